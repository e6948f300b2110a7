use super::*;

use std::net::SocketAddr;
use std::path::PathBuf;

use reader::Manifest;

use crate::config::MagazineSource;
use crate::state::test_helpers::test_config;

/// Fresh scratch directory under the system temp dir.
fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sanxia-site-{label}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

async fn serve(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app(state);
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });
    format!("http://{addr}")
}

/// Site with a public dir holding `robots.txt` and an image-dir magazine.
async fn serve_site() -> String {
    let public = scratch_dir("public");
    std::fs::write(public.join("robots.txt"), "User-agent: *\n").unwrap();
    let pages = scratch_dir("pages");
    std::fs::write(pages.join("1.jpg"), b"jpeg-bytes").unwrap();

    let mut config = test_config();
    config.public_dir = public;
    config.magazine = MagazineSource::ImageDir(pages);
    let manifest = Manifest { cover: None, pages: vec![format!("{PAGES_ROUTE}/1.jpg")] };
    serve(AppState::new(&config, None, None, manifest)).await
}

#[tokio::test]
async fn healthz_is_ok() {
    let base = serve_site().await;
    let response = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn pages_render_with_layout() {
    let base = serve_site().await;
    for path in ["/", "/about", "/contact", "/meeting", "/meeting/international", "/magazine"] {
        let response = reqwest::get(format!("{base}{path}")).await.unwrap();
        assert_eq!(response.status(), 200, "{path}");
        let html = response.text().await.unwrap();
        assert!(html.contains("<nav class=\"site-nav\">"), "{path}");
        assert!(html.contains(&format!(r#"href="{path}" class="active""#)), "{path}");
    }
}

#[tokio::test]
async fn static_files_are_served_from_public_dir() {
    let base = serve_site().await;
    let response = reqwest::get(format!("{base}/robots.txt")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "User-agent: *\n");
}

#[tokio::test]
async fn unknown_paths_render_not_found_page() {
    let base = serve_site().await;
    let response = reqwest::get(format!("{base}/no/such/page")).await.unwrap();
    assert_eq!(response.status(), 404);
    assert!(response.text().await.unwrap().contains("Page not found"));
}

#[tokio::test]
async fn magazine_images_are_served_from_image_dir() {
    let base = serve_site().await;
    let response = reqwest::get(format!("{base}{PAGES_ROUTE}/1.jpg")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"jpeg-bytes");
}

#[tokio::test]
async fn magazine_api_returns_manifest() {
    let base = serve_site().await;
    let json: serde_json::Value = reqwest::get(format!("{base}/api/magazine"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "cover": "/magazine/pages/1.jpg",
            "pages": ["/magazine/pages/1.jpg"],
            "total": 1
        })
    );
}

#[tokio::test]
async fn contact_without_mail_is_unavailable() {
    let base = serve_site().await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/contact"))
        .json(&serde_json::json!({"name": "Lin", "email": "lin@example.org", "message": "Hello there, friends"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn chat_without_backend_is_unavailable() {
    let base = serve_site().await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/chat"))
        .json(&serde_json::json!({"message": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);
}

async fn post_raw(url: String, content_type: &str, body: &'static str) -> reqwest::Response {
    reqwest::Client::new()
        .post(url)
        .header("content-type", content_type)
        .body(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn contact_with_wrong_field_type_answers_400_message() {
    let base = serve_site().await;
    let response = post_raw(
        format!("{base}/api/contact"),
        "application/json",
        r#"{"name":5,"email":"lin@example.org","message":"Hello there, friends"}"#,
    )
    .await;
    assert_eq!(response.status(), 400);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json, serde_json::json!({"message": contact::MALFORMED_MESSAGE}));
}

#[tokio::test]
async fn contact_with_non_json_body_answers_400_message() {
    let base = serve_site().await;
    let response = post_raw(format!("{base}/api/contact"), "text/plain", "name=Lin").await;
    assert_eq!(response.status(), 400);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["message"], contact::MALFORMED_MESSAGE);
}

#[tokio::test]
async fn chat_with_malformed_body_answers_400_message() {
    let base = serve_site().await;
    let response = post_raw(format!("{base}/api/chat"), "application/json", r#"{"message":["hi"]}"#).await;
    assert_eq!(response.status(), 400);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json, serde_json::json!({"message": chat::MALFORMED_MESSAGE}));
}
