//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Server-rendered pages, the JSON API and static assets share one Axum
//! router. Unknown paths fall through to the public directory and finally
//! to the rendered 404 page. Handlers read the client address from
//! `ConnectInfo`, so the router must be served with
//! `into_make_service_with_connect_info::<SocketAddr>()`.

pub mod chat;
pub mod contact;
pub mod magazine;
pub mod pages;

use axum::Router;
use axum::handler::HandlerWithoutStateExt;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::services::magazine::PAGES_ROUTE;
use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = ServeDir::new(&state.public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(pages::not_found.into_service());

    let mut router = Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        .route("/meeting", get(pages::meeting))
        .route("/meeting/international", get(pages::international))
        .route("/magazine", get(pages::magazine))
        .route("/api/contact", post(contact::submit))
        .route("/api/chat", post(chat::ask))
        .route("/api/magazine", get(magazine::manifest))
        .route("/healthz", get(healthz));

    if let Some(dir) = &state.magazine_dir {
        router = router.nest_service(PAGES_ROUTE, ServeDir::new(dir));
    }

    router
        .fallback_service(public)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
