mod chat;
mod config;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::chat::ChatBackend;
use crate::services::mail::Mailer;

const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ignoring unreadable .env: {e}");
        }
    }
    tracing_subscriber::fmt::init();

    let config = config::Config::from_env().expect("invalid configuration");
    let port = config.port;

    // Optional integrations: the matching endpoints answer 503 when disabled.
    let mail = config.mail.as_ref().map(|mail_config| {
        tracing::info!(receiver = %mail_config.receiver, "mail delivery configured");
        state::MailSetup {
            mailer: Arc::new(services::mail::ResendMailer::new(mail_config)) as Arc<dyn Mailer>,
            config: mail_config.clone(),
        }
    });
    if mail.is_none() {
        tracing::warn!("RESEND_API_KEY/MAIL_FROM/MAIL_RECEIVER not set; contact form disabled");
    }

    let chat = match &config.chat {
        Some(chat_config) => match chat::dify::DifyClient::new(chat_config) {
            Ok(client) => {
                tracing::info!(base_url = %chat_config.base_url, "chat backend initialized");
                Some(Arc::new(client) as Arc<dyn ChatBackend>)
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat backend unavailable; chat disabled");
                None
            }
        },
        None => {
            tracing::warn!("CHAT_API_KEY not set; chat disabled");
            None
        }
    };

    let magazine = services::magazine::load(&config.magazine).expect("magazine manifest");
    tracing::info!(pages = magazine.pages.len(), "magazine loaded");

    let state = state::AppState::new(&config, mail, chat, magazine);

    let _sweeper = rate_limit::spawn_sweeper(
        vec![state.contact_limiter.clone(), state.chat_limiter.clone()],
        SWEEP_INTERVAL,
    );

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "sanxia-site listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .expect("server failed");
}
