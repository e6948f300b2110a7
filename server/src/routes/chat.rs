//! Chat assistant endpoint.

use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::{self, ChatError, ChatQuery};
use crate::state::AppState;

pub const EMPTY_MESSAGE: &str = "Please enter a question.";
pub const MALFORMED_MESSAGE: &str = "The question could not be read.";
pub const UNAVAILABLE_MESSAGE: &str = "The assistant is currently unavailable.";
pub const RATE_LIMITED_MESSAGE: &str = "Too many questions, please wait a moment.";
pub const UPSTREAM_FAILED_MESSAGE: &str = "The assistant could not answer right now, please try again later.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
    pub user: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatFailure {
    pub message: String,
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(ChatFailure { message: message.to_owned() })).into_response()
}

pub(crate) fn chat_error_to_status(err: &ChatError) -> StatusCode {
    match err {
        ChatError::HttpClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ChatError::ApiRequest(_) | ChatError::ApiResponse { .. } | ChatError::ApiParse(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Blank ids are treated as absent; a missing user gets a fresh id the
/// client is expected to send back on later turns.
fn to_query(request: ChatRequest) -> Option<ChatQuery> {
    let text = request.message.trim();
    if text.is_empty() {
        return None;
    }
    let user = request
        .user
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    Some(ChatQuery {
        text: text.to_owned(),
        conversation_id: request.conversation_id.filter(|c| !c.trim().is_empty()),
        user,
    })
}

/// `POST /api/chat`: answer one message through the configured backend.
pub async fn ask(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match request {
        Ok(Json(request)) => request,
        Err(e) => {
            tracing::debug!(error = %e, "unreadable chat body");
            return failure(StatusCode::BAD_REQUEST, MALFORMED_MESSAGE);
        }
    };
    let Some(query) = to_query(request) else {
        return failure(StatusCode::BAD_REQUEST, EMPTY_MESSAGE);
    };
    let Some(backend) = state.chat.as_ref() else {
        return failure(StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_MESSAGE);
    };

    if let Err(e) = state.chat_limiter.check_and_record(addr.ip()) {
        tracing::warn!(client = %addr.ip(), error = %e, "chat rate limited");
        return failure(StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED_MESSAGE);
    }

    match chat::respond(backend.as_ref(), query).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "chat backend failed");
            failure(chat_error_to_status(&e), UPSTREAM_FAILED_MESSAGE)
        }
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
