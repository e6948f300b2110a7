//! Contact form endpoint.

use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;

use crate::services::contact::{self, ContactError, ContactForm};
use crate::state::AppState;

pub const SENT_MESSAGE: &str = "Mail sent successfully.";
pub const DELIVERY_FAILED_MESSAGE: &str = "Mail delivery failed, please try again later.";
pub const UNAVAILABLE_MESSAGE: &str = "The contact form is currently unavailable.";
pub const RATE_LIMITED_MESSAGE: &str = "Too many messages, please try again later.";
pub const MALFORMED_MESSAGE: &str = "The form data could not be read.";

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub message: String,
}

fn reply(status: StatusCode, message: &str) -> (StatusCode, Json<ContactResponse>) {
    (status, Json(ContactResponse { message: message.to_owned() }))
}

/// Status and user-facing message for a failed submission. Delivery
/// failures get a generic message; the transport error is only logged.
pub(crate) fn contact_error_to_response(err: &ContactError) -> (StatusCode, String) {
    match err {
        ContactError::Mail(_) => (StatusCode::BAD_REQUEST, DELIVERY_FAILED_MESSAGE.to_owned()),
        ContactError::MissingFields
        | ContactError::NameTooShort
        | ContactError::InvalidEmail
        | ContactError::MessageTooShort => (StatusCode::BAD_REQUEST, err.to_string()),
    }
}

/// `POST /api/contact`: validate the form and forward it by mail.
pub async fn submit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    form: Result<Json<ContactForm>, JsonRejection>,
) -> (StatusCode, Json<ContactResponse>) {
    let form = match form {
        Ok(Json(form)) => form,
        Err(e) => {
            tracing::debug!(error = %e, "unreadable contact body");
            return reply(StatusCode::BAD_REQUEST, MALFORMED_MESSAGE);
        }
    };
    let Some(mail) = state.mail.as_ref() else {
        return reply(StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_MESSAGE);
    };

    if let Err(e) = state.contact_limiter.check_and_record(addr.ip()) {
        tracing::warn!(client = %addr.ip(), error = %e, "contact form rate limited");
        return reply(StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED_MESSAGE);
    }

    match contact::submit(mail.mailer.as_ref(), &mail.config, &form).await {
        Ok(()) => reply(StatusCode::OK, SENT_MESSAGE),
        Err(e) => {
            if matches!(e, ContactError::Mail(_)) {
                tracing::error!(error = %e, "contact mail delivery failed");
            }
            let (status, message) = contact_error_to_response(&e);
            reply(status, &message)
        }
    }
}

#[cfg(test)]
#[path = "contact_test.rs"]
mod tests;
