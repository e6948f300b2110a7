//! Contact form: validation and mail composition.

use serde::Deserialize;

use super::mail::{MailError, Mailer, OutgoingMail};
use crate::config::MailConfig;

pub const SENDER_NAME: &str = "Sanxia JCI Website";
pub const DEFAULT_SUBJECT: &str = "Contact form message";

const MIN_NAME_CHARS: usize = 2;
const MIN_MESSAGE_CHARS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("Please fill in all required fields.")]
    MissingFields,
    #[error("Name must be at least 2 characters.")]
    NameTooShort,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Message must be at least 10 characters.")]
    MessageTooShort,
    #[error(transparent)]
    Mail(#[from] MailError),
}

/// Raw submission. Missing fields deserialize as empty and fail validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

/// A submission that passed validation; every field is trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Validate and normalize a form submission.
///
/// # Errors
///
/// Returns the first rule the submission breaks.
pub fn validate(form: &ContactForm) -> Result<Submission, ContactError> {
    let name = form.name.trim();
    let email = form.email.trim();
    let message = form.message.trim();

    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err(ContactError::MissingFields);
    }
    if name.chars().count() < MIN_NAME_CHARS {
        return Err(ContactError::NameTooShort);
    }
    if !is_valid_email(email) {
        return Err(ContactError::InvalidEmail);
    }
    if message.chars().count() < MIN_MESSAGE_CHARS {
        return Err(ContactError::MessageTooShort);
    }

    let subject = form
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SUBJECT);

    Ok(Submission {
        name: name.to_owned(),
        email: email.to_owned(),
        subject: subject.to_owned(),
        message: message.to_owned(),
    })
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // At least one dot with something on both sides of some dot.
    domain
        .match_indices('.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

/// Address the submission to the configured receiver.
#[must_use]
pub fn compose(submission: &Submission, config: &MailConfig) -> OutgoingMail {
    OutgoingMail {
        from: format!("{SENDER_NAME} <{}>", config.from),
        to: config.receiver.clone(),
        subject: submission.subject.clone(),
        text: format!("Name: {}\nEmail: {}\n\n{}", submission.name, submission.email, submission.message),
    }
}

/// Validate, compose and deliver one submission.
///
/// # Errors
///
/// Validation errors, or [`ContactError::Mail`] when delivery fails.
pub async fn submit(mailer: &dyn Mailer, config: &MailConfig, form: &ContactForm) -> Result<(), ContactError> {
    let submission = validate(form)?;
    let mail = compose(&submission, config);
    mailer.send(&mail).await?;
    tracing::info!(subject = %submission.subject, "contact message delivered");
    Ok(())
}

#[cfg(test)]
#[path = "contact_test.rs"]
mod tests;
