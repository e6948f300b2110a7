//! Outgoing mail transport.
//!
//! `Mailer` is the seam handlers talk to; production uses Resend, tests use a
//! recording mock.

use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;

use crate::config::MailConfig;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

/// A fully addressed plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// `Display Name <address>`.
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Async mail transport. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver `mail`.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Delivery`] when the transport rejects the message.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Mail sent through the Resend HTTP API.
pub struct ResendMailer {
    client: Resend,
}

impl ResendMailer {
    #[must_use]
    pub fn new(config: &MailConfig) -> Self {
        Self { client: Resend::new(&config.api_key) }
    }
}

#[async_trait::async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let email = CreateEmailBaseOptions::new(&mail.from, [mail.to.as_str()], &mail.subject).with_text(&mail.text);
        self.client
            .emails
            .send(email)
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;
        Ok(())
    }
}
