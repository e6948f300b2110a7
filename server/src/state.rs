//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Everything in it is immutable after startup except the rate limiters,
//! which carry their own locks. Optional integrations are `None` when their
//! configuration is absent, and the matching endpoints answer 503.

use std::path::PathBuf;
use std::sync::Arc;

use reader::Manifest;

use crate::chat::ChatBackend;
use crate::config::{Config, MailConfig};
use crate::rate_limit::RateLimiter;
use crate::services::mail::Mailer;

/// Mail transport plus the addresses it sends between.
#[derive(Clone)]
pub struct MailSetup {
    pub mailer: Arc<dyn Mailer>,
    pub config: MailConfig,
}

/// Shared application state. Clone is required by Axum; all inner fields
/// are `Arc`-wrapped or cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub mail: Option<MailSetup>,
    pub chat: Option<Arc<dyn ChatBackend>>,
    pub magazine: Arc<Manifest>,
    /// Static files served for unknown paths.
    pub public_dir: PathBuf,
    /// Page images of a directory-backed magazine.
    pub magazine_dir: Option<PathBuf>,
    pub contact_limiter: RateLimiter,
    pub chat_limiter: RateLimiter,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: &Config,
        mail: Option<MailSetup>,
        chat: Option<Arc<dyn ChatBackend>>,
        magazine: Manifest,
    ) -> Self {
        let magazine_dir = match &config.magazine {
            crate::config::MagazineSource::ImageDir(dir) => Some(dir.clone()),
            _ => None,
        };
        Self {
            mail,
            chat,
            magazine: Arc::new(magazine),
            public_dir: config.public_dir.clone(),
            magazine_dir,
            contact_limiter: RateLimiter::new(config.contact_limits),
            chat_limiter: RateLimiter::new(config.chat_limits),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
