//! In-memory rate limiting for the form and chat endpoints.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<IpAddr, VecDeque<Instant>>`.
//! Two limits are enforced per limiter:
//! - Per-client: requests per window from one IP address
//! - Global: requests per window across all clients
//!
//! Each endpoint family owns its own limiter so chat traffic can never
//! exhaust the contact form's allowance.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::{ConfigError, parse_or};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_client_limit: usize,
    pub per_client_window: Duration,
    pub global_limit: usize,
    pub global_window: Duration,
}

impl RateLimitConfig {
    pub const CONTACT_DEFAULTS: Self = Self {
        per_client_limit: 3,
        per_client_window: Duration::from_secs(600),
        global_limit: 30,
        global_window: Duration::from_secs(600),
    };

    pub const CHAT_DEFAULTS: Self = Self {
        per_client_limit: 10,
        per_client_window: Duration::from_secs(60),
        global_limit: 60,
        global_window: Duration::from_secs(60),
    };

    /// Read `RATE_LIMIT_{scope}_PER_CLIENT`, `..._PER_CLIENT_WINDOW_SECS`,
    /// `..._GLOBAL` and `..._GLOBAL_WINDOW_SECS`, keeping `defaults` for
    /// anything unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value does not parse.
    pub fn from_lookup(
        lookup: &impl Fn(&str) -> Option<String>,
        scope: &str,
        defaults: Self,
    ) -> Result<Self, ConfigError> {
        let var = |suffix: &str| format!("RATE_LIMIT_{scope}_{suffix}");
        let secs = |suffix: &str, default: Duration| -> Result<Duration, ConfigError> {
            parse_or(lookup, &var(suffix), default.as_secs()).map(Duration::from_secs)
        };
        Ok(Self {
            per_client_limit: parse_or(lookup, &var("PER_CLIENT"), defaults.per_client_limit)?,
            per_client_window: secs("PER_CLIENT_WINDOW_SECS", defaults.per_client_window)?,
            global_limit: parse_or(lookup, &var("GLOBAL"), defaults.global_limit)?,
            global_window: secs("GLOBAL_WINDOW_SECS", defaults.global_window)?,
        })
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum RateLimitError {
    #[error("per-client rate limit exceeded (max {limit} requests/{window_secs}s)")]
    PerClientExceeded { limit: usize, window_secs: u64 },
    #[error("global rate limit exceeded (max {limit} requests/{window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
    config: RateLimitConfig,
}

#[derive(Default)]
struct RateLimiterInner {
    client_requests: HashMap<IpAddr, VecDeque<Instant>>,
    global_requests: VecDeque<Instant>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self { inner: Arc::new(Mutex::new(RateLimiterInner::default())), config }
    }

    /// Check both limits for `client`, then record the request.
    ///
    /// # Errors
    ///
    /// Returns the first limit that would be exceeded; nothing is recorded.
    pub fn check_and_record(&self, client: IpAddr) -> Result<(), RateLimitError> {
        self.check_and_record_at(client, Instant::now())
    }

    fn check_and_record_at(&self, client: IpAddr, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let cfg = self.config;

        prune_window(&mut inner.global_requests, now, cfg.global_window);
        if inner.global_requests.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }

        let client_deque = inner.client_requests.entry(client).or_default();
        prune_window(client_deque, now, cfg.per_client_window);
        if client_deque.len() >= cfg.per_client_limit {
            return Err(RateLimitError::PerClientExceeded {
                limit: cfg.per_client_limit,
                window_secs: cfg.per_client_window.as_secs(),
            });
        }

        client_deque.push_back(now);
        inner.global_requests.push_back(now);
        Ok(())
    }

    /// Drop clients with no requests left in their window.
    pub fn sweep(&self) {
        self.sweep_at(Instant::now());
    }

    fn sweep_at(&self, now: Instant) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let window = self.config.per_client_window;
        inner.client_requests.retain(|_, deque| {
            prune_window(deque, now, window);
            !deque.is_empty()
        });
    }

    fn tracked_clients(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .client_requests
            .len()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

/// Periodically sweep idle clients so the maps stay bounded.
pub fn spawn_sweeper(limiters: Vec<RateLimiter>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            for limiter in &limiters {
                limiter.sweep();
            }
            let tracked: usize = limiters.iter().map(RateLimiter::tracked_clients).sum();
            tracing::debug!(tracked, "rate limiter sweep");
        }
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
