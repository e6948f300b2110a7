//! Process configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Everything is read once at startup into typed structs. Parsing goes
//! through a lookup closure so tests can feed a map instead of mutating the
//! process environment. Mail and chat are optional: when none of their
//! variables are set the feature is disabled, when only some are set startup
//! fails so a typo is not silently ignored.

use std::path::PathBuf;

use crate::rate_limit::RateLimitConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PUBLIC_DIR: &str = "public";
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.dify.ai";
pub const DEFAULT_CHAT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CHAT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: String, value: String },
    #[error("{feature} is partially configured: {var} is missing")]
    Incomplete { feature: &'static str, var: &'static str },
}

/// Where the magazine manifest comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MagazineSource {
    /// JSON file holding `{cover, pages}`.
    ManifestFile(PathBuf),
    /// Directory of page images, listed in name order.
    ImageDir(PathBuf),
    /// No magazine configured; the manifest is empty.
    Unconfigured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub api_key: String,
    /// Sender mailbox address.
    pub from: String,
    /// Mailbox that receives contact submissions.
    pub receiver: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub api_key: String,
    /// Base URL without trailing slash.
    pub base_url: String,
    pub timeouts: ChatTimeouts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub public_dir: PathBuf,
    pub magazine: MagazineSource,
    pub mail: Option<MailConfig>,
    pub chat: Option<ChatConfig>,
    pub contact_limits: RateLimitConfig,
    pub chat_limits: RateLimitConfig,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparsable numbers or partially
    /// configured optional features.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`.
    ///
    /// - `PORT`: default 3000
    /// - `PUBLIC_DIR`: static files, default `public`
    /// - `MAGAZINE_MANIFEST` or `MAGAZINE_DIR`: magazine source, manifest wins
    /// - `RESEND_API_KEY`, `MAIL_FROM`, `MAIL_RECEIVER`: all or none
    /// - `CHAT_API_KEY`: enables chat; `CHAT_BASE_URL`,
    ///   `CHAT_REQUEST_TIMEOUT_SECS`, `CHAT_CONNECT_TIMEOUT_SECS` optional
    /// - `RATE_LIMIT_CONTACT_*` and `RATE_LIMIT_CHAT_*`: see [`RateLimitConfig`]
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let public_dir = non_empty(&lookup, "PUBLIC_DIR").map_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR), PathBuf::from);

        let magazine = match (non_empty(&lookup, "MAGAZINE_MANIFEST"), non_empty(&lookup, "MAGAZINE_DIR")) {
            (Some(file), _) => MagazineSource::ManifestFile(file.into()),
            (None, Some(dir)) => MagazineSource::ImageDir(dir.into()),
            (None, None) => MagazineSource::Unconfigured,
        };

        Ok(Self {
            port,
            public_dir,
            magazine,
            mail: parse_mail(&lookup)?,
            chat: parse_chat(&lookup)?,
            contact_limits: RateLimitConfig::from_lookup(&lookup, "CONTACT", RateLimitConfig::CONTACT_DEFAULTS)?,
            chat_limits: RateLimitConfig::from_lookup(&lookup, "CHAT", RateLimitConfig::CHAT_DEFAULTS)?,
        })
    }
}

fn parse_mail(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<MailConfig>, ConfigError> {
    const VARS: [&str; 3] = ["RESEND_API_KEY", "MAIL_FROM", "MAIL_RECEIVER"];
    let [api_key, from, receiver] = VARS.map(|var| non_empty(lookup, var));
    match (api_key, from, receiver) {
        (None, None, None) => Ok(None),
        (Some(api_key), Some(from), Some(receiver)) => Ok(Some(MailConfig { api_key, from, receiver })),
        (api_key, from, _) => {
            let var = if api_key.is_none() {
                VARS[0]
            } else if from.is_none() {
                VARS[1]
            } else {
                VARS[2]
            };
            Err(ConfigError::Incomplete { feature: "mail", var })
        }
    }
}

fn parse_chat(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<ChatConfig>, ConfigError> {
    let Some(api_key) = non_empty(lookup, "CHAT_API_KEY") else {
        return Ok(None);
    };
    let base_url = non_empty(lookup, "CHAT_BASE_URL")
        .unwrap_or_else(|| DEFAULT_CHAT_BASE_URL.to_owned())
        .trim_end_matches('/')
        .to_owned();
    let timeouts = ChatTimeouts {
        request_secs: parse_or(lookup, "CHAT_REQUEST_TIMEOUT_SECS", DEFAULT_CHAT_REQUEST_TIMEOUT_SECS)?,
        connect_secs: parse_or(lookup, "CHAT_CONNECT_TIMEOUT_SECS", DEFAULT_CHAT_CONNECT_TIMEOUT_SECS)?,
    };
    Ok(Some(ChatConfig { api_key, base_url, timeouts }))
}

/// Trimmed value of `var`, treating blank as unset.
pub(crate) fn non_empty(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    lookup(var)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Parse `var`, falling back to `default` when unset.
pub(crate) fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError> {
    match non_empty(lookup, var) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { var: var.to_owned(), value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
