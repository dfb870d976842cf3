//! Host configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use url::Url;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PROXY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ServerConfigError {
    #[error("invalid PORT '{0}'")]
    InvalidPort(String),
    #[error("invalid PROPDESK_BACKEND_URL '{value}': {reason}")]
    InvalidBackendUrl { value: String, reason: String },
    #[error("PROPDESK_BACKEND_URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Remote API base; `/api/*` answers 503 when absent.
    pub backend_url: Option<Url>,
    pub proxy_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT, backend_url: None, proxy_timeout: Duration::from_secs(DEFAULT_PROXY_TIMEOUT_SECS) }
    }
}

impl ServerConfig {
    /// Build host config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `PROPDESK_BACKEND_URL`: remote API base URL
    /// - `PROPDESK_PROXY_TIMEOUT_SECS`: default 30
    ///
    /// # Errors
    ///
    /// Returns an error when `PORT` or `PROPDESK_BACKEND_URL` is malformed.
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns an error when `PORT` or `PROPDESK_BACKEND_URL` is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ServerConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        let backend_url = lookup("PROPDESK_BACKEND_URL")
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_backend_url(&raw))
            .transpose()?;
        let proxy_timeout = Duration::from_secs(parse_u64_or(
            lookup("PROPDESK_PROXY_TIMEOUT_SECS").as_deref(),
            DEFAULT_PROXY_TIMEOUT_SECS,
        ));

        Ok(Self { port, backend_url, proxy_timeout })
    }
}

fn parse_backend_url(raw: &str) -> Result<Url, ServerConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|e| ServerConfigError::InvalidBackendUrl { value: trimmed.to_owned(), reason: e.to_string() })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ServerConfigError::UnsupportedScheme(other.to_owned())),
    }
}

/// Zero and unparsable values fall back to the default.
fn parse_u64_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}
