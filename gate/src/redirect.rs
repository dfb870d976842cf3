//! Round-trips the originally requested destination through the login flow.
//!
//! The destination travels as one opaque, percent-encoded query parameter on
//! the login entry point (`/auth/login?redirect=%2Fhotels%2F42%2Fedit`).
//! Decoding never fails: anything that is not a plain in-app path falls back
//! to the default landing path and is never treated as an external URL.

#[cfg(test)]
#[path = "redirect_test.rs"]
mod redirect_test;

use std::fmt;

use url::{Url, form_urlencoded};

use crate::config::GateConfig;

/// Placeholder origin used to check that a decoded path stays in-app.
const APP_ORIGIN: &str = "http://propdesk.invalid/";

/// Path and query a visitor asked for before being gated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RedirectTarget {
    pub path: String,
    /// Query string without the leading `?`; empty when absent.
    pub query: String,
}

impl RedirectTarget {
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        let query = query.into();
        let query = match query.strip_prefix('?') {
            Some(rest) => rest.to_owned(),
            None => query,
        };
        Self { path: path.into(), query }
    }

    /// The configured default landing destination.
    #[must_use]
    pub fn landing(config: &GateConfig) -> Self {
        Self::new(config.default_landing.clone(), String::new())
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            f.write_str(&self.path)
        } else {
            write!(f, "{}?{}", self.path, self.query)
        }
    }
}

/// Encode a destination as a single URL-safe parameter value.
#[must_use]
pub fn encode(path: &str, query: &str) -> String {
    let target = RedirectTarget::new(path, query);
    form_urlencoded::byte_serialize(target.to_string().as_bytes()).collect()
}

/// Decode a token produced by [`encode`].
///
/// Missing, malformed, external, or self-referencing (login page) tokens yield
/// the configured default landing path.
#[must_use]
pub fn decode(token: &str, config: &GateConfig) -> RedirectTarget {
    match parse_token(token, config) {
        Some(target) => target,
        None => {
            if !token.is_empty() {
                tracing::warn!(token, "ignoring unusable redirect token");
            }
            RedirectTarget::landing(config)
        }
    }
}

/// Login URL carrying `target` as the preserved destination.
#[must_use]
pub fn login_url(config: &GateConfig, target: &RedirectTarget) -> String {
    format!(
        "{}?{}={}",
        config.login_path,
        config.redirect_param,
        encode(&target.path, &target.query)
    )
}

/// Raw (still encoded) value of `param` in a query string.
#[must_use]
pub fn token_from_search<'a>(search: &'a str, param: &str) -> Option<&'a str> {
    let search = search.strip_prefix('?').unwrap_or(search);
    search.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == param && !value.is_empty()).then_some(value)
    })
}

/// Where to go after a successful login, given the login page's query string.
#[must_use]
pub fn destination_from_search(search: &str, config: &GateConfig) -> RedirectTarget {
    match token_from_search(search, &config.redirect_param) {
        Some(token) => decode(token, config),
        None => RedirectTarget::landing(config),
    }
}

fn parse_token(token: &str, config: &GateConfig) -> Option<RedirectTarget> {
    if token.is_empty() || token.contains(['&', '=', '#']) {
        return None;
    }
    let (raw, _) = form_urlencoded::parse(token.as_bytes()).next()?;
    if raw.contains(char::REPLACEMENT_CHARACTER) || !is_in_app(&raw) {
        return None;
    }

    let target = match raw.split_once('?') {
        Some((path, query)) => RedirectTarget::new(path, query),
        None => RedirectTarget::new(&*raw, ""),
    };
    if target.path == config.login_path {
        return None;
    }
    Some(target)
}

fn is_in_app(raw: &str) -> bool {
    if !raw.starts_with('/') || raw.starts_with("//") || raw.starts_with("/\\") {
        return false;
    }
    if raw.chars().any(char::is_control) {
        return false;
    }
    let Ok(origin) = Url::parse(APP_ORIGIN) else {
        return false;
    };
    origin
        .join(raw)
        .is_ok_and(|joined| joined.scheme() == origin.scheme() && joined.host_str() == origin.host_str())
}
