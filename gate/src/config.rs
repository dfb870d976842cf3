//! Gate configuration: entry points, redirect parameter, and timeout bound.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
pub const DEFAULT_REDIRECT_PARAM: &str = "redirect";
pub const DEFAULT_LANDING_PATH: &str = "/";
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "/api/auth/me";
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 10;

/// Static settings shared by the verifier, guard, and redirect helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Login entry point that accepts the preserved destination.
    pub login_path: String,
    /// Query parameter name carrying the encoded destination.
    pub redirect_param: String,
    /// Where visitors land when no (valid) destination was preserved.
    pub default_landing: String,
    /// Upper bound on a single identity check before it resolves as a timeout.
    pub verify_timeout: Duration,
    /// Identity-check endpoint on the backend.
    pub identity_endpoint: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            redirect_param: DEFAULT_REDIRECT_PARAM.to_owned(),
            default_landing: DEFAULT_LANDING_PATH.to_owned(),
            verify_timeout: Duration::from_secs(DEFAULT_VERIFY_TIMEOUT_SECS),
            identity_endpoint: DEFAULT_IDENTITY_ENDPOINT.to_owned(),
        }
    }
}

impl GateConfig {
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    #[must_use]
    pub fn with_redirect_param(mut self, param: impl Into<String>) -> Self {
        self.redirect_param = param.into();
        self
    }

    #[must_use]
    pub fn with_default_landing(mut self, path: impl Into<String>) -> Self {
        self.default_landing = path.into();
        self
    }

    #[must_use]
    pub fn with_verify_timeout(mut self, timeout: Duration) -> Self {
        self.verify_timeout = timeout;
        self
    }

    /// Override the timeout from an optional raw seconds value, keeping the
    /// current bound when the value is absent, unparsable, or zero.
    #[must_use]
    pub fn with_timeout_secs_str(self, raw: Option<&str>) -> Self {
        match raw.and_then(|v| v.trim().parse::<u64>().ok()).filter(|secs| *secs > 0) {
            Some(secs) => self.with_verify_timeout(Duration::from_secs(secs)),
            None => self,
        }
    }

    #[must_use]
    pub fn with_identity_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.identity_endpoint = endpoint.into();
        self
    }

    /// Check that the configured paths stay inside the application.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_app_path(&self.login_path) {
            return Err(ConfigError::InvalidLoginPath(self.login_path.clone()));
        }
        if !is_app_path(&self.default_landing) {
            return Err(ConfigError::InvalidLandingPath(self.default_landing.clone()));
        }
        if self.redirect_param.trim().is_empty() {
            return Err(ConfigError::EmptyRedirectParam);
        }
        if self.verify_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

fn is_app_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}
