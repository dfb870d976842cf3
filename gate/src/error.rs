//! Error types for the session gate.
//!
//! Recoverable environmental failures (transport errors, timeouts, bad
//! redirect tokens) never surface here; they are folded into session state or
//! a safe default. These types cover contract violations and bad config.

use crate::store::SessionStatus;

/// Contract violation against the session store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A resolve operation was called while no verification was in progress.
    #[error("invalid session transition: {operation} called while status is {from}")]
    InvalidTransition { from: SessionStatus, operation: &'static str },
}

/// Rejected [`GateConfig`](crate::config::GateConfig) values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("login path must be an absolute in-app path, got {0:?}")]
    InvalidLoginPath(String),
    #[error("default landing path must be an absolute in-app path, got {0:?}")]
    InvalidLandingPath(String),
    #[error("redirect parameter name must not be empty")]
    EmptyRedirectParam,
    #[error("verification timeout must be greater than zero")]
    ZeroTimeout,
}
