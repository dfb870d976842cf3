//! REST API helpers for the backend's auth endpoints.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`; the session cookie
//! rides along on same-origin requests.
//! Server-side (SSR): stubs returning errors since these endpoints are only
//! meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Callers get `CheckOutcome`/`Result` outputs instead of panics. The identity
//! check folds every non-success outcome into the gate's taxonomy (rejected vs
//! failed) and never surfaces a transport error as a crash.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;
use gate::{CheckOutcome, IdentityCheck};

const LOGIN_ENDPOINT: &str = "/api/auth/login";
const LOGOUT_ENDPOINT: &str = "/api/auth/logout";

/// Outcome implied by the identity endpoint's status alone.
///
/// `None` means success: the body must be parsed for the identity payload.
#[cfg(any(test, feature = "hydrate"))]
fn outcome_for_status(status: u16) -> Option<CheckOutcome> {
    match status {
        200..=299 => None,
        401 | 403 => Some(CheckOutcome::Rejected),
        other => Some(CheckOutcome::Failed(unexpected_status_message(other))),
    }
}

#[cfg(any(test, feature = "hydrate"))]
fn unexpected_status_message(status: u16) -> String {
    format!("identity check failed: {status}")
}

#[cfg(any(test, feature = "hydrate"))]
fn login_failed_message(status: u16) -> String {
    match status {
        401 | 403 => "Invalid email or password.".to_owned(),
        429 => "Too many attempts; try again shortly.".to_owned(),
        other => format!("login failed: {other}"),
    }
}

/// Identity check against `GET {endpoint}` (default `/api/auth/me`).
pub struct HttpIdentityCheck {
    endpoint: String,
}

impl HttpIdentityCheck {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }
}

#[async_trait(?Send)]
impl IdentityCheck for HttpIdentityCheck {
    async fn check(&self) -> CheckOutcome {
        #[cfg(feature = "hydrate")]
        {
            let resp = match gloo_net::http::Request::get(&self.endpoint).send().await {
                Ok(resp) => resp,
                Err(e) => return CheckOutcome::Failed(e.to_string()),
            };
            if let Some(outcome) = outcome_for_status(resp.status()) {
                return outcome;
            }
            match resp.json::<gate::Identity>().await {
                Ok(user) => CheckOutcome::Authenticated(user),
                Err(e) => CheckOutcome::Failed(format!("malformed identity payload: {e}")),
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = &self.endpoint;
            CheckOutcome::Failed("not available on server".to_owned())
        }
    }
}

/// Submit credentials via `POST /api/auth/login`; the backend sets the session cookie.
///
/// # Errors
///
/// Returns a user-facing error string if the request fails or credentials are rejected.
pub async fn login(email: &str, password: &str) -> Result<(), String> {
    #[cfg(feature = "hydrate")]
    {
        let payload = serde_json::json!({ "email": email, "password": password });
        let resp = gloo_net::http::Request::post(LOGIN_ENDPOINT)
            .json(&payload)
            .map_err(|e| e.to_string())?
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            return Err(login_failed_message(resp.status()));
        }
        Ok(())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (email, password, LOGIN_ENDPOINT);
        Err("not available on server".to_owned())
    }
}

/// Log out the current user by calling `POST /api/auth/logout`.
pub async fn logout() {
    #[cfg(feature = "hydrate")]
    {
        if let Err(e) = gloo_net::http::Request::post(LOGOUT_ENDPOINT).send().await {
            leptos::logging::warn!("logout request failed: {e}");
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = LOGOUT_ENDPOINT;
    }
}
