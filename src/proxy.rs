//! Same-origin forwarding of `/api/*` to the remote backend.
//!
//! The console's session cookie is scoped to the host serving the SSR pages,
//! so identity, login and logout calls go through here instead of hitting the
//! backend cross-origin.

#[cfg(test)]
#[path = "proxy_test.rs"]
mod proxy_test;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, HeaderName, SET_COOKIE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use url::Url;

/// Request headers copied to the upstream call.
static FORWARDED_REQUEST_HEADERS: [HeaderName; 3] = [COOKIE, CONTENT_TYPE, AUTHORIZATION];
/// Response headers copied back to the browser.
static FORWARDED_RESPONSE_HEADERS: [HeaderName; 2] = [SET_COOKIE, CONTENT_TYPE];
const MAX_BODY_BYTES: usize = 1024 * 1024;
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("no backend configured")]
    NotConfigured,
    #[error("failed to build proxy client: {0}")]
    ClientBuild(String),
    #[error("request body rejected: {0}")]
    Body(String),
    #[error("invalid upstream url: {0}")]
    InvalidTarget(String),
    #[error("upstream request failed: {0}")]
    Upstream(String),
}

impl ProxyError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::ClientBuild(_) | Self::InvalidTarget(_) | Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::BAD_GATEWAY {
            tracing::warn!(error = %self, "api proxy failed");
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// Forwarding target shared by every proxied request.
#[derive(Debug)]
pub struct ApiProxy {
    http: reqwest::Client,
    backend: Option<Url>,
}

pub type ProxyState = Arc<ApiProxy>;

impl ApiProxy {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(backend: Option<Url>, timeout: Duration) -> Result<Self, ProxyError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(|e| ProxyError::ClientBuild(e.to_string()))?;
        Ok(Self { http, backend })
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }
}

/// Join the backend base with the incoming path and query.
///
/// A base path prefix (`https://host/v1`) is kept in front of the request path.
///
/// # Errors
///
/// Returns an error if the combined string is not a valid URL.
pub fn upstream_url(base: &Url, path_and_query: &str) -> Result<Url, ProxyError> {
    let root = base.as_str().trim_end_matches('/');
    let tail = if path_and_query.starts_with('/') { path_and_query.to_owned() } else { format!("/{path_and_query}") };
    Url::parse(&format!("{root}{tail}")).map_err(|e| ProxyError::InvalidTarget(e.to_string()))
}

/// Handler mounted at `/api/{*path}`.
///
/// # Errors
///
/// Returns [`ProxyError`] when no backend is configured or the upstream call fails.
pub async fn forward(State(proxy): State<ProxyState>, req: Request) -> Result<Response, ProxyError> {
    let backend = proxy.backend.as_ref().ok_or(ProxyError::NotConfigured)?;
    let (parts, body) = req.into_parts();
    let path_and_query = parts.uri.path_and_query().map_or_else(|| parts.uri.path(), |pq| pq.as_str());
    let target = upstream_url(backend, path_and_query)?;

    let body = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| ProxyError::Body(e.to_string()))?;

    let mut upstream = proxy.http.request(parts.method.clone(), target.clone());
    for name in &FORWARDED_REQUEST_HEADERS {
        for value in parts.headers.get_all(name) {
            upstream = upstream.header(name.clone(), value.clone());
        }
    }
    if !body.is_empty() {
        upstream = upstream.body(body);
    }

    let reply = upstream.send().await.map_err(|e| ProxyError::Upstream(e.to_string()))?;
    let status = reply.status();
    tracing::debug!(method = %parts.method, path = target.path(), %status, "api proxied");

    let mut response = axum::http::Response::builder().status(status);
    for name in &FORWARDED_RESPONSE_HEADERS {
        for value in reply.headers().get_all(name) {
            response = response.header(name.clone(), value.clone());
        }
    }
    let bytes = reply.bytes().await.map_err(|e| ProxyError::Upstream(e.to_string()))?;
    response.body(Body::from(bytes)).map_err(|e| ProxyError::Upstream(e.to_string()))
}
