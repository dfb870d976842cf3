mod config;
mod proxy;
mod routes;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = match config::ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let proxy = match proxy::ApiProxy::new(config.backend_url.clone(), config.proxy_timeout) {
        Ok(proxy) => Arc::new(proxy),
        Err(e) => {
            tracing::error!(error = %e, "api proxy init failed");
            std::process::exit(1);
        }
    };
    if !proxy.is_configured() {
        tracing::warn!("PROPDESK_BACKEND_URL not set; /api requests will answer 503");
    }

    let app = match routes::app(proxy) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "router init failed");
            std::process::exit(1);
        }
    };

    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "propdesk listening");
    axum::serve(listener, app).await.expect("server failed");
}
