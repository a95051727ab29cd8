pub mod github;
pub mod routes;
pub mod types;

pub use github::GitHubClient;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Invalid GitHub token: {0}")]
    InvalidToken(reqwest::header::InvalidHeaderValue),

    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

/// Every upstream failure reaches the client as the same flat 500.
/// The underlying cause is only logged.
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            ProxyError::ApiRequest(e) => error!(
                status = ?e.status(),
                url = ?e.url().map(|u| u.as_str()),
                error = %self,
                "upstream request failed"
            ),
            _ => error!(error = %self, "proxy request failed"),
        }
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal Server Error" })),
        )
            .into_response()
    }
}

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub github: GitHubClient,
    pub allowed_origin: HeaderValue,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, ProxyError> {
        let allowed_origin = HeaderValue::from_str(&config.server.allowed_origin)
            .map_err(|_| ProxyError::InvalidOrigin(config.server.allowed_origin.clone()))?;
        Ok(Self {
            github: GitHubClient::new(&config.github)?,
            allowed_origin,
        })
    }
}

/// Bind `listen` and serve the proxy until Ctrl+C.
pub async fn serve(config: &Config, listen: &str) -> Result<(), ProxyError> {
    let state = AppState::new(config)?;
    let app = routes::build_router(state);

    let listener = TcpListener::bind(listen)
        .await
        .map_err(|source| ProxyError::Bind {
            addr: listen.to_string(),
            source,
        })?;

    info!(
        listen = %listen,
        upstream = %config.github.api_url,
        allowed_origin = %config.server.allowed_origin,
        "proxy listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ProxyError::Serve)?;

    info!("proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
