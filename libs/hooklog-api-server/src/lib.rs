//! HTTP surface of the stream: GitHub webhook ingestion and a read-only
//! topic inspection API.

pub mod error;
pub mod signature;
mod github;
mod http;

use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use hooklog_stream::Stream;

pub use error::{ApiError, EventError};
pub use github::{EVENT_HEADER, EVENT_ISSUES};

/// Webhook ingestion settings.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Shared secret for payload signatures. Empty disables verification.
    pub secret: String,
    /// Topic opened issues are published to.
    pub issues_topic: String,
}

#[derive(Clone)]
struct AppState {
    stream: Arc<Stream>,
    webhook: Arc<WebhookConfig>,
}

pub fn router(stream: Arc<Stream>, webhook: WebhookConfig) -> Router {
    let state = AppState {
        stream,
        webhook: Arc::new(webhook),
    };

    Router::new()
        .route("/github", any(github::handle_github))
        .route("/api/topics", get(http::handle_list_topics))
        .route("/api/topics/{name}", get(http::handle_topic_stats))
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    stream: Arc<Stream>,
    webhook: WebhookConfig,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if webhook.secret.is_empty() {
        tracing::warn!("webhook secret is empty, signatures are not verified");
    }
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "api server listening");
    }

    axum::serve(listener, router(stream, webhook))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}
