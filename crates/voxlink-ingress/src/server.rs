// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook ingress HTTP server built on axum.
//!
//! Sets up routes and shared state. Handlers run on axum's worker pool,
//! concurrently for many simultaneous calls; everything they share is
//! behind `Arc`.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use voxlink_call::CallTracker;
use voxlink_core::{EventPublisher, VoxlinkError};
use voxlink_relay::MessageHistory;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct IngressState {
    /// Broker link (or mock) events are relayed through.
    pub relay: Arc<dyn EventPublisher + Send + Sync>,
    /// Call session tracker.
    pub tracker: Arc<CallTracker>,
    /// Drained message history served to the dashboard renderer.
    pub history: Arc<MessageHistory>,
    /// Provider voice used for spoken responses.
    pub voice: Option<String>,
}

/// Ingress server configuration (mirrors IngressConfig from voxlink-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the ingress router.
///
/// Exposed separately from [`start_server`] so tests can drive it without
/// binding a socket.
pub fn router(state: IngressState) -> Router {
    Router::new()
        .route("/status_callback", post(handlers::post_status_callback))
        .route("/process-input", post(handlers::post_process_input))
        .route("/history", get(handlers::get_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the webhook ingress server.
///
/// Serves until `cancel` fires, then drains in-flight requests and returns.
pub async fn start_server(
    config: &ServerConfig,
    state: IngressState,
    cancel: CancellationToken,
) -> Result<(), VoxlinkError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| VoxlinkError::Internal(format!("failed to bind ingress to {addr}: {e}")))?;

    tracing::info!("webhook ingress listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| VoxlinkError::Internal(format!("ingress server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use voxlink_test_utils::{MockLlm, MockPublisher};

    use super::*;

    fn test_state() -> IngressState {
        let publisher: Arc<dyn EventPublisher + Send + Sync> = Arc::new(MockPublisher::new());
        IngressState {
            relay: Arc::clone(&publisher),
            tracker: Arc::new(CallTracker::new(
                Arc::new(MockLlm::new()),
                publisher,
                Duration::from_millis(100),
            )),
            history: Arc::new(MessageHistory::new()),
            voice: Some("alice".to_string()),
        }
    }

    #[test]
    fn ingress_state_is_clone() {
        let state = test_state();
        let _cloned = state.clone();
    }

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
    }

    #[tokio::test]
    async fn router_builds() {
        let _app = router(test_state());
    }
}
