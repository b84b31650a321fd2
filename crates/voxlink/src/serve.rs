// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `voxlink serve` command implementation.
//!
//! Runs the webhook ingress with the broker relay, the call tracker, and
//! the session view drain. All services are constructed here and passed in
//! explicitly; the only shared state is the broker link, the tracker map,
//! and the inbound queue, each behind an `Arc`.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use voxlink_call::CallTracker;
use voxlink_config::VoxlinkConfig;
use voxlink_core::{EventPublisher, LlmTurn, VoxlinkError};
use voxlink_ingress::{IngressState, ServerConfig, start_server};
use voxlink_ollama::OllamaClient;
use voxlink_relay::{BrokerLink, EventQueue, MessageHistory, SessionViewDrain};

use crate::shutdown;

/// Runs the `voxlink serve` command.
///
/// Connects the broker link (failing fast if the broker is unreachable --
/// restart policy belongs to the supervisor), starts the drain, and serves
/// webhooks until a shutdown signal arrives.
pub async fn run_serve(config: VoxlinkConfig) -> Result<(), VoxlinkError> {
    info!(agent = %config.agent.name, "starting voxlink serve");

    let queue = Arc::new(EventQueue::new());
    let relay = Arc::new(BrokerLink::with_queue(
        config.relay.clone(),
        Arc::clone(&queue),
    ));
    relay.connect().await?;

    let llm_timeout = Duration::from_secs(config.ollama.timeout_secs);
    let llm: Arc<dyn LlmTurn + Send + Sync> = Arc::new(OllamaClient::new(
        config.ollama.base_url.clone(),
        config.ollama.model.clone(),
        llm_timeout,
    )?);

    let tracker = Arc::new(CallTracker::new(
        llm,
        Arc::clone(&relay) as Arc<dyn EventPublisher + Send + Sync>,
        llm_timeout,
    ));

    let history = Arc::new(MessageHistory::new());
    let drain = SessionViewDrain::new(Arc::clone(&queue), Arc::clone(&history));

    let cancel = shutdown::install_signal_handler();

    let refresh = Duration::from_secs(config.dashboard.refresh_secs);
    let drain_task = tokio::spawn({
        let cancel = cancel.clone();
        async move { drain.run(refresh, cancel).await }
    });

    let server_config = ServerConfig {
        host: config.ingress.host.clone(),
        port: config.ingress.port,
    };
    let state = IngressState {
        relay: Arc::clone(&relay) as Arc<dyn EventPublisher + Send + Sync>,
        tracker,
        history,
        voice: config.twilio.voice.clone(),
    };

    let result = start_server(&server_config, state, cancel.clone()).await;

    // Tear down in reverse construction order, whether the server stopped
    // by signal or by error.
    cancel.cancel();
    let _ = drain_task.await;
    relay.disconnect().await;
    info!("voxlink serve stopped");

    result
}
