// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `voxlink dashboard` command implementation.
//!
//! The consumer side of the bridge: subscribes to the relay topic, drains
//! the inbound queue on a fixed refresh tick, and renders every new event
//! from the message history in arrival order. This is the process that
//! stays in sync with calls handled elsewhere.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use voxlink_config::VoxlinkConfig;
use voxlink_core::event::keys;
use voxlink_core::{CanonicalEvent, EventKind, VoxlinkError};
use voxlink_relay::{BrokerLink, EventQueue, MessageHistory, SessionViewDrain};

use crate::shutdown;

/// Runs the `voxlink dashboard` command.
pub async fn run_dashboard(config: VoxlinkConfig) -> Result<(), VoxlinkError> {
    let queue = Arc::new(EventQueue::new());

    // The dashboard is its own broker client; sharing the serve process's
    // client id would bump it off the broker.
    let mut relay_config = config.relay.clone();
    relay_config.client_id = format!("{}-dashboard", config.relay.client_id);

    let relay = Arc::new(BrokerLink::with_queue(relay_config, Arc::clone(&queue)));
    relay.connect().await?;

    let history = Arc::new(MessageHistory::new());
    let drain = SessionViewDrain::new(Arc::clone(&queue), Arc::clone(&history));
    let cancel = shutdown::install_signal_handler();

    info!(topic = %config.relay.topic, "dashboard subscribed");
    println!("Dashboard connected; waiting for events (Ctrl+C to exit).");

    let mut tick = tokio::time::interval(Duration::from_secs(config.dashboard.refresh_secs));
    let mut rendered = 0usize;
    loop {
        tokio::select! {
            _ = tick.tick() => {
                drain.drain_once();
                rendered = render_new(&history, rendered, config.dashboard.page_size);
            }
            _ = cancel.cancelled() => {
                // Final sweep so nothing already delivered goes unrendered.
                drain.drain_once();
                render_new(&history, rendered, config.dashboard.page_size);
                break;
            }
        }
    }

    relay.disconnect().await;
    info!("dashboard stopped");
    Ok(())
}

/// Renders everything past `from`, page by page, and returns the new
/// high-water mark.
fn render_new(history: &MessageHistory, from: usize, page_size: usize) -> usize {
    let mut offset = from;
    loop {
        let page = history.page(offset, page_size);
        if page.is_empty() {
            return offset;
        }
        for event in &page {
            println!("{}", render_event(event));
        }
        offset += page.len();
    }
}

/// One line per event, in the shape the operator reads.
fn render_event(event: &CanonicalEvent) -> String {
    let call = event.field(keys::CALL_SID).unwrap_or("-");
    match event.kind {
        EventKind::StatusUpdate => {
            let status = event.field(keys::CALL_STATUS).unwrap_or("?");
            match event.field(keys::CALL_DURATION) {
                Some(duration) if !duration.is_empty() => format!(
                    "[{}] {} status: {} ({}s)",
                    event.timestamp, call, status, duration
                ),
                _ => format!("[{}] {} status: {}", event.timestamp, call, status),
            }
        }
        EventKind::UserInput => {
            let speech = event.field(keys::SPEECH_RESULT).unwrap_or("");
            if speech.is_empty() {
                let digits = event.field(keys::DIGITS).unwrap_or("");
                format!("[{}] {} caller pressed: {}", event.timestamp, call, digits)
            } else {
                format!("[{}] {} caller: {}", event.timestamp, call, speech)
            }
        }
        EventKind::AgentResponse => {
            let text = event.field(keys::TEXT).unwrap_or("");
            format!("[{}] {} agent: {}", event.timestamp, call, text)
        }
        EventKind::Test => format!("[{}] test event", event.timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamped(event: CanonicalEvent) -> CanonicalEvent {
        let mut event = event;
        event.timestamp = "2026-01-01 10:00:00".to_string();
        event
    }

    #[test]
    fn render_status_update() {
        let event = stamped(
            CanonicalEvent::new(EventKind::StatusUpdate)
                .with_field(keys::CALL_SID, "CA1")
                .with_field(keys::CALL_STATUS, "ringing"),
        );
        assert_eq!(
            render_event(&event),
            "[2026-01-01 10:00:00] CA1 status: ringing"
        );
    }

    #[test]
    fn render_completed_with_duration() {
        let event = stamped(
            CanonicalEvent::new(EventKind::StatusUpdate)
                .with_field(keys::CALL_SID, "CA1")
                .with_field(keys::CALL_STATUS, "completed")
                .with_field(keys::CALL_DURATION, "42"),
        );
        assert_eq!(
            render_event(&event),
            "[2026-01-01 10:00:00] CA1 status: completed (42s)"
        );
    }

    #[test]
    fn render_speech_and_digits() {
        let speech = stamped(
            CanonicalEvent::new(EventKind::UserInput)
                .with_field(keys::CALL_SID, "CA1")
                .with_field(keys::SPEECH_RESULT, "hello there"),
        );
        assert_eq!(
            render_event(&speech),
            "[2026-01-01 10:00:00] CA1 caller: hello there"
        );

        let digits = stamped(
            CanonicalEvent::new(EventKind::UserInput)
                .with_field(keys::CALL_SID, "CA1")
                .with_field(keys::SPEECH_RESULT, "")
                .with_field(keys::DIGITS, "42"),
        );
        assert_eq!(
            render_event(&digits),
            "[2026-01-01 10:00:00] CA1 caller pressed: 42"
        );
    }

    #[test]
    fn render_agent_response() {
        let event = stamped(
            CanonicalEvent::new(EventKind::AgentResponse)
                .with_field(keys::CALL_SID, "CA1")
                .with_field(keys::TEXT, "How can I help?"),
        );
        assert_eq!(
            render_event(&event),
            "[2026-01-01 10:00:00] CA1 agent: How can I help?"
        );
    }

    #[test]
    fn render_new_pages_through_everything() {
        let history = MessageHistory::new();
        history.append_batch(
            (0..7)
                .map(|n| {
                    stamped(
                        CanonicalEvent::new(EventKind::Test).with_field("seq", n),
                    )
                })
                .collect(),
        );

        // Page size smaller than the batch still reaches the end.
        let rendered = render_new(&history, 0, 3);
        assert_eq!(rendered, 7);

        // Nothing new: high-water mark is unchanged.
        assert_eq!(render_new(&history, rendered, 3), 7);

        history.append_batch(vec![stamped(CanonicalEvent::new(EventKind::Test))]);
        assert_eq!(render_new(&history, rendered, 3), 8);
    }
}
