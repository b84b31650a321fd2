// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The durable, UI-visible record: an append-only message history fed by a
//! periodic drain of the inbound event queue.
//!
//! Pull-based, single consumer per process. Arrival order at the drain is
//! the history order; it is not guaranteed to equal producer emission order
//! across process boundaries (at-least-once delivery, no total order).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use voxlink_core::CanonicalEvent;

use crate::queue::EventQueue;

/// Append-only ordered record of canonical events, unbounded within a run.
///
/// No dedup; length is monotonically non-decreasing. Reads are paginated
/// for the dashboard renderer.
#[derive(Debug, Default)]
pub struct MessageHistory {
    entries: Mutex<Vec<CanonicalEvent>>,
}

impl MessageHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a drained batch, preserving its order.
    pub fn append_batch(&self, events: Vec<CanonicalEvent>) {
        if events.is_empty() {
            return;
        }
        let mut entries = self.entries.lock().expect("history lock poisoned");
        entries.extend(events);
    }

    /// Total number of recorded events.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("history lock poisoned").len()
    }

    /// True when nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns one page of events, oldest first.
    ///
    /// `offset` past the end yields an empty page; the last page may be
    /// shorter than `limit`.
    pub fn page(&self, offset: usize, limit: usize) -> Vec<CanonicalEvent> {
        let entries = self.entries.lock().expect("history lock poisoned");
        entries.iter().skip(offset).take(limit).cloned().collect()
    }
}

/// Periodically drains the inbound event queue into the message history.
///
/// One drain per process: when two consumers drain the same queue, each
/// event is delivered to exactly one of them, so fan-out is not supported.
pub struct SessionViewDrain {
    queue: Arc<EventQueue>,
    history: Arc<MessageHistory>,
}

impl SessionViewDrain {
    /// Creates a drain between `queue` and `history`.
    pub fn new(queue: Arc<EventQueue>, history: Arc<MessageHistory>) -> Self {
        Self { queue, history }
    }

    /// Drains whatever is queued right now into the history.
    ///
    /// Returns the number of events moved. Never blocks waiting for items.
    pub fn drain_once(&self) -> usize {
        let batch = self.queue.drain_all();
        let count = batch.len();
        if count > 0 {
            debug!(count, "drained events into message history");
            self.history.append_batch(batch);
        }
        count
    }

    /// Runs the drain on a fixed tick until `cancel` fires.
    ///
    /// Cancellation stops scheduling further ticks; it does not interrupt a
    /// tick in flight (each tick is a non-blocking drain anyway).
    pub async fn run(&self, refresh: Duration, cancel: CancellationToken) {
        let mut tick = tokio::time::interval(refresh);
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    self.drain_once();
                }
                _ = cancel.cancelled() => {
                    // Final sweep so nothing queued before shutdown is lost
                    // to the UI.
                    self.drain_once();
                    debug!("session view drain stopped");
                    return;
                }
            }
        }
    }
}
