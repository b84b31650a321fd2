// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The inbound event queue: the single handoff point between the broker
//! link's receive task and the polling consumer.
//!
//! This is the only structure in the process mutated from two execution
//! contexts, so it keeps its own lock. Push never blocks and never fails;
//! drain atomically takes the whole batch in arrival order.

use std::collections::VecDeque;
use std::sync::Mutex;

use voxlink_core::CanonicalEvent;

/// Unbounded, thread-safe FIFO buffer of canonical events.
#[derive(Debug, Default)]
pub struct EventQueue {
    inner: Mutex<VecDeque<CanonicalEvent>>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event. Never blocks beyond the internal lock; never fails.
    pub fn push(&self, event: CanonicalEvent) {
        self.inner
            .lock()
            .expect("event queue lock poisoned")
            .push_back(event);
    }

    /// Atomically removes and returns everything currently queued, in
    /// arrival order. Returns an empty batch immediately when nothing is
    /// queued -- never waits for new items.
    pub fn drain_all(&self) -> Vec<CanonicalEvent> {
        let mut inner = self.inner.lock().expect("event queue lock poisoned");
        std::mem::take(&mut *inner).into()
    }

    /// Number of events currently buffered.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("event queue lock poisoned").len()
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
