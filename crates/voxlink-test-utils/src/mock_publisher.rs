// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capturing mock for the [`EventPublisher`] seam.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use voxlink_core::{CanonicalEvent, EventPublisher, VoxlinkError};

/// An event publisher that records everything published, with an optional
/// failure mode to exercise partial-failure tolerance.
#[derive(Debug, Default)]
pub struct MockPublisher {
    events: Mutex<Vec<CanonicalEvent>>,
    failing: AtomicBool,
}

impl MockPublisher {
    /// Create a mock publisher that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// When `failing` is set, every publish returns a `Publish` error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Everything published so far, in order.
    pub fn published(&self) -> Vec<CanonicalEvent> {
        self.events.lock().expect("mock publisher lock poisoned").clone()
    }
}

#[async_trait]
impl EventPublisher for MockPublisher {
    async fn publish(&self, event: &CanonicalEvent) -> Result<(), VoxlinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(VoxlinkError::Publish {
                message: "mock publisher configured to fail".to_string(),
                source: None,
            });
        }
        self.events
            .lock()
            .expect("mock publisher lock poisoned")
            .push(event.clone().stamped());
        Ok(())
    }
}
