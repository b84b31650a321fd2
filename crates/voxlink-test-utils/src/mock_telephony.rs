// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock telephony provider for deterministic testing.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use voxlink_core::{CallStatus, TelephonyAdapter, VoxlinkError};

/// A call placed through the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCall {
    pub to: String,
    pub voice_document: String,
    pub status_callback_url: String,
}

/// A status pushed onto a call through the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct CallUpdate {
    pub call_id: String,
    pub status: CallStatus,
}

/// A telephony provider that records placed calls and serves scripted
/// statuses from a FIFO queue.
///
/// When the status script runs dry, `fetch_call_status` keeps returning the
/// last scripted status (a completed call stays completed).
#[derive(Debug, Default)]
pub struct MockTelephony {
    placed: Mutex<Vec<PlacedCall>>,
    updates: Mutex<Vec<CallUpdate>>,
    statuses: Mutex<VecDeque<CallStatus>>,
    last_status: Mutex<Option<CallStatus>>,
}

impl MockTelephony {
    /// Create a mock with no scripted statuses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that serves the given statuses, in order.
    pub fn with_statuses(statuses: Vec<CallStatus>) -> Self {
        Self {
            statuses: Mutex::new(VecDeque::from(statuses)),
            ..Self::default()
        }
    }

    /// Calls placed so far.
    pub fn placed_calls(&self) -> Vec<PlacedCall> {
        self.placed.lock().expect("mock telephony lock poisoned").clone()
    }

    /// Statuses pushed onto calls so far.
    pub fn updates(&self) -> Vec<CallUpdate> {
        self.updates.lock().expect("mock telephony lock poisoned").clone()
    }
}

#[async_trait]
impl TelephonyAdapter for MockTelephony {
    async fn place_call(
        &self,
        to: &str,
        voice_document: &str,
        status_callback_url: &str,
    ) -> Result<String, VoxlinkError> {
        let mut placed = self.placed.lock().expect("mock telephony lock poisoned");
        placed.push(PlacedCall {
            to: to.to_string(),
            voice_document: voice_document.to_string(),
            status_callback_url: status_callback_url.to_string(),
        });
        Ok(format!("CAmock{}", placed.len()))
    }

    async fn fetch_call_status(&self, _call_id: &str) -> Result<CallStatus, VoxlinkError> {
        let mut statuses = self.statuses.lock().expect("mock telephony lock poisoned");
        let mut last = self.last_status.lock().expect("mock telephony lock poisoned");
        if let Some(status) = statuses.pop_front() {
            *last = Some(status);
        }
        (*last).ok_or_else(|| VoxlinkError::Telephony {
            message: "mock telephony has no scripted status".to_string(),
            source: None,
        })
    }

    async fn update_call(&self, call_id: &str, status: CallStatus) -> Result<(), VoxlinkError> {
        self.updates
            .lock()
            .expect("mock telephony lock poisoned")
            .push(CallUpdate {
                call_id: call_id.to_string(),
                status,
            });
        Ok(())
    }
}
