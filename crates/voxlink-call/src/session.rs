// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-call FSM that records status transitions and conversation turns.
//!
//! Each call moves Queued -> Initiated -> Ringing -> Answered and then into
//! one of the terminal statuses. Webhook deliveries can arrive out of order
//! and more than once (QoS 1), so the transition rule is:
//!
//! - a terminal status always wins over any non-terminal status (the call
//!   ended even if intermediate events were missed);
//! - forward progress between non-terminal statuses is accepted;
//! - re-delivery of the current status is a quiet no-op;
//! - everything else is rejected without changing state.

use tracing::warn;

use voxlink_core::{CallStatus, ConversationTurn, Speaker, VoxlinkError};

/// Outcome of feeding a status into the FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The status was recorded.
    Applied,
    /// Re-delivery of the current status; nothing changed.
    Duplicate,
    /// Regressive or post-terminal status; logged, nothing changed.
    Rejected,
}

/// State for one outbound call, keyed by the provider-assigned call id.
#[derive(Debug, Clone)]
pub struct CallSession {
    call_id: String,
    status: CallStatus,
    turns: Vec<ConversationTurn>,
    /// Last status announced by a poll loop; only used to suppress duplicate
    /// announcements, not part of the transition rule.
    last_polled_status: Option<CallStatus>,
}

impl CallSession {
    /// Creates a session for a freshly placed call.
    pub fn new(call_id: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            status: CallStatus::Queued,
            turns: Vec::new(),
            last_polled_status: None,
        }
    }

    /// The provider-assigned call identifier.
    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    /// Current recorded status.
    pub fn status(&self) -> CallStatus {
        self.status
    }

    /// The ordered conversation so far.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// True once a terminal status has been recorded.
    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Applies a reported status under the transition rule.
    pub fn apply_status(&mut self, next: CallStatus) -> Transition {
        if next == self.status {
            return Transition::Duplicate;
        }

        if self.status.is_terminal() {
            warn!(
                call_id = %self.call_id,
                current = %self.status,
                reported = %next,
                "transition rejected: session already terminal"
            );
            return Transition::Rejected;
        }

        if next.is_terminal() || next.phase() > self.status.phase() {
            self.status = next;
            return Transition::Applied;
        }

        warn!(
            call_id = %self.call_id,
            current = %self.status,
            reported = %next,
            "transition rejected: regressive status"
        );
        Transition::Rejected
    }

    /// Appends a conversation turn.
    ///
    /// A terminal session is retained for read but accepts no more turns.
    pub fn push_turn(&mut self, speaker: Speaker, text: impl Into<String>) -> Result<(), VoxlinkError> {
        if self.is_closed() {
            return Err(VoxlinkError::SessionClosed {
                call_id: self.call_id.clone(),
            });
        }
        self.turns.push(ConversationTurn {
            speaker,
            text: text.into(),
        });
        Ok(())
    }

    /// Records a status observed by a poll loop.
    ///
    /// Returns `true` when the observation differs from the last announced
    /// one, so the loop announces each status once.
    pub fn poll_update(&mut self, observed: CallStatus) -> bool {
        if self.last_polled_status == Some(observed) {
            return false;
        }
        self.last_polled_status = Some(observed);
        true
    }
}
