// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracks every in-flight call and orchestrates LLM turns.
//!
//! Sessions are sharded by call id: one async mutex per session serializes
//! transitions and turn appends for that call, and concurrent calls never
//! contend. The session lock is held across the LLM invocation so a call's
//! turns stay strictly ordered.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use voxlink_core::event::keys;
use voxlink_core::{
    CallStatus, CanonicalEvent, ConversationTurn, EventKind, EventPublisher, LlmTurn, Speaker,
    VoxlinkError,
};

use crate::session::{CallSession, Transition};

/// Process-lifetime map of call id -> session, plus the collaborators a
/// turn needs. Constructed once by the entry point and shared via `Arc`.
pub struct CallTracker {
    sessions: DashMap<String, Arc<Mutex<CallSession>>>,
    llm: Arc<dyn LlmTurn + Send + Sync>,
    publisher: Arc<dyn EventPublisher + Send + Sync>,
    llm_timeout: Duration,
}

impl CallTracker {
    /// Creates a tracker bounding every LLM invocation by `llm_timeout`.
    pub fn new(
        llm: Arc<dyn LlmTurn + Send + Sync>,
        publisher: Arc<dyn EventPublisher + Send + Sync>,
        llm_timeout: Duration,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            llm,
            publisher,
            llm_timeout,
        }
    }

    /// Registers a freshly placed call.
    pub fn begin_session(&self, call_id: &str) {
        self.session(call_id);
        info!(call_id, "call session started");
    }

    /// Number of tracked sessions (active and closed).
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn session(&self, call_id: &str) -> Arc<Mutex<CallSession>> {
        self.sessions
            .entry(call_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(CallSession::new(call_id))))
            .clone()
    }

    /// Applies a provider-reported status to the call's session.
    ///
    /// Status events can reach this process before the session was begun
    /// explicitly (the provider assigns ids), so an unknown call id creates
    /// its session on the fly. The matching StatusUpdate event has already
    /// been relayed by the ingress adapter; the tracker only owns the FSM.
    pub async fn record_status(&self, call_id: &str, status: CallStatus) -> Transition {
        let session = self.session(call_id);
        let mut session = session.lock().await;
        let outcome = session.apply_status(status);
        if outcome == Transition::Applied {
            debug!(call_id, status = %status, "call status recorded");
        }
        outcome
    }

    /// Runs one conversation turn: appends the caller's input, invokes the
    /// LLM with the prior turn history (bounded by the configured timeout),
    /// appends and returns the reply.
    ///
    /// The reply is mirrored as an AgentResponse event through the broker
    /// link; a publish failure is logged and the reply is still returned,
    /// because the caller on the phone comes first.
    pub async fn user_turn(&self, call_id: &str, text: &str) -> Result<String, VoxlinkError> {
        let session = self.session(call_id);
        let mut session = session.lock().await;

        let history: Vec<ConversationTurn> = session.turns().to_vec();
        session.push_turn(Speaker::User, text)?;

        let reply = tokio::time::timeout(self.llm_timeout, self.llm.reply(&history, text))
            .await
            .map_err(|_| VoxlinkError::Timeout {
                duration: self.llm_timeout,
            })??;

        session.push_turn(Speaker::Agent, reply.clone())?;
        debug!(call_id, turns = session.turns().len(), "turn completed");

        let event = CanonicalEvent::new(EventKind::AgentResponse)
            .with_field(keys::CALL_SID, call_id)
            .with_field(keys::TEXT, reply.clone())
            .stamped();
        if let Err(e) = self.publisher.publish(&event).await {
            warn!(call_id, error = %e, "agent response relay failed, continuing");
        }

        Ok(reply)
    }

    /// Read-only view of a session: current status and turn history.
    pub async fn snapshot(&self, call_id: &str) -> Option<(CallStatus, Vec<ConversationTurn>)> {
        let session = self.sessions.get(call_id)?.clone();
        let session = session.lock().await;
        Some((session.status(), session.turns().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use voxlink_test_utils::{MockLlm, MockPublisher};

    use super::*;

    fn tracker_with(llm: MockLlm, publisher: MockPublisher) -> (CallTracker, Arc<MockPublisher>) {
        let publisher = Arc::new(publisher);
        let tracker = CallTracker::new(
            Arc::new(llm),
            Arc::clone(&publisher) as Arc<dyn EventPublisher + Send + Sync>,
            Duration::from_millis(200),
        );
        (tracker, publisher)
    }

    #[tokio::test]
    async fn user_turn_appends_both_turns_and_mirrors_the_reply() {
        let (tracker, publisher) =
            tracker_with(MockLlm::with_replies(vec!["the weather is fine".into()]), MockPublisher::new());
        tracker.begin_session("CA1");
        tracker.record_status("CA1", CallStatus::Answered).await;

        let reply = tracker.user_turn("CA1", "how is the weather?").await.unwrap();
        assert_eq!(reply, "the weather is fine");

        let (status, turns) = tracker.snapshot("CA1").await.unwrap();
        assert_eq!(status, CallStatus::Answered);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, Speaker::User);
        assert_eq!(turns[0].text, "how is the weather?");
        assert_eq!(turns[1].speaker, Speaker::Agent);
        assert_eq!(turns[1].text, "the weather is fine");

        let published = publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].kind, EventKind::AgentResponse);
        assert_eq!(published[0].field(keys::CALL_SID), Some("CA1"));
        assert_eq!(published[0].field(keys::TEXT), Some("the weather is fine"));
        assert!(published[0].is_stamped());
    }

    #[tokio::test]
    async fn llm_sees_prior_history_but_not_the_new_input_twice() {
        let llm = MockLlm::with_replies(vec!["first reply".into(), "second reply".into()]);
        let (tracker, _publisher) = tracker_with(llm, MockPublisher::new());

        tracker.user_turn("CA1", "one").await.unwrap();
        tracker.user_turn("CA1", "two").await.unwrap();

        let (_, turns) = tracker.snapshot("CA1").await.unwrap();
        assert_eq!(
            turns.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(),
            vec!["one", "first reply", "two", "second reply"]
        );
    }

    #[tokio::test]
    async fn slow_llm_is_bounded_by_the_timeout() {
        let llm = MockLlm::with_replies(vec!["too late".into()]).with_delay(Duration::from_secs(5));
        let (tracker, publisher) = tracker_with(llm, MockPublisher::new());

        let err = tracker.user_turn("CA1", "hello?").await.unwrap_err();
        assert!(matches!(err, VoxlinkError::Timeout { .. }));

        // No reply means nothing to mirror.
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn turns_on_a_terminal_session_are_rejected() {
        let (tracker, _publisher) = tracker_with(MockLlm::new(), MockPublisher::new());
        tracker.begin_session("CA1");
        tracker.record_status("CA1", CallStatus::Completed).await;

        let err = tracker.user_turn("CA1", "anyone there?").await.unwrap_err();
        assert!(matches!(err, VoxlinkError::SessionClosed { .. }));
    }

    #[tokio::test]
    async fn publish_failure_does_not_lose_the_reply() {
        let publisher = MockPublisher::new();
        publisher.set_failing(true);
        let (tracker, _publisher) =
            tracker_with(MockLlm::with_replies(vec!["still here".into()]), publisher);

        let reply = tracker.user_turn("CA1", "hello").await.unwrap();
        assert_eq!(reply, "still here");
    }

    #[tokio::test]
    async fn status_events_for_unknown_calls_create_sessions() {
        let (tracker, _publisher) = tracker_with(MockLlm::new(), MockPublisher::new());

        let outcome = tracker.record_status("CA9", CallStatus::Ringing).await;
        assert_eq!(outcome, Transition::Applied);
        assert_eq!(tracker.session_count(), 1);

        let (status, _) = tracker.snapshot("CA9").await.unwrap();
        assert_eq!(status, CallStatus::Ringing);
    }

    #[tokio::test]
    async fn out_of_order_statuses_are_rejected_through_the_tracker() {
        let (tracker, _publisher) = tracker_with(MockLlm::new(), MockPublisher::new());

        tracker.record_status("CA1", CallStatus::Ringing).await;
        let outcome = tracker.record_status("CA1", CallStatus::Initiated).await;
        assert_eq!(outcome, Transition::Rejected);

        let (status, _) = tracker.snapshot("CA1").await.unwrap();
        assert_eq!(status, CallStatus::Ringing);
    }

    #[tokio::test]
    async fn sessions_are_independent_across_call_ids() {
        let llm = MockLlm::with_replies(vec!["for one".into(), "for two".into()]);
        let (tracker, _publisher) = tracker_with(llm, MockPublisher::new());

        tracker.user_turn("CA1", "hello from one").await.unwrap();
        tracker.user_turn("CA2", "hello from two").await.unwrap();
        tracker.record_status("CA1", CallStatus::Completed).await;

        let (status1, turns1) = tracker.snapshot("CA1").await.unwrap();
        let (status2, turns2) = tracker.snapshot("CA2").await.unwrap();
        assert_eq!(status1, CallStatus::Completed);
        assert_eq!(status2, CallStatus::Queued);
        assert_eq!(turns1.len(), 2);
        assert_eq!(turns2.len(), 2);
        assert_eq!(turns2[0].text, "hello from two");
    }
}
