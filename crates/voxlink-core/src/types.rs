// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Voxlink workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle status of an outbound call, as reported by the telephony
/// provider.
///
/// Wire spellings are kebab-case; the provider reports an answered call as
/// `in-progress`. Non-terminal statuses form a forward-only progression
/// Queued -> Initiated -> Ringing -> Answered; the remaining statuses are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum CallStatus {
    Queued,
    Initiated,
    Ringing,
    #[strum(serialize = "answered", to_string = "in-progress")]
    Answered,
    Completed,
    Failed,
    Busy,
    NoAnswer,
    Canceled,
}

impl CallStatus {
    /// A terminal status accepts no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CallStatus::Completed
                | CallStatus::Failed
                | CallStatus::Busy
                | CallStatus::NoAnswer
                | CallStatus::Canceled
        )
    }

    /// Position of a non-terminal status in the forward progression.
    /// `None` for terminal statuses.
    pub fn phase(self) -> Option<u8> {
        match self {
            CallStatus::Queued => Some(0),
            CallStatus::Initiated => Some(1),
            CallStatus::Ringing => Some(2),
            CallStatus::Answered => Some(3),
            _ => None,
        }
    }
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}

/// One (speaker, text) pair in a call's conversation.
///
/// Turns are append-only and chronologically ordered; they are the context
/// handed to the LLM turn capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ConversationTurn {
    /// A caller turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    /// An LLM reply turn.
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Agent,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn call_status_wire_spellings() {
        assert_eq!(CallStatus::Queued.to_string(), "queued");
        assert_eq!(CallStatus::Answered.to_string(), "in-progress");
        assert_eq!(CallStatus::NoAnswer.to_string(), "no-answer");
    }

    #[test]
    fn call_status_parses_provider_strings() {
        assert_eq!(CallStatus::from_str("queued").unwrap(), CallStatus::Queued);
        assert_eq!(
            CallStatus::from_str("in-progress").unwrap(),
            CallStatus::Answered
        );
        assert_eq!(
            CallStatus::from_str("answered").unwrap(),
            CallStatus::Answered
        );
        assert_eq!(
            CallStatus::from_str("no-answer").unwrap(),
            CallStatus::NoAnswer
        );
        assert!(CallStatus::from_str("warbling").is_err());
    }

    #[test]
    fn terminal_set() {
        let terminal = [
            CallStatus::Completed,
            CallStatus::Failed,
            CallStatus::Busy,
            CallStatus::NoAnswer,
            CallStatus::Canceled,
        ];
        for status in terminal {
            assert!(status.is_terminal());
            assert!(status.phase().is_none());
        }
        for status in [
            CallStatus::Queued,
            CallStatus::Initiated,
            CallStatus::Ringing,
            CallStatus::Answered,
        ] {
            assert!(!status.is_terminal());
            assert!(status.phase().is_some());
        }
    }

    #[test]
    fn phase_is_forward_ordered() {
        assert!(CallStatus::Queued.phase() < CallStatus::Initiated.phase());
        assert!(CallStatus::Initiated.phase() < CallStatus::Ringing.phase());
        assert!(CallStatus::Ringing.phase() < CallStatus::Answered.phase());
    }

    #[test]
    fn speaker_display() {
        assert_eq!(Speaker::User.to_string(), "user");
        assert_eq!(Speaker::Agent.to_string(), "agent");
    }

    #[test]
    fn turn_constructors() {
        let turn = ConversationTurn::user("hello");
        assert_eq!(turn.speaker, Speaker::User);
        assert_eq!(turn.text, "hello");

        let turn = ConversationTurn::agent("hi there");
        assert_eq!(turn.speaker, Speaker::Agent);
    }
}
