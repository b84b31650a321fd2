// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The canonical event: the normalized, timestamped unit that flows through
//! the bridge, from webhook ingress to broker to queue to message history.
//!
//! Wire encoding is a flat UTF-8 JSON object: the `type` discriminant, the
//! `timestamp`, and the payload fields all at top level, matching what the
//! dashboard consumes off the broker topic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::VoxlinkError;

/// Timestamp format used on the wire: `YYYY-MM-DD HH:MM:SS`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Recognized payload keys, by event kind.
///
/// - [`StatusUpdate`](EventKind::StatusUpdate): `CallSid`, `CallStatus`,
///   `CallDuration`
/// - [`UserInput`](EventKind::UserInput): `CallSid`, `SpeechResult`, `Digits`
/// - [`AgentResponse`](EventKind::AgentResponse): `CallSid`, `Text`
///
/// Unknown keys are preserved on the event but not interpreted. Required-key
/// presence is validated at ingress, not downstream.
pub mod keys {
    /// Provider-assigned call identifier.
    pub const CALL_SID: &str = "CallSid";
    /// Provider call status string (kebab-case).
    pub const CALL_STATUS: &str = "CallStatus";
    /// Call duration in seconds, present on completion callbacks.
    pub const CALL_DURATION: &str = "CallDuration";
    /// Transcribed caller speech.
    pub const SPEECH_RESULT: &str = "SpeechResult";
    /// DTMF digits pressed by the caller.
    pub const DIGITS: &str = "Digits";
    /// Agent reply text on mirrored responses.
    pub const TEXT: &str = "Text";
}

/// Discriminant for canonical events, serialized as the `type` wire key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A call lifecycle transition reported by the telephony provider.
    StatusUpdate,
    /// Caller speech or DTMF input.
    UserInput,
    /// A reply produced by the LLM turn capability.
    AgentResponse,
    /// Connectivity probe, ignored by the session tracker.
    Test,
}

/// The unit flowing through the bridge.
///
/// A value type: copied from ingress to queue to drain, never shared
/// mutably across the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    /// Event discriminant.
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Producer-assigned wall-clock timestamp (`YYYY-MM-DD HH:MM:SS`).
    ///
    /// Empty until stamped; always non-empty before the event leaves the
    /// ingress adapter, is published, or is queued inbound.
    #[serde(default)]
    pub timestamp: String,

    /// Raw provider/LLM fields. String and number values only on the wire.
    #[serde(flatten)]
    pub payload: BTreeMap<String, serde_json::Value>,
}

impl CanonicalEvent {
    /// Creates an unstamped event with an empty payload.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            timestamp: String::new(),
            payload: BTreeMap::new(),
        }
    }

    /// Sets a payload field, builder style.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    /// Returns a payload field as a string slice, if present and a string.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }

    /// True once the timestamp has been populated.
    pub fn is_stamped(&self) -> bool {
        !self.timestamp.is_empty()
    }

    /// Assigns the current local wall-clock time if no timestamp is set.
    ///
    /// An already-populated timestamp is left untouched so the original
    /// producer's stamp survives relay hops.
    pub fn stamp(&mut self) {
        if self.timestamp.is_empty() {
            self.timestamp = now_timestamp();
        }
    }

    /// Consuming variant of [`stamp`](Self::stamp).
    #[must_use]
    pub fn stamped(mut self) -> Self {
        self.stamp();
        self
    }

    /// Serializes to the canonical wire encoding.
    pub fn to_wire(&self) -> Result<String, VoxlinkError> {
        serde_json::to_string(self)
            .map_err(|e| VoxlinkError::Internal(format!("event serialization failed: {e}")))
    }

    /// Parses an event from its wire encoding.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, VoxlinkError> {
        serde_json::from_slice(bytes).map_err(|e| VoxlinkError::Decode {
            message: format!("malformed event payload: {e}"),
        })
    }
}

/// Current local time in the canonical wire format.
pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_discriminant_strings() {
        let json = serde_json::to_string(&EventKind::StatusUpdate).unwrap();
        assert_eq!(json, "\"status_update\"");
        let json = serde_json::to_string(&EventKind::UserInput).unwrap();
        assert_eq!(json, "\"user_input\"");
        let json = serde_json::to_string(&EventKind::AgentResponse).unwrap();
        assert_eq!(json, "\"agent_response\"");
    }

    #[test]
    fn wire_round_trip_preserves_kind_timestamp_payload() {
        let event = CanonicalEvent::new(EventKind::UserInput)
            .with_field(keys::CALL_SID, "CA123")
            .with_field(keys::SPEECH_RESULT, "hello")
            .with_field(keys::CALL_DURATION, 42)
            .stamped();

        let wire = event.to_wire().unwrap();
        let parsed = CanonicalEvent::from_wire(wire.as_bytes()).unwrap();

        assert_eq!(parsed.kind, event.kind);
        assert_eq!(parsed.timestamp, event.timestamp);
        assert_eq!(parsed.payload, event.payload);
    }

    #[test]
    fn wire_object_is_flat() {
        let event = CanonicalEvent::new(EventKind::StatusUpdate)
            .with_field(keys::CALL_STATUS, "ringing")
            .stamped();
        let wire = event.to_wire().unwrap();
        let value: serde_json::Value = serde_json::from_str(&wire).unwrap();

        assert_eq!(value["type"], "status_update");
        assert_eq!(value["CallStatus"], "ringing");
        assert!(value.get("payload").is_none());
    }

    #[test]
    fn stamp_fills_empty_timestamp_only() {
        let mut event = CanonicalEvent::new(EventKind::Test);
        assert!(!event.is_stamped());
        event.stamp();
        assert!(event.is_stamped());

        let original = event.timestamp.clone();
        event.stamp();
        assert_eq!(event.timestamp, original);
    }

    #[test]
    fn stamp_matches_wire_format() {
        let ts = now_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let wire = r#"{"type":"status_update","timestamp":"2026-01-01 10:00:00",
                       "CallStatus":"queued","ApiVersion":"2010-04-01"}"#;
        let event = CanonicalEvent::from_wire(wire.as_bytes()).unwrap();
        assert_eq!(event.field("ApiVersion"), Some("2010-04-01"));

        let round = event.to_wire().unwrap();
        assert!(round.contains("ApiVersion"));
    }

    #[test]
    fn missing_timestamp_deserializes_unstamped() {
        let wire = r#"{"type":"user_input","SpeechResult":"hi"}"#;
        let event = CanonicalEvent::from_wire(wire.as_bytes()).unwrap();
        assert!(!event.is_stamped());
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let err = CanonicalEvent::from_wire(b"not json").unwrap_err();
        assert!(matches!(err, VoxlinkError::Decode { .. }));

        // Valid JSON without a discriminant is equally malformed.
        let err = CanonicalEvent::from_wire(b"{\"timestamp\":\"x\"}").unwrap_err();
        assert!(matches!(err, VoxlinkError::Decode { .. }));
    }
}
