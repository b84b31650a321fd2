// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the webhook ingress.
//!
//! `POST /status_callback` and `POST /process-input` receive the telephony
//! provider's callbacks; `GET /history` serves the drained message history
//! to the dashboard renderer.
//!
//! Every `/process-input` path -- success, fallback, even a 500 -- answers
//! with a voice document that ends in a `<Gather>`. A caller on the phone
//! must never be left in a dead end because the backend faulted.

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use voxlink_core::event::keys;
use voxlink_core::{CanonicalEvent, EventKind, VoxlinkError};
use voxlink_twilio::VoiceResponse;

use crate::server::IngressState;

/// Action the gather posts the next caller input back to.
pub const GATHER_ACTION: &str = "/process-input";

/// Session key used when the provider omitted `CallSid`.
const UNKNOWN_CALL_ID: &str = "unknown";

/// JSON body returned by `/status_callback`.
#[derive(Debug, Serialize)]
pub struct StatusAck {
    /// "success" or "error".
    pub status: String,
    /// Human-readable detail.
    pub message: String,
}

/// Error response body for non-voice endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Query parameters for `GET /history`.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Zero-based offset into the history.
    #[serde(default)]
    pub offset: usize,
    /// Maximum events per page.
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    50
}

/// Response body for `GET /history`.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Total events recorded so far.
    pub total: usize,
    /// The requested page, oldest first.
    pub events: Vec<CanonicalEvent>,
}

/// POST /status_callback
///
/// Normalizes the provider's form fields into a StatusUpdate event,
/// publishes it (the publish is what keeps the dashboard in sync), then
/// applies the transition to the call's session. Relay failures are logged
/// and absorbed: the provider's callback must still succeed.
pub async fn post_status_callback(
    State(state): State<IngressState>,
    body: Bytes,
) -> (StatusCode, Json<StatusAck>) {
    let fields: HashMap<String, String> = match serde_urlencoded::from_bytes(&body) {
        Ok(fields) => fields,
        Err(e) => {
            error!(error = %e, "unreadable status callback body");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusAck {
                    status: "error".to_string(),
                    message: format!("unreadable status callback body: {e}"),
                }),
            );
        }
    };

    let mut event = CanonicalEvent::new(EventKind::StatusUpdate);
    for (key, value) in &fields {
        event = event.with_field(key, value.clone());
    }
    let event = event.stamped();

    if let Err(e) = state.relay.publish(&event).await {
        warn!(error = %e, "status relay failed, continuing");
    }

    let call_sid = fields
        .get(keys::CALL_SID)
        .map_or(UNKNOWN_CALL_ID, String::as_str);
    match fields.get(keys::CALL_STATUS).map(|s| s.parse()) {
        Some(Ok(status)) => {
            info!(call_sid, status = %status, "status callback received");
            state.tracker.record_status(call_sid, status).await;
        }
        Some(Err(_)) => {
            warn!(
                call_sid,
                raw = fields.get(keys::CALL_STATUS).map(String::as_str),
                "unrecognized call status in callback"
            );
        }
        None => {
            warn!(call_sid, "status callback without CallStatus field");
        }
    }

    (
        StatusCode::OK,
        Json(StatusAck {
            status: "success".to_string(),
            message: "status update processed".to_string(),
        }),
    )
}

/// POST /process-input
///
/// Accepts form-encoded or JSON caller input; any other content type is
/// 415 with no side effects. The normalized UserInput event is published
/// before the response is computed, then the tracker runs the LLM turn.
pub async fn post_process_input(
    State(state): State<IngressState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    let input = if content_type.contains("application/json") {
        parse_json_input(&body)
    } else if content_type.contains("application/x-www-form-urlencoded") {
        parse_form_input(&body)
    } else {
        warn!(content_type = %content_type, "unsupported content type on /process-input");
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(ErrorResponse {
                error: format!("Unsupported Content-Type: {content_type}"),
            }),
        )
            .into_response();
    };

    let input = match input {
        Ok(input) => input,
        Err(e) => {
            error!(error = %e, "unreadable caller input");
            return fallback_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Sorry, something went wrong. Let's try again.",
                &state,
            );
        }
    };

    let event = CanonicalEvent::new(EventKind::UserInput)
        .with_field(keys::CALL_SID, input.call_sid.clone())
        .with_field(keys::SPEECH_RESULT, input.speech.clone())
        .with_field(keys::DIGITS, input.digits.clone())
        .stamped();
    if let Err(e) = state.relay.publish(&event).await {
        warn!(error = %e, "user input relay failed, continuing");
    }

    if !input.speech.is_empty() {
        return speech_response(&state, &input).await;
    }

    let doc = if !input.digits.is_empty() {
        info!(call_sid = %input.call_sid, digits = %input.digits, "dtmf input received");
        voice(&state, &format!("You pressed: {}", input.digits))
    } else {
        voice(&state, "No input received.")
    };
    twiml_response(StatusCode::OK, &doc)
}

/// GET /history
///
/// Read-only paginated view of the drained message history.
pub async fn get_history(
    State(state): State<IngressState>,
    Query(params): Query<HistoryParams>,
) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        total: state.history.len(),
        events: state.history.page(params.offset, params.limit),
    })
}

/// Caller input normalized from either accepted encoding.
#[derive(Debug)]
struct CallerInput {
    speech: String,
    digits: String,
    call_sid: String,
}

fn parse_json_input(body: &[u8]) -> Result<CallerInput, VoxlinkError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| VoxlinkError::Decode {
            message: format!("malformed JSON input: {e}"),
        })?;
    let text = |key: &str| {
        value
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };
    Ok(CallerInput {
        speech: text(keys::SPEECH_RESULT),
        digits: text(keys::DIGITS),
        call_sid: non_empty_or_unknown(text(keys::CALL_SID)),
    })
}

fn parse_form_input(body: &[u8]) -> Result<CallerInput, VoxlinkError> {
    let fields: HashMap<String, String> =
        serde_urlencoded::from_bytes(body).map_err(|e| VoxlinkError::Decode {
            message: format!("malformed form input: {e}"),
        })?;
    let text = |key: &str| fields.get(key).cloned().unwrap_or_default();
    Ok(CallerInput {
        speech: text(keys::SPEECH_RESULT),
        digits: text(keys::DIGITS),
        call_sid: non_empty_or_unknown(text(keys::CALL_SID)),
    })
}

fn non_empty_or_unknown(call_sid: String) -> String {
    if call_sid.is_empty() {
        UNKNOWN_CALL_ID.to_string()
    } else {
        call_sid
    }
}

/// Runs the LLM turn for transcribed speech and maps failures to fallback
/// documents. A timed-out or failed turn is a handled condition (200 with
/// an apology); anything else is a 500 -- but both keep gathering.
async fn speech_response(state: &IngressState, input: &CallerInput) -> Response {
    info!(call_sid = %input.call_sid, speech = %input.speech, "speech input received");

    match state.tracker.user_turn(&input.call_sid, &input.speech).await {
        Ok(reply) => twiml_response(StatusCode::OK, &voice(state, &reply)),
        Err(e @ (VoxlinkError::Timeout { .. } | VoxlinkError::Llm { .. })) => {
            warn!(call_sid = %input.call_sid, error = %e, "llm turn failed, speaking fallback");
            twiml_response(
                StatusCode::OK,
                &voice(state, "Sorry, I didn't catch that. Could you say that again?"),
            )
        }
        Err(e) => {
            error!(call_sid = %input.call_sid, error = %e, "turn processing failed");
            fallback_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Sorry, something went wrong. Let's try again.",
                state,
            )
        }
    }
}

/// A spoken document that continues gathering input.
fn voice(state: &IngressState, text: &str) -> VoiceResponse {
    VoiceResponse::new()
        .say(text, state.voice.as_deref())
        .gather(GATHER_ACTION)
}

fn fallback_response(status: StatusCode, text: &str, state: &IngressState) -> Response {
    twiml_response(status, &voice(state, text))
}

/// Serves a TwiML document with the XML content type.
fn twiml_response(status: StatusCode, doc: &VoiceResponse) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/xml")],
        doc.to_xml(),
    )
        .into_response()
}
