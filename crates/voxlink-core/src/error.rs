// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Voxlink call bridge.

use thiserror::Error;

/// The primary error type used across all Voxlink components.
#[derive(Debug, Error)]
pub enum VoxlinkError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Broker connection errors (unreachable, refused, auth failure).
    ///
    /// Surfaced from `connect`; the bridge never retries internally --
    /// retry policy belongs to the process supervisor.
    #[error("broker connection error: {message}")]
    Connection {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Publish attempted while not connected, or the client rejected the send.
    ///
    /// Logged at call sites; the surrounding request continues.
    #[error("publish error: {message}")]
    Publish {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed inbound broker message or webhook payload.
    ///
    /// Always absorbed at the component boundary: dropped inbound, 415 at
    /// ingress. Never propagated as a crash.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Telephony provider REST failure (API error, transport failure).
    #[error("telephony error: {message}")]
    Telephony {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM turn invocation failure (API error, malformed reply).
    #[error("llm error: {message}")]
    Llm {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation exceeded its bounded timeout.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Turn append attempted on a session whose status is terminal.
    #[error("call session {call_id} is closed")]
    SessionClosed { call_id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
