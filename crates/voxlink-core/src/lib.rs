// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Voxlink call bridge.
//!
//! Provides the canonical event model, the call status and conversation
//! types, the error taxonomy, and the adapter traits implemented by the
//! broker relay, telephony, and LLM crates.

pub mod error;
pub mod event;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VoxlinkError;
pub use event::{CanonicalEvent, EventKind};
pub use types::{CallStatus, ConversationTurn, Speaker};

pub use traits::{EventPublisher, LlmTurn, TelephonyAdapter};
