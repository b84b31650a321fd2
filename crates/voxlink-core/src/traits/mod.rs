// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the seams of the bridge.
//!
//! The external collaborators (broker relay, telephony provider, LLM turn
//! capability) are consumed through these traits so the webhook adapter and
//! the session tracker can be driven by mocks in tests. All traits use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod llm;
pub mod publish;
pub mod telephony;

pub use llm::LlmTurn;
pub use publish::EventPublisher;
pub use telephony::TelephonyAdapter;
