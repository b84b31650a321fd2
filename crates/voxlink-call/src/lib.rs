// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call session tracking for Voxlink.
//!
//! [`CallSession`] is the per-call FSM; [`CallTracker`] shards sessions by
//! call id and runs LLM turns against them.

pub mod session;
pub mod tracker;

pub use session::{CallSession, Transition};
pub use tracker::CallTracker;
