// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock adapters for deterministic Voxlink testing.
//!
//! Everything here implements a `voxlink-core` trait with scripted,
//! in-memory behavior so the tracker, ingress, and binary can be exercised
//! without a broker, a telephony account, or a running model.

pub mod mock_llm;
pub mod mock_publisher;
pub mod mock_telephony;

pub use mock_llm::MockLlm;
pub use mock_publisher::MockPublisher;
pub use mock_telephony::{CallUpdate, MockTelephony, PlacedCall};
