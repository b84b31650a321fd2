// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The event bridge: broker link, inbound event queue, and session view
//! drain.
//!
//! Events produced by the webhook ingress are published through the
//! [`BrokerLink`], delivered (possibly in another process) to the link's
//! receive task, buffered in the [`EventQueue`], and periodically drained
//! into the [`MessageHistory`] that the dashboard renders.

pub mod history;
pub mod link;
pub mod queue;

pub use history::{MessageHistory, SessionViewDrain};
pub use link::{BrokerLink, EventCallback};
pub use queue::EventQueue;
