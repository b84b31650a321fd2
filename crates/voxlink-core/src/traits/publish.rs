// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound event publishing seam.

use async_trait::async_trait;

use crate::error::VoxlinkError;
use crate::event::CanonicalEvent;

/// Publishes canonical events toward the dashboard.
///
/// The broker link is the production implementation; tests substitute a
/// capturing mock. Callers treat publish failures as recoverable: log and
/// continue, the caller-facing flow must not abort because telemetry relay
/// failed.
#[async_trait]
pub trait EventPublisher {
    /// Publishes one event at the at-least-once delivery level.
    ///
    /// Implementations stamp the timestamp if the producer left it empty.
    async fn publish(&self, event: &CanonicalEvent) -> Result<(), VoxlinkError>;
}
