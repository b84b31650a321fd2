// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telephony provider seam. Voxlink is a pure consumer of this capability:
//! the provider owns dialing and voice transport.

use async_trait::async_trait;

use crate::error::VoxlinkError;
use crate::types::CallStatus;

/// Outbound call operations against the telephony provider's REST API.
#[async_trait]
pub trait TelephonyAdapter {
    /// Places a call to `to`, answering with `voice_document` (TwiML) and
    /// subscribing lifecycle callbacks to `status_callback_url`.
    ///
    /// Returns the provider-assigned call identifier.
    async fn place_call(
        &self,
        to: &str,
        voice_document: &str,
        status_callback_url: &str,
    ) -> Result<String, VoxlinkError>;

    /// Fetches the current status of a call.
    async fn fetch_call_status(&self, call_id: &str) -> Result<CallStatus, VoxlinkError>;

    /// Pushes a status onto an in-flight call (e.g. Completed to hang up).
    async fn update_call(&self, call_id: &str, status: CallStatus) -> Result<(), VoxlinkError>;
}
