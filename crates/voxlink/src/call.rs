// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `voxlink call` command implementation.
//!
//! Places an outbound call with a greeting document, then polls the
//! provider for call status on a fixed interval, announcing each status
//! once and stopping on a terminal status. Ctrl+C hangs the call up.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use voxlink_call::CallSession;
use voxlink_config::VoxlinkConfig;
use voxlink_core::{CallStatus, TelephonyAdapter, VoxlinkError};
use voxlink_twilio::{TwilioClient, VoiceResponse};

use crate::shutdown;

/// Opening line spoken when the callee answers.
const GREETING: &str = "Hello! How can I help you today?";

/// Runs the `voxlink call` command.
pub async fn run_call(config: VoxlinkConfig, to: &str) -> Result<(), VoxlinkError> {
    let account_sid = require(&config.twilio.account_sid, "twilio.account_sid")?;
    let auth_token = require(&config.twilio.auth_token, "twilio.auth_token")?;
    let phone_number = require(&config.twilio.phone_number, "twilio.phone_number")?;
    let public_url = require(&config.twilio.public_url, "twilio.public_url")?;

    let telephony = TwilioClient::new(account_sid, auth_token, phone_number)?;
    let cancel = shutdown::install_signal_handler();

    let final_status = place_and_watch(
        &telephony,
        to,
        config.twilio.voice.as_deref(),
        &public_url,
        Duration::from_secs(config.dashboard.poll_interval_secs),
        cancel,
    )
    .await?;

    println!("Call ended with status: {final_status}");
    Ok(())
}

fn require(value: &Option<String>, key: &str) -> Result<String, VoxlinkError> {
    value
        .clone()
        .ok_or_else(|| VoxlinkError::Config(format!("{key} is required to place calls")))
}

/// Places the call and watches it to completion.
///
/// The greeting document gathers straight into `/process-input`, and the
/// status callback subscribes the webhook process to lifecycle events. The
/// watch loop suspends for `poll_interval` between polls -- a bounded wait,
/// re-entered each tick -- and announces a status only when it changed
/// since the last announcement. Cancelling hangs the call up via the
/// provider.
pub async fn place_and_watch(
    telephony: &(dyn TelephonyAdapter + Sync),
    to: &str,
    voice: Option<&str>,
    public_url: &str,
    poll_interval: Duration,
    cancel: CancellationToken,
) -> Result<CallStatus, VoxlinkError> {
    let greeting = VoiceResponse::new()
        .say(GREETING, voice)
        .gather(&format!("{public_url}/process-input"));

    let call_id = telephony
        .place_call(
            to,
            &greeting.to_xml(),
            &format!("{public_url}/status_callback"),
        )
        .await?;
    info!(call_id = %call_id, to, "call placed");
    println!("Call placed. SID: {call_id}");

    let mut session = CallSession::new(call_id.as_str());
    let mut tick = tokio::time::interval(poll_interval);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let status = telephony.fetch_call_status(&call_id).await?;
                if session.poll_update(status) {
                    println!("Call status: {status}");
                }
                if status.is_terminal() {
                    return Ok(status);
                }
            }
            _ = cancel.cancelled() => {
                println!("Interrupted; hanging up.");
                telephony.update_call(&call_id, CallStatus::Completed).await?;
                return Ok(CallStatus::Completed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use voxlink_test_utils::MockTelephony;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn watch_announces_each_status_once_and_stops_on_terminal() {
        let telephony = MockTelephony::with_statuses(vec![
            CallStatus::Queued,
            CallStatus::Ringing,
            CallStatus::Ringing,
            CallStatus::Answered,
            CallStatus::Completed,
        ]);

        let status = place_and_watch(
            &telephony,
            "+15551234567",
            Some("alice"),
            "https://example.ngrok.io",
            Duration::from_secs(10),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(status, CallStatus::Completed);

        let placed = telephony.placed_calls();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].to, "+15551234567");
        assert!(placed[0].voice_document.contains(GREETING));
        assert!(
            placed[0]
                .voice_document
                .contains("https://example.ngrok.io/process-input")
        );
        assert_eq!(
            placed[0].status_callback_url,
            "https://example.ngrok.io/status_callback"
        );
        // No hangup was pushed: the call ended on its own.
        assert!(telephony.updates().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_the_watch_hangs_the_call_up() {
        let telephony = MockTelephony::with_statuses(vec![CallStatus::Ringing]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let status = place_and_watch(
            &telephony,
            "+15551234567",
            None,
            "https://example.ngrok.io",
            Duration::from_secs(10),
            cancel,
        )
        .await
        .unwrap();

        assert_eq!(status, CallStatus::Completed);
        let updates = telephony.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].status, CallStatus::Completed);
    }
}
