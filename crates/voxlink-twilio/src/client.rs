// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Twilio Calls REST API.
//!
//! Implements [`TelephonyAdapter`]: placing outbound calls with a TwiML
//! answer document and a status callback subscription, fetching live call
//! status, and pushing a status onto an in-flight call.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use voxlink_core::{CallStatus, TelephonyAdapter, VoxlinkError};

/// Base URL for the Twilio REST API.
const API_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

/// Call lifecycle events the status callback subscribes to.
const STATUS_CALLBACK_EVENTS: [&str; 4] = ["initiated", "ringing", "answered", "completed"];

/// HTTP client for Twilio API communication.
///
/// Requests are form-encoded with basic auth, the way the provider expects.
#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    base_url: String,
}

/// The subset of the provider's call resource Voxlink reads.
#[derive(Debug, Deserialize)]
struct CallResource {
    sid: String,
    status: String,
}

impl TwilioClient {
    /// Creates a new Twilio API client.
    ///
    /// # Arguments
    /// * `account_sid` - Account SID used in the URL path and for auth
    /// * `auth_token` - API auth token
    /// * `from_number` - E.164 number calls originate from
    pub fn new(
        account_sid: String,
        auth_token: String,
        from_number: String,
    ) -> Result<Self, VoxlinkError> {
        if !validate_phone_number(&from_number) {
            return Err(VoxlinkError::Config(format!(
                "originating number `{from_number}` is not in E.164 format"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| VoxlinkError::Telephony {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            account_sid,
            auth_token,
            from_number,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn calls_url(&self) -> String {
        format!("{}/Accounts/{}/Calls.json", self.base_url, self.account_sid)
    }

    fn call_url(&self, call_id: &str) -> String {
        format!(
            "{}/Accounts/{}/Calls/{}.json",
            self.base_url, self.account_sid, call_id
        )
    }

    async fn read_call_resource(
        &self,
        response: reqwest::Response,
    ) -> Result<CallResource, VoxlinkError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| VoxlinkError::Telephony {
            message: format!("failed to read API response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(VoxlinkError::Telephony {
                message: format!("API returned {status}: {body}"),
                source: None,
            });
        }

        serde_json::from_str(&body).map_err(|e| VoxlinkError::Decode {
            message: format!("malformed call resource: {e}"),
        })
    }

    fn parse_status(&self, resource: &CallResource) -> Result<CallStatus, VoxlinkError> {
        CallStatus::from_str(&resource.status).map_err(|_| VoxlinkError::Decode {
            message: format!(
                "unrecognized call status `{}` for {}",
                resource.status, resource.sid
            ),
        })
    }
}

#[async_trait]
impl TelephonyAdapter for TwilioClient {
    async fn place_call(
        &self,
        to: &str,
        voice_document: &str,
        status_callback_url: &str,
    ) -> Result<String, VoxlinkError> {
        if !validate_phone_number(to) {
            return Err(VoxlinkError::Telephony {
                message: format!("destination `{to}` is not in E.164 format"),
                source: None,
            });
        }

        let mut form: Vec<(&str, &str)> = vec![
            ("To", to),
            ("From", self.from_number.as_str()),
            ("Twiml", voice_document),
            ("StatusCallback", status_callback_url),
        ];
        for event in STATUS_CALLBACK_EVENTS {
            form.push(("StatusCallbackEvent", event));
        }

        let response = self
            .client
            .post(self.calls_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| VoxlinkError::Telephony {
                message: format!("place call request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let resource = self.read_call_resource(response).await?;
        debug!(call_id = %resource.sid, to, "call placed");
        Ok(resource.sid)
    }

    async fn fetch_call_status(&self, call_id: &str) -> Result<CallStatus, VoxlinkError> {
        let response = self
            .client
            .get(self.call_url(call_id))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await
            .map_err(|e| VoxlinkError::Telephony {
                message: format!("fetch call status request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let resource = self.read_call_resource(response).await?;
        self.parse_status(&resource)
    }

    async fn update_call(&self, call_id: &str, status: CallStatus) -> Result<(), VoxlinkError> {
        let status_str = status.to_string();
        let response = self
            .client
            .post(self.call_url(call_id))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("Status", status_str.as_str())])
            .send()
            .await
            .map_err(|e| VoxlinkError::Telephony {
                message: format!("update call request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        self.read_call_resource(response).await?;
        debug!(call_id, status = %status, "call updated");
        Ok(())
    }
}

/// Basic E.164 shape check: leading `+`, then 8 to 15 digits.
pub fn validate_phone_number(number: &str) -> bool {
    let Some(digits) = number.strip_prefix('+') else {
        return false;
    };
    (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}
