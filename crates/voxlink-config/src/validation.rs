// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, E.164 phone numbers, and
//! nonzero intervals.

use crate::diagnostic::ConfigError;
use crate::model::VoxlinkConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &VoxlinkConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate ingress bind host looks like an IP or hostname.
    let host = config.ingress.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "ingress.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("ingress.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.ingress.port == 0 {
        errors.push(ConfigError::Validation {
            message: "ingress.port must be nonzero".to_string(),
        });
    }

    if config.relay.broker_host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "relay.broker_host must not be empty".to_string(),
        });
    }

    if config.relay.topic.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "relay.topic must not be empty".to_string(),
        });
    }

    if config.relay.client_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "relay.client_id must not be empty".to_string(),
        });
    }

    // Originating number must be E.164 when set.
    if let Some(ref number) = config.twilio.phone_number
        && !is_e164(number)
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "twilio.phone_number `{number}` is not in E.164 format (e.g. +15551234567)"
            ),
        });
    }

    // Webhook callbacks need an http(s) base URL.
    if let Some(ref url) = config.twilio.public_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        errors.push(ConfigError::Validation {
            message: format!("twilio.public_url `{url}` must start with http:// or https://"),
        });
    }

    if config.ollama.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "ollama.timeout_secs must be nonzero".to_string(),
        });
    }

    if config.dashboard.refresh_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "dashboard.refresh_secs must be nonzero".to_string(),
        });
    }

    if config.dashboard.poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "dashboard.poll_interval_secs must be nonzero".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Basic E.164 shape check: leading `+`, then 8 to 15 digits.
pub fn is_e164(number: &str) -> bool {
    let Some(digits) = number.strip_prefix('+') else {
        return false;
    };
    (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}
