// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Voxlink.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Voxlink configuration.
///
/// Loaded from TOML files following XDG hierarchy, with `VOXLINK_*`
/// environment variable overrides. All sections are optional and default to
/// sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VoxlinkConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// MQTT relay settings.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Telephony provider settings.
    #[serde(default)]
    pub twilio: TwilioConfig,

    /// LLM turn capability settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Webhook ingress server settings.
    #[serde(default)]
    pub ingress: IngressConfig,

    /// Dashboard drain and poll settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "voxlink".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// MQTT relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Broker hostname.
    #[serde(default = "default_broker_host")]
    pub broker_host: String,

    /// Broker TCP port.
    #[serde(default = "default_broker_port")]
    pub broker_port: u16,

    /// The single topic events are published to and consumed from.
    #[serde(default = "default_topic")]
    pub topic: String,

    /// MQTT client identifier. Each process needs its own.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// MQTT keep-alive interval in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            broker_host: default_broker_host(),
            broker_port: default_broker_port(),
            topic: default_topic(),
            client_id: default_client_id(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

fn default_broker_host() -> String {
    "broker.hivemq.com".to_string()
}

fn default_broker_port() -> u16 {
    1883
}

fn default_topic() -> String {
    "voxlink/events".to_string()
}

fn default_client_id() -> String {
    "voxlink-serve".to_string()
}

fn default_keep_alive_secs() -> u64 {
    60
}

/// Telephony provider configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TwilioConfig {
    /// Account SID. `None` disables call placement.
    #[serde(default)]
    pub account_sid: Option<String>,

    /// API auth token.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// E.164 number calls originate from.
    #[serde(default)]
    pub phone_number: Option<String>,

    /// Voice used for spoken responses.
    #[serde(default)]
    pub voice: Option<String>,

    /// Publicly reachable base URL for webhook callbacks (e.g. an ngrok
    /// tunnel in development).
    #[serde(default)]
    pub public_url: Option<String>,
}

/// LLM turn capability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the Ollama-compatible API.
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    /// Model used for call turns.
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Bound on a single turn invocation, in seconds. The webhook must
    /// answer within the provider's call-flow timeout, so this stays small.
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_ollama_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    10
}

/// Webhook ingress server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IngressConfig {
    /// Host address to bind.
    #[serde(default = "default_ingress_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_ingress_port")]
    pub port: u16,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            host: default_ingress_host(),
            port: default_ingress_port(),
        }
    }
}

fn default_ingress_host() -> String {
    "0.0.0.0".to_string()
}

fn default_ingress_port() -> u16 {
    5000
}

/// Dashboard drain and call-status poll configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Interval between message-history drain ticks, in seconds.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    /// Page size for history reads.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Interval between call-status polls, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
            page_size: default_page_size(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_refresh_secs() -> u64 {
    2
}

fn default_page_size() -> usize {
    50
}

fn default_poll_interval_secs() -> u64 {
    10
}
