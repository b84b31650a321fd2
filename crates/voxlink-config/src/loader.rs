// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./voxlink.toml` > `~/.config/voxlink/voxlink.toml`
//! > `/etc/voxlink/voxlink.toml` with environment variable overrides via the
//! `VOXLINK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::VoxlinkConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/voxlink/voxlink.toml` (system-wide)
/// 3. `~/.config/voxlink/voxlink.toml` (user XDG config)
/// 4. `./voxlink.toml` (local directory)
/// 5. `VOXLINK_*` environment variables
pub fn load_config() -> Result<VoxlinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VoxlinkConfig::default()))
        .merge(Toml::file("/etc/voxlink/voxlink.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("voxlink/voxlink.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("voxlink.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<VoxlinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VoxlinkConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VoxlinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VoxlinkConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `VOXLINK_RELAY_BROKER_HOST` must map to
/// `relay.broker_host`, not `relay.broker.host`.
fn env_provider() -> Env {
    Env::prefixed("VOXLINK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: VOXLINK_TWILIO_ACCOUNT_SID -> "twilio_account_sid"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("relay_", "relay.", 1)
            .replacen("twilio_", "twilio.", 1)
            .replacen("ollama_", "ollama.", 1)
            .replacen("ingress_", "ingress.", 1)
            .replacen("dashboard_", "dashboard.", 1);
        mapped.into()
    })
}
