// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error types and terminal rendering.

use thiserror::Error;

/// A single configuration problem, reported at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML parse or type error from the loader.
    #[error("config parse error: {message}")]
    Parse { message: String },

    /// Semantic validation failure after deserialization.
    #[error("config validation error: {message}")]
    Validation { message: String },
}

/// Convert a figment extraction error into config errors.
///
/// Figment reports one error per failed key; each becomes its own entry so
/// the user sees everything wrong in one run.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::Parse {
            message: e.to_string(),
        })
        .collect()
}

/// Render collected config errors to stderr, one per line.
pub fn render_errors(errors: &[ConfigError]) {
    eprintln!("voxlink: configuration is invalid:");
    for error in errors {
        eprintln!("  - {error}");
    }
    eprintln!("fix voxlink.toml (or VOXLINK_* overrides) and restart");
}
