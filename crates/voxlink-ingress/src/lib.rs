// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook ingress adapter for Voxlink.
//!
//! Receives the telephony provider's callbacks, normalizes them into
//! canonical events, relays them through the broker link, and answers with
//! TwiML voice documents that always keep the conversation gathering.

pub mod handlers;
pub mod server;

pub use server::{IngressState, ServerConfig, router, start_server};
