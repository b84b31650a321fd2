// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telephony adapter for Voxlink: the Twilio Calls REST client and the
//! TwiML voice-response documents it answers with.

pub mod client;
pub mod twiml;

pub use client::{TwilioClient, validate_phone_number};
pub use twiml::VoiceResponse;
