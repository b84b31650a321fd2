// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TwiML voice-response documents.
//!
//! A small builder over the handful of verbs Voxlink speaks: `<Say>`,
//! `<Pause>`, and `<Gather>`. Every document the ingress returns ends with a
//! gather so the caller always has a way to continue the conversation.

use std::fmt::Write;

/// Default seconds a gather waits for caller input.
pub const GATHER_TIMEOUT_SECS: u32 = 5;

/// One TwiML verb.
#[derive(Debug, Clone, PartialEq)]
enum Verb {
    Say { text: String, voice: Option<String> },
    Pause { length: u32 },
    Gather { action: String, timeout: u32 },
}

/// Builder for a TwiML `<Response>` document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    /// An empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Speaks `text`, optionally with a provider voice name.
    #[must_use]
    pub fn say(mut self, text: &str, voice: Option<&str>) -> Self {
        self.verbs.push(Verb::Say {
            text: text.to_string(),
            voice: voice.map(str::to_string),
        });
        self
    }

    /// Waits silently for `length` seconds.
    #[must_use]
    pub fn pause(mut self, length: u32) -> Self {
        self.verbs.push(Verb::Pause { length });
        self
    }

    /// Gathers speech and DTMF input, posting the result to `action`.
    ///
    /// Speech end is auto-detected; input waits up to
    /// [`GATHER_TIMEOUT_SECS`] before the provider moves on.
    #[must_use]
    pub fn gather(mut self, action: &str) -> Self {
        self.verbs.push(Verb::Gather {
            action: action.to_string(),
            timeout: GATHER_TIMEOUT_SECS,
        });
        self
    }

    /// True when the document contains a `<Gather>` continuation.
    pub fn has_gather(&self) -> bool {
        self.verbs.iter().any(|v| matches!(v, Verb::Gather { .. }))
    }

    /// Renders the document as TwiML XML.
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>");
        for verb in &self.verbs {
            match verb {
                Verb::Say { text, voice } => {
                    match voice {
                        Some(voice) => {
                            let _ = write!(xml, "<Say voice=\"{}\">", escape(voice));
                        }
                        None => xml.push_str("<Say>"),
                    }
                    xml.push_str(&escape(text));
                    xml.push_str("</Say>");
                }
                Verb::Pause { length } => {
                    let _ = write!(xml, "<Pause length=\"{length}\"/>");
                }
                Verb::Gather { action, timeout } => {
                    let _ = write!(
                        xml,
                        "<Gather input=\"speech dtmf\" action=\"{}\" method=\"POST\" \
                         timeout=\"{timeout}\" speechTimeout=\"auto\"/>",
                        escape(action)
                    );
                }
            }
        }
        xml.push_str("</Response>");
        xml
    }
}

/// Escapes text for XML content and attribute values.
fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
