// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an Ollama-compatible chat API.
//!
//! Implements [`LlmTurn`]: one non-streaming `/api/chat` request per
//! conversation turn, with the whole turn history mapped to chat messages
//! under a fixed phone-assistant system prompt. The request itself is
//! bounded by the configured timeout; a phone caller cannot wait on an
//! unbounded generation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use voxlink_core::{ConversationTurn, LlmTurn, Speaker, VoxlinkError};

/// System prompt for every call turn.
const SYSTEM_PROMPT: &str = "You are a helpful AI assistant handling phone calls. \
                             Keep responses clear, concise, and natural.";

/// HTTP client for the Ollama chat endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

impl OllamaClient {
    /// Creates a client for `base_url` generating with `model`, bounding
    /// every request by `timeout`.
    pub fn new(base_url: String, model: String, timeout: Duration) -> Result<Self, VoxlinkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VoxlinkError::Llm {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout,
        })
    }

    /// The model identifier used for call turns.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl LlmTurn for OllamaClient {
    async fn reply(
        &self,
        history: &[ConversationTurn],
        input: &str,
    ) -> Result<String, VoxlinkError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        });
        for turn in history {
            messages.push(ChatMessage {
                role: match turn.speaker {
                    Speaker::User => "user".to_string(),
                    Speaker::Agent => "assistant".to_string(),
                },
                content: turn.text.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: input.to_string(),
        });

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(self.chat_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VoxlinkError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    VoxlinkError::Llm {
                        message: format!("chat request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| VoxlinkError::Llm {
            message: format!("failed to read chat response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(VoxlinkError::Llm {
                message: format!("chat API returned {status}: {body}"),
                source: None,
            });
        }

        let chat: ChatResponse = serde_json::from_str(&body).map_err(|e| VoxlinkError::Llm {
            message: format!("malformed chat response: {e}"),
            source: Some(Box::new(e)),
        })?;

        debug!(
            model = %self.model,
            turns = history.len(),
            reply_len = chat.message.content.len(),
            "chat turn completed"
        );
        Ok(chat.message.content)
    }
}
