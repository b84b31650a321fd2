// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM turn seam. Natural-language generation is owned by an external
//! capability; the tracker only hands it ordered context and bounds it
//! with a timeout.

use async_trait::async_trait;

use crate::error::VoxlinkError;
use crate::types::ConversationTurn;

/// Produces the next agent reply for a call.
#[async_trait]
pub trait LlmTurn {
    /// Generates a reply to `input` given the ordered turn `history`
    /// (everything before the new input).
    ///
    /// Assumed synchronous request/response; callers bound the invocation
    /// with a timeout and must survive failures.
    async fn reply(
        &self,
        history: &[ConversationTurn],
        input: &str,
    ) -> Result<String, VoxlinkError>;
}
