// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM turn adapter for Voxlink, speaking the Ollama chat API.

pub mod client;

pub use client::OllamaClient;
