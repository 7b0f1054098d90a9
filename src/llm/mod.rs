// src/llm/mod.rs
//! Chat completion backends.

pub mod openai;

pub use openai::OpenAIClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::conversation::Role;

/// One prior turn handed to the model.
#[derive(Debug, Clone)]
pub struct CompletionMessage {
    pub role: Role,
    pub content: String,
}

/// Everything a single completion call needs. The system prompt rides
/// separately so backends can place it however their API expects.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub messages: Vec<CompletionMessage>,
    pub temperature: f64,
    pub max_tokens: i64,
}

/// Unified trait for chat completion backends.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion and return the assistant text.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}
