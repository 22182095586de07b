//! LLM request/response types shared between the engine and its
//! language-model capability provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Role of a message in an LLM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in an LLM conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Response from the language-model provider.
///
/// `content` is the first-choice message content; `raw` carries the full
/// provider response for auditing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    #[serde(default)]
    pub raw: Value,
}

/// A registered language model, resolved by id from node config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmModel {
    /// String id as referenced from node `config.model_id`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Upstream model identifier passed to the provider.
    pub model: String,
}
