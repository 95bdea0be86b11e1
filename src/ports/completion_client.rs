//! Completion Client Port - Interface for LLM completion APIs.
//!
//! Collaborators differ in the call shape they accept: chat-style APIs take a
//! list of role-tagged messages, legacy ones take a `(question, system, context)`
//! triplet. Both are modeled by [`CompletionPrompt`] and the client reports
//! which one it prefers through [`CompletionClient::request_shape`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Port for LLM completion calls.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a single, non-streaming completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, CompletionError>;

    /// Call shape the prompt assembler should build for this client.
    fn request_shape(&self) -> RequestShape {
        RequestShape::Chat
    }

    /// Provider name and model, recorded in traces.
    fn provider_info(&self) -> ProviderInfo;
}

/// Call shape accepted by a completion collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestShape {
    /// `messages=[...]` keyword signature.
    #[default]
    Chat,
    /// Positional `(question, system, context)` signature.
    Legacy,
}

/// Request for a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: CompletionPrompt,
    pub hyperparameters: LlmHyperparameters,
}

/// Prompt payload in one of the two supported call shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionPrompt {
    Chat {
        messages: Vec<ChatMessage>,
    },
    Legacy {
        question: String,
        system: String,
        context: String,
    },
}

impl CompletionRequest {
    /// Creates a chat-shaped request.
    pub fn chat(messages: Vec<ChatMessage>) -> Self {
        Self {
            prompt: CompletionPrompt::Chat { messages },
            hyperparameters: LlmHyperparameters::default(),
        }
    }

    /// Creates a legacy triplet request.
    pub fn legacy(
        question: impl Into<String>,
        system: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            prompt: CompletionPrompt::Legacy {
                question: question.into(),
                system: system.into(),
                context: context.into(),
            },
            hyperparameters: LlmHyperparameters::default(),
        }
    }

    /// Sets the sampling hyperparameters.
    pub fn with_hyperparameters(mut self, hyperparameters: LlmHyperparameters) -> Self {
        self.hyperparameters = hyperparameters;
        self
    }

    /// Flattens either shape into chat messages.
    ///
    /// The legacy triplet becomes a system message followed by one user
    /// message of the context terminated by the question suffix.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        match &self.prompt {
            CompletionPrompt::Chat { messages } => messages.clone(),
            CompletionPrompt::Legacy {
                question,
                system,
                context,
            } => vec![
                ChatMessage::system(system.clone()),
                ChatMessage::user(question_suffixed(context, question)),
            ],
        }
    }
}

/// Appends the `Q:`/`A:` question suffix to a user content block.
pub fn question_suffixed(context: &str, question: &str) -> String {
    format!("{}\n Q: {}\n A:", context, question)
}

/// A message in a chat-shaped request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Sampling hyperparameters forwarded to the completion API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmHyperparameters {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub n: u32,
    pub stop: Option<Vec<String>>,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl Default for LlmHyperparameters {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
            max_tokens: 300,
            top_p: 0.0,
            n: 1,
            stop: None,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        }
    }
}

/// Response from a completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Provider identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Errors from completion calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u32 },

    #[error("Provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u32 },

    #[error("Failed to parse provider response: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("No completion provider configured")]
    NotConfigured,
}

impl CompletionError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        CompletionError::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        CompletionError::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        CompletionError::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        CompletionError::Parse(message.into())
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited { .. }
                | CompletionError::Unavailable { .. }
                | CompletionError::Network(_)
                | CompletionError::Timeout { .. }
        )
    }

    /// Whether the provider could not be reached at all.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            CompletionError::Unavailable { .. }
                | CompletionError::Network(_)
                | CompletionError::Timeout { .. }
        )
    }
}
