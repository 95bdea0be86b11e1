//! Completion Client Adapters.
//!
//! ## Available Adapters
//!
//! - `OpenAICompletionClient` - OpenAI chat completions, both request shapes
//! - `MockCompletionClient` - Configurable mock for testing

mod mock_completion;
mod openai_completion;

pub use mock_completion::{MockCompletionClient, DEFAULT_MOCK_ANSWER};
pub use openai_completion::{OpenAICompletionClient, OpenAIConfig};
