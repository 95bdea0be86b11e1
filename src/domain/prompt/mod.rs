//! Prompt - fragments, response cache, and the prompt assembler.

mod assembler;
mod cache;
mod fragment;

pub use assembler::{AssembledPrompt, Assembly, PromptAssembler, PromptError};
pub use cache::ResponseCache;
pub use fragment::{validate_fragments, PromptFragment, PromptSettings, PromptSource, PromptType};
