//! Prompt fragments and the settings of a prompt action.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptType {
    System,
    User,
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptSource {
    #[default]
    Static,
    History,
    BotContent,
    Slot,
    Action,
}

/// One configured unit of prompt content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptFragment {
    pub name: String,

    /// Static text, slot name, action name, or collection, depending on `source`.
    #[serde(default)]
    pub data: Option<String>,

    #[serde(default)]
    pub instructions: Option<String>,

    #[serde(rename = "type")]
    pub prompt_type: PromptType,

    #[serde(default)]
    pub source: PromptSource,

    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl PromptFragment {
    pub fn new(name: impl Into<String>, prompt_type: PromptType, source: PromptSource) -> Self {
        Self {
            name: name.into(),
            data: None,
            instructions: None,
            prompt_type,
            source,
            is_enabled: true,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new("System Prompt", PromptType::System, PromptSource::Static).with_data(text)
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }

    /// Non-empty data text.
    pub fn data_text(&self) -> Option<&str> {
        self.data.as_deref().filter(|data| !data.trim().is_empty())
    }
}

/// Validates a prompt fragment list as stored on a prompt action.
pub fn validate_fragments(fragments: &[PromptFragment]) -> Result<(), ValidationError> {
    if fragments.is_empty() {
        return Err(ValidationError::empty_field("llm_prompts"));
    }

    let mut system_count = 0;
    let mut history_count = 0;
    for fragment in fragments {
        if fragment.name.trim().is_empty() {
            return Err(ValidationError::empty_field("llm_prompts.name"));
        }
        if fragment.prompt_type == PromptType::System {
            system_count += 1;
            if fragment.source != PromptSource::Static {
                return Err(ValidationError::invalid_format(
                    "llm_prompts.source",
                    "system prompt must have static source",
                ));
            }
        }
        if fragment.source == PromptSource::History {
            history_count += 1;
        }
        let needs_data = matches!(
            fragment.source,
            PromptSource::Static | PromptSource::Slot | PromptSource::Action
        );
        if needs_data && fragment.data_text().is_none() {
            return Err(ValidationError::invalid_format(
                "llm_prompts.data",
                format!("data is required for {} prompt '{}'", source_label(fragment.source), fragment.name),
            ));
        }
    }

    if system_count != 1 {
        return Err(ValidationError::invalid_combination("exactly one system prompt is required"));
    }
    if history_count > 1 {
        return Err(ValidationError::invalid_combination("only one history source prompt is allowed"));
    }
    Ok(())
}

fn source_label(source: PromptSource) -> &'static str {
    match source {
        PromptSource::Static => "static",
        PromptSource::History => "history",
        PromptSource::BotContent => "bot_content",
        PromptSource::Slot => "slot",
        PromptSource::Action => "action",
    }
}

/// Retrieval and caching settings of a prompt action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptSettings {
    pub num_bot_responses: usize,
    pub top_results: usize,
    pub similarity_threshold: f64,
    pub enable_response_cache: bool,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            num_bot_responses: 5,
            top_results: 10,
            similarity_threshold: 0.70,
            enable_response_cache: false,
        }
    }
}
