//! LLM completion configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::ports::RequestShape;

/// Completion client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// OpenAI API key. Without one the server answers with a mock client.
    pub openai_api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used when an action does not name one
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub request_shape: RequestShape,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate LLM configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("llm.base_url"));
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("llm.model"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("llm"));
        }
        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            request_shape: RequestShape::default(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.request_shape, RequestShape::Chat);
        assert!(!config.has_openai());
    }

    #[test]
    fn test_timeout_duration() {
        let config = LlmConfig {
            timeout_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_empty_key_is_not_configured() {
        let config = LlmConfig {
            openai_api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(!config.has_openai());
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let config = LlmConfig {
            base_url: "api.openai.com".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidUrl("llm.base_url")));
    }

    #[test]
    fn test_validation_valid_config() {
        let config = LlmConfig {
            openai_api_key: Some("sk-xxx".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
