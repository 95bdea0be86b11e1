//! Script evaluator configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Remote script evaluator endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluatorConfig {
    /// Evaluator URL. Without one, script-mode expressions fail at evaluation time.
    pub url: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl EvaluatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidUrl("evaluator.url"));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("evaluator"));
        }
        Ok(())
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EvaluatorConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = EvaluatorConfig {
            url: Some("localhost:8080/evaluate".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidUrl("evaluator.url")));
    }
}
