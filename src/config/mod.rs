//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `ACTION_SERVER_` prefix
//! and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use kairon_action_server::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod dispatch;
mod error;
mod evaluator;
mod llm;
mod server;
mod storage;

pub use dispatch::DispatchConfig;
pub use error::{ConfigError, ValidationError};
pub use evaluator::EvaluatorConfig;
pub use llm::LlmConfig;
pub use server::{Environment, LogFormat, ServerConfig};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a runnable
/// development server backed by in-memory adapters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion client (OpenAI)
    #[serde(default)]
    pub llm: LlmConfig,

    /// Remote script evaluator
    #[serde(default)]
    pub evaluator: EvaluatorConfig,

    /// Action catalog and audit log locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Nested invocation limits and failure fallback
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ACTION_SERVER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ACTION_SERVER__SERVER__PORT=5055` -> `server.port = 5055`
    /// - `ACTION_SERVER__LLM__OPENAI_API_KEY=...` -> `llm.openai_api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ACTION_SERVER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first section that fails.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.llm.validate()?;
        self.evaluator.validate()?;
        self.storage.validate()?;
        self.dispatch.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "ACTION_SERVER__SERVER__PORT",
        "ACTION_SERVER__SERVER__ENVIRONMENT",
        "ACTION_SERVER__LLM__OPENAI_API_KEY",
        "ACTION_SERVER__LLM__REQUEST_SHAPE",
        "ACTION_SERVER__EVALUATOR__URL",
        "ACTION_SERVER__STORAGE__ACTIONS_FILE",
        "ACTION_SERVER__DISPATCH__MAX_NESTING_DEPTH",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.port, 5055);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.dispatch.max_nesting_depth, 3);
        assert!(config.storage.actions_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_nested_sections() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("ACTION_SERVER__SERVER__PORT", "3000");
        env::set_var("ACTION_SERVER__LLM__OPENAI_API_KEY", "sk-test");
        env::set_var("ACTION_SERVER__LLM__REQUEST_SHAPE", "legacy");
        env::set_var("ACTION_SERVER__EVALUATOR__URL", "http://localhost:8080/evaluate");
        env::set_var("ACTION_SERVER__STORAGE__ACTIONS_FILE", "/etc/actions.yml");
        env::set_var("ACTION_SERVER__DISPATCH__MAX_NESTING_DEPTH", "5");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.llm.has_openai());
        assert_eq!(config.llm.request_shape, crate::ports::RequestShape::Legacy);
        assert_eq!(config.evaluator.url.as_deref(), Some("http://localhost:8080/evaluate"));
        assert_eq!(
            config.storage.actions_file.as_deref(),
            Some(std::path::Path::new("/etc/actions.yml"))
        );
        assert_eq!(config.dispatch.max_nesting_depth, 5);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("ACTION_SERVER__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_validate_reports_first_failing_section() {
        let mut config = AppConfig::default();
        config.dispatch.max_nesting_depth = 0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidNestingDepth));
    }
}
