//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PAPER_DIALOGUE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use paper_dialogue::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Default model: {}", config.llm.default_model);
//! ```

mod error;
mod llm;
mod logging;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use llm::LlmConfig;
pub use logging::LoggingConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration apart from the API key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// LLM gateway configuration (endpoint, models, retries)
    #[serde(default)]
    pub llm: LlmConfig,

    /// Logging configuration (filter, format)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Action log storage
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PAPER_DIALOGUE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PAPER_DIALOGUE__LLM__MAX_MODEL=gpt-4` -> `llm.max_model = gpt-4`
    /// - `PAPER_DIALOGUE__STORAGE__ACTION_LOG_PATH=...` -> `storage.action_log_path = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAPER_DIALOGUE")
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
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.llm.validate()?;
        self.logging.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}
