//! Logging configuration

use serde::Deserialize;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use super::error::ValidationError;

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `paper_dialogue=debug`
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Parses the filter directive.
    pub fn env_filter(&self) -> Result<EnvFilter, ValidationError> {
        EnvFilter::try_new(&self.level).map_err(|e| ValidationError::InvalidLogLevel(e.to_string()))
    }

    /// Validate logging configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.env_filter().map(|_| ())
    }

    /// Installs the global tracing subscriber.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init_tracing(&self) -> Result<(), ValidationError> {
        let filter = self.env_filter()?;
        let registry = tracing_subscriber::registry().with(filter);
        let result = if self.json {
            registry.with(tracing_subscriber::fmt::layer().json()).try_init()
        } else {
            registry.with(tracing_subscriber::fmt::layer()).try_init()
        };
        if result.is_err() {
            tracing::debug!("Tracing subscriber already installed");
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_module_directives_are_valid() {
        let config = LoggingConfig {
            level: "paper_dialogue=debug,reqwest=warn".to_string(),
            json: true,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_directive_rejected() {
        let config = LoggingConfig {
            level: "paper_dialogue=loudest".to_string(),
            json: false,
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidLogLevel(_))));
    }
}
