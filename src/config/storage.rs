//! Action log storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Action log storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON-lines file holding the action log
    #[serde(default = "default_action_log_path")]
    pub action_log_path: PathBuf,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.action_log_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__ACTION_LOG_PATH"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            action_log_path: default_action_log_path(),
        }
    }
}

fn default_action_log_path() -> PathBuf {
    PathBuf::from("actions.jsonl")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.action_log_path, PathBuf::from("actions.jsonl"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_path_rejected() {
        let config = StorageConfig {
            action_log_path: PathBuf::new(),
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("STORAGE__ACTION_LOG_PATH"))
        );
    }
}
