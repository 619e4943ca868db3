//! Configuration error types

use thiserror::Error;

use crate::domain::models::ModelEngine;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout (must be 1-600 seconds)")]
    InvalidTimeout,

    #[error("Model ceiling {ceiling} ranks below default model {default}")]
    CeilingBelowDefault {
        default: ModelEngine,
        ceiling: ModelEngine,
    },

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}
