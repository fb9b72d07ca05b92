//! Error types for the configuration system

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to load properties to configure CAS client (tried: {})", display_paths(.attempted))]
    LoadFailed { attempted: Vec<PathBuf> },

    #[error("Configuration already initialized for {0}")]
    AlreadyInitialized(String),

    #[error("Configuration not initialized for {0}")]
    NotInitialized(String),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no locations".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
