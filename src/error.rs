//! Error types for agency

use thiserror::Error;

/// Main error type for agency
#[derive(Error, Debug)]
pub enum AgencyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// Result type alias using `AgencyError`
pub type Result<T> = std::result::Result<T, AgencyError>;
