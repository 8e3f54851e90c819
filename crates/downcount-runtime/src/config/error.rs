//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
///
/// All of these are recoverable: the caller keeps the previous good
/// configuration in use and reports the error.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found at the specified path.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Failed to read the configuration source.
    #[error("Failed to read configuration: {0}")]
    Read(#[from] std::io::Error),

    /// YAML syntax error; the parser reports line and column.
    #[error("Malformed configuration document: {0}")]
    MalformedDocument(#[from] serde_yaml::Error),

    /// A key exists but its value cannot be coerced to the expected type.
    /// The message carries the offending key path from the deserializer.
    #[error("Invalid value type: {0}")]
    InvalidValueType(String),

    /// Extraction from layered sources failed.
    #[error("Failed to extract configuration: {0}")]
    Extract(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {message}")]
    Validation { message: String },

    /// Missing required field.
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },
}

impl ConfigError {
    /// Creates a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid value type error.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValueType(message.into())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
