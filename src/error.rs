//! # Error Types
//!
//! Custom error types for the RC gamepad bridge using `thiserror`.

use thiserror::Error;

use crate::sink::SinkError;

/// Main error type for the bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration parsed but holds an out-of-range value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serial port errors
    #[error("Serial port error: {0}")]
    Serial(String),

    /// Output sink errors
    #[error("Output sink error: {0}")]
    Sink(#[from] SinkError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the bridge
pub type Result<T> = std::result::Result<T, BridgeError>;
