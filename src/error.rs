// src/error.rs

//! Unified error handling for the notifier.

use std::fmt;

use thiserror::Error;

/// Result type alias for notifier operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The outage listing no longer has the expected table shape.
    #[error("Listing format changed: {0}")]
    FormatChanged(String),

    /// Object storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Inbound webhook payload could not be decoded
    #[error("Webhook error: {0}")]
    Webhook(String),
}

impl AppError {
    /// Create a listing format error.
    pub fn format_changed(message: impl Into<String>) -> Self {
        Self::FormatChanged(message.into())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl fmt::Display) -> Self {
        Self::Storage(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a webhook payload error.
    pub fn webhook(message: impl fmt::Display) -> Self {
        Self::Webhook(message.to_string())
    }

    /// Whether this error means the upstream listing changed shape.
    pub fn is_format_changed(&self) -> bool {
        matches!(self, Self::FormatChanged(_))
    }
}
