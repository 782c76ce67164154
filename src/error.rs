//! Error types and handling for spotsync
//!
//! This module defines the error types used throughout the application.
//! Fetch-stage variants abort a whole sync run; `Store` errors only affect
//! the price point being reconciled.

use thiserror::Error;

/// Result type alias for spotsync operations
pub type Result<T> = std::result::Result<T, SpotSyncError>;

/// Main error type for spotsync
#[derive(Debug, Error)]
pub enum SpotSyncError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport-level failures talking to the price feed
    #[error("Network error: {message}")]
    Network { message: String },

    /// Request exceeded the configured timeout
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Malformed feed payload or unparseable timestamp
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// The feed answered with `error: true`
    #[error("Feed reported error: {message}")]
    FeedReported { message: String },

    /// Price store lookup or save failures
    #[error("Store error: {message}")]
    Store { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Status display errors
    #[error("Display error: {message}")]
    Display { message: String },

    /// Job scheduler errors
    #[error("Scheduler error: {message}")]
    Scheduler { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

}

impl SpotSyncError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        SpotSyncError::Config {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        SpotSyncError::Network {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        SpotSyncError::Timeout {
            message: message.into(),
        }
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        SpotSyncError::Decode {
            message: message.into(),
        }
    }

    /// Create a new feed-reported error
    pub fn feed_reported<S: Into<String>>(message: S) -> Self {
        SpotSyncError::FeedReported {
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        SpotSyncError::Store {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        SpotSyncError::Io {
            message: message.into(),
        }
    }

    /// Create a new display error
    pub fn display<S: Into<String>>(message: S) -> Self {
        SpotSyncError::Display {
            message: message.into(),
        }
    }

    /// Create a new scheduler error
    pub fn scheduler<S: Into<String>>(message: S) -> Self {
        SpotSyncError::Scheduler {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        SpotSyncError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error was produced while fetching or decoding the feed
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            SpotSyncError::Network { .. }
                | SpotSyncError::Timeout { .. }
                | SpotSyncError::Decode { .. }
                | SpotSyncError::FeedReported { .. }
        )
    }
}

impl From<std::io::Error> for SpotSyncError {
    fn from(err: std::io::Error) -> Self {
        SpotSyncError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for SpotSyncError {
    fn from(err: serde_yaml::Error) -> Self {
        SpotSyncError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SpotSyncError {
    fn from(err: serde_json::Error) -> Self {
        SpotSyncError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for SpotSyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SpotSyncError::timeout(err.to_string())
        } else if err.is_decode() {
            SpotSyncError::decode(err.to_string())
        } else {
            SpotSyncError::network(err.to_string())
        }
    }
}

impl From<chrono::ParseError> for SpotSyncError {
    fn from(err: chrono::ParseError) -> Self {
        SpotSyncError::Validation {
            field: "datetime".to_string(),
            message: err.to_string(),
        }
    }
}
