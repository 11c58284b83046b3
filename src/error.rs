//! Error types for DocChat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for DocChat operations
///
/// The first five variants form the failure taxonomy seen by the chat
/// controller: transport failures, timeouts, upstream errors, validation
/// errors and document-host errors. The rest cover configuration, relay
/// startup and plumbing errors from the libraries underneath.
#[derive(Error, Debug)]
pub enum DocchatError {
    /// Network or TLS failure before any HTTP answer was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// Bounded wait exceeded
    #[error("Request timed out after {seconds} seconds")]
    Timeout {
        /// The timeout that was exceeded
        seconds: u64,
    },

    /// The model server (or relay) answered with a non-success status
    #[error("Upstream error {status}: {message}")]
    Upstream {
        /// HTTP status code returned upstream
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// Empty input or a missing required form field
    #[error("Validation error: {0}")]
    Validation(String),

    /// The document host rejected a read or write
    #[error("Document error: {0}")]
    HostIntegration(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Relay startup or forwarding errors
    #[error("Relay error: {0}")]
    Relay(String),

    /// Chat session bookkeeping errors
    #[error("Session error: {0}")]
    Session(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl DocchatError {
    /// Status code associated with a network failure
    ///
    /// Timeouts report `0`, matching how the relay client distinguishes an
    /// abandoned request from one the server answered.
    ///
    /// # Examples
    ///
    /// ```
    /// use docchat::error::DocchatError;
    ///
    /// assert_eq!(DocchatError::Timeout { seconds: 30 }.status_code(), Some(0));
    /// assert_eq!(DocchatError::Validation("empty".into()).status_code(), None);
    /// ```
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Timeout { .. } => Some(0),
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify a `reqwest` failure into the transport taxonomy
    ///
    /// # Arguments
    ///
    /// * `err` - The error returned by `reqwest`
    /// * `timeout_seconds` - Timeout configured on the request, reported on expiry
    pub fn from_request(err: reqwest::Error, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                seconds: timeout_seconds,
            }
        } else if let Some(status) = err.status() {
            Self::Upstream {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            Self::Http(err)
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Result type alias for DocChat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
