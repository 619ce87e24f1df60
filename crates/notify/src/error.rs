//! Error types for the notification system.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when sending a message to a channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The transport did not answer in time
    #[error("Timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The API answered with a non-success HTTP status
    #[error("{channel} returned {status}: {body}")]
    Status {
        channel: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The API answered 2xx but reported an error in its payload
    #[error("{channel} rejected the message: {reason}")]
    Api {
        channel: &'static str,
        reason: String,
    },

    /// Channel is not configured
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The external helper executable could not be found
    #[error("Helper executable not found: {0}")]
    HelperMissing(String),

    /// The external helper exited with a non-zero status
    #[error("Helper exited with {}: {stderr}", code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    HelperFailed { code: Option<i32>, stderr: String },

    /// Other I/O failure while running a helper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChannelError {
    /// Map a reqwest error, surfacing timeouts as [`ChannelError::Timeout`].
    pub(crate) fn from_request(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Http(err)
        }
    }
}

/// Errors raised while resolving channel configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The channel selector names no known channel
    #[error("Unknown notification channel '{0}' (expected telegram, whatsapp, openclaw, serverchan or both)")]
    UnknownChannel(String),
}
