//! Error types for the discovery system.

use thiserror::Error;

/// Error type for discovery operations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Socket or HTTP failure
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Malformed SSDP response or device description
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Operation timed out waiting for responses
    #[error("Operation timed out")]
    Timeout,
    /// The responder is not a Sonos speaker
    #[error("Invalid device: {0}")]
    InvalidDevice(String),
}

impl From<reqwest::Error> for DiscoveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DiscoveryError::Timeout
        } else {
            DiscoveryError::NetworkError(err.to_string())
        }
    }
}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
