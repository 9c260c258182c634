//! Error types for image hosting.

use std::time::Duration;

/// Error from an image hosting operation.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// HTTP request failed (network error, DNS, TLS, etc).
    #[error("HTTP request failed")]
    Transport(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Response body did not match the hosting service's success format.
    ///
    /// Carries the raw body to aid diagnosis.
    #[error("unexpected response from image host: {body}")]
    UnexpectedResponse {
        /// Raw response body.
        body: String,
    },

    /// The bounded wait expired before the operation settled.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

impl HostError {
    /// True when this error came from the deadline race, not the host.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
