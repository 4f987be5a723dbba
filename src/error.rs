// src/error.rs
// Error taxonomy for the analysis pipeline

use std::time::Duration;
use thiserror::Error;

/// Failures of the single upstream model call.
///
/// These never reach the caller: the pipeline answers with the mock report instead.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream transport error: {0}")]
    Transport(String),

    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

/// Main error type for the vibe pipeline
#[derive(Error, Debug)]
pub enum VibeError {
    #[error("{0}")]
    Validation(String),

    #[error("rate limit exceeded, retry in {}s", retry_after.as_secs().max(1))]
    RateLimited { retry_after: Duration },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Result using VibeError
pub type Result<T> = std::result::Result<T, VibeError>;

impl VibeError {
    pub fn validation(message: impl Into<String>) -> Self {
        VibeError::Validation(message.into())
    }
}
