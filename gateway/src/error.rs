//! Error kinds and their connection-level handling policy.
//!
//! The wire protocol has no explicit error event: the only channel for a
//! protocol-level failure to reach the client is TCP connection close. This
//! module just names the kinds so callers can log and count them uniformly.

use thiserror::Error;

/// Errors that can terminate or perturb a connection.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("frame error: {0}")]
    Frame(#[from] crate::frame::FrameError),

    #[error("event schema error: {0}")]
    EventSchema(String),

    #[error("worker error: {0}")]
    Worker(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid audio format: {0}")]
    InvalidAudioFormat(#[from] wyoming_speech::FormatError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Whether this error should close the current connection.
    ///
    /// `SessionStateViolation` and `TimeoutError` are deliberately absent
    /// here: they are handled inline by the session machines (log-and-ignore,
    /// log-and-continue) and never surface as a `GatewayError`.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, GatewayError::Validation(_))
    }
}
