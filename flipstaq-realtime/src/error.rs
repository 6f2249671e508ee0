//! Channel Error Types
//!
//! Error types for channel and transport operations.

use thiserror::Error;

/// Channel and transport error types.
#[derive(Error, Debug, Clone)]
pub enum ChannelError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Message send failed: {0}")]
    SendFailed(String),

    #[error("Message receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Channel not connected")]
    NotConnected,

    #[error("A tracked send is already in flight")]
    SendInFlight,
}

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Terminal outcome of a tracked send that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendFailure {
    /// The server answered with an error frame.
    Rejected(String),
    /// No response arrived before the send timeout.
    TimedOut,
}

impl std::fmt::Display for SendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendFailure::Rejected(reason) => write!(f, "rejected by server: {}", reason),
            SendFailure::TimedOut => write!(f, "timed out waiting for response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let errors = vec![
            (
                ChannelError::ConnectionFailed("refused".into()),
                "Connection failed: refused",
            ),
            (ChannelError::ConnectionClosed, "Connection closed"),
            (ChannelError::NotConnected, "Channel not connected"),
            (
                ChannelError::SendInFlight,
                "A tracked send is already in flight",
            ),
        ];

        for (error, expected) in errors {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_send_failure_display() {
        assert_eq!(
            SendFailure::Rejected("bad payload".into()).to_string(),
            "rejected by server: bad payload"
        );
        assert_eq!(
            SendFailure::TimedOut.to_string(),
            "timed out waiting for response"
        );
    }
}
