use std::time::Duration;
use thiserror::Error;

/// LensCtl unified error type
#[derive(Error, Debug)]
pub enum LensError {
    #[error("Connection error: cannot open {endpoint}: {message}")]
    Connect { endpoint: String, message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Communication timeout after {0:?}")]
    Timeout(Duration),

    #[error("Unparseable response: {response:?}")]
    Parse { response: String },

    #[error("Session is closed")]
    Closed,

    #[error("Connection lost: {message}")]
    ConnectionLost { message: String },

    #[error("Transaction failed after reconnect: {message}")]
    Transaction { message: String },

    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl LensError {
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Whether this failure means the connection can no longer be trusted.
    ///
    /// Only these failures make a session tear down its transport and
    /// retry; a parse failure leaves a healthy connection alone.
    pub fn triggers_reconnect(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Transport { .. } | Self::Timeout(_) | Self::Network(_)
        )
    }
}

pub type LensResult<T> = Result<T, LensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_classification() {
        assert!(LensError::transport("broken pipe").triggers_reconnect());
        assert!(LensError::Timeout(Duration::from_secs(2)).triggers_reconnect());
        assert!(LensError::Connect {
            endpoint: "10.0.0.1:10001".to_string(),
            message: "refused".to_string(),
        }
        .triggers_reconnect());
        assert!(LensError::Network(std::io::ErrorKind::BrokenPipe.into()).triggers_reconnect());

        assert!(!LensError::Parse { response: String::new() }.triggers_reconnect());
        assert!(!LensError::Closed.triggers_reconnect());
        assert!(!LensError::InvalidInput("bad".to_string()).triggers_reconnect());
    }

    #[test]
    fn test_error_display() {
        let error = LensError::Connect {
            endpoint: "lens.local:10001".to_string(),
            message: "Connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Connection error: cannot open lens.local:10001: Connection refused"
        );
        assert_eq!(LensError::Closed.to_string(), "Session is closed");
    }
}
