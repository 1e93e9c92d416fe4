//! Error types for the scoring client.
//!
//! Every failure is surfaced to the caller immediately. Nothing here is
//! retried.

use thiserror::Error;

/// Errors produced by the transport, scorer and normalizer.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connectivity failure, timeout, or a request that could not be built.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("Sentino API error {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A response arrived but is not the shape we expect.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Strict normalization was asked for an inventory the result lacks.
    #[error("Unknown inventory: {0}")]
    UnknownInventory(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// True for failures that happened at the HTTP layer (connectivity or status).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_) | ClientError::HttpStatus { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(ClientError::Transport("refused".to_string()).is_transport());
        assert!(ClientError::HttpStatus {
            status: 503,
            body: String::new()
        }
        .is_transport());
        assert!(!ClientError::MalformedResponse("x".to_string()).is_transport());
        assert!(!ClientError::UnknownInventory("hexaco".to_string()).is_transport());
    }

    #[test]
    fn test_status_message() {
        let err = ClientError::HttpStatus {
            status: 401,
            body: "Invalid token.".to_string(),
        };
        assert_eq!(err.to_string(), "Sentino API error 401: Invalid token.");
    }
}
