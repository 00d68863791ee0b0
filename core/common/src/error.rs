//! Common error types for VaultDeck.

use thiserror::Error;

/// Error code reported for transport-level failures.
///
/// The backend reserves positive codes for application errors and 0 for
/// success; network and envelope failures are surfaced to consumers under
/// this sentinel.
pub const TRANSPORT_ERROR_CODE: i32 = -1;

/// Top-level error type for VaultDeck operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Backend-reported application error (`code != 0` in the envelope).
    #[error("API error {code}: {message}")]
    Api { code: i32, message: String },

    /// Network or connection failure before a valid envelope was received.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body was not a valid envelope.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid input provided by the caller.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Error code as surfaced to the presentation layer.
    ///
    /// Application errors keep the backend code; everything else collapses
    /// to [`TRANSPORT_ERROR_CODE`].
    pub fn code(&self) -> i32 {
        match self {
            Error::Api { code, .. } => *code,
            _ => TRANSPORT_ERROR_CODE,
        }
    }

    /// Human-readable message as surfaced to the presentation layer.
    pub fn message(&self) -> String {
        match self {
            Error::Api { message, .. } => message.clone(),
            Error::Network(msg) => msg.clone(),
            Error::InvalidResponse(msg) => msg.clone(),
            Error::InvalidInput(msg) => msg.clone(),
        }
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_backend_code() {
        let err = Error::Api {
            code: 5,
            message: "invalid password".to_string(),
        };
        assert_eq!(err.code(), 5);
        assert_eq!(err.message(), "invalid password");
    }

    #[test]
    fn test_network_error_normalized_to_sentinel() {
        let err = Error::Network("connection refused".to_string());
        assert_eq!(err.code(), TRANSPORT_ERROR_CODE);
        assert_eq!(err.message(), "connection refused");
    }

    #[test]
    fn test_invalid_response_normalized_to_sentinel() {
        let err = Error::InvalidResponse("expected value at line 1".to_string());
        assert_eq!(err.code(), TRANSPORT_ERROR_CODE);
    }
}
