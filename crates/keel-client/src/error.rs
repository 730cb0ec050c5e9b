//! Consumer-side error type.

use thiserror::Error;

/// Errors surfaced by the keel client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a structured error envelope.
    #[error("API error {code} ({status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        retryable: bool,
    },

    /// The request never produced a response (connect failure, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A 2xx response body did not match the expected schema.
    #[error("Response decode error: {0}")]
    Decode(String),
}

impl ClientError {
    /// Wire code of an API error, if this is one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}
