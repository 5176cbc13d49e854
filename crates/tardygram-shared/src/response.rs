//! Error body returned by every failing endpoint.

use serde::{Deserialize, Serialize};

/// `{ "status": 500, "message": "jwt must be provided" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The HTTP status code, repeated in the body.
    pub status: u16,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }
}
