//! Shared error response envelope for Grid Bot services
//!
//! Every HTTP error body produced by a service goes through [`ErrorResponse`]
//! so clients can rely on one shape regardless of which handler failed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Machine-readable error codes
pub mod error_codes {
    pub const MISSING_CREDENTIALS: &str = "MISSING_CREDENTIALS";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const WALLET_MISMATCH: &str = "WALLET_MISMATCH";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Error categories
pub mod error_types {
    pub const AUTHENTICATION_ERROR: &str = "authentication_error";
    pub const AUTHORIZATION_ERROR: &str = "authorization_error";
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const SERVER_ERROR: &str = "server_error";
}

/// JSON body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Reason phrase for the status ("Bad Request", ...)
    pub error: String,
    pub message: String,
    pub status: u16,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            timestamp: Utc::now(),
        }
    }
}
