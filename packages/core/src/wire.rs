//! Wire-level error envelope.

use serde::{Deserialize, Serialize};

/// The JSON body returned for every failed call.
///
/// ```json
/// { "error": "item x not found", "code": "handler_error" }
/// ```
///
/// The message shape is the same for all failures; the HTTP status and
/// `code` tell them apart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human-readable description of the problem.
    pub error: String,

    /// Machine-readable error code.
    ///
    /// | `code` | HTTP status |
    /// |--------|------------|
    /// | `malformed_payload` | 400 |
    /// | `unknown_route` | 404 |
    /// | `handler_error` | 500 |
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
        }
    }
}

/// Well-known error codes.
pub mod codes {
    pub const MALFORMED_PAYLOAD: &str = "malformed_payload";
    pub const UNKNOWN_ROUTE: &str = "unknown_route";
    pub const HANDLER_ERROR: &str = "handler_error";
}
