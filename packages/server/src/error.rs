//! Request-time and startup-time error types for the server.
//!
//! [`DispatchError`] serialises to the [`ErrorResponse`] envelope and maps to
//! the matching HTTP status code. Handler-reported failures and unexpected
//! faults (panics, unencodable results) both collapse into
//! [`DispatchError::Handler`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use remoting::{codes, ContractError, DocsError, ErrorResponse};

/// A failed call. Converts directly to an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// No declared operation is routed at this path.
    #[error("no operation is routed at {0}")]
    UnknownRoute(String),

    /// The payload is not valid JSON or does not fit the input shape.
    #[error("malformed payload for {operation}: {reason}")]
    MalformedPayload { operation: String, reason: String },

    /// The handler reported a failure, panicked, or returned an unencodable value.
    #[error("{0}")]
    Handler(String),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::UnknownRoute(_) => StatusCode::NOT_FOUND,
            DispatchError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            DispatchError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::UnknownRoute(_) => codes::UNKNOWN_ROUTE,
            DispatchError::MalformedPayload { .. } => codes::MALFORMED_PAYLOAD,
            DispatchError::Handler(_) => codes::HANDLER_ERROR,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse::new(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}

/// A failure reported by a bound handler.
///
/// Only the message crosses the wire. Domain code usually converts its own
/// error type with `HandlerError::new(err.to_string())` or a `From` impl.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Reasons a server refuses to start.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Docs(#[from] DocsError),
}
