//! HTTP error mapping

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::models::StatusResponse;
use crate::error::DeskError;

pub const INVALID_JSON: &str = "Invalid JSON body";
pub const ROUTE_NOT_FOUND: &str = "Route not found";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

/// A failed request, rendered as `{ok: false, message}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Map a desk error for a given operation
    ///
    /// Validation errors keep their own message. Storage errors become a 500
    /// with `server_message`; the detail was already logged by the service.
    pub fn from_desk(error: DeskError, server_message: &str) -> Self {
        match error {
            DeskError::Validation(message) => Self::bad_request(message),
            DeskError::Storage(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, server_message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
        Self::bad_request(INVALID_JSON)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(StatusResponse::error(self.message))).into_response()
    }
}
