//! The response envelope shared by all auth endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Uniform response envelope: `{status, success, message, data}`.
#[derive(Debug, Serialize)]
pub struct HttpResponse<T: Serialize> {
    /// HTTP status code, repeated in the body.
    pub status: u16,
    /// Whether the request succeeded.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// Payload, omitted when there is none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> HttpResponse<T> {
    /// A 200 response with a payload.
    #[must_use]
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    /// A 201 response with a payload.
    #[must_use]
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, Some(data))
    }

    /// A response with an explicit status.
    #[must_use]
    pub fn with_status(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: status.as_u16(),
            success: status.is_success(),
            message: message.into(),
            data,
        }
    }
}

impl HttpResponse<()> {
    /// A 200 response without a payload.
    #[must_use]
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message, None)
    }
}

impl<T: Serialize> IntoResponse for HttpResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
