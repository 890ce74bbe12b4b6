//! HTTP mapping for [`AuthError`].

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::error::AuthError;

impl AuthError {
    /// The HTTP status this error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated { .. }
            | Self::TokenExpired
            | Self::TokenNotYetValid
            | Self::TokenRevoked => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Storage { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message surfaced to the client.
    ///
    /// Token-state and server errors are flattened to generic text; the
    /// precise cause stays in the logs.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::TokenExpired | Self::TokenNotYetValid | Self::TokenRevoked => {
                "invalid token".to_string()
            }
            Self::Storage { .. } | Self::Internal { .. } => "internal server error".to_string(),
            Self::Unauthenticated { message }
            | Self::Forbidden { message }
            | Self::InvalidRequest { message }
            | Self::NotFound { message } => message.clone(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(category = %self.category(), error = %self, "request failed");
        }

        let body = Json(json!({
            "status": status.as_u16(),
            "success": false,
            "message": self.client_message(),
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}
