//! HTTP error responses.
//!
//! Every failure leaves the server as `{ "error": message }` with a status
//! matching the [`Error`] variant. Validation failures also list each
//! problem under `details`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::error::Error;

/// An [`Error`] on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    /// Status code for the wrapped error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::InvalidPassword | Error::InvalidAdminPassword => StatusCode::UNAUTHORIZED,
            Error::AdminDisabled => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::invalid(format!(
            "Invalid request data: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self.0 {
            Error::Validation { problems } => json!({
                "error": self.0.to_string(),
                "details": problems,
            }),
            err if status == StatusCode::INTERNAL_SERVER_ERROR => {
                // Internals stay in the log.
                error!("Request failed: {}", err);
                json!({ "error": "Internal server error" })
            }
            err => json!({ "error": err.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
