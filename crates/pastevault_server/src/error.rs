//! HTTP error mapping for API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pastevault_core::AppError;
use serde_json::json;

const DEFAULT_FAILURE_MESSAGE: &str = "Internal server error";

/// API-facing error wrapper that converts core errors into JSON responses.
///
/// Client errors carry their own message; server-side failures answer with a
/// fixed per-route message and are logged once, by kind.
#[derive(Debug)]
pub struct HttpError {
    error: AppError,
    failure_message: &'static str,
}

impl HttpError {
    /// Wrap `error`, answering 500s with `failure_message`.
    pub fn new(error: AppError, failure_message: &'static str) -> Self {
        Self {
            error,
            failure_message,
        }
    }

    /// Whether this layer logs the failure.
    ///
    /// Client errors are not logged; corrupt rows are already logged with
    /// their paste id by the store.
    fn logs_here(&self) -> bool {
        !matches!(
            self.error,
            AppError::Validation(_) | AppError::NotFound | AppError::CorruptEntry { .. }
        )
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self.error {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for HttpError {
    fn from(error: AppError) -> Self {
        Self::new(error, DEFAULT_FAILURE_MESSAGE)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.logs_here() {
            tracing::error!(kind = self.error.kind(), "Request failed: {}", self.error);
        }
        let message = match self.error {
            AppError::Validation(message) => message,
            AppError::NotFound => "Paste not found".to_string(),
            _ => self.failure_message.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
