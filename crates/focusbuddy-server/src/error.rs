use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use focusbuddy_core::CoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Everything a handler can fail with. Rendered as `{success: false, error}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Detail is logged, never returned.
    #[error("Internal server error")]
    Internal(#[source] CoreError),

    /// A blocking storage task panicked or was cancelled.
    #[error("Internal server error")]
    Task(#[from] tokio::task::JoinError),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::BadRequest(e.to_string()),
            CoreError::Signature(e) => ApiError::BadRequest(e.to_string()),
            CoreError::Billing(e) => ApiError::BadRequest(e.to_string()),
            CoreError::Json(_) => ApiError::BadRequest("Invalid JSON body".into()),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(source) => {
                error!(error = %source, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Task(source) => {
                error!(error = %source, "storage task failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}

/// Errors that stop the server from starting or running.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
