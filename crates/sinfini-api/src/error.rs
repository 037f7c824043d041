use axum::{
    Json,
    extract::multipart::MultipartError,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(anyhow::Error),

    #[error("Upload error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Multipart(e) => e.status(),
            ApiError::Storage(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Fault details go to the log, never to the client.
        let message = match &self {
            ApiError::Storage(e) => {
                error!("Storage error: {:#}", e);
                "Internal server error".to_string()
            }
            ApiError::Io(e) => {
                error!("IO error: {}", e);
                "Internal server error".to_string()
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            ApiError::Multipart(e) => e.body_text(),
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) => {
                msg.clone()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
