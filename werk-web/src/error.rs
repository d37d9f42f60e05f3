//! Error types for werk-web
//!
//! Handlers return [`ApiResult`]; every error renders as an HTML page with a
//! matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ui::error_page;
use crate::catalog::CatalogError;
use crate::sync::SyncError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Caller is not the owner (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Common error: {0}")]
    Common(#[from] werk_common::Error),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ApiError::Catalog(err) => catalog_status(err, err.to_string()),
            ApiError::Sync(SyncError::SyncFailed { source, .. }) => {
                catalog_status(source, self.to_string())
            }
            ApiError::Sync(SyncError::ValidationFailed(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            ApiError::Sync(SyncError::Store(err)) | ApiError::Common(err) => common_status(err),
        }
    }
}

fn catalog_status(err: &CatalogError, message: String) -> (StatusCode, String) {
    match err {
        CatalogError::NotFound(_) => (StatusCode::NOT_FOUND, message),
        CatalogError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, message),
        CatalogError::RemoteUnavailable(_) | CatalogError::MalformedResponse(_) => {
            (StatusCode::BAD_GATEWAY, message)
        }
    }
}

fn common_status(err: &werk_common::Error) -> (StatusCode, String) {
    use werk_common::Error;
    match err {
        Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        // Store details stay in the log
        other => {
            tracing::error!("Request failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong on our side.".to_string(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::warn!(status = %status, "{}", self);
        }
        error_page(status, &message)
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
