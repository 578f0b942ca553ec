use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use models::errors::ModelError;
use service::ServiceError;
use thiserror::Error;
use tracing::error;

use crate::views;

/// Error surfaced to a browser as a small HTML page.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => Self::bad_request(msg),
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Student not found"),
            other => {
                error!(error = %other, "storage failure while handling request");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Error saving student data")
            }
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(msg) => Self::bad_request(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Html(views::error_page(self.status, &self.message))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
