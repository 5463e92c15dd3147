//! Error types for the task store and the HTTP API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors produced by [`crate::store::TaskStore`].
///
/// Every variant is raised before the collection is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Task not found: {0}")]
    NotFound(String),
}

impl StoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        StoreError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    MissingRequiredField,
    InvalidFieldValue,
    InvalidBody,
    InvalidQuery,

    // Not found errors
    TaskNotFound,
    RouteNotFound,

    // Internal errors
    InternalError,
}

impl ErrorCode {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorCode::MissingRequiredField
            | ErrorCode::InvalidFieldValue
            | ErrorCode::InvalidBody
            | ErrorCode::InvalidQuery => StatusCode::BAD_REQUEST,
            ErrorCode::TaskNotFound | ErrorCode::RouteNotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Structured error returned by HTTP handlers.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    #[serde(rename = "error")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{} is required", field),
        )
        .with_field(field)
    }

    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn invalid_body(reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidBody,
            format!("Invalid request body: {}", reason),
        )
    }

    pub fn invalid_query(reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidQuery,
            format!("Invalid query string: {}", reason),
        )
    }

    pub fn task_not_found(task_id: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {}", task_id),
        )
    }

    pub fn route_not_found(path: &str) -> Self {
        Self::new(ErrorCode::RouteNotFound, format!("No route for {}", path))
    }

    /// Generic 500; the underlying cause is logged, never returned.
    pub fn internal() -> Self {
        Self::new(ErrorCode::InternalError, "Internal server error")
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingField(field) => ApiError::missing_field(field),
            StoreError::Validation { field, message } => ApiError::invalid_value(field, message),
            StoreError::NotFound(id) => ApiError::task_not_found(&id),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Result type for HTTP handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
