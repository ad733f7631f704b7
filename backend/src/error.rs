//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to appropriate HTTP responses.

use crate::withings::WithingsError;
use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use body_scan_shared::{ExportError, ValidationError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] WithingsError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<&'static str>) {
        match self {
            ApiError::Validation(err) => {
                let (code, field) = match err {
                    ValidationError::MissingAccessToken => ("MISSING_ACCESS_TOKEN", Some("at")),
                    ValidationError::MissingRefreshToken => {
                        ("MISSING_REFRESH_TOKEN", Some("refresh_token"))
                    }
                    ValidationError::InvalidToken => ("INVALID_TOKEN", None),
                    ValidationError::InvalidDate(_) => ("VALIDATION_ERROR", Some("date")),
                    ValidationError::UnknownRange(_) => ("VALIDATION_ERROR", Some("range")),
                    _ => ("VALIDATION_ERROR", None),
                };
                (StatusCode::BAD_REQUEST, code, err.to_string(), field)
            }
            ApiError::Upstream(err) => match err {
                WithingsError::Unauthorized(_) => {
                    (StatusCode::UNAUTHORIZED, "UPSTREAM_UNAUTHORIZED", err.to_string(), None)
                }
                WithingsError::Transport(_) => {
                    warn!("Withings unreachable: {}", err);
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_UNAVAILABLE",
                        "Withings could not be reached".to_string(),
                        None,
                    )
                }
                _ => {
                    warn!("Withings error: {}", err);
                    (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string(), None)
                }
            },
            ApiError::Export(err) => {
                error!("Export error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_ERROR",
                    "Export could not be generated".to_string(),
                    None,
                )
            }
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = self.parts();

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field: field.map(str::to_string),
            },
        });

        (status, body).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(ValidationError::InvalidParameter(rejection.body_text()))
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
