//! Error types for Credit Throttle
//!
//! `ApiError` is the single error kind surfaced by the Windsurf client.
//! `AppError` wraps it (and CSV import failures) for the admin HTTP API.

use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::caps::import::ImportError;

/// Errors raised by the Windsurf usage API client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("WINDSURF_SERVICE_KEY not found in environment")]
    MissingCredential,

    /// Caller supplied no target/update, or more than one
    #[error("{0}")]
    InvalidRequest(String),

    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },

    #[error("Error {operation}: {detail}")]
    Transport {
        operation: &'static str,
        detail: String,
    },

    #[error("Error {operation}: invalid response body: {detail}")]
    Decode {
        operation: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest(message.into())
    }

    /// Build a transport error keeping the whole cause chain in the message
    pub(crate) fn transport(operation: &'static str, err: &reqwest::Error) -> Self {
        ApiError::Transport {
            operation,
            detail: error_chain(err),
        }
    }

    /// True for errors detected before any network activity
    pub fn is_caller_error(&self) -> bool {
        matches!(self, ApiError::MissingCredential | ApiError::InvalidRequest(_))
    }
}

/// Join an error and its sources into one line, skipping repeated text
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("{0}")]
    BadRequest(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error details
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Api(ApiError::MissingCredential) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MISSING_CREDENTIAL")
            }
            AppError::Api(ApiError::InvalidRequest(_)) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Api(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            AppError::Import(_) => (StatusCode::BAD_REQUEST, "INVALID_CSV"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for the admin API
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for client calls
pub type ApiResult<T> = Result<T, ApiError>;
