//! Error types for DocRank services
//!
//! Provides the error taxonomy shared by the rerank service:
//! - Distinct error types for client input, processing and internal faults
//! - HTTP status code mapping
//! - Structured `{ "detail": ... }` error responses
//! - Error codes for client handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Message returned to clients for every server-side failure
pub const GENERIC_SERVER_ERROR: &str = "Internal error while processing the request";

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidFormat,

    // Processing errors (8xxx)
    ProcessingError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidFormat => 1003,
            ErrorCode::ProcessingError => 8001,
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
        }
    }

    /// Wire name, also used as a metrics label
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::ProcessingError => "PROCESSING_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or out-of-bounds request
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Request body could not be decoded
    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    /// Unexpected failure while transforming validated input
    #[error("Processing error: {message}")]
    Processing { message: String },

    /// Resource exhaustion or an unrecoverable fault
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
        }
    }

    /// Flatten request validation failures into one client-facing message.
    ///
    /// Fields are visited in name order and list items in index order, so
    /// the same input always yields the same detail. Violations inside a
    /// list item are prefixed with `field[index]: `.
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_messages(errors, "", &mut messages);
        AppError::Validation {
            message: messages.join("; "),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        AppError::Processing {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::Processing { .. } => ErrorCode::ProcessingError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } | AppError::InvalidFormat { .. } => {
                StatusCode::BAD_REQUEST
            }

            // 500 Internal Server Error
            AppError::Processing { .. }
            | AppError::Internal { .. }
            | AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Message safe to return to the caller.
    ///
    /// Client errors echo their reason; server errors never leak internals.
    pub fn detail(&self) -> String {
        match self {
            AppError::Validation { message } | AppError::InvalidFormat { message } => {
                message.clone()
            }
            _ => GENERIC_SERVER_ERROR.to_string(),
        }
    }
}

/// Error body returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub code: ErrorCode,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            detail: self.detail(),
            code,
        };

        (status, Json(body)).into_response()
    }
}

fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        match kind {
            ValidationErrorsKind::Field(errors) => {
                for error in errors {
                    let message = match &error.message {
                        Some(message) => message.to_string(),
                        None => format!("{field}: {}", error.code),
                    };
                    out.push(format!("{prefix}{message}"));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_messages(nested, &format!("{prefix}{field}: "), out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(nested, &format!("{prefix}{field}[{index}]: "), out);
                }
            }
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}
