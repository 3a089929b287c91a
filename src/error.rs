//! Error types for media-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (task lifecycle, external fetch tool)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "temp_dir")
        key: Option<String>,
    },

    /// Malformed task-creation input; no task is created
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown or already cleaned-up task identifier
    #[error("task {0} not found")]
    TaskNotFound(String),

    /// Shutdown in progress - not accepting new tasks
    #[error("shutdown in progress: not accepting new tasks")]
    ShuttingDown,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Errors raised by one invocation of the external fetch tool
#[derive(Debug, Error)]
pub enum FetchError {
    /// The tool could not be started at all
    #[error("failed to execute {program}: {reason}")]
    Spawn {
        /// The executable that failed to start
        program: String,
        /// The underlying OS error
        reason: String,
    },

    /// The tool exited with a non-zero status
    #[error("fetch tool failed ({}): {diagnostics}", exit_label(.exit_code))]
    FetchFailed {
        /// Process exit code (None when terminated by a signal)
        exit_code: Option<i32>,
        /// The tool's diagnostic output (stderr, or stdout when stderr is empty)
        diagnostics: String,
    },

    /// The tool exited successfully but no file matching the temp prefix was found
    #[error("fetch tool produced no output file for prefix {prefix}")]
    OutputMissing {
        /// The temporary path prefix the tool was told to write to
        prefix: PathBuf,
    },

    /// The secondary title lookup failed (always swallowed by the fetcher)
    #[error("title lookup failed: {0}")]
    TitleLookupFailed(String),
}

fn exit_label(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "task_not_found",
///     "message": "task 1f0c... not found",
///     "details": {
///       "task_id": "1f0c..."
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "task_not_found", "invalid_request")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::InvalidRequest(_) => 400,

            // 404 Not Found
            Error::TaskNotFound(_) => 404,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,

            // 500 Internal Server Error - Server-side issues
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidRequest(_) => "invalid_request",
            Error::TaskNotFound(_) => "task_not_found",
            Error::ShuttingDown => "shutting_down",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::TaskNotFound(task_id) => Some(serde_json::json!({
                "task_id": task_id,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
