// Error handling module for the Entropy Node
//
// This module defines the node's error type and maps it onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use entropy::types::rpc::{ErrorDetail, ErrorResponse};
use entropy::EntropyError;
use std::io;
use std::result;
use thiserror::Error;

/// Result type for Entropy Node operations
pub type Result<T> = result::Result<T, NodeError>;

/// Error type for Entropy Node operations
#[derive(Debug, Error)]
pub enum NodeError {
    /// Program or ledger rejection
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    IO(String),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    /// Task failed
    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl NodeError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            NodeError::Entropy(err) => {
                let status = match err {
                    EntropyError::InvalidAccountData(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    EntropyError::GenerationOverflow => StatusCode::UNPROCESSABLE_ENTITY,
                    // Lifecycle preconditions: the record is in the wrong state
                    err if err.is_program_error() => StatusCode::CONFLICT,
                    EntropyError::DuplicateTransaction(_) => StatusCode::CONFLICT,
                    EntropyError::BlockhashNotFound => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.code())
            }
            NodeError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            NodeError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            NodeError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            NodeError::IO(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            NodeError::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR"),
            NodeError::TaskFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TASK_FAILED"),
        }
    }
}

/// Implement IntoResponse for NodeError so it can be returned directly from handlers
impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            NodeError::Entropy(err) => err.to_string(),
            NodeError::NotFound(msg)
            | NodeError::InvalidRequest(msg)
            | NodeError::Config(msg)
            | NodeError::IO(msg)
            | NodeError::Server(msg)
            | NodeError::TaskFailed(msg) => msg.clone(),
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

// Implement conversion from io::Error to NodeError
impl From<io::Error> for NodeError {
    fn from(err: io::Error) -> Self {
        NodeError::IO(err.to_string())
    }
}

// Implement conversion from config errors to NodeError
impl From<config::ConfigError> for NodeError {
    fn from(err: config::ConfigError) -> Self {
        NodeError::Config(err.to_string())
    }
}

// Implement conversion from toml serialization error to NodeError
impl From<toml::ser::Error> for NodeError {
    fn from(err: toml::ser::Error) -> Self {
        NodeError::Config(err.to_string())
    }
}

// Implement conversion from a failed blocking task to NodeError
impl From<tokio::task::JoinError> for NodeError {
    fn from(err: tokio::task::JoinError) -> Self {
        NodeError::TaskFailed(err.to_string())
    }
}
