// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Every financial failure aborts its whole transactional scope, so a
/// client receiving one of these knows no balance changed.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Out of stock: {0}")]
    OutOfStock(String),

    #[error("Already claimed: {0}")]
    AlreadyClaimed(String),

    #[error("Already completed: {0}")]
    AlreadyCompleted(String),

    #[error("Conflicting active resource: {0}")]
    ConflictingActiveResource(String),

    #[error("Invalid weight table: {0}")]
    InvalidWeightTable(String),

    #[error("Transaction scope timed out")]
    Timeout,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    /// Stable machine-readable kind string used in API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::InsufficientFunds(_) => "insufficient_funds",
            AppError::OutOfStock(_) => "out_of_stock",
            AppError::AlreadyClaimed(_) => "already_claimed",
            AppError::AlreadyCompleted(_) => "already_completed",
            AppError::ConflictingActiveResource(_) => "conflicting_active_resource",
            AppError::InvalidWeightTable(_) => "invalid_weight_table",
            AppError::Timeout => "timeout",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, None),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, Some(msg.clone())),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, Some(msg.clone())),
            AppError::InsufficientFunds(msg) => (StatusCode::CONFLICT, Some(msg.clone())),
            AppError::OutOfStock(msg) => (StatusCode::CONFLICT, Some(msg.clone())),
            AppError::AlreadyClaimed(msg) => (StatusCode::CONFLICT, Some(msg.clone())),
            AppError::AlreadyCompleted(msg) => (StatusCode::CONFLICT, Some(msg.clone())),
            AppError::ConflictingActiveResource(msg) => (StatusCode::CONFLICT, Some(msg.clone())),
            AppError::InvalidWeightTable(msg) => {
                tracing::error!(error = %msg, "Misconfigured weight table");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            AppError::Timeout => (StatusCode::SERVICE_UNAVAILABLE, None),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = ErrorResponse {
            error: self.kind().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
