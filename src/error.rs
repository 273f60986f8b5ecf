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
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Google Calendar not connected")]
    CalendarNotConnected,

    #[error("Google Calendar authentication expired. Please reconnect.")]
    AuthExpired,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Google API error: {0}")]
    GoogleApi(String),

    #[error("Gemini API error: {0}")]
    Gemini(String),

    #[error("Nutrition database error: {0}")]
    NutritionDb(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Marker message for Google auth failures detected in API responses.
    pub const GOOGLE_AUTH_ERROR: &'static str = "Google token invalid or revoked";

    /// True if this error means the stored Google grant is no longer usable
    /// and the user has to go through the OAuth flow again.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            AppError::AuthExpired => true,
            AppError::GoogleApi(msg) => {
                msg.contains("invalid_grant") || msg.contains(Self::GOOGLE_AUTH_ERROR)
            }
            _ => false,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    /// Set when the client should re-initiate the calendar OAuth flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    needs_auth: Option<bool>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details, needs_auth) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None, None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None, None),
            AppError::CalendarNotConnected => (
                StatusCode::FORBIDDEN,
                "calendar_not_connected",
                Some("Google Calendar not connected".to_string()),
                Some(true),
            ),
            AppError::AuthExpired => (
                StatusCode::UNAUTHORIZED,
                "auth_expired",
                Some("Google Calendar authentication expired. Please reconnect.".to_string()),
                Some(true),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone()), None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()), None)
            }
            AppError::GoogleApi(msg) => (
                StatusCode::BAD_GATEWAY,
                "calendar_error",
                Some(msg.clone()),
                None,
            ),
            AppError::Gemini(msg) => {
                (StatusCode::BAD_GATEWAY, "model_error", Some(msg.clone()), None)
            }
            AppError::NutritionDb(msg) => (
                StatusCode::BAD_GATEWAY,
                "nutrition_db_error",
                Some(msg.clone()),
                None,
            ),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    None,
                    None,
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    None,
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            needs_auth,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
