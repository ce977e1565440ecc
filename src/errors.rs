use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub enum AppError {
    // Database errors
    Database(sqlx::Error),

    // Authentication errors
    InvalidCredentials,
    TokenValidation(String),
    TokenExpired,
    Unauthorized,

    // Authorization errors
    Forbidden,

    // Lookup errors
    UserNotFound,
    ScenarioNotFound,
    ArticleNotFound,
    ProviderNotFound,
    HistoryEntryNotFound,

    // State errors
    Conflict(String),

    // Validation errors
    Validation(String),

    // Upstream synthesizer/provider errors, including timeouts
    Upstream(String),

    // Configuration errors
    Configuration(String),

    // Internal errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::TokenValidation(msg) => write!(f, "Token validation failed: {}", msg),
            AppError::TokenExpired => write!(f, "Token has expired"),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::UserNotFound => write!(f, "User not found"),
            AppError::ScenarioNotFound => write!(f, "Scenario not found"),
            AppError::ArticleNotFound => write!(f, "Article not found"),
            AppError::ProviderNotFound => write!(f, "Provider not found"),
            AppError::HistoryEntryNotFound => write!(f, "History entry not found"),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Convert from various error types
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::TokenValidation(err.to_string()),
        }
    }
}

// Implement IntoResponse for Axum
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Database(_) => {
                tracing::error!("Database error: {:?}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AppError::TokenValidation(_) => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired".to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            AppError::ScenarioNotFound => (StatusCode::NOT_FOUND, "Scenario not found".to_string()),
            AppError::ArticleNotFound => (StatusCode::NOT_FOUND, "Article not found".to_string()),
            AppError::ProviderNotFound => (StatusCode::NOT_FOUND, "Provider not found".to_string()),
            AppError::HistoryEntryNotFound => {
                (StatusCode::NOT_FOUND, "History entry not found".to_string())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Upstream(_) => {
                tracing::error!("Upstream error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Content generation failed".to_string(),
                )
            }
            AppError::Configuration(_) => {
                tracing::error!("Configuration error: {:?}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Internal(_) => {
                tracing::error!("Internal error: {:?}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Validation("bad input".to_string()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::TokenExpired, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
            (AppError::ScenarioNotFound, StatusCode::NOT_FOUND),
            (AppError::Conflict("busy".to_string()), StatusCode::CONFLICT),
            (AppError::Upstream("down".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let response = err.into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
