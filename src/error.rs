//! Error handling module
//!
//! Centralized error types and HTTP response conversion. One discipline for
//! every operation: mutating flows return these errors, read flows degrade
//! to empty results at the handler layer and never gate mutations.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::providers::{Provider, ProviderError};

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not signed in")]
    Unauthorized,

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Cannot transfer between the same bank account")]
    SameBankTransfer,

    #[error("Idempotency conflict: same key with different request")]
    IdempotencyConflict,

    // Upstream errors (5xx)
    #[error("{provider} provider error: {source}")]
    ExternalService {
        provider: Provider,
        #[source]
        source: ProviderError,
    },

    /// A multi-step orchestration succeeded at a provider but failed to
    /// record the outcome locally (or vice versa). Logged distinctly,
    /// never swallowed.
    #[error("Partial failure during {operation}: {detail}")]
    PartialFailure {
        operation: &'static str,
        detail: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// Attribute a provider failure to the platform it came from.
    pub fn external(provider: Provider, source: ProviderError) -> Self {
        Self::ExternalService { provider, source }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Record a partial failure under its dedicated log target before
    /// returning it, so inconsistencies are greppable in one place.
    pub fn partial_failure(operation: &'static str, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::error!(
            target: "horizon::partial_failure",
            operation,
            %detail,
            "partial failure: external side effect without matching local state"
        );
        Self::PartialFailure { operation, detail }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::SameBankTransfer => {
                (StatusCode::BAD_REQUEST, "same_bank_transfer", None)
            }

            // 401 Unauthorized
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "invalid_credentials", None)
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),

            // 404 Not Found
            AppError::NotFound { id, .. } => {
                (StatusCode::NOT_FOUND, "not_found", Some(id.clone()))
            }

            // 409 Conflict
            AppError::IdempotencyConflict => {
                (StatusCode::CONFLICT, "idempotency_conflict", None)
            }

            // Upstream failures: timeouts get their own status
            AppError::ExternalService { provider, source } => {
                tracing::error!(%provider, error = %source, "External service error");
                match source {
                    ProviderError::Timeout => {
                        (StatusCode::GATEWAY_TIMEOUT, "provider_timeout", None)
                    }
                    _ => (StatusCode::BAD_GATEWAY, "provider_error", None),
                }
            }

            // 500 Internal Server Error
            AppError::PartialFailure { detail, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "partial_failure",
                Some(detail.clone()),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("bank", "bank_1");
        assert_eq!(err.to_string(), "bank not found: bank_1");
    }

    #[test]
    fn test_external_wraps_source() {
        let err = AppError::external(Provider::Payments, ProviderError::Timeout);
        assert!(err.to_string().contains("payments"));
    }
}
