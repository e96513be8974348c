use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid wallet address: {0}")]
    InvalidWallet(String),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Provider error {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Provider request failed: {0}")]
    ProviderUnreachable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Scoring deadline exceeded: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_secs: Option<u64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::InvalidWallet(wallet) => {
                tracing::warn!(wallet = %wallet, error_code = "INVALID_WALLET", "Invalid wallet address");
                (StatusCode::BAD_REQUEST, "INVALID_WALLET")
            }
            AppError::InvalidDomain(domain) => {
                tracing::warn!(domain = %domain, error_code = "INVALID_DOMAIN", "Invalid domain");
                (StatusCode::BAD_REQUEST, "INVALID_DOMAIN")
            }
            AppError::Provider { status, message } => {
                tracing::error!(upstream_status = %status, message = %message, error_code = "PROVIDER_ERROR", "Provider error");
                (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR")
            }
            AppError::ProviderUnreachable(msg) => {
                tracing::error!(message = %msg, error_code = "PROVIDER_UNREACHABLE", "Provider request failed");
                (StatusCode::BAD_GATEWAY, "PROVIDER_UNREACHABLE")
            }
            AppError::Config(msg) => {
                tracing::error!(message = %msg, error_code = "CONFIG_ERROR", "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            AppError::RateLimited { retry_after_secs } => {
                tracing::warn!(retry_after_secs = %retry_after_secs, error_code = "RATE_LIMITED", "Rate limit exceeded");
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED")
            }
            AppError::Timeout(msg) => {
                tracing::error!(message = %msg, error_code = "TIMEOUT", "Scoring deadline exceeded");
                (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT")
            }
            AppError::Internal(msg) => {
                tracing::error!(message = %msg, error_code = "INTERNAL_ERROR", "Internal error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let retry_after_secs = match &self {
            AppError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            retry_after_secs,
        });

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
