use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::matching::error::MatchError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MatchError> for AppError {
    fn from(e: MatchError) -> Self {
        let message = e.to_string();
        match e {
            MatchError::EmptyJobDescription | MatchError::NoCandidates => {
                AppError::Validation(message)
            }
            MatchError::ExtractionFailed(_) | MatchError::ResponseParseFailed(_) => {
                AppError::UnprocessableEntity(message)
            }
            MatchError::AnalysisServiceUnauthorized => AppError::Unauthorized(message),
            MatchError::AnalysisServiceRateLimited { .. } => AppError::RateLimited(message),
            MatchError::AnalysisServiceUnavailable(_) => AppError::ServiceUnavailable(message),
            MatchError::ScoringFailed(_) => AppError::Internal(anyhow::anyhow!(message)),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout => AppError::GatewayTimeout(e.to_string()),
            other => MatchError::from(other).into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Unauthorized(msg) => {
                tracing::warn!("Analysis service unauthorized: {msg}");
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::RateLimited(msg) => {
                tracing::warn!("Analysis service rate limited: {msg}");
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", msg.clone())
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("Service unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    msg.clone(),
                )
            }
            AppError::GatewayTimeout(msg) => {
                tracing::error!("Upstream timeout: {msg}");
                (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
