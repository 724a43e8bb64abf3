use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::orchestrator::AnalysisError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Callers see three failure categories: their input was bad (400), the
/// analysis itself failed (422), or something unexpected broke (500).
impl From<AnalysisError> for AppError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::Document(inner) => {
                AppError::Validation(format!("Failed to parse CV document: {inner}"))
            }
            AnalysisError::Prompt(inner) => AppError::Validation(inner.to_string()),
            AnalysisError::Provider(_) | AnalysisError::InvalidOutput(_) => {
                AppError::Analysis(e.to_string())
            }
            AnalysisError::Internal(inner) => AppError::Internal(inner),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Analysis(msg) => {
                tracing::error!("Analysis error: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "ANALYSIS_ERROR",
                    msg.clone(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractError;
    use crate::providers::ProviderError;

    #[test]
    fn test_document_failures_map_to_validation() {
        let err: AppError =
            AnalysisError::Document(ExtractError::UnsupportedFormat(".txt".to_string())).into();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("Failed to parse CV document"));
    }

    #[test]
    fn test_provider_failures_map_to_analysis() {
        let err: AppError = AnalysisError::Provider(ProviderError::CallFailed {
            provider: "openai".to_string(),
            message: "timeout".to_string(),
        })
        .into();
        assert!(matches!(err, AppError::Analysis(_)));
    }
}
