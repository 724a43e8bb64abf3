use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::request::{
    validate_filename, AnalysisConfig, AnalysisRequest, CompanyCriteria, PositionFramework,
};
use crate::models::response::AnalysisResult;
use crate::state::AppState;

/// POST /api/v1/analyze request body.
#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    /// Base64-encoded document bytes, or an http(s) URL to fetch them from.
    pub cv_file: String,
    pub cv_filename: String,
    pub position_framework: PositionFramework,
    pub company_criteria: CompanyCriteria,
    #[serde(default)]
    pub config: AnalysisConfig,
}

/// POST /api/v1/analyze
/// Runs the full analysis pipeline and returns the structured evaluation.
pub async fn analyze_handler(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeBody>,
) -> Result<Json<AnalysisResult>, AppError> {
    info!("received analysis request for {}", body.cv_filename);

    // The extension is checked before any payload bytes are fetched or
    // decoded, so a wrong file type never costs a network round trip.
    validate_filename(&body.cv_filename).map_err(AppError::Validation)?;

    let document = resolve_document(&state.http, &body.cv_file).await?;

    let max_bytes = state.config.max_file_size_mb * 1024 * 1024;
    if document.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "file exceeds the {}MB size limit",
            state.config.max_file_size_mb
        )));
    }

    let request = AnalysisRequest::new(
        document,
        body.cv_filename,
        body.position_framework,
        body.company_criteria,
        body.config,
    )
    .map_err(AppError::Validation)?;

    let result = state.analyzer.analyze(request).await?;
    Ok(Json(result))
}

/// Accepts either a URL to fetch or a base64 payload to decode. The shared
/// client carries the fetch timeout, so a hung remote host cannot pin the
/// request task.
async fn resolve_document(client: &reqwest::Client, cv_file: &str) -> Result<Vec<u8>, AppError> {
    if cv_file.starts_with("http://") || cv_file.starts_with("https://") {
        info!("fetching CV document from URL");
        let response = client
            .get(cv_file)
            .send()
            .await
            .map_err(|e| AppError::Validation(format!("failed to fetch CV from URL: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::Validation(format!(
                "failed to fetch CV from URL: HTTP {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read CV from URL: {e}")))?;
        Ok(bytes.to_vec())
    } else {
        base64::engine::general_purpose::STANDARD
            .decode(cv_file.trim())
            .map_err(|_| {
                AppError::Validation(
                    "cv_file must be either a valid URL or base64 encoded string".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_base64_payload_is_decoded() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"hello");
        let decoded = resolve_document(&reqwest::Client::new(), &encoded)
            .await
            .unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[tokio::test]
    async fn test_garbage_payload_is_a_validation_error() {
        let err = resolve_document(&reqwest::Client::new(), "not base64 at all!!")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
