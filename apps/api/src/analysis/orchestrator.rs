//! Analysis Orchestrator — composes extraction, provider selection, prompt
//! building, the model call, and validation into one transaction, and audits
//! every attempt.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::audit::{AuditEntry, AuditRecorder, AuditStatus};
use crate::extract::{self, ExtractError};
use crate::models::request::AnalysisRequest;
use crate::models::response::{AnalysisMetadata, AnalysisResult};
use crate::prompt::{PromptError, PromptLibrary};
use crate::providers::{ProviderError, ProviderRegistry};

use super::validator::{self, OutputError};

/// Pipeline failure taxonomy. `Document` surfaces as a document-parsing
/// failure, `Prompt`/`Provider`/`InvalidOutput` as analysis failures, and
/// `Internal` as an unexpected failure; nothing is silently swallowed.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to parse CV document: {0}")]
    Document(#[from] ExtractError),

    #[error("{0}")]
    Prompt(#[from] PromptError),

    #[error("LLM analysis failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("LLM analysis failed: {0}")]
    InvalidOutput(#[from] OutputError),

    #[error("analysis failed: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Owns one analysis transaction end to end. Constructed once at startup with
/// its collaborators injected; holds no per-request state.
pub struct Analyzer {
    registry: Arc<ProviderRegistry>,
    prompts: Arc<PromptLibrary>,
    audit: AuditRecorder,
}

impl Analyzer {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        prompts: Arc<PromptLibrary>,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            registry,
            prompts,
            audit,
        }
    }

    /// Runs the full pipeline for one request, terminal on first failure.
    /// An audit record is written on every path; a failed audit write is
    /// logged but never replaces the real outcome.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let analysis_id = Uuid::new_v4();
        let started = Instant::now();

        info!("starting analysis {analysis_id} for {}", request.filename);

        match self.run_pipeline(analysis_id, &request, started).await {
            Ok(result) => {
                self.write_audit(AuditEntry {
                    analysis_id: analysis_id.to_string(),
                    cv_filename: request.filename.clone(),
                    position_title: request.position_framework.role_title.clone(),
                    company_name: request.company_criteria.company_name.clone(),
                    provider: result.metadata.provider.clone(),
                    model: result.metadata.model.clone(),
                    prompt_version: result.metadata.prompt_version.clone(),
                    tokens_used: result.metadata.tokens_used,
                    processing_time_ms: result.metadata.processing_time_ms,
                    overall_score: Some(result.overall_score),
                    recommendation: Some(result.recommendation.as_str().to_string()),
                    status: AuditStatus::Success,
                    error_message: None,
                })
                .await;

                info!(
                    "analysis {analysis_id} completed in {}ms",
                    result.metadata.processing_time_ms
                );
                Ok(result)
            }
            Err(e) => {
                error!("analysis {analysis_id} failed: {e}");
                self.write_audit(AuditEntry {
                    analysis_id: analysis_id.to_string(),
                    cv_filename: request.filename.clone(),
                    position_title: request.position_framework.role_title.clone(),
                    company_name: request.company_criteria.company_name.clone(),
                    provider: request.config.provider.clone(),
                    model: "unknown".to_string(),
                    prompt_version: request.config.prompt_version.clone(),
                    tokens_used: None,
                    processing_time_ms: started.elapsed().as_millis() as u64,
                    overall_score: None,
                    recommendation: None,
                    status: AuditStatus::Error,
                    error_message: Some(e.to_string()),
                })
                .await;
                Err(e)
            }
        }
    }

    async fn run_pipeline(
        &self,
        analysis_id: Uuid,
        request: &AnalysisRequest,
        started: Instant,
    ) -> Result<AnalysisResult, AnalysisError> {
        let (cv_text, pages) = extract::extract(&request.document, &request.filename)?;
        info!(
            "extracted {} chars from {} ({pages} pages)",
            cv_text.len(),
            request.filename
        );

        let provider = self.registry.select(&request.config.provider)?;

        let (system_prompt, user_prompt) = self.prompts.build_analysis_prompt(
            &request.config.prompt_version,
            &cv_text,
            &request.position_framework,
            &request.company_criteria,
            request.config.depth,
        )?;

        let llm_response = provider.generate(&user_prompt, Some(&system_prompt)).await?;

        let fields = validator::parse_report(&llm_response.content)?;

        let processing_time_ms = started.elapsed().as_millis() as u64;
        Ok(AnalysisResult {
            analysis_id,
            timestamp: Utc::now(),
            overall_score: fields.overall_score,
            recommendation: fields.recommendation,
            section_scores: fields.section_scores,
            key_strengths: fields.key_strengths,
            critical_gaps: fields.critical_gaps,
            follow_up_questions: fields.follow_up_questions,
            metadata: AnalysisMetadata {
                provider: provider.name().to_string(),
                model: llm_response.model,
                prompt_version: request.config.prompt_version.clone(),
                tokens_used: llm_response.tokens_used,
                processing_time_ms,
                pages,
            },
        })
    }

    /// Losing the audit trail must not mask or replace the real outcome.
    async fn write_audit(&self, entry: AuditEntry) {
        if let Err(e) = self.audit.record(&entry).await {
            error!(
                "failed to write audit record for analysis {}: {e}",
                entry.analysis_id
            );
        }
    }
}
