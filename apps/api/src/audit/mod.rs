//! Audit Recorder — durably records every analysis attempt and maintains
//! rolling daily token-usage aggregates.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStatus {
    Success,
    Error,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Success => "success",
            AuditStatus::Error => "error",
        }
    }
}

/// One analysis attempt, success or failure.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub analysis_id: String,
    pub cv_filename: String,
    pub position_title: String,
    pub company_name: String,
    pub provider: String,
    pub model: String,
    pub prompt_version: String,
    pub tokens_used: Option<u32>,
    pub processing_time_ms: u64,
    pub overall_score: Option<f64>,
    pub recommendation: Option<String>,
    pub status: AuditStatus,
    pub error_message: Option<String>,
}

/// Persisted audit row, as returned by the read endpoints.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditRow {
    pub analysis_id: String,
    pub timestamp: DateTime<Utc>,
    pub cv_filename: String,
    pub position_title: String,
    pub company_name: String,
    pub provider: String,
    pub model: String,
    pub prompt_version: String,
    pub tokens_used: Option<i64>,
    pub processing_time_ms: i64,
    pub overall_score: Option<f64>,
    pub recommendation: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
}

/// Per-provider usage over a trailing window of days.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProviderUsage {
    pub provider: String,
    pub total_tokens: i64,
    pub total_requests: i64,
    pub avg_tokens_per_request: f64,
}

/// Append-only audit log over the shared SQLite pool. Rows are keyed by
/// analysis id; the daily `(date, provider)` token aggregate is maintained
/// with a single atomic upsert so concurrent writers cannot lose updates.
#[derive(Clone)]
pub struct AuditRecorder {
    pool: SqlitePool,
}

impl AuditRecorder {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Appends one audit row. A duplicate analysis id is tolerated (logged,
    /// not raised) so the orchestrator's error path stays non-fatal.
    pub async fn record(&self, entry: &AuditEntry) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO analysis_audit (
                analysis_id, timestamp, cv_filename, position_title,
                company_name, provider, model, prompt_version,
                tokens_used, processing_time_ms, overall_score,
                recommendation, status, error_message
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.analysis_id)
        .bind(Utc::now())
        .bind(&entry.cv_filename)
        .bind(&entry.position_title)
        .bind(&entry.company_name)
        .bind(&entry.provider)
        .bind(&entry.model)
        .bind(&entry.prompt_version)
        .bind(entry.tokens_used.map(|t| t as i64))
        .bind(entry.processing_time_ms as i64)
        .bind(entry.overall_score)
        .bind(&entry.recommendation)
        .bind(entry.status.as_str())
        .bind(&entry.error_message)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                warn!("duplicate audit row for analysis {}", entry.analysis_id);
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        if entry.status == AuditStatus::Success {
            if let Some(tokens) = entry.tokens_used {
                self.accumulate_usage(&entry.provider, tokens).await?;
            }
        }

        info!(
            "audited analysis {} ({})",
            entry.analysis_id,
            entry.status.as_str()
        );
        Ok(())
    }

    /// Single-statement upsert: insert the day's first row or atomically add
    /// to the running totals.
    async fn accumulate_usage(&self, provider: &str, tokens: u32) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO token_usage (date, provider, total_tokens, request_count)
            VALUES (?, ?, ?, 1)
            ON CONFLICT(date, provider)
            DO UPDATE SET
                total_tokens = total_tokens + excluded.total_tokens,
                request_count = request_count + 1
            "#,
        )
        .bind(Utc::now().date_naive())
        .bind(provider)
        .bind(tokens as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Point lookup by analysis id.
    pub async fn get_by_id(&self, analysis_id: &str) -> Result<Option<AuditRow>, sqlx::Error> {
        sqlx::query_as::<_, AuditRow>("SELECT * FROM analysis_audit WHERE analysis_id = ?")
            .bind(analysis_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Most recent attempts, newest first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<AuditRow>, sqlx::Error> {
        sqlx::query_as::<_, AuditRow>(
            "SELECT * FROM analysis_audit ORDER BY timestamp DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
    }

    /// Per-provider usage over the trailing `days`-day window.
    pub async fn usage_summary(&self, days: u32) -> Result<Vec<ProviderUsage>, sqlx::Error> {
        sqlx::query_as::<_, ProviderUsage>(
            r#"
            SELECT
                provider,
                SUM(total_tokens) AS total_tokens,
                SUM(request_count) AS total_requests,
                AVG(total_tokens * 1.0 / request_count) AS avg_tokens_per_request
            FROM token_usage
            WHERE date >= date('now', '-' || ? || ' days')
            GROUP BY provider
            ORDER BY provider
            "#,
        )
        .bind(days as i64)
        .fetch_all(&self.pool)
        .await
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db) if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
    )
}
