//! The score report returned to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Five-level categorical hiring signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongYes,
    Yes,
    Maybe,
    No,
    StrongNo,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongYes => "strong_yes",
            Recommendation::Yes => "yes",
            Recommendation::Maybe => "maybe",
            Recommendation::No => "no",
            Recommendation::StrongNo => "strong_no",
        }
    }
}

/// One rubric dimension: raw score, its weight, and the derived contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionScore {
    pub section: String,
    pub score: f64,
    pub weight: f64,
    /// score * weight / 100
    pub weighted_score: f64,
    pub rationale: String,
}

/// How the analysis was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub provider: String,
    pub model: String,
    pub prompt_version: String,
    pub tokens_used: Option<u32>,
    pub processing_time_ms: u64,
    /// True page count for PDFs; a 500-words-per-page estimate for DOC/DOCX.
    pub pages: usize,
}

/// The validated score report for one analysis. Constructed exactly once per
/// successful pipeline run and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub overall_score: f64,
    pub recommendation: Recommendation,
    pub section_scores: Vec<SectionScore>,
    pub key_strengths: Vec<String>,
    pub critical_gaps: Vec<String>,
    pub follow_up_questions: Vec<String>,
    pub metadata: AnalysisMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_snake_case_serde() {
        let rec: Recommendation = serde_json::from_str(r#""strong_yes""#).unwrap();
        assert_eq!(rec, Recommendation::StrongYes);
        assert_eq!(serde_json::to_string(&Recommendation::StrongNo).unwrap(), r#""strong_no""#);
    }

    #[test]
    fn test_recommendation_unknown_value_rejected() {
        let result: Result<Recommendation, _> = serde_json::from_str(r#""definitely""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_section_score_round_trips() {
        let json = r#"{
            "section": "Technical Skills",
            "score": 85.0,
            "weight": 40.0,
            "weighted_score": 34.0,
            "rationale": "Strong systems background."
        }"#;
        let score: SectionScore = serde_json::from_str(json).unwrap();
        assert!((score.weighted_score - score.score * score.weight / 100.0).abs() < 1e-9);
    }
}
