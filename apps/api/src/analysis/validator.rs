//! Response Validator — coerces free-form model output into the strict score
//! report shape, or rejects it.

use serde::Deserialize;
use thiserror::Error;
use tracing::error;

use crate::models::response::{Recommendation, SectionScore};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("invalid model output: {0}")]
    InvalidModelOutput(String),
}

/// The six top-level keys every model answer must carry. Presence is checked
/// explicitly before typed deserialization so a missing key is reported by
/// name rather than as a generic parse failure.
const REQUIRED_KEYS: &[&str] = &[
    "overall_score",
    "recommendation",
    "section_scores",
    "key_strengths",
    "critical_gaps",
    "follow_up_questions",
];

/// Content fields of a validated report, before metadata is attached.
#[derive(Debug, Deserialize)]
pub struct ReportFields {
    pub overall_score: f64,
    pub recommendation: Recommendation,
    pub section_scores: Vec<SectionScore>,
    pub key_strengths: Vec<String>,
    pub critical_gaps: Vec<String>,
    pub follow_up_questions: Vec<String>,
}

/// Parses raw provider text into `ReportFields`.
pub fn parse_report(content: &str) -> Result<ReportFields, OutputError> {
    let cleaned = strip_code_fences(content);

    let value: serde_json::Value = serde_json::from_str(cleaned).map_err(|e| {
        error!("failed to parse model output as JSON: {e}");
        error!("raw content (first 500 chars): {}", truncate(content, 500));
        error!("cleaned content (first 500 chars): {}", truncate(cleaned, 500));
        OutputError::InvalidModelOutput("the model did not return valid JSON".to_string())
    })?;

    let object = value.as_object().ok_or_else(|| {
        OutputError::InvalidModelOutput("top-level value is not a JSON object".to_string())
    })?;

    for key in REQUIRED_KEYS {
        if !object.contains_key(*key) {
            return Err(OutputError::InvalidModelOutput(format!(
                "missing required field: {key}"
            )));
        }
    }

    let report: ReportFields = serde_json::from_value(value).map_err(|e| {
        error!("model output failed schema validation: {e}");
        OutputError::InvalidModelOutput(format!("field has unexpected shape: {e}"))
    })?;

    check_score_range("overall_score", report.overall_score)?;
    for section in &report.section_scores {
        check_score_range(&format!("score for section '{}'", section.section), section.score)?;
        check_score_range(&format!("weight for section '{}'", section.section), section.weight)?;
    }

    Ok(report)
}

/// All scores and weights are percentages; anything outside [0, 100] means
/// the model hallucinated the scale.
fn check_score_range(field: &str, value: f64) -> Result<(), OutputError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(OutputError::InvalidModelOutput(format!(
            "{field} must be between 0 and 100, got {value}"
        )))
    }
}

/// Some models wrap JSON in a markdown code fence despite instructions. Strip
/// the marker line (and language tag) plus any matching trailing fence.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let body = match trimmed.find('\n') {
        Some(i) => &trimmed[i + 1..],
        None => return trimmed,
    };
    body.strip_suffix("```")
        .map(|s| s.trim_end())
        .unwrap_or(body)
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_REPORT: &str = r#"{
        "overall_score": 78.0,
        "recommendation": "yes",
        "section_scores": [
            {
                "section": "Technical Skills",
                "score": 85.0,
                "weight": 40.0,
                "weighted_score": 34.0,
                "rationale": "Strong Rust and distributed-systems background."
            }
        ],
        "key_strengths": ["7 years of systems programming"],
        "critical_gaps": ["No Kubernetes exposure"],
        "follow_up_questions": ["Describe a production incident you debugged."]
    }"#;

    #[test]
    fn test_plain_json_parses() {
        let report = parse_report(VALID_REPORT).unwrap();
        assert_eq!(report.overall_score, 78.0);
        assert_eq!(report.recommendation, Recommendation::Yes);
        assert_eq!(report.section_scores.len(), 1);
    }

    #[test]
    fn test_fenced_json_parses_identically() {
        let fenced = format!("```json\n{VALID_REPORT}\n```");
        let plain = parse_report(VALID_REPORT).unwrap();
        let from_fence = parse_report(&fenced).unwrap();
        assert_eq!(plain.overall_score, from_fence.overall_score);
        assert_eq!(plain.key_strengths, from_fence.key_strengths);
        assert_eq!(
            plain.section_scores[0].weighted_score,
            from_fence.section_scores[0].weighted_score
        );
    }

    #[test]
    fn test_fence_without_language_tag() {
        let fenced = format!("```\n{VALID_REPORT}\n```");
        assert!(parse_report(&fenced).is_ok());
    }

    #[test]
    fn test_each_missing_key_is_rejected() {
        let full: serde_json::Value = serde_json::from_str(VALID_REPORT).unwrap();
        for key in REQUIRED_KEYS {
            let mut partial = full.clone();
            partial.as_object_mut().unwrap().remove(*key);
            let err = parse_report(&partial.to_string()).unwrap_err();
            let message = err.to_string();
            assert!(message.contains(key), "expected '{key}' in: {message}");
        }
    }

    #[test]
    fn test_non_json_rejected() {
        let err = parse_report("The candidate looks great, I'd hire them.").unwrap_err();
        assert!(err.to_string().contains("valid JSON"));
    }

    #[test]
    fn test_json_array_rejected() {
        let err = parse_report(r#"[1, 2, 3]"#).unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }

    #[test]
    fn test_out_of_range_overall_score_rejected() {
        let bad = VALID_REPORT.replace(r#""overall_score": 78.0"#, r#""overall_score": 150.0"#);
        let err = parse_report(&bad).unwrap_err();
        assert!(err.to_string().contains("overall_score"));
        assert!(err.to_string().contains("150"));
    }

    #[test]
    fn test_negative_section_score_rejected() {
        let bad = VALID_REPORT.replace(r#""score": 85.0"#, r#""score": -20.0"#);
        let err = parse_report(&bad).unwrap_err();
        assert!(err.to_string().contains("Technical Skills"));
    }

    #[test]
    fn test_out_of_range_section_weight_rejected() {
        let bad = VALID_REPORT.replace(r#""weight": 40.0"#, r#""weight": 250.0"#);
        let err = parse_report(&bad).unwrap_err();
        assert!(err.to_string().contains("weight"));
    }

    #[test]
    fn test_boundary_scores_accepted() {
        let report = VALID_REPORT
            .replace(r#""overall_score": 78.0"#, r#""overall_score": 100.0"#)
            .replace(r#""score": 85.0"#, r#""score": 0.0"#);
        assert!(parse_report(&report).is_ok());
    }

    #[test]
    fn test_unknown_recommendation_rejected() {
        let bad = VALID_REPORT.replace(r#""yes""#, r#""hire_immediately""#);
        let err = parse_report(&bad).unwrap_err();
        assert!(matches!(err, OutputError::InvalidModelOutput(_)));
    }
}
