//! Inbound request types for the analysis pipeline.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// File extensions the extractor understands. Checked at ingress, before the
/// document payload is decoded.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];

/// Scoring weights for the four evaluation sections, as percentages.
/// The four values are not required to sum to 100 — a mismatched sum logs a
/// warning but never blocks the analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_technical")]
    pub technical_skills: u8,
    #[serde(default = "default_experience")]
    pub experience: u8,
    #[serde(default = "default_education")]
    pub education: u8,
    #[serde(default = "default_cultural_fit")]
    pub cultural_fit: u8,
}

fn default_technical() -> u8 {
    40
}
fn default_experience() -> u8 {
    30
}
fn default_education() -> u8 {
    15
}
fn default_cultural_fit() -> u8 {
    15
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            technical_skills: 40,
            experience: 30,
            education: 15,
            cultural_fit: 15,
        }
    }
}

impl ScoringWeights {
    /// Each weight is a u8 so the 0–100 range check is the only thing left to
    /// enforce. Returns the offending label on failure.
    pub fn validate(&self) -> Result<(), String> {
        for (label, value) in self.iter() {
            if value > 100 {
                return Err(format!("weight '{label}' must be between 0 and 100"));
            }
        }
        Ok(())
    }

    /// True when the four weights sum to exactly 100.
    pub fn sums_to_hundred(&self) -> bool {
        self.sum() == 100
    }

    pub fn sum(&self) -> u32 {
        self.iter().map(|(_, v)| v as u32).sum()
    }

    /// Stable label/value iteration order, used by the prompt weight table.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u8)> {
        [
            ("technical_skills", self.technical_skills),
            ("experience", self.experience),
            ("education", self.education),
            ("cultural_fit", self.cultural_fit),
        ]
        .into_iter()
    }
}

/// Position-specific evaluation framework: what this role needs and how much
/// each dimension counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionFramework {
    pub role_title: String,
    #[serde(default)]
    pub key_requirements: Vec<String>,
    #[serde(default)]
    pub scoring_weights: ScoringWeights,
    #[serde(default)]
    pub must_have_skills: Vec<String>,
    #[serde(default)]
    pub nice_to_have_skills: Vec<String>,
    #[serde(default)]
    pub experience_years_required: Option<u32>,
}

/// Company-wide evaluation criteria applied across all roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyCriteria {
    pub company_name: String,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub evaluation_guidelines: String,
    #[serde(default)]
    pub disqualifiers: Vec<String>,
    #[serde(default)]
    pub preferred_backgrounds: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisDepth {
    Quick,
    Detailed,
}

impl Default for AnalysisDepth {
    fn default() -> Self {
        AnalysisDepth::Detailed
    }
}

impl AnalysisDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisDepth::Quick => "quick",
            AnalysisDepth::Detailed => "detailed",
        }
    }
}

/// Per-request analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Provider name or "auto".
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_prompt_version")]
    pub prompt_version: String,
    #[serde(default)]
    pub depth: AnalysisDepth,
}

fn default_provider() -> String {
    "auto".to_string()
}

fn default_prompt_version() -> String {
    "v1".to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            prompt_version: default_prompt_version(),
            depth: AnalysisDepth::default(),
        }
    }
}

/// Immutable, validated input to one pipeline run. Constructed once at
/// ingress; the document bytes are already decoded by the time this exists.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub document: Vec<u8>,
    pub filename: String,
    pub position_framework: PositionFramework,
    pub company_criteria: CompanyCriteria,
    pub config: AnalysisConfig,
}

impl AnalysisRequest {
    pub fn new(
        document: Vec<u8>,
        filename: String,
        position_framework: PositionFramework,
        company_criteria: CompanyCriteria,
        config: AnalysisConfig,
    ) -> Result<Self, String> {
        validate_filename(&filename)?;
        position_framework.scoring_weights.validate()?;

        if !position_framework.scoring_weights.sums_to_hundred() {
            warn!(
                "scoring weights for '{}' sum to {} rather than 100",
                position_framework.role_title,
                position_framework.scoring_weights.sum()
            );
        }

        Ok(Self {
            document,
            filename,
            position_framework,
            company_criteria,
            config,
        })
    }
}

/// Rejects filenames without an allowed document extension. Runs before any
/// payload bytes are touched.
pub fn validate_filename(filename: &str) -> Result<(), String> {
    let lower = filename.to_lowercase();
    if ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        Ok(())
    } else {
        Err(format!(
            "file '{filename}' must have one of these extensions: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ))
    }
}
