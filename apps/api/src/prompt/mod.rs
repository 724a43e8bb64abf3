//! Prompt Builder — renders versioned analysis prompts deterministically.

mod templates;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::request::{AnalysisDepth, CompanyCriteria, PositionFramework};

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt version '{requested}' not found; available versions: {}", available.join(", "))]
    UnknownPromptVersion {
        requested: String,
        available: Vec<String>,
    },
}

/// Placeholder rendered for absent optional fields so the prompt stays
/// well-formed for the model.
const NOT_SPECIFIED: &str = "Not specified";

struct PromptTemplate {
    system: &'static str,
    user: &'static str,
}

/// Versioned prompt templates, keyed by tag. BTreeMap keeps the available-tag
/// listing in error messages stable.
pub struct PromptLibrary {
    templates: BTreeMap<String, PromptTemplate>,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptLibrary {
    pub fn new() -> Self {
        let mut templates = BTreeMap::new();
        templates.insert(
            "v1".to_string(),
            PromptTemplate {
                system: templates::V1_SYSTEM,
                user: templates::V1_USER_TEMPLATE,
            },
        );
        Self { templates }
    }

    pub fn available_versions(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    /// Renders `(system_prompt, user_prompt)` for the given version tag.
    pub fn build_analysis_prompt(
        &self,
        version: &str,
        cv_text: &str,
        framework: &PositionFramework,
        criteria: &CompanyCriteria,
        depth: AnalysisDepth,
    ) -> Result<(String, String), PromptError> {
        let template =
            self.templates
                .get(version)
                .ok_or_else(|| PromptError::UnknownPromptVersion {
                    requested: version.to_string(),
                    available: self.available_versions(),
                })?;

        let requirements = bulleted_or_placeholder(&framework.key_requirements);
        let must_have = joined_or_placeholder(&framework.must_have_skills);
        let nice_to_have = joined_or_placeholder(&framework.nice_to_have_skills);
        let weights = weight_table(framework);
        let values = joined_or_placeholder(&criteria.values);
        let guidelines = non_empty_or_placeholder(&criteria.evaluation_guidelines);
        let disqualifiers = if criteria.disqualifiers.is_empty() {
            "None specified".to_string()
        } else {
            criteria.disqualifiers.join(", ")
        };

        let user = template
            .user
            .replace("{role_title}", non_empty_or_placeholder(&framework.role_title).as_str())
            .replace("{requirements}", &requirements)
            .replace("{must_have}", &must_have)
            .replace("{nice_to_have}", &nice_to_have)
            .replace("{weights}", &weights)
            .replace("{company_name}", non_empty_or_placeholder(&criteria.company_name).as_str())
            .replace("{values}", &values)
            .replace("{guidelines}", &guidelines)
            .replace("{disqualifiers}", &disqualifiers)
            .replace("{cv_text}", cv_text)
            .replace("{depth}", depth.as_str());

        Ok((template.system.to_string(), user))
    }
}

/// One line per named weight: label title-cased with underscores replaced by
/// spaces, value as a percentage.
fn weight_table(framework: &PositionFramework) -> String {
    framework
        .scoring_weights
        .iter()
        .map(|(label, value)| format!("- {}: {value}%", title_case(label)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn title_case(label: &str) -> String {
    label
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn bulleted_or_placeholder(items: &[String]) -> String {
    if items.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        items
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn joined_or_placeholder(items: &[String]) -> String {
    if items.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        items.join(", ")
    }
}

fn non_empty_or_placeholder(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::ScoringWeights;

    fn framework() -> PositionFramework {
        PositionFramework {
            role_title: "Senior Backend Engineer".to_string(),
            key_requirements: vec![
                "5+ years Rust experience".to_string(),
                "Microservices architecture".to_string(),
            ],
            scoring_weights: ScoringWeights::default(),
            must_have_skills: vec!["Rust".to_string(), "SQL".to_string()],
            nice_to_have_skills: vec![],
            experience_years_required: Some(5),
        }
    }

    fn criteria() -> CompanyCriteria {
        CompanyCriteria {
            company_name: "ACME Corp".to_string(),
            values: vec!["Ownership".to_string(), "Rigor".to_string()],
            evaluation_guidelines: String::new(),
            disqualifiers: vec![],
            preferred_backgrounds: vec![],
        }
    }

    #[test]
    fn test_user_prompt_interpolates_in_order() {
        let library = PromptLibrary::new();
        let (system, user) = library
            .build_analysis_prompt("v1", "CV BODY", &framework(), &criteria(), AnalysisDepth::Detailed)
            .unwrap();

        assert!(system.contains("overall_score"));
        assert!(system.contains("follow_up_questions"));

        let role = user.find("Role: Senior Backend Engineer").unwrap();
        let requirements = user.find("- 5+ years Rust experience").unwrap();
        let weights = user.find("- Technical Skills: 40%").unwrap();
        let company = user.find("Company: ACME Corp").unwrap();
        let cv = user.find("CV BODY").unwrap();
        let depth = user.find("Analysis Depth: detailed").unwrap();
        assert!(role < requirements);
        assert!(requirements < weights);
        assert!(weights < company);
        assert!(company < cv);
        assert!(cv < depth);
    }

    #[test]
    fn test_weight_labels_are_title_cased() {
        let library = PromptLibrary::new();
        let (_, user) = library
            .build_analysis_prompt("v1", "cv", &framework(), &criteria(), AnalysisDepth::Quick)
            .unwrap();
        assert!(user.contains("- Technical Skills: 40%"));
        assert!(user.contains("- Cultural Fit: 15%"));
        assert!(!user.contains("technical_skills"));
    }

    #[test]
    fn test_missing_optional_fields_render_placeholders() {
        let library = PromptLibrary::new();
        let (_, user) = library
            .build_analysis_prompt("v1", "cv", &framework(), &criteria(), AnalysisDepth::Quick)
            .unwrap();
        assert!(user.contains("Nice-to-Have Skills: Not specified"));
        assert!(user.contains("Evaluation Guidelines:\nNot specified"));
        assert!(user.contains("Disqualifiers:\nNone specified"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let library = PromptLibrary::new();
        let a = library
            .build_analysis_prompt("v1", "cv", &framework(), &criteria(), AnalysisDepth::Quick)
            .unwrap();
        let b = library
            .build_analysis_prompt("v1", "cv", &framework(), &criteria(), AnalysisDepth::Quick)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_version_lists_available_tags() {
        let library = PromptLibrary::new();
        let err = library
            .build_analysis_prompt("v9", "cv", &framework(), &criteria(), AnalysisDepth::Quick)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("v9"));
        assert!(message.contains("v1"));
    }
}
