//! Provider Abstraction — a uniform capability interface over remote LLM
//! backends.
//!
//! ARCHITECTURAL RULE: no other module may talk to a model API directly.
//! Every provider call is a single attempt; retry policy, if any, belongs to
//! the caller.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;

/// Provider-agnostic result of one remote model call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    /// Model identifier the provider actually used.
    pub model: String,
    pub tokens_used: Option<u32>,
    pub finish_reason: Option<String>,
    /// Raw provider payload, retained for diagnostics.
    pub raw: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider '{provider}' not available; available providers: {}", available.join(", "))]
    Unavailable {
        provider: String,
        available: Vec<String>,
    },

    #[error("[{provider}] {message}")]
    CallFailed { provider: String, message: String },
}

/// Capability contract every model backend implements. All calls are
/// non-blocking; an inherently blocking client would have to be wrapped off
/// the scheduler before it could live behind this trait.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn model(&self) -> &str;

    /// Whether the provider is properly configured and usable.
    fn is_available(&self) -> bool;

    /// Performs one generation call. Never retries.
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<LlmResponse, ProviderError>;
}

/// Names every backend this build knows about, used for the health map.
const KNOWN_PROVIDERS: &[&str] = &["anthropic", "gemini", "openai"];

/// Holds the constructed providers and owns selection policy.
///
/// Providers live in a BTreeMap so enumeration is alphabetical and stable:
/// when "auto" has no configured default, the first *available* provider in
/// alphabetical name order wins. This replaces the insertion-order dependence
/// of earlier designs with a documented, deterministic rule.
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn LlmProvider>>,
    default_provider: String,
}

impl ProviderRegistry {
    /// Builds the registry from configuration. Each provider is attempted
    /// independently; one that cannot be constructed (missing credential) is
    /// omitted rather than aborting startup.
    pub fn from_config(config: &Config) -> Self {
        let mut providers: BTreeMap<String, Arc<dyn LlmProvider>> = BTreeMap::new();

        if let Some(provider) = anthropic::AnthropicProvider::from_settings(&config.anthropic) {
            providers.insert(provider.name().to_string(), Arc::new(provider));
            info!("anthropic provider initialized");
        }
        if let Some(provider) = gemini::GeminiProvider::from_settings(&config.gemini) {
            providers.insert(provider.name().to_string(), Arc::new(provider));
            info!("gemini provider initialized");
        }
        if let Some(provider) = openai::OpenAiProvider::from_settings(&config.openai) {
            providers.insert(provider.name().to_string(), Arc::new(provider));
            info!("openai provider initialized");
        }

        if providers.is_empty() {
            warn!("no LLM providers initialized; check API key configuration");
        }

        Self {
            providers,
            default_provider: config.default_provider.clone(),
        }
    }

    /// Builds a registry from explicit provider instances. Used by tests and
    /// by any embedder that wants to supply its own backends.
    pub fn from_providers(
        default_provider: &str,
        list: Vec<Arc<dyn LlmProvider>>,
    ) -> Self {
        let providers = list
            .into_iter()
            .map(|p| (p.name().to_string(), p))
            .collect();
        Self {
            providers,
            default_provider: default_provider.to_string(),
        }
    }

    /// Names of providers that are both constructed and reporting available.
    pub fn available_names(&self) -> Vec<String> {
        self.providers
            .iter()
            .filter(|(_, p)| p.is_available())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn has_any_provider(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Resolves a provider by name, or by the "auto" policy: "auto" falls
    /// back to the configured default; a default of "auto" (or empty) picks
    /// the alphabetically first available provider.
    pub fn select(&self, requested: &str) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        let mut name = if requested.is_empty() || requested == "auto" {
            self.default_provider.as_str()
        } else {
            requested
        };

        if name.is_empty() || name == "auto" {
            match self
                .providers
                .iter()
                .find(|(_, p)| p.is_available())
                .map(|(n, _)| n.as_str())
            {
                Some(first) => {
                    info!("auto-selected provider: {first}");
                    name = first;
                }
                None => {
                    return Err(ProviderError::Unavailable {
                        provider: "auto".to_string(),
                        available: self.available_names(),
                    })
                }
            }
        }

        let provider = self
            .providers
            .get(name)
            .ok_or_else(|| ProviderError::Unavailable {
                provider: name.to_string(),
                available: self.available_names(),
            })?;

        if !provider.is_available() {
            return Err(ProviderError::Unavailable {
                provider: name.to_string(),
                available: self.available_names(),
            });
        }

        Ok(Arc::clone(provider))
    }

    /// Per-provider availability states for the health endpoint.
    pub fn availability(&self) -> BTreeMap<String, &'static str> {
        let mut status: BTreeMap<String, &'static str> = BTreeMap::new();
        for name in KNOWN_PROVIDERS {
            status.insert(name.to_string(), "not_configured");
        }
        for (name, provider) in &self.providers {
            let state = if provider.is_available() {
                "available"
            } else {
                "configured_but_unavailable"
            };
            status.insert(name.clone(), state);
        }
        status
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Canned provider for registry and orchestrator tests.
    pub struct StubProvider {
        pub provider_name: &'static str,
        pub reply: Result<String, String>,
        pub available: bool,
        pub tokens: Option<u32>,
    }

    impl StubProvider {
        pub fn answering(name: &'static str, reply: &str) -> Self {
            Self {
                provider_name: name,
                reply: Ok(reply.to_string()),
                available: true,
                tokens: Some(1000),
            }
        }

        pub fn failing(name: &'static str, message: &str) -> Self {
            Self {
                provider_name: name,
                reply: Err(message.to_string()),
                available: true,
                tokens: None,
            }
        }
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.provider_name
        }

        fn model(&self) -> &str {
            "stub-model"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn generate(
            &self,
            _prompt: &str,
            _system_prompt: Option<&str>,
        ) -> Result<LlmResponse, ProviderError> {
            match &self.reply {
                Ok(content) => Ok(LlmResponse {
                    content: content.clone(),
                    model: self.model().to_string(),
                    tokens_used: self.tokens,
                    finish_reason: Some("stop".to_string()),
                    raw: serde_json::Value::Null,
                }),
                Err(message) => Err(ProviderError::CallFailed {
                    provider: self.provider_name.to_string(),
                    message: message.clone(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::StubProvider;
    use super::*;

    fn registry_with(default: &str, providers: Vec<StubProvider>) -> ProviderRegistry {
        ProviderRegistry::from_providers(
            default,
            providers
                .into_iter()
                .map(|p| Arc::new(p) as Arc<dyn LlmProvider>)
                .collect(),
        )
    }

    #[test]
    fn test_named_provider_selected() {
        let registry = registry_with(
            "auto",
            vec![
                StubProvider::answering("anthropic", "{}"),
                StubProvider::answering("openai", "{}"),
            ],
        );
        assert_eq!(registry.select("openai").unwrap().name(), "openai");
    }

    #[test]
    fn test_missing_provider_lists_available_names() {
        let registry = registry_with("auto", vec![StubProvider::answering("anthropic", "{}")]);
        let err = registry.select("gemini").err().unwrap();
        match err {
            ProviderError::Unavailable {
                provider,
                available,
            } => {
                assert_eq!(provider, "gemini");
                assert_eq!(available, vec!["anthropic".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unavailable_provider_rejected() {
        let mut stub = StubProvider::answering("openai", "{}");
        stub.available = false;
        let registry = registry_with("auto", vec![stub]);
        let err = registry.select("openai").err().unwrap();
        assert!(matches!(err, ProviderError::Unavailable { .. }));
    }

    #[test]
    fn test_auto_prefers_configured_default() {
        let registry = registry_with(
            "openai",
            vec![
                StubProvider::answering("anthropic", "{}"),
                StubProvider::answering("openai", "{}"),
            ],
        );
        assert_eq!(registry.select("auto").unwrap().name(), "openai");
    }

    #[test]
    fn test_auto_with_auto_default_picks_alphabetical_first() {
        let registry = registry_with(
            "auto",
            vec![
                StubProvider::answering("openai", "{}"),
                StubProvider::answering("anthropic", "{}"),
                StubProvider::answering("gemini", "{}"),
            ],
        );
        assert_eq!(registry.select("auto").unwrap().name(), "anthropic");
    }

    #[test]
    fn test_auto_skips_unavailable_providers() {
        let mut anthropic = StubProvider::answering("anthropic", "{}");
        anthropic.available = false;
        let registry = registry_with(
            "auto",
            vec![anthropic, StubProvider::answering("gemini", "{}")],
        );
        assert_eq!(registry.select("auto").unwrap().name(), "gemini");
    }

    #[test]
    fn test_empty_registry_auto_is_unavailable() {
        let registry = registry_with("auto", vec![]);
        let err = registry.select("auto").err().unwrap();
        assert!(matches!(
            err,
            ProviderError::Unavailable { provider, .. } if provider == "auto"
        ));
    }

    #[test]
    fn test_availability_map_covers_known_providers() {
        let registry = registry_with("auto", vec![StubProvider::answering("anthropic", "{}")]);
        let map = registry.availability();
        assert_eq!(map.get("anthropic"), Some(&"available"));
        assert_eq!(map.get("openai"), Some(&"not_configured"));
        assert_eq!(map.get("gemini"), Some(&"not_configured"));
    }
}
