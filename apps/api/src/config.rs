use anyhow::{Context, Result};

/// Per-provider model settings. A provider with no API key is treated as
/// unconfigured and never constructed.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ProviderSettings {
    fn from_env(prefix: &str, default_model: &str) -> Result<Self> {
        Ok(ProviderSettings {
            api_key: optional_env(&format!("{prefix}_API_KEY")),
            model: std::env::var(format!("{prefix}_MODEL"))
                .unwrap_or_else(|_| default_model.to_string()),
            temperature: parse_env(&format!("{prefix}_TEMPERATURE"), 0.3)?,
            max_tokens: parse_env(&format!("{prefix}_MAX_TOKENS"), 4000)?,
        })
    }
}

/// Application configuration loaded from environment variables.
/// Every value has a default; only provider API keys gate functionality.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic: ProviderSettings,
    pub gemini: ProviderSettings,
    pub openai: ProviderSettings,
    pub default_provider: String,
    pub default_prompt_version: String,
    pub database_path: String,
    pub max_file_size_mb: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic: ProviderSettings::from_env("ANTHROPIC", "claude-3-5-sonnet-20241022")?,
            gemini: ProviderSettings::from_env("GEMINI", "gemini-1.5-pro")?,
            openai: ProviderSettings::from_env("OPENAI", "gpt-4-turbo-preview")?,
            default_provider: std::env::var("DEFAULT_LLM_PROVIDER")
                .unwrap_or_else(|_| "auto".to_string()),
            default_prompt_version: std::env::var("DEFAULT_PROMPT_VERSION")
                .unwrap_or_else(|_| "v1".to_string()),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/audit.db".to_string()),
            max_file_size_mb: parse_env("MAX_FILE_SIZE_MB", 10)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("'{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
