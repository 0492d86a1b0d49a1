use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub llm_provider: String,
    pub llm_model: String,
    pub fallback_provider: String,
    pub fallback_model: String,
    pub analysis_mode: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub llm_max_attempts: u32,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub ollama_base_url: String,
    pub static_dir: Option<PathBuf>,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let secret = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            port: parse(&lookup, "APP_PORT", 5000)?,
            environment: var("SCOUT_ENVIRONMENT", "development"),
            llm_provider: var("LLM_PROVIDER", "openai"),
            llm_model: var("LLM_MODEL", "gpt-4o-mini"),
            fallback_provider: var("FALLBACK_PROVIDER", "none"),
            fallback_model: var("FALLBACK_MODEL", "claude-haiku-4-5-20251001"),
            analysis_mode: var("ANALYSIS_MODE", "A"),
            max_tokens: parse(&lookup, "LLM_MAX_TOKENS", 500)?,
            temperature: parse(&lookup, "LLM_TEMPERATURE", 0.1)?,
            llm_max_attempts: parse(&lookup, "LLM_MAX_ATTEMPTS", 2)?,
            openai_api_key: secret("OPENAI_API_KEY"),
            anthropic_api_key: secret("ANTHROPIC_API_KEY"),
            ollama_base_url: var("OLLAMA_BASE_URL", "http://localhost:11434"),
            static_dir: lookup("STATIC_DIR").map(PathBuf::from),
            otel_service_name: var("OTEL_SERVICE_NAME", "privacy-prism"),
            otel_exporter_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT", "http://localhost:4317"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        None => Ok(default),
    }
}
