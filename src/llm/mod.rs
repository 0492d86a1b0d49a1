pub mod anthropic;
pub mod client;
pub mod openai;
pub mod stub;

use std::sync::Arc;

pub use client::LlmClient;

use crate::config::Config;
use crate::dimension::Dimension;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub dimension: Dimension,
}

#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: String,
    pub provider: String,
}

#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
    fn name(&self) -> &str;
}

/// Builds the provider registered under `name`, or `None` for `"none"` and
/// unknown names.
pub fn build_provider(name: &str, config: &Config) -> Option<Arc<dyn Provider>> {
    let provider: Arc<dyn Provider> = match name {
        "openai" => Arc::new(openai::OpenAIProvider::new(
            config.openai_api_key.as_deref().unwrap_or(""),
        )),
        "ollama" => Arc::new(openai::OpenAIProvider::new_ollama(&config.ollama_base_url)),
        "anthropic" => Arc::new(anthropic::AnthropicProvider::new(
            config.anthropic_api_key.as_deref().unwrap_or(""),
        )),
        "stub" => Arc::new(stub::StubProvider),
        _ => return None,
    };
    Some(provider)
}
