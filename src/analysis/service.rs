use chrono::Utc;
use opentelemetry::KeyValue;

use super::prompts::{system_prompt, user_prompt};
use super::{AnalysisRequest, AnalysisResult};
use crate::dimension::Dimension;
use crate::error::AppError;
use crate::llm::{GenerateRequest, LlmClient};
use crate::telemetry::metrics::ANALYSIS_REQUESTS;

/// Model parameters applied to every dimension prompt.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[tracing::instrument(
    name = "analyze_dimension",
    skip(llm_client, settings, request),
    fields(
        privacy.dimension = %dimension,
        privacy.input_type = %request.kind(),
        privacy.input_chars = request.input().chars().count(),
        privacy.content_chars,
    )
)]
pub async fn analyze_dimension(
    llm_client: &LlmClient,
    settings: &ModelSettings,
    dimension: Dimension,
    request: &AnalysisRequest,
) -> Result<AnalysisResult, AppError> {
    tracing::info!("Analysis request received");

    let outcome = llm_client
        .generate(&GenerateRequest {
            model: settings.model.clone(),
            system: system_prompt(dimension),
            prompt: user_prompt(dimension, request.input()),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            dimension,
        })
        .await;

    let dimension_kv = KeyValue::new("privacy.dimension", dimension.as_str());
    let resp = match outcome {
        Ok(resp) => {
            ANALYSIS_REQUESTS.add(1, &[dimension_kv, KeyValue::new("outcome", "success")]);
            resp
        }
        Err(err) => {
            ANALYSIS_REQUESTS.add(1, &[dimension_kv, KeyValue::new("outcome", "error")]);
            return Err(AppError::Analysis {
                dimension,
                message: err.to_string(),
            });
        }
    };

    tracing::Span::current().record("privacy.content_chars", resp.content.chars().count());
    tracing::info!(provider = %resp.provider, "Analysis completed");

    Ok(AnalysisResult {
        content: resp.content,
        dimension,
        timestamp: Utc::now(),
    })
}
