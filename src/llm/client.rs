use std::sync::Arc;
use std::time::Instant;

use opentelemetry::KeyValue;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::{GenerateRequest, GenerateResponse, Provider};
use crate::retry::{RetryPolicy, with_retry_notify};
use crate::telemetry::metrics::{
    GEN_AI_ERROR_COUNT, GEN_AI_FALLBACK_COUNT, GEN_AI_OPERATION_DURATION, GEN_AI_RETRY_COUNT,
    GEN_AI_TOKEN_USAGE,
};

pub struct LlmClient {
    pub primary: Arc<dyn Provider>,
    pub fallback: Option<Arc<dyn Provider>>,
    pub fallback_model: String,
    pub retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(primary: Arc<dyn Provider>, retry: RetryPolicy) -> Self {
        Self {
            primary,
            fallback: None,
            fallback_model: String::new(),
            retry,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn Provider>, model: &str) -> Self {
        self.fallback = Some(fallback);
        self.fallback_model = model.to_string();
        self
    }

    async fn generate_once(
        &self,
        provider: &dyn Provider,
        req: &GenerateRequest,
    ) -> anyhow::Result<GenerateResponse> {
        let provider_name = provider.name();
        let start = Instant::now();

        let span = tracing::info_span!(
            "gen_ai.chat",
            otel.name = %format!("gen_ai.chat {}", req.model),
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = %provider_name,
            gen_ai.request.model = %req.model,
            gen_ai.request.temperature = req.temperature,
            gen_ai.request.max_tokens = req.max_tokens as i64,
            gen_ai.response.model = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
            privacy.dimension = %req.dimension,
            otel.status_code = tracing::field::Empty,
            error.type = tracing::field::Empty,
        );

        span.add_event(
            "gen_ai.user.message",
            vec![KeyValue::new("gen_ai.prompt", truncate(&req.prompt, 1000))],
        );

        let result = provider.generate(req).instrument(span.clone()).await;
        let duration = start.elapsed().as_secs_f64();

        let provider_kv = KeyValue::new("gen_ai.provider.name", provider_name.to_string());
        let model_kv = KeyValue::new("gen_ai.request.model", req.model.clone());

        match result {
            Ok(mut resp) => {
                resp.provider = provider_name.to_string();

                span.record("gen_ai.response.model", resp.model.as_str());
                span.record("gen_ai.usage.input_tokens", resp.input_tokens as i64);
                span.record("gen_ai.usage.output_tokens", resp.output_tokens as i64);
                if !resp.finish_reason.is_empty() {
                    span.record("gen_ai.response.finish_reasons", resp.finish_reason.as_str());
                }

                for (token_type, count) in [("input", resp.input_tokens), ("output", resp.output_tokens)] {
                    GEN_AI_TOKEN_USAGE.record(
                        f64::from(count),
                        &[
                            KeyValue::new("gen_ai.token.type", token_type),
                            provider_kv.clone(),
                            model_kv.clone(),
                        ],
                    );
                }
                GEN_AI_OPERATION_DURATION.record(duration, &[provider_kv, model_kv]);

                Ok(resp)
            }
            Err(err) => {
                span.record("otel.status_code", "ERROR");
                span.record("error.type", classify_error(&err));
                GEN_AI_ERROR_COUNT.add(1, &[provider_kv, model_kv]);
                Err(err)
            }
        }
    }

    async fn generate_with_retry(
        &self,
        provider: &dyn Provider,
        req: &GenerateRequest,
    ) -> anyhow::Result<GenerateResponse> {
        with_retry_notify(
            &self.retry,
            |_| self.generate_once(provider, req),
            |attempt, err, next_delay| {
                tracing::warn!(
                    attempt,
                    max_attempts = self.retry.max_attempts,
                    provider = provider.name(),
                    model = %req.model,
                    dimension = %req.dimension,
                    error = %err,
                    retry_in_ms = next_delay.map(|d| d.as_millis() as u64),
                    "LLM call failed"
                );
                if next_delay.is_some() {
                    GEN_AI_RETRY_COUNT.add(
                        1,
                        &[KeyValue::new("gen_ai.provider.name", provider.name().to_string())],
                    );
                }
            },
        )
        .await
    }

    /// Sends `req` to the primary provider, then to the fallback (with the
    /// fallback model) if the primary exhausted its attempts.
    pub async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let primary_err = match self.generate_with_retry(self.primary.as_ref(), req).await {
            Ok(resp) => return Ok(resp),
            Err(err) => err,
        };

        let Some(fallback) = self.fallback.as_ref() else {
            return Err(primary_err);
        };

        tracing::warn!(
            primary_provider = self.primary.name(),
            fallback_provider = fallback.name(),
            error = %primary_err,
            "Primary provider failed, falling back"
        );
        GEN_AI_FALLBACK_COUNT.add(1, &[]);

        let fallback_req = GenerateRequest {
            model: self.fallback_model.clone(),
            ..req.clone()
        };
        self.generate_with_retry(fallback.as_ref(), &fallback_req)
            .await
    }
}

fn classify_error(err: &anyhow::Error) -> &'static str {
    let msg = err.to_string().to_lowercase();
    if msg.contains("rate limit") || msg.contains("429") {
        "rate_limit"
    } else if msg.contains("timeout") || msg.contains("timed out") {
        "timeout"
    } else if msg.contains("401") || msg.contains("403") || msg.contains("api key") {
        "auth_error"
    } else if msg.contains("500") || msg.contains("502") || msg.contains("503") {
        "server_error"
    } else if msg.contains("connect") || msg.contains("dns") {
        "network_error"
    } else {
        "unknown_error"
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
