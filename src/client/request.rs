use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use super::ClientConfig;
use crate::analysis::{AnalysisRequest, AnalysisResult};
use crate::dimension::Dimension;
use crate::retry::with_retry_notify;

/// Why one attempt (and, after retries, one dimension) failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("invalid response: {0}")]
    Decode(String),
}

impl RequestError {
    pub(super) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            RequestError::Timeout(timeout)
        } else if err.is_decode() {
            RequestError::Decode(err.to_string())
        } else {
            RequestError::Network(err.to_string())
        }
    }
}

/// Produces one dimension's analysis for a validated request.
#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        dimension: Dimension,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, RequestError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the analysis and report endpoints.
#[derive(Clone)]
pub struct RequestClient {
    pub(super) http: reqwest::Client,
    pub(super) config: ClientConfig,
}

impl RequestClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn attempt(
        &self,
        dimension: Dimension,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, RequestError> {
        let timeout = self.config.attempt_timeout;
        let response = self
            .http
            .post(self.url(&format!("/api/analyze/{dimension}")))
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| RequestError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let result: AnalysisResult = response
            .json()
            .await
            .map_err(|e| RequestError::from_reqwest(e, timeout))?;

        if result.dimension != dimension {
            return Err(RequestError::Decode(format!(
                "expected {dimension} result, got {}",
                result.dimension
            )));
        }

        Ok(result)
    }

    /// Requests one dimension, retrying per the configured policy. Returns
    /// the last error once every attempt failed.
    pub async fn analyze_dimension(
        &self,
        dimension: Dimension,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, RequestError> {
        let policy = self.config.retry_policy();

        let result = with_retry_notify(
            &policy,
            |attempt| {
                tracing::debug!(%dimension, attempt, max_attempts = policy.max_attempts, "Sending analysis request");
                self.attempt(dimension, request)
            },
            |attempt, err, next_delay| match next_delay {
                Some(delay) => tracing::warn!(
                    %dimension,
                    attempt,
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Analysis attempt failed, retrying"
                ),
                None => tracing::error!(
                    %dimension,
                    attempts = attempt,
                    error = %err,
                    "Analysis failed after all attempts"
                ),
            },
        )
        .await?;

        tracing::debug!(%dimension, content_chars = result.content.chars().count(), "Analysis received");
        Ok(result)
    }
}

#[async_trait::async_trait]
impl Analyzer for RequestClient {
    async fn analyze(
        &self,
        dimension: Dimension,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, RequestError> {
        self.analyze_dimension(dimension, request).await
    }
}

pub(super) fn status_error(status: StatusCode, body: &str) -> RequestError {
    let reason = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .ok()
        .filter(|e| !e.is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_default();

    RequestError::Status {
        status: status.as_u16(),
        reason,
    }
}
