//! Client side of an analysis run: per-dimension requests, concurrent
//! dispatch, progress and aggregation of the six summaries.

pub mod aggregate;
pub mod dispatcher;
pub mod export;
pub mod progress;
pub mod request;
pub mod state;

use std::time::Duration;

use crate::retry::RetryPolicy;

pub use aggregate::{failure_placeholder, merge_results};
pub use dispatcher::{Outcome, Outcomes, RunObserver, run_analysis, submit};
pub use export::ExportError;
pub use progress::Progress;
pub use request::{Analyzer, RequestClient, RequestError};
pub use state::{AnalysisRunState, RunPhase};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Bound on a single attempt, not on the whole retry sequence.
    pub attempt_timeout: Duration,
    pub max_attempts: u32,
    pub backoff_step: Duration,
    pub export_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            attempt_timeout: Duration::from_secs(25),
            max_attempts: 2,
            backoff_step: Duration::from_millis(1000),
            export_timeout: Duration::from_secs(60),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::linear(self.max_attempts, self.backoff_step)
    }
}
