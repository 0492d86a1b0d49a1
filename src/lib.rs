pub mod analysis;
pub mod client;
pub mod config;
pub mod dimension;
pub mod error;
pub mod llm;
pub mod report;
pub mod retry;
pub mod routes;
pub mod telemetry;

use std::sync::Arc;

use analysis::service::ModelSettings;
pub use config::Config;
pub use dimension::Dimension;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm_client: Arc<llm::LlmClient>,
    pub model: ModelSettings,
}

impl AppState {
    pub fn new(config: Config, llm_client: Arc<llm::LlmClient>) -> Self {
        let model = ModelSettings {
            model: config.llm_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };
        Self {
            config,
            llm_client,
            model,
        }
    }
}
