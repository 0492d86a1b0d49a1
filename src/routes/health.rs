use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let openai_key = if state.config.openai_api_key.is_some() {
        "Set"
    } else {
        "NOT SET"
    };

    Json(json!({
        "status": "ok",
        "model": state.model.model,
        "mode": state.config.analysis_mode,
        "openaiKey": openai_key,
        "provider": state.llm_client.primary.name(),
        "service": "privacy-prism",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
