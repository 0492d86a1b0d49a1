use super::{GenerateRequest, GenerateResponse, Provider};
use crate::dimension::Dimension;

/// Offline provider returning a fixed assessment per dimension. Used for local
/// development without an API key and by the end-to-end tests.
pub struct StubProvider;

pub const STUB_MODEL: &str = "stub";

fn canned(dimension: Dimension) -> (f32, &'static str) {
    match dimension {
        Dimension::Exposure => (0.7, "You have a fair amount of data exposure risk."),
        Dimension::Inference => (0.4, "Some personal inferences can be drawn from your data."),
        Dimension::Audience => (0.6, "Your audience exposure level is medium."),
        Dimension::Platforms => (0.8, "Platforms are moderately privacy-conscious."),
        Dimension::Amplification => (0.9, "High potential for data amplification across networks."),
        Dimension::Manipulability => (0.5, "Moderate potential for data manipulation."),
    }
}

#[async_trait::async_trait]
impl Provider for StubProvider {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let (score, summary) = canned(req.dimension);
        let content = format!("Risk score {score:.1}. {summary}");

        Ok(GenerateResponse {
            output_tokens: content.split_whitespace().count() as u32,
            input_tokens: req.prompt.split_whitespace().count() as u32,
            content,
            model: STUB_MODEL.to_string(),
            finish_reason: "stop".to_string(),
            provider: String::new(),
        })
    }

    fn name(&self) -> &str {
        "stub"
    }
}
