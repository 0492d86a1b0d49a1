//! Drives the real router over TCP with the offline provider.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};

use privacy_prism::analysis::{AnalysisRequest, InputKind};
use privacy_prism::client::{
    AnalysisRunState, ClientConfig, RequestClient, RequestError, RunObserver, merge_results,
    run_analysis, submit,
};
use privacy_prism::llm::LlmClient;
use privacy_prism::llm::stub::StubProvider;
use privacy_prism::report::{DimensionResults, ReportRequest};
use privacy_prism::retry::RetryPolicy;
use privacy_prism::{AppState, Config, Dimension, routes};

async fn spawn_server() -> String {
    let config = Config::from_lookup(|key| match key {
        "LLM_PROVIDER" => Some("stub".to_string()),
        _ => None,
    })
    .unwrap();
    let llm_client = LlmClient::new(
        Arc::new(StubProvider),
        RetryPolicy::linear(1, Duration::ZERO),
    );
    let app = routes::create_router(AppState::new(config, Arc::new(llm_client)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

#[derive(Default)]
struct Counting {
    progress_events: usize,
    last_percent: u32,
    completions: usize,
}

impl RunObserver for Counting {
    fn on_progress(&mut self, state: &AnalysisRunState) {
        self.progress_events += 1;
        self.last_percent = state.progress().percent;
    }

    fn on_complete(&mut self, _results: &DimensionResults) {
        self.completions += 1;
    }
}

#[tokio::test]
async fn test_full_run_against_server() {
    let base_url = spawn_server().await;
    let client = RequestClient::new(ClientConfig::with_base_url(&base_url));
    let request = assert_ok!(AnalysisRequest::new(
        "Just checked in at the Riverside clinic, appointment with Dr. Patel at 3pm",
        InputKind::Text,
    ));
    let mut observer = Counting::default();

    let outcomes = run_analysis(&client, &request, &mut observer).await;

    assert_eq!(outcomes.len(), Dimension::COUNT);
    for (dimension, outcome) in &outcomes {
        let result = outcome.as_ref().unwrap();
        assert_eq!(result.dimension, *dimension);
        assert!(result.content.starts_with("Risk score"), "{}", result.content);
    }
    assert_eq!(observer.progress_events, 6);
    assert_eq!(observer.last_percent, 100);
    assert_eq!(observer.completions, 1);

    let results = merge_results(&outcomes);
    assert_eq!(
        results[&Dimension::Amplification],
        "Risk score 0.9. High potential for data amplification across networks."
    );
}

#[tokio::test]
async fn test_export_returns_pdf() {
    let base_url = spawn_server().await;
    let client = RequestClient::new(ClientConfig::with_base_url(&base_url));

    let report = ReportRequest {
        content: "Just checked in at the Riverside clinic".to_string(),
        results: Dimension::ALL
            .iter()
            .map(|d| (*d, format!("Findings for {d}.")))
            .collect(),
        timestamp: "October 18, 2026 at 09:30 AM".to_string(),
        footer_text: None,
    };

    let bytes = assert_ok!(client.export_report(&report).await);
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_invalid_input_never_reaches_server() {
    let base_url = spawn_server().await;
    let client = RequestClient::new(ClientConfig::with_base_url(&base_url));

    assert_err!(submit(&client, "   ", InputKind::Text, &mut ()).await);
    assert_err!(submit(&client, "not a url", InputKind::Url, &mut ()).await);
}

#[tokio::test]
async fn test_unreachable_server_yields_placeholders() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig {
        max_attempts: 1,
        ..ClientConfig::with_base_url(&format!("http://{addr}"))
    };
    let client = RequestClient::new(config);
    let request = assert_ok!(AnalysisRequest::new("https://example.com/post/1", InputKind::Url));

    let outcomes = run_analysis(&client, &request, &mut ()).await;
    assert!(
        outcomes
            .values()
            .all(|o| matches!(o, Err(RequestError::Network(_))))
    );

    let results = merge_results(&outcomes);
    assert_eq!(results.len(), 6);
    assert!(results[&Dimension::Exposure].starts_with("Analysis failed: exposure: network error"));
}
