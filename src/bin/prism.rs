//! Terminal frontend: analyzes a text or URL against a running server and
//! prints the six summaries.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use privacy_prism::Dimension;
use privacy_prism::analysis::{AnalysisRequest, InputKind};
use privacy_prism::client::{
    AnalysisRunState, ClientConfig, DEFAULT_API_BASE_URL, Progress, RequestClient, RunObserver,
    merge_results, run_analysis,
};
use privacy_prism::report::{DEFAULT_FOOTER, DimensionResults, ReportRequest};

#[derive(Parser, Debug)]
#[command(
    name = "prism",
    about = "Analyze a post or URL for privacy risks across six dimensions",
    version,
    long_about = None
)]
#[command(group(ArgGroup::new("input").required(true).args(["text", "url"])))]
struct Args {
    /// Text to analyze
    #[arg(long)]
    text: Option<String>,

    /// URL to analyze
    #[arg(long)]
    url: Option<String>,

    /// Base URL of the analysis server
    #[arg(long, env = "PRISM_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    api: String,

    /// Per-attempt timeout in seconds
    #[arg(long, default_value_t = 25)]
    timeout_secs: u64,

    /// Attempts per dimension
    #[arg(long, default_value_t = 2)]
    attempts: u32,

    /// Print results as a JSON object
    #[arg(long)]
    json: bool,

    /// Also export the report as a PDF to this file
    #[arg(long)]
    pdf: Option<PathBuf>,
}

impl Args {
    fn request(&self) -> Result<AnalysisRequest, privacy_prism::analysis::ValidationError> {
        match (&self.text, &self.url) {
            (Some(text), _) => AnalysisRequest::new(text, InputKind::Text),
            (None, Some(url)) => AnalysisRequest::new(url, InputKind::Url),
            (None, None) => AnalysisRequest::new("", InputKind::Text),
        }
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            attempt_timeout: Duration::from_secs(self.timeout_secs),
            max_attempts: self.attempts.max(1),
            ..ClientConfig::with_base_url(&self.api)
        }
    }
}

/// Writes progress lines to stderr so stdout carries only the results.
#[derive(Default)]
struct TerminalObserver {
    seen: BTreeSet<Dimension>,
}

impl RunObserver for TerminalObserver {
    fn on_progress(&mut self, state: &AnalysisRunState) {
        let progress = state.progress();
        for dimension in state.results().keys() {
            if self.seen.insert(*dimension) {
                eprintln!(
                    "Completed {dimension} analysis ({}/{})",
                    progress.completed, progress.total
                );
            }
        }
        eprintln!("{progress}");
    }

    fn on_complete(&mut self, _results: &DimensionResults) {
        eprintln!("Analysis complete");
    }
}

fn print_results(results: &DimensionResults, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    for (dimension, text) in results {
        println!("{}", dimension.title());
        println!("{text}");
        println!();
    }
    Ok(())
}

async fn export(
    client: &RequestClient,
    request: &AnalysisRequest,
    results: DimensionResults,
    path: &PathBuf,
) -> anyhow::Result<bool> {
    let report = ReportRequest {
        content: request.input().to_string(),
        results,
        timestamp: chrono::Local::now()
            .format("%B %-d, %Y at %I:%M %p")
            .to_string(),
        footer_text: Some(DEFAULT_FOOTER.to_string()),
    };

    match client.export_report(&report).await {
        Ok(bytes) => {
            tokio::fs::write(path, &bytes)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Saved report to {}", path.display());
            Ok(true)
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let request = match args.request() {
        Ok(request) => request,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(ExitCode::from(2));
        }
    };

    let client = RequestClient::new(args.client_config());
    let mut observer = TerminalObserver::default();
    eprintln!("{}", Progress::start());

    let outcomes = tokio::select! {
        outcomes = run_analysis(&client, &request, &mut observer) => outcomes,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Analysis cancelled");
            return Ok(ExitCode::from(130));
        }
    };

    let results = merge_results(&outcomes);
    print_results(&results, args.json)?;

    if let Some(path) = &args.pdf
        && !export(&client, &request, results, path).await?
    {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
