use std::collections::BTreeMap;

use futures::stream::{FuturesUnordered, StreamExt};

use super::aggregate::merge_results;
use super::request::{Analyzer, RequestError};
use super::state::AnalysisRunState;
use crate::analysis::{AnalysisRequest, AnalysisResult, InputKind, ValidationError};
use crate::dimension::Dimension;
use crate::report::DimensionResults;

pub type Outcome = Result<AnalysisResult, RequestError>;
pub type Outcomes = BTreeMap<Dimension, Outcome>;

/// Rendering boundary for a run.
pub trait RunObserver {
    /// Called after each dimension settles, successful or not.
    fn on_progress(&mut self, _state: &AnalysisRunState) {}

    /// Called once, after every dimension settled.
    fn on_complete(&mut self, _results: &DimensionResults) {}
}

impl RunObserver for () {}

/// Analyzes all six dimensions concurrently and waits for every one to
/// settle. A failing dimension never cancels the others.
///
/// The requests are polled together on the calling task. Dropping the
/// returned future abandons every in-flight attempt and backoff.
#[tracing::instrument(
    name = "run_analysis",
    skip_all,
    fields(input.type = %request.kind(), run.failed)
)]
pub async fn run_analysis<A, O>(analyzer: &A, request: &AnalysisRequest, observer: &mut O) -> Outcomes
where
    A: Analyzer + ?Sized,
    O: RunObserver + ?Sized,
{
    let mut state = AnalysisRunState::new(request.clone());
    let mut outcomes = Outcomes::new();

    let mut pending: FuturesUnordered<_> = Dimension::ALL
        .into_iter()
        .map(|dimension| async move { (dimension, analyzer.analyze(dimension, request).await) })
        .collect();
    state.mark_dispatched();
    tracing::info!(dimensions = Dimension::COUNT, "Dispatched analysis requests");

    while let Some((dimension, outcome)) = pending.next().await {
        if state.settle(dimension, &outcome) {
            match &outcome {
                Ok(_) => tracing::info!(%dimension, completed = state.completed(), "Dimension settled"),
                Err(err) => tracing::warn!(%dimension, error = %err, "Dimension failed"),
            }
            outcomes.insert(dimension, outcome);
            observer.on_progress(&state);
        }
    }

    let failed = outcomes.values().filter(|o| o.is_err()).count();
    tracing::Span::current().record("run.failed", failed);

    observer.on_complete(&merge_results(&outcomes));
    outcomes
}

/// Validates raw input and, only if it is valid, runs the analysis.
pub async fn submit<A, O>(
    analyzer: &A,
    input: &str,
    kind: InputKind,
    observer: &mut O,
) -> Result<Outcomes, ValidationError>
where
    A: Analyzer + ?Sized,
    O: RunObserver + ?Sized,
{
    let request = AnalysisRequest::new(input, kind)?;
    Ok(run_analysis(analyzer, &request, observer).await)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use chrono::Utc;
    use tokio::time::Instant;

    use super::*;
    use crate::client::progress::Progress;

    /// Answers each dimension after a fixed delay, failing the listed ones.
    #[derive(Default)]
    struct Scripted {
        delays_ms: HashMap<Dimension, u64>,
        failing: Vec<Dimension>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Analyzer for Scripted {
        async fn analyze(
            &self,
            dimension: Dimension,
            request: &AnalysisRequest,
        ) -> Result<AnalysisResult, RequestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = self.delays_ms.get(&dimension).copied().unwrap_or(10);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            if self.failing.contains(&dimension) {
                return Err(RequestError::Status {
                    status: 500,
                    reason: "Internal Server Error".to_string(),
                });
            }
            Ok(AnalysisResult {
                content: format!("{dimension}: {}", request.input()),
                dimension,
                timestamp: Utc::now(),
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        progress: Vec<(Progress, Vec<Dimension>)>,
        completed: Vec<DimensionResults>,
    }

    impl RunObserver for Recorder {
        fn on_progress(&mut self, state: &AnalysisRunState) {
            self.progress
                .push((state.progress(), state.results().keys().copied().collect()));
        }

        fn on_complete(&mut self, results: &DimensionResults) {
            self.completed.push(results.clone());
        }
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("Meet me at Jane's house on 5th Ave tonight", InputKind::Text).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_six_dispatched_concurrently() {
        let analyzer = Scripted {
            delays_ms: Dimension::ALL
                .iter()
                .enumerate()
                .map(|(i, d)| (*d, 100 * (i as u64 + 1)))
                .collect(),
            ..Default::default()
        };

        let start = Instant::now();
        let outcomes = run_analysis(&analyzer, &request(), &mut ()).await;

        // concurrent: bounded by the slowest call, not the sum
        assert_eq!(start.elapsed(), Duration::from_millis(600));
        assert_eq!(outcomes.len(), 6);
        assert!(outcomes.values().all(Result::is_ok));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_become_placeholders_and_run_completes() {
        let analyzer = Scripted {
            failing: vec![Dimension::Inference, Dimension::Manipulability],
            ..Default::default()
        };
        let mut recorder = Recorder::default();

        let outcomes = run_analysis(&analyzer, &request(), &mut recorder).await;

        assert_eq!(outcomes.len(), 6);
        assert!(outcomes[&Dimension::Inference].is_err());
        assert!(outcomes[&Dimension::Exposure].is_ok());

        assert_eq!(recorder.completed.len(), 1);
        let results = &recorder.completed[0];
        assert_eq!(results.keys().copied().collect::<Vec<_>>(), Dimension::ALL.to_vec());
        assert_eq!(
            results[&Dimension::Manipulability],
            "Analysis failed: manipulability: HTTP 500: Internal Server Error"
        );
        assert_eq!(
            results[&Dimension::Exposure],
            "exposure: Meet me at Jane's house on 5th Ave tonight"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_follows_arrival_order() {
        // reverse declaration order of arrival
        let analyzer = Scripted {
            delays_ms: Dimension::ALL
                .iter()
                .enumerate()
                .map(|(i, d)| (*d, 100 * (6 - i as u64)))
                .collect(),
            failing: vec![Dimension::Platforms],
            ..Default::default()
        };
        let mut recorder = Recorder::default();

        run_analysis(&analyzer, &request(), &mut recorder).await;

        assert_eq!(recorder.progress.len(), 6);
        let completed: Vec<usize> = recorder.progress.iter().map(|(p, _)| p.completed).collect();
        assert_eq!(completed, vec![1, 2, 3, 4, 5, 6]);

        let (halfway, settled) = &recorder.progress[2];
        assert_eq!(halfway.percent, 50);
        assert_eq!(halfway.eta_seconds, 6);
        assert_eq!(
            settled,
            &vec![Dimension::Platforms, Dimension::Amplification, Dimension::Manipulability]
        );
        assert!(recorder.progress[5].0.is_done());
    }

    #[tokio::test]
    async fn test_short_text_issues_no_request() {
        let analyzer = Scripted::default();
        let mut recorder = Recorder::default();

        let err = submit(&analyzer, "hi there", InputKind::Text, &mut recorder)
            .await
            .unwrap_err();

        assert_eq!(err, ValidationError::TextTooShort { chars: 8 });
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
        assert!(recorder.progress.is_empty());
        assert!(recorder.completed.is_empty());
    }

    #[tokio::test]
    async fn test_non_http_url_issues_no_request() {
        let analyzer = Scripted::default();
        let err = submit(&analyzer, "ftp://example.com", InputKind::Url, &mut ())
            .await
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidUrl);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_run_abandons_pending_requests() {
        let analyzer = Scripted {
            delays_ms: Dimension::ALL.iter().map(|d| (*d, 60_000)).collect(),
            ..Default::default()
        };
        let finished = Mutex::new(false);

        let run = async {
            run_analysis(&analyzer, &request(), &mut ()).await;
            *finished.lock().unwrap() = true;
        };
        let timed_out = tokio::time::timeout(Duration::from_secs(1), run).await;

        assert!(timed_out.is_err());
        assert!(!*finished.lock().unwrap());
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 6);
    }
}
