use super::aggregate::settled_text;
use super::progress::Progress;
use super::request::RequestError;
use crate::analysis::{AnalysisRequest, AnalysisResult};
use crate::dimension::Dimension;
use crate::report::DimensionResults;

/// Lifecycle of one run. Between runs there is no state value at all, which
/// is the idle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Input validated, requests not yet dispatched.
    Running,
    /// All six dispatched, zero or more settled.
    Settling,
    /// Every dimension settled.
    Complete,
}

/// Mutable state of a single analysis run, owned by whoever drives it.
#[derive(Debug, Clone)]
pub struct AnalysisRunState {
    request: AnalysisRequest,
    results: DimensionResults,
    phase: RunPhase,
}

impl AnalysisRunState {
    pub fn new(request: AnalysisRequest) -> Self {
        Self {
            request,
            results: DimensionResults::new(),
            phase: RunPhase::Running,
        }
    }

    pub fn mark_dispatched(&mut self) {
        if self.phase == RunPhase::Running {
            self.phase = RunPhase::Settling;
        }
    }

    /// Records a settled dimension. A dimension settles once; later outcomes
    /// for it are ignored and `false` is returned.
    pub fn settle(
        &mut self,
        dimension: Dimension,
        outcome: &Result<AnalysisResult, RequestError>,
    ) -> bool {
        if self.results.contains_key(&dimension) {
            return false;
        }
        self.results
            .insert(dimension, settled_text(dimension, outcome));
        if self.completed() == self.total() {
            self.phase = RunPhase::Complete;
        }
        true
    }

    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    pub fn results(&self) -> &DimensionResults {
        &self.results
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != RunPhase::Complete
    }

    pub fn completed(&self) -> usize {
        self.results.len()
    }

    pub fn total(&self) -> usize {
        Dimension::COUNT
    }

    pub fn progress(&self) -> Progress {
        Progress::new(self.completed(), self.total())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::analysis::InputKind;

    fn state() -> AnalysisRunState {
        AnalysisRunState::new(AnalysisRequest::new("https://example.com/p/1", InputKind::Url).unwrap())
    }

    fn ok(dimension: Dimension) -> Result<AnalysisResult, RequestError> {
        Ok(AnalysisResult {
            content: format!("{dimension} ok"),
            dimension,
            timestamp: Utc::now(),
        })
    }

    #[test]
    fn test_phases() {
        let mut state = state();
        assert_eq!(state.phase(), RunPhase::Running);
        assert_eq!(state.progress(), Progress::start());

        state.mark_dispatched();
        assert_eq!(state.phase(), RunPhase::Settling);

        for dimension in Dimension::ALL {
            assert!(state.is_running());
            assert!(state.settle(dimension, &ok(dimension)));
        }
        assert_eq!(state.phase(), RunPhase::Complete);
        assert!(!state.is_running());
        assert!(state.progress().is_done());
    }

    #[test]
    fn test_settle_is_keyed_and_idempotent() {
        let mut state = state();
        state.mark_dispatched();

        assert!(state.settle(Dimension::Inference, &ok(Dimension::Inference)));
        assert!(!state.settle(
            Dimension::Inference,
            &Err(RequestError::Network("late".to_string()))
        ));

        assert_eq!(state.completed(), 1);
        assert_eq!(state.results()[&Dimension::Inference], "inference ok");
    }

    #[test]
    fn test_failure_stored_as_placeholder() {
        let mut state = state();
        state.settle(
            Dimension::Exposure,
            &Err(RequestError::Timeout(std::time::Duration::from_secs(25))),
        );
        assert_eq!(
            state.results()[&Dimension::Exposure],
            "Analysis failed: exposure: request timed out after 25s"
        );
    }
}
