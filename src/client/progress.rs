use std::fmt;

use crate::dimension::Dimension;

/// Completion feedback derived from the number of settled dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
    pub eta_seconds: u64,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        let completed = completed.min(total);
        let percent = if total == 0 {
            100
        } else {
            (100.0 * completed as f64 / total as f64).round() as u32
        };
        let remaining = (total - completed) as u64;

        Self {
            completed,
            total,
            percent,
            eta_seconds: (2 * remaining).max(5),
        }
    }

    /// Progress at the start of a run.
    pub fn start() -> Self {
        Self::new(0, Dimension::COUNT)
    }

    pub fn is_done(&self) -> bool {
        self.completed == self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ANALYZING... {}% (~{}s remaining)",
            self.percent, self.eta_seconds
        )
    }
}
