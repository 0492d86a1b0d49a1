use super::dispatcher::Outcomes;
use super::request::RequestError;
use crate::analysis::AnalysisResult;
use crate::dimension::Dimension;
use crate::report::DimensionResults;

const NOT_RECEIVED: &str = "no result received";

/// Text shown in place of a dimension whose analysis did not succeed.
pub fn failure_placeholder(dimension: Dimension, reason: &str) -> String {
    format!("Analysis failed: {dimension}: {reason}")
}

/// Text recorded for one settled dimension.
pub fn settled_text(dimension: Dimension, outcome: &Result<AnalysisResult, RequestError>) -> String {
    match outcome {
        Ok(result) => result.content.clone(),
        Err(err) => failure_placeholder(dimension, &err.to_string()),
    }
}

/// Merges settled outcomes into a mapping holding all six dimensions.
/// Dimensions missing from `outcomes` get the placeholder as well.
pub fn merge_results(outcomes: &Outcomes) -> DimensionResults {
    Dimension::ALL
        .into_iter()
        .map(|dimension| {
            let text = match outcomes.get(&dimension) {
                Some(outcome) => settled_text(dimension, outcome),
                None => failure_placeholder(dimension, NOT_RECEIVED),
            };
            (dimension, text)
        })
        .collect()
}
