use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;

use crate::AppState;
use crate::analysis::{AnalysisRequest, AnalysisResult, InputKind, analyze_dimension};
use crate::dimension::Dimension;
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    pub input: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub async fn analyze(
    State(state): State<AppState>,
    Path(dimension): Path<String>,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> AppResult<Json<AnalysisResult>> {
    let dimension: Dimension = dimension
        .parse()
        .map_err(|_| AppError::InvalidDimension(dimension.clone()))?;

    let Json(body) =
        body.map_err(|e| AppError::Validation(format!("Invalid request body: {}", e.body_text())))?;

    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(input), Some(kind)) = (non_empty(body.input), non_empty(body.kind)) else {
        return Err(AppError::Validation(
            "Missing required fields: input and type".into(),
        ));
    };

    let kind: InputKind = kind.parse()?;
    let request = AnalysisRequest::new(&input, kind)?;

    let result = analyze_dimension(&state.llm_client, &state.model, dimension, &request).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_fields_are_optional() {
        let body: AnalyzeBody = serde_json::from_str("{}").unwrap();
        assert!(body.input.is_none());
        assert!(body.kind.is_none());
    }

    #[test]
    fn test_body_reads_type_field() {
        let body: AnalyzeBody =
            serde_json::from_str(r#"{"input": "https://example.com", "type": "url"}"#).unwrap();
        assert_eq!(body.kind.as_deref(), Some("url"));
    }
}
