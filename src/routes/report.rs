use std::collections::HashMap;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::Span;

use crate::dimension::Dimension;
use crate::error::{AppError, AppResult};
use crate::report::{DimensionResults, REPORT_FILENAME, ReportRequest, render_pdf};
use crate::telemetry::metrics::{REPORT_PAGES, REPORT_SIZE};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePdfBody {
    pub content: Option<String>,
    pub results: Option<HashMap<String, String>>,
    pub timestamp: Option<String>,
    pub footer_text: Option<String>,
}

impl GeneratePdfBody {
    fn into_report(self) -> AppResult<ReportRequest> {
        let missing = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        if missing(&self.content) || self.results.is_none() || missing(&self.timestamp) {
            return Err(AppError::Validation(
                "Missing required fields: content, results and timestamp".into(),
            ));
        }

        let mut results = DimensionResults::new();
        for (key, text) in self.results.unwrap_or_default() {
            match key.parse::<Dimension>() {
                Ok(dimension) => {
                    results.insert(dimension, text);
                }
                Err(_) => tracing::debug!(key = %key, "Ignoring unknown result key"),
            }
        }

        Ok(ReportRequest {
            content: self.content.unwrap_or_default(),
            results,
            timestamp: self.timestamp.unwrap_or_default(),
            footer_text: self.footer_text,
        })
    }
}

pub async fn generate_pdf(
    body: Result<Json<GeneratePdfBody>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(body) =
        body.map_err(|e| AppError::Validation(format!("Invalid request body: {}", e.body_text())))?;
    let report = body.into_report()?;

    tracing::info!(dimensions = report.results.len(), "PDF generation request received");

    let span = Span::current();
    let rendered = tokio::task::spawn_blocking(move || span.in_scope(|| render_pdf(&report)))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Export(e.to_string()))?;

    REPORT_SIZE.record(rendered.bytes.len() as f64, &[]);
    REPORT_PAGES.record(rendered.pages as f64, &[]);
    tracing::info!(pages = rendered.pages, bytes = rendered.bytes.len(), "PDF generated");

    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILENAME}\""),
            ),
        ],
        rendered.bytes,
    ))
}
