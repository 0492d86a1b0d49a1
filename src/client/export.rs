use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

use super::request::{RequestClient, RequestError, status_error};
use crate::report::ReportRequest;

const PRINT_FALLBACK: &str =
    "Please try again, or print the results (browser Print, Ctrl+P / Cmd+P) to save them as PDF.";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF generation is not available: {0}")]
    Unavailable(String),

    #[error("Failed to generate PDF: {0}")]
    Failed(#[from] RequestError),

    #[error("Failed to generate PDF: server returned {0} instead of a PDF")]
    NotPdf(String),
}

impl ExportError {
    /// Message for the user, including the manual fallback.
    pub fn user_message(&self) -> String {
        format!("{self}. {PRINT_FALLBACK}")
    }
}

impl RequestClient {
    /// Posts the aggregated results to the report endpoint and returns the
    /// PDF bytes. Not retried.
    #[tracing::instrument(name = "export_report", skip_all, fields(report.bytes))]
    pub async fn export_report(&self, report: &ReportRequest) -> Result<Vec<u8>, ExportError> {
        let timeout = self.config.export_timeout;
        let response = self
            .http
            .post(self.url("/api/generate-pdf"))
            .timeout(timeout)
            .json(report)
            .send()
            .await
            .map_err(|e| RequestError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match (status, status_error(status, &body)) {
                (StatusCode::NOT_IMPLEMENTED, RequestError::Status { reason, .. }) => {
                    ExportError::Unavailable(reason)
                }
                (_, err) => ExportError::Failed(err),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.starts_with("application/pdf") {
            return Err(ExportError::NotPdf(content_type));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RequestError::from_reqwest(e, timeout))?;

        tracing::Span::current().record("report.bytes", bytes.len());
        tracing::info!("Report downloaded");
        Ok(bytes.to_vec())
    }
}
