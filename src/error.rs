use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use opentelemetry::trace::TraceContextExt;
use serde_json::json;
use thiserror::Error;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::dimension::Dimension;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid dimension. Must be one of: {}", Dimension::valid_names())]
    InvalidDimension(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Failed to analyze {dimension}: {message}")]
    Analysis {
        dimension: Dimension,
        message: String,
    },

    #[error("Failed to generate PDF: {0}")]
    Export(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidDimension(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Analysis { .. } | AppError::Export(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<crate::analysis::ValidationError> for AppError {
    fn from(err: crate::analysis::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

fn get_trace_id() -> Option<String> {
    let span = Span::current();
    let context = span.context();
    let span_ref = context.span();
    let span_context = span_ref.span_context();

    if span_context.is_valid() {
        Some(span_context.trace_id().to_string())
    } else {
        None
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Analysis { dimension, message } => {
                tracing::error!(%dimension, error = %message, "Analysis error");
            }
            AppError::Export(msg) => tracing::error!(error = %msg, "PDF generation error"),
            AppError::Internal(msg) => tracing::error!(error = %msg, "Internal error"),
            AppError::InvalidDimension(name) => {
                tracing::warn!(dimension = %name, "Rejected unknown dimension");
            }
            AppError::Validation(_) | AppError::MethodNotAllowed => {}
        }

        let mut body = json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        if let Some(trace_id) = get_trace_id() {
            body["trace_id"] = json!(trace_id);
        }

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
