pub mod prompts;
pub mod service;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::dimension::Dimension;

pub use service::analyze_dimension;

/// Minimum number of characters accepted for free-text input.
pub const MIN_TEXT_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Url,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Url => "url",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(InputKind::Text),
            "url" => Ok(InputKind::Url),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please provide input content or URL")]
    EmptyInput,

    #[error("Text content is too short. Please provide at least {MIN_TEXT_CHARS} characters.")]
    TextTooShort { chars: usize },

    #[error("Please enter a valid URL (must start with http:// or https://)")]
    InvalidUrl,

    #[error("Unknown input type \"{0}\", expected \"text\" or \"url\"")]
    UnknownKind(String),
}

/// A validated `{input, type}` pair.
///
/// The only way to obtain one is [`AnalysisRequest::new`], so holding a value
/// means the input already passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    input: String,
    #[serde(rename = "type")]
    kind: InputKind,
}

impl AnalysisRequest {
    pub fn new(input: &str, kind: InputKind) -> Result<Self, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationError::EmptyInput);
        }

        match kind {
            InputKind::Text => {
                let chars = input.chars().count();
                if chars < MIN_TEXT_CHARS {
                    return Err(ValidationError::TextTooShort { chars });
                }
            }
            InputKind::Url => {
                if !is_http_url(input) {
                    return Err(ValidationError::InvalidUrl);
                }
            }
        }

        Ok(Self {
            input: input.to_string(),
            kind,
        })
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }
}

fn is_http_url(input: &str) -> bool {
    Url::parse(input)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// One dimension's summary as returned by the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub content: String,
    pub dimension: Dimension,
    pub timestamp: DateTime<Utc>,
}
