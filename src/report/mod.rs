pub mod pdf;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dimension::Dimension;

pub use pdf::{RenderError, RenderedPdf, render_pdf};

/// Per-dimension summary text, iterated in report order.
pub type DimensionResults = BTreeMap<Dimension, String>;

pub const DEFAULT_FOOTER: &str = "This report was generated by Privacy Prism, a privacy risk \
    analysis tool that evaluates content across six core privacy dimensions. The system reviews \
    your text to identify potential risks related to information exposure, inference, audience \
    impact, platform rules, amplification, and manipulability.";

pub const DISCLAIMER: &str = "DISCLAIMER: This platform provides AI-powered privacy risk \
    assessments for educational and informational purposes only. All analysis results should be \
    reviewed by qualified privacy professionals before making critical decisions.";

pub const COPYRIGHT: &str = "© Privacy Prism. All rights reserved.";

pub const REPORT_FILENAME: &str = "privacy-analysis.pdf";

/// Everything needed to render the exported report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub content: String,
    pub results: DimensionResults,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<String>,
}

impl ReportRequest {
    pub fn footer(&self) -> &str {
        self.footer_text
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(DEFAULT_FOOTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_camel_case() {
        let request = ReportRequest {
            content: "hello world!".to_string(),
            results: DimensionResults::from([(Dimension::Exposure, "none".to_string())]),
            timestamp: "October 18, 2026 at 10:00 AM".to_string(),
            footer_text: Some("custom".to_string()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["footerText"], "custom");
        assert_eq!(json["results"]["exposure"], "none");
    }

    #[test]
    fn test_footer_defaults_when_missing_or_blank() {
        let mut request = ReportRequest {
            content: "c".to_string(),
            results: DimensionResults::new(),
            timestamp: "t".to_string(),
            footer_text: None,
        };
        assert_eq!(request.footer(), DEFAULT_FOOTER);
        request.footer_text = Some("   ".to_string());
        assert_eq!(request.footer(), DEFAULT_FOOTER);
        request.footer_text = Some("Custom footer".to_string());
        assert_eq!(request.footer(), "Custom footer");
    }
}
