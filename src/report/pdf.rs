//! Minimal text-only PDF layout for the analysis report.
//!
//! Uses the standard Helvetica faces with WinAnsi encoding, so no fonts are
//! embedded. Line breaking estimates glyph widths from the font size.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use thiserror::Error;

use super::{COPYRIGHT, DISCLAIMER, ReportRequest};
use crate::dimension::Dimension;

// A4 in points
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 57.0;
// average Helvetica advance as a fraction of the font size
const AVG_GLYPH_WIDTH: f32 = 0.52;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode page content: {0}")]
    Encode(String),

    #[error("failed to write document: {0}")]
    Write(String),
}

#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

#[derive(Clone, Copy)]
enum Face {
    Regular,
    Bold,
}

impl Face {
    fn resource_name(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }
}

struct Layout {
    finished: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn new_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn into_pages(mut self) -> Vec<Vec<Operation>> {
        self.finished.push(self.current);
        self.finished
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.new_page();
        }
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn paragraph(&mut self, text: &str, size: f32, face: Face) {
        let leading = size * 1.45;
        for line in wrap(text, max_chars_per_line(size)) {
            self.ensure_space(leading);
            self.y -= leading;
            let y = self.y;
            self.show(&line, MARGIN, y, size, face);
        }
        self.y -= 4.0;
    }

    fn show(&mut self, text: &str, x: f32, y: f32, size: f32, face: Face) {
        let ops = &mut self.current;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![face.resource_name().into(), (size.round() as i64).into()],
        ));
        ops.push(Operation::new(
            "Td",
            vec![(x.round() as i64).into(), (y.round() as i64).into()],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(text))],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
}

fn max_chars_per_line(size: f32) -> usize {
    let usable = PAGE_WIDTH - 2.0 * MARGIN;
    ((usable / (size * AVG_GLYPH_WIDTH)) as usize).max(1)
}

/// Greedy word wrap. Words longer than a line are split; explicit newlines
/// start a new line and blank lines are kept.
pub(crate) fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in raw_line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > max_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }

        lines.push(current);
    }

    lines
}

/// Maps text to WinAnsiEncoding bytes; characters outside it become `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

fn layout_report(request: &ReportRequest) -> Layout {
    let mut layout = Layout::new();

    layout.paragraph("PRIVACY PRISM", 20.0, Face::Bold);
    layout.paragraph("Privacy Risk Analysis Report", 16.0, Face::Bold);
    layout.paragraph(&format!("Generated on {}", request.timestamp), 10.0, Face::Regular);
    layout.gap(28.0);

    layout.paragraph("Analyzed Content", 14.0, Face::Bold);
    layout.paragraph(&request.content, 12.0, Face::Regular);
    layout.gap(14.0);

    for dimension in Dimension::ALL {
        let Some(result) = request.results.get(&dimension) else {
            continue;
        };
        if result.trim().is_empty() {
            continue;
        }
        // keep a heading together with the start of its text
        layout.ensure_space(60.0);
        layout.paragraph(dimension.title(), 14.0, Face::Bold);
        layout.paragraph(result, 11.0, Face::Regular);
        layout.gap(8.0);
    }

    layout.ensure_space(170.0);
    layout.paragraph("About Privacy Prism", 14.0, Face::Bold);
    layout.paragraph(request.footer(), 10.0, Face::Regular);
    layout.gap(28.0);
    layout.paragraph(DISCLAIMER, 9.0, Face::Regular);

    layout.show(COPYRIGHT, MARGIN, 40.0, 8.0, Face::Regular);

    layout
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Renders the report into PDF bytes.
#[tracing::instrument(
    name = "render_pdf",
    skip(request),
    fields(report.dimensions = request.results.len(), report.pages, report.bytes)
)]
pub fn render_pdf(request: &ReportRequest) -> Result<RenderedPdf, RenderError> {
    let pages = layout_report(request).into_pages();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Face::Regular.resource_name() => regular_id,
            Face::Bold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<ObjectId> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }
            .encode()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id);
    }

    let page_count = kids.len();
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids.into_iter().map(Object::from).collect::<Vec<Object>>(),
        "Count" => page_count as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            (PAGE_WIDTH as i64).into(),
            (PAGE_HEIGHT as i64).into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Write(e.to_string()))?;

    let span = tracing::Span::current();
    span.record("report.pages", page_count);
    span.record("report.bytes", bytes.len());

    Ok(RenderedPdf {
        bytes,
        pages: page_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::DimensionResults;

    fn request(results: DimensionResults) -> ReportRequest {
        ReportRequest {
            content: "I'm at the Elm Street gym every weekday at 6am (usually alone).".to_string(),
            results,
            timestamp: "October 18, 2026 at 09:30 AM".to_string(),
            footer_text: None,
        }
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "the quick brown fox jumps over the lazy dog";
        let lines = wrap(text, 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10), "{lines:?}");
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_splits_long_words_and_keeps_blank_lines() {
        let lines = wrap("abcdefghijkl\n\nxy", 5);
        assert_eq!(lines, vec!["abcde", "fghij", "kl", "", "xy"]);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("a(b)"), b"a(b)".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(encode_win_ansi("“hi” — ok"), vec![0x93, b'h', b'i', 0x94, b' ', 0x97, b' ', b'o', b'k']);
        assert_eq!(encode_win_ansi("世"), b"?".to_vec());
    }

    #[test]
    fn test_render_produces_loadable_pdf() {
        let results: DimensionResults = Dimension::ALL
            .iter()
            .map(|d| (*d, format!("Summary for {d}.")))
            .collect();
        let pdf = render_pdf(&request(results)).unwrap();

        assert!(pdf.bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&pdf.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), pdf.pages);
        assert_eq!(pdf.pages, 1);
    }

    #[test]
    fn test_long_results_flow_onto_more_pages() {
        let long = "Location and routine details reveal identity. ".repeat(120);
        let results: DimensionResults = Dimension::ALL.iter().map(|d| (*d, long.clone())).collect();
        let pdf = render_pdf(&request(results)).unwrap();

        assert!(pdf.pages > 2);
        let doc = Document::load_mem(&pdf.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), pdf.pages);
    }

    #[test]
    fn test_empty_results_are_skipped() {
        let with_blank = DimensionResults::from([
            (Dimension::Exposure, "Name and gym revealed.".to_string()),
            (Dimension::Inference, "   ".to_string()),
        ]);
        let pages = layout_report(&request(with_blank)).into_pages();
        let shown: Vec<Vec<u8>> = pages
            .iter()
            .flatten()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| op.operands.first().and_then(|o| o.as_str().ok()).map(<[u8]>::to_vec))
            .collect();

        assert!(shown.iter().any(|s| s == Dimension::Exposure.title().as_bytes()));
        assert!(!shown.iter().any(|s| s == Dimension::Inference.title().as_bytes()));
    }
}
