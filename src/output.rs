//! Result types returned by the extraction entry points.

use crate::config::PageSeparator;
use crate::format::DocumentFormat;
use serde::{Deserialize, Serialize};

/// Text of one page (or, for DOC/DOCX, of the whole paragraph stream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Text recognised or read for this page, unmodified.
    pub text: String,
    /// Wall-clock time spent on this page.
    pub duration_ms: u64,
}

impl PageText {
    /// Character (not byte) count of the page text.
    pub fn chars(&self) -> usize {
        self.text.chars().count()
    }
}

/// Timing and size figures for one extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub total_pages: usize,
    pub total_chars: usize,
    /// Time spent in external format converters (ddjvu, soffice).
    pub convert_duration_ms: u64,
    /// Time spent rasterising pages.
    pub render_duration_ms: u64,
    /// Time spent in OCR or text-layer reads.
    pub read_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything an extraction produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Assembled text, pages in ascending order.
    pub text: String,
    /// Format the input was handled as.
    pub format: DocumentFormat,
    /// Per-page results, sorted by `page_num`.
    pub pages: Vec<PageText>,
    pub stats: ExtractionStats,
}

/// Join page texts in ascending page order.
///
/// The separator is placed *between* pages only; the first page is never
/// prefixed and the last never suffixed.
pub fn assemble_text(pages: &[PageText], separator: &PageSeparator) -> String {
    let mut out = String::with_capacity(pages.iter().map(|p| p.text.len()).sum());
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            out.push_str(&separator.render(page.page_num));
        }
        out.push_str(&page.text);
    }
    out
}
