//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the OCR and text-layer extractors walk a document. Paragraph
//! based formats (DOC, DOCX) have no pages and report a single unit.
//!
//! # Example
//!
//! ```rust
//! use docs2text::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, Mutex};
//!
//! /// Remembers which pages came back empty.
//! #[derive(Default)]
//! struct BlankPages(Mutex<Vec<usize>>);
//!
//! impl ExtractionProgressCallback for BlankPages {
//!     fn on_page_complete(&self, page_num: usize, _total: usize, chars: usize) {
//!         if chars == 0 {
//!             if let Ok(mut pages) = self.0.lock() {
//!                 pages.push(page_num);
//!             }
//!         }
//!     }
//! }
//!
//! let blanks = Arc::new(BlankPages::default());
//! let config = ExtractionConfig::builder()
//!     .progress_callback(blanks.clone())
//!     .build()?;
//! # Ok::<(), docs2text::ExtractError>(())
//! ```

use std::sync::Arc;

/// Called by the extractors as they process each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Pages are reported strictly in ascending order.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once the page count is known, before the first page.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is recognised or read.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page produced text.
    ///
    /// `chars` is the character count of the page text.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, chars: usize) {
        let _ = (page_num, total_pages, chars);
    }

    /// Called when a page failed; the extraction aborts right after.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after the last page succeeded.
    fn on_extraction_complete(&self, total_pages: usize, total_chars: usize) {
        let _ = (total_pages, total_chars);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
