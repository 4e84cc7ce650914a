//! # docs2text
//!
//! Extract plain text from DJVU, DOC, DOCX and PDF documents, and scrape a
//! news listing into CSV.
//!
//! Each format goes through the cheapest route that yields its text:
//!
//! ```text
//! DJVU ─ ddjvu → PDF ─ pdfium → PNG per page ─ tesseract → text   (OCR)
//! PDF  ─ pdfium text layer ─────────────────────────────→ text
//! DOCX ─ word/document.xml body paragraphs ─────────────→ text
//! DOC  ─ soffice → DOCX ─ body paragraphs ──────────────→ text
//! ```
//!
//! Intermediate files live in a per-call scratch directory that is removed
//! before the call returns, whether it succeeds or fails.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docs2text::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder().ocr_language("rus+eng").build()?;
//!     let output = extract("scan.djvu", &config).await?;
//!     println!("{}", output.text);
//!     eprintln!("{} pages, {} chars", output.stats.total_pages, output.stats.total_chars);
//!     Ok(())
//! }
//! ```
//!
//! ## External requirements
//!
//! | Format | Needs |
//! |--------|-------|
//! | DJVU   | `ddjvu` (DjVuLibre), pdfium, `tesseract` |
//! | PDF    | pdfium |
//! | DOC    | `soffice` (LibreOffice) |
//! | DOCX   | nothing |
//!
//! pdfium is located through `PDFIUM_LIB_PATH`, then the working directory,
//! then the system library path.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docs2text` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docs2text = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod news;
pub mod output;
pub mod pdfium;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ExtractionConfig, ExtractionConfigBuilder, NewsConfig, NewsConfigBuilder, PageSeparator,
};
pub use error::{ErrorKind, ExtractError, ScrapeError};
pub use extract::{
    extract, extract_as, extract_djvu, extract_doc, extract_docx, extract_from_bytes,
    extract_pdf, extract_sync, extract_to_file, write_output,
};
pub use format::DocumentFormat;
pub use news::{scrape, ArticleRecord, ScrapeReport};
pub use output::{ExtractionOutput, ExtractionStats, PageText};
pub use pipeline::ocr::{OcrEngine, TesseractOcr};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
