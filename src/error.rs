//! Error types for the docs2text library.
//!
//! Two error types reflect the two halves of the crate:
//!
//! * [`ExtractError`] — a document extraction could not produce text
//!   (missing file, corrupt input, an external tool failed). Returned as
//!   `Err(ExtractError)` from every `extract*` function; there is no
//!   "empty string means failure" convention.
//!
//! * [`ScrapeError`] — a news-scrape step failed. Per-article failures are
//!   non-fatal and collected in [`crate::news::ScrapeReport::failures`];
//!   only listing or CSV failures abort a scrape.
//!
//! Every variant maps onto a coarse [`ErrorKind`] so callers can branch on
//! "not found" vs "corrupt" vs "upstream tool" without matching on strings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of an [`ExtractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The input (file, URL or converted intermediate) does not exist.
    NotFound,
    /// The process lacks permission to read the input.
    PermissionDenied,
    /// The input exists but cannot be decoded as the expected format.
    CorruptFormat,
    /// An external tool or library (ddjvu, tesseract, soffice, pdfium, HTTP) failed.
    UpstreamLibraryError,
    /// The caller supplied something unusable (bad URL, bad config, unknown format).
    InvalidInput,
    /// A bug or an environment failure (task panic, temp dir creation).
    Internal,
}

/// All errors returned by the extraction half of the library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is neither a usable path nor an HTTP/HTTPS URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// The file extension and magic bytes match none of DJVU, DOC, DOCX, PDF.
    #[error("Unsupported document format for '{path}' (expected .djvu, .doc, .docx or .pdf)")]
    UnsupportedFormat { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Format errors ─────────────────────────────────────────────────────
    /// The file was read but its content is not valid for its format.
    #[error("'{path}' is corrupt or not a valid {format} file: {detail}")]
    CorruptFormat {
        path: PathBuf,
        format: &'static str,
        detail: String,
    },

    /// PDF requires a password but none (or a wrong one) was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    // ── External tool errors ──────────────────────────────────────────────
    /// An external binary could not be located.
    #[error("Required tool '{tool}' was not found on PATH.\n{hint}")]
    ToolMissing { tool: String, hint: String },

    /// An external binary ran longer than `tool_timeout_secs` and was killed.
    #[error("'{tool}' timed out after {}s while processing '{path}'", .elapsed.as_secs())]
    ToolTimeout {
        tool: String,
        path: PathBuf,
        elapsed: Duration,
    },

    /// A format conversion tool exited unsuccessfully or produced nothing.
    #[error("'{tool}' failed to convert '{path}' ({status}): {stderr}")]
    ConversionFailed {
        tool: String,
        path: PathBuf,
        status: String,
        stderr: String,
    },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page} of '{path}': {detail}")]
    RenderFailed {
        path: PathBuf,
        page: usize,
        detail: String,
    },

    /// The OCR engine failed on a page image.
    #[error("OCR failed for page {page} ('{image}'): {detail}")]
    OcrFailed {
        page: usize,
        image: PathBuf,
        detail: String,
    },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/dir/containing/libpdfium, place the library\n\
next to the executable, or install it system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Reading an input or scratch file failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// Classify this error into the coarse [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::FileNotFound { .. } => ErrorKind::NotFound,
            ExtractError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            ExtractError::InvalidInput { .. }
            | ExtractError::UnsupportedFormat { .. }
            | ExtractError::InvalidConfig(_) => ErrorKind::InvalidInput,
            ExtractError::CorruptFormat { .. } | ExtractError::PasswordRequired { .. } => {
                ErrorKind::CorruptFormat
            }
            ExtractError::DownloadFailed { .. }
            | ExtractError::DownloadTimeout { .. }
            | ExtractError::ToolMissing { .. }
            | ExtractError::ToolTimeout { .. }
            | ExtractError::ConversionFailed { .. }
            | ExtractError::RenderFailed { .. }
            | ExtractError::OcrFailed { .. }
            | ExtractError::PdfiumBindingFailed(_) => ErrorKind::UpstreamLibraryError,
            ExtractError::Io { source, .. } | ExtractError::OutputWriteFailed { source, .. } => {
                match source.kind() {
                    std::io::ErrorKind::NotFound => ErrorKind::NotFound,
                    std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
                    _ => ErrorKind::Internal,
                }
            }
            ExtractError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Map an `io::Error` on `path` to the most specific variant.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => ExtractError::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied { path },
            _ => ExtractError::Io { path, source },
        }
    }
}

/// Errors from the news scraper.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The request could not be sent or the body could not be read.
    #[error("Request to '{url}' failed: {reason}")]
    Http { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("'{url}' returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// A required element was absent from the page.
    #[error("'{url}': no element matches '{selector}'")]
    MissingElement { url: String, selector: String },

    /// The publication timestamp could not be parsed.
    #[error("'{url}': unparseable publication date '{value}'")]
    BadDate { url: String, value: String },

    /// Writing the CSV failed.
    #[error("Failed to write CSV '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Creating the output file or its parent directory failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_file() {
        let e = ExtractError::FileNotFound {
            path: PathBuf::from("non_existent_file.docx"),
        };
        assert!(e.to_string().contains("non_existent_file.docx"));
        assert_eq!(e.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn from_io_classifies_by_kind() {
        let nf = ExtractError::from_io(
            "a.pdf",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(nf, ExtractError::FileNotFound { .. }));

        let pd = ExtractError::from_io(
            "a.pdf",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no"),
        );
        assert_eq!(pd.kind(), ErrorKind::PermissionDenied);

        let other = ExtractError::from_io("a.pdf", std::io::Error::other("disk on fire"));
        assert!(matches!(other, ExtractError::Io { .. }));
        assert_eq!(other.kind(), ErrorKind::Internal);
    }

    #[test]
    fn tool_errors_are_upstream() {
        let e = ExtractError::ConversionFailed {
            tool: "ddjvu".into(),
            path: PathBuf::from("scan.djvu"),
            status: "exit status: 10".into(),
            stderr: "corrupt chunk".into(),
        };
        assert_eq!(e.kind(), ErrorKind::UpstreamLibraryError);
        let msg = e.to_string();
        assert!(msg.contains("ddjvu"), "got: {msg}");
        assert!(msg.contains("scan.djvu"), "got: {msg}");
        assert!(msg.contains("corrupt chunk"), "got: {msg}");
    }

    #[test]
    fn timeout_display_in_seconds() {
        let e = ExtractError::ToolTimeout {
            tool: "tesseract".into(),
            path: PathBuf::from("page_0.png"),
            elapsed: Duration::from_secs(30),
        };
        assert!(e.to_string().contains("30s"));
    }

    #[test]
    fn corrupt_and_password_are_corrupt_format() {
        let e = ExtractError::CorruptFormat {
            path: PathBuf::from("x.docx"),
            format: "DOCX",
            detail: "missing word/document.xml".into(),
        };
        assert_eq!(e.kind(), ErrorKind::CorruptFormat);
        let p = ExtractError::PasswordRequired {
            path: PathBuf::from("x.pdf"),
        };
        assert_eq!(p.kind(), ErrorKind::CorruptFormat);
    }

    #[test]
    fn scrape_missing_element_display() {
        let e = ScrapeError::MissingElement {
            url: "https://example.com/a".into(),
            selector: "h1".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("example.com/a"));
        assert!(msg.contains("h1"));
    }
}
