//! Text-layer extraction from PDFs via pdfium.
//!
//! Reads the embedded text of each page; no OCR is involved, so scanned
//! PDFs without a text layer yield empty pages rather than an error.

use crate::error::ExtractError;
use crate::output::PageText;
use crate::pdfium;
use crate::pipeline::render::{ensure_exists, open_document};
use crate::progress::ProgressCallback;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Read the text layer of every page, in page order.
pub async fn read_text_layer(
    pdf_path: &Path,
    password: Option<&str>,
    progress: Option<ProgressCallback>,
) -> Result<Vec<PageText>, ExtractError> {
    let path: PathBuf = pdf_path.to_path_buf();
    let password = password.map(str::to_string);

    tokio::task::spawn_blocking(move || {
        read_text_layer_blocking(&path, password.as_deref(), progress.as_ref())
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("Text extraction task panicked: {}", e)))?
}

fn read_text_layer_blocking(
    pdf_path: &Path,
    password: Option<&str>,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<PageText>, ExtractError> {
    ensure_exists(pdf_path)?;
    let pdfium = pdfium::bind()?;
    let document = open_document(&pdfium, pdf_path, password)?;

    let pages = document.pages();
    let total = pages.len() as usize;
    info!("PDF loaded: {} pages", total);
    if let Some(cb) = progress {
        cb.on_extraction_start(total);
    }

    let mut out = Vec::with_capacity(total);
    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        if let Some(cb) = progress {
            cb.on_page_start(page_num, total);
        }
        let start = Instant::now();

        let text = match page.text() {
            Ok(text) => normalize_newlines(&text.all()),
            Err(e) => {
                let detail = format!("{:?}", e);
                if let Some(cb) = progress {
                    cb.on_page_error(page_num, total, &detail);
                }
                return Err(ExtractError::CorruptFormat {
                    path: pdf_path.to_path_buf(),
                    format: "PDF",
                    detail: format!("page {}: {}", page_num, detail),
                });
            }
        };

        let page_text = PageText {
            page_num,
            text,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        debug!("Page {}/{}: {} chars", page_num, total, page_text.chars());
        if let Some(cb) = progress {
            cb.on_page_complete(page_num, total, page_text.chars());
        }
        out.push(page_text);
    }

    Ok(out)
}

/// pdfium reports line breaks as `\r\n`.
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_becomes_lf() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[tokio::test]
    async fn missing_pdf_is_not_found() {
        let err = read_text_layer(Path::new("non_existent_file.pdf"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }), "got {err:?}");
    }
}
