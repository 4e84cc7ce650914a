//! Extraction entry points.
//!
//! [`extract`] resolves the input (path or URL), detects the format and
//! dispatches to the per-format extractor. The per-format functions are
//! public too, for callers that already know what they hold.
//!
//! Every extractor either returns the whole document's text or an
//! [`ExtractError`]; there is no partial result. Intermediate files live in
//! a [`ScratchDir`] that is removed before the function returns, on the
//! error path as well.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::format::DocumentFormat;
use crate::output::{assemble_text, ExtractionOutput, ExtractionStats, PageText};
use crate::pipeline::ocr::{recognize_pages, OcrEngine, TesseractOcr};
use crate::pipeline::scratch::ScratchDir;
use crate::pipeline::{djvu, doc, docx, input, pdf_text, render};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Name of the intermediate PDF inside the scratch directory.
const CONVERTED_PDF: &str = "converted.pdf";

/// Extract the text of a document given as a local path or HTTP/HTTPS URL.
///
/// The format is detected from the extension and confirmed by the file's
/// leading bytes.
///
/// # Example
/// ```rust,no_run
/// use docs2text::{extract, ExtractionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let output = extract("scan.djvu", &ExtractionConfig::default()).await?;
/// println!("{}", output.text);
/// # Ok(())
/// # }
/// ```
pub async fn extract(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let input_str = input_str.as_ref();
    info!("Starting extraction: {}", input_str);

    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let format = DocumentFormat::detect(resolved.path())?;
    // `resolved` must outlive the extraction: it may own the downloaded file.
    extract_path(resolved.path(), format, config).await
}

/// Like [`extract`], but with the format given instead of detected.
pub async fn extract_as(
    input_str: impl AsRef<str>,
    format: DocumentFormat,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    extract_path(resolved.path(), format, config).await
}

async fn extract_path(
    path: &Path,
    format: DocumentFormat,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    match format {
        DocumentFormat::Djvu => extract_djvu(path, config).await,
        DocumentFormat::Doc => extract_doc(path, config).await,
        DocumentFormat::Docx => extract_docx(path, config).await,
        DocumentFormat::Pdf => extract_pdf(path, config).await,
    }
}

/// OCR a scanned DJVU document.
///
/// DJVU → PDF (`ddjvu`) → one PNG per page (pdfium) → OCR per page, in
/// page order → pages joined with the configured separator.
pub async fn extract_djvu(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let path = path.as_ref();
    let total_start = Instant::now();
    render::ensure_exists(path)?;

    let scratch = ScratchDir::create(config.scratch_root.as_deref())?;
    let pdf_path = scratch.join(CONVERTED_PDF);

    // ── Step 1: DJVU → PDF ───────────────────────────────────────────────
    let convert_elapsed = djvu::convert_djvu_to_pdf(path, &pdf_path, config).await?;

    // ── Step 2: Rasterise pages ──────────────────────────────────────────
    let render_start = Instant::now();
    let images = render::rasterize_pages(&pdf_path, scratch.path(), config).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!("Rendered {} pages in {}ms", images.len(), render_duration_ms);

    // ── Step 3: OCR ──────────────────────────────────────────────────────
    if let Some(cb) = &config.progress_callback {
        cb.on_extraction_start(images.len());
    }
    let engine = ocr_engine(config);
    let read_start = Instant::now();
    let pages = recognize_pages(engine.as_ref(), &images, config.progress_callback.as_ref()).await?;
    let read_duration_ms = read_start.elapsed().as_millis() as u64;

    scratch.close();

    let stats = ExtractionStats {
        convert_duration_ms: convert_elapsed.as_millis() as u64,
        render_duration_ms,
        read_duration_ms,
        ..Default::default()
    };
    Ok(finish(path, DocumentFormat::Djvu, pages, stats, config, total_start))
}

/// Read the text layer of a PDF, pages in order.
pub async fn extract_pdf(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let path = path.as_ref();
    let total_start = Instant::now();

    let pages = pdf_text::read_text_layer(
        path,
        config.password.as_deref(),
        config.progress_callback.clone(),
    )
    .await?;

    let stats = ExtractionStats {
        read_duration_ms: total_start.elapsed().as_millis() as u64,
        ..Default::default()
    };
    Ok(finish(path, DocumentFormat::Pdf, pages, stats, config, total_start))
}

/// Read the body paragraphs of a DOCX, joined with `\n`.
pub async fn extract_docx(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let path = path.as_ref();
    let total_start = Instant::now();

    let page = read_docx_page(path, config).await?;
    let stats = ExtractionStats {
        read_duration_ms: page.duration_ms,
        ..Default::default()
    };
    Ok(finish(path, DocumentFormat::Docx, vec![page], stats, config, total_start))
}

/// Convert a Word 97-2003 document to DOCX with LibreOffice, then read it
/// like [`extract_docx`].
pub async fn extract_doc(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let path = path.as_ref();
    let total_start = Instant::now();
    render::ensure_exists(path)?;

    let scratch = ScratchDir::create(config.scratch_root.as_deref())?;
    let (docx_path, convert_elapsed) = doc::convert_doc_to_docx(path, scratch.path(), config).await?;
    let page = read_docx_page(&docx_path, config).await?;
    scratch.close();

    let stats = ExtractionStats {
        convert_duration_ms: convert_elapsed.as_millis() as u64,
        read_duration_ms: page.duration_ms,
        ..Default::default()
    };
    Ok(finish(path, DocumentFormat::Doc, vec![page], stats, config, total_start))
}

/// Extract a document and write its text to a file.
///
/// The file is written through [`write_output`].
pub async fn extract_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, ExtractError> {
    let output = extract(input_str, config).await?;
    write_output(&output, output_path.as_ref()).await?;
    Ok(output.stats)
}

/// Write an extraction's text to `path`, creating parent directories.
///
/// The text goes to `<name>.tmp` first and is renamed into place, so
/// readers never see a partial file.
pub async fn write_output(output: &ExtractionOutput, path: &Path) -> Result<(), ExtractError> {
    let write_failed = |source: std::io::Error| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let tmp_path = tmp_path_for(path);
    tokio::fs::write(&tmp_path, &output.text)
        .await
        .map_err(write_failed)?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(write_failed)?;

    info!("Wrote {} chars to {}", output.stats.total_chars, path.display());
    Ok(())
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input_str, config))
}

/// Extract a document held in memory.
///
/// The bytes are written to a managed temp file named with the format's
/// extension, which is removed on return.
pub async fn extract_from_bytes(
    bytes: &[u8],
    format: DocumentFormat,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("docs2text-input-")
        .suffix(&format!(".{}", format.extension()))
        .tempfile()
        .map_err(|e| ExtractError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ExtractError::Internal(format!("tempfile write: {e}")))?;
    extract_path(tmp.path(), format, config).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// The configured engine, or tesseract built from the config.
fn ocr_engine(config: &ExtractionConfig) -> Arc<dyn OcrEngine> {
    match &config.ocr_engine {
        Some(engine) => Arc::clone(engine),
        None => Arc::new(TesseractOcr::from_config(config)),
    }
}

/// Read a DOCX as a single page of `\n`-joined paragraphs.
async fn read_docx_page(path: &Path, config: &ExtractionConfig) -> Result<PageText, ExtractError> {
    let progress = config.progress_callback.clone();
    if let Some(cb) = &progress {
        cb.on_extraction_start(1);
        cb.on_page_start(1, 1);
    }

    let start = Instant::now();
    let owned = path.to_path_buf();
    let result = tokio::task::spawn_blocking(move || docx::read_paragraphs(&owned))
        .await
        .map_err(|e| ExtractError::Internal(format!("DOCX task panicked: {}", e)))?;

    let paragraphs = match result {
        Ok(paragraphs) => paragraphs,
        Err(e) => {
            if let Some(cb) = &progress {
                cb.on_page_error(1, 1, &e.to_string());
            }
            return Err(e);
        }
    };

    let page = PageText {
        page_num: 1,
        text: paragraphs.join("\n"),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    if let Some(cb) = &progress {
        cb.on_page_complete(1, 1, page.chars());
    }
    Ok(page)
}

/// Assemble pages into the final output, fill in totals and log.
fn finish(
    path: &Path,
    format: DocumentFormat,
    pages: Vec<PageText>,
    mut stats: ExtractionStats,
    config: &ExtractionConfig,
    total_start: Instant,
) -> ExtractionOutput {
    let text = assemble_text(&pages, &config.page_separator);
    stats.total_pages = pages.len();
    stats.total_chars = text.chars().count();
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Extracted {} ({}): {} pages, {} chars, {}ms total",
        path.display(),
        format,
        stats.total_pages,
        stats.total_chars,
        stats.total_duration_ms
    );
    if let Some(cb) = &config.progress_callback {
        cb.on_extraction_complete(stats.total_pages, stats.total_chars);
    }

    ExtractionOutput {
        text,
        format,
        pages,
        stats,
    }
}

/// Sibling temp path used for the atomic write, e.g. `out.txt` → `out.txt.tmp`.
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
