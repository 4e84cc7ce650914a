//! PDF rasterisation: render every page to a PNG file via pdfium.
//!
//! pdfium is CPU-bound and keeps thread-local state, so the work runs on
//! tokio's blocking pool. Pages are written as `page_<index>.png` (0-based
//! index) into the caller's scratch directory and returned in page order.
//!
//! The scale factor comes from the configured DPI (PDF user space is 72
//! units per inch); `max_rendered_pixels` caps both edges so oversized pages
//! stay within a bounded allocation.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::pdfium;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the raster for a 0-based page index.
pub fn page_image_name(index: usize) -> String {
    format!("page_{index}.png")
}

/// Rasterise all pages of `pdf_path` into `out_dir`.
///
/// # Returns
/// The image paths, one per page, in ascending page order.
pub async fn rasterize_pages(
    pdf_path: &Path,
    out_dir: &Path,
    config: &ExtractionConfig,
) -> Result<Vec<PathBuf>, ExtractError> {
    let path = pdf_path.to_path_buf();
    let dir = out_dir.to_path_buf();
    let dpi = config.dpi;
    let max_pixels = config.max_rendered_pixels;
    let password = config.password.clone();

    tokio::task::spawn_blocking(move || {
        rasterize_pages_blocking(&path, &dir, dpi, max_pixels, password.as_deref())
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of page rasterisation.
fn rasterize_pages_blocking(
    pdf_path: &Path,
    out_dir: &Path,
    dpi: u32,
    max_pixels: u32,
    password: Option<&str>,
) -> Result<Vec<PathBuf>, ExtractError> {
    ensure_exists(pdf_path)?;
    let pdfium = pdfium::bind()?;
    let document = open_document(&pdfium, pdf_path, password)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded for rendering: {} pages", total_pages);

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(dpi as f32 / 72.0)
        .set_maximum_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut paths = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let render_failed = |detail: String| ExtractError::RenderFailed {
            path: pdf_path.to_path_buf(),
            page: idx + 1,
            detail,
        };

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| render_failed(format!("{:?}", e)))?;

        let raster = bitmap.as_image().to_rgb8();
        let image_path = out_dir.join(page_image_name(idx));
        raster
            .save_with_format(&image_path, image::ImageFormat::Png)
            .map_err(|e| render_failed(format!("writing {}: {}", image_path.display(), e)))?;

        debug!(
            "Rendered page {} → {}x{} px ({})",
            idx + 1,
            raster.width(),
            raster.height(),
            image_path.display()
        );
        paths.push(image_path);
    }

    Ok(paths)
}

/// Fail with `FileNotFound`/`PermissionDenied` before pdfium is involved,
/// so a missing file is never reported as a corrupt one.
pub(crate) fn ensure_exists(pdf_path: &Path) -> Result<(), ExtractError> {
    std::fs::metadata(pdf_path)
        .map(|_| ())
        .map_err(|e| ExtractError::from_io(pdf_path, e))
}

/// Open a PDF, classifying pdfium's load error.
pub(crate) fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, ExtractError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            ExtractError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        } else {
            ExtractError::CorruptFormat {
                path: pdf_path.to_path_buf(),
                format: "PDF",
                detail: err_str,
            }
        }
    })
}
