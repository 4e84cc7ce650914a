//! Locating and binding the pdfium shared library.
//!
//! Lookup order:
//!
//! 1. `PDFIUM_LIB_PATH` — either the library file itself or the directory
//!    containing it.
//! 2. The current working directory (`./libpdfium.so`, `./pdfium.dll`, …).
//! 3. The system library search path.
//!
//! A fresh [`Pdfium`] is bound per call; every caller runs inside
//! `spawn_blocking` and drops it before returning.

use crate::error::ExtractError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit pdfium location.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to the first pdfium library found.
pub fn bind() -> Result<Pdfium, ExtractError> {
    let mut attempts = Vec::new();

    if let Some(configured) = std::env::var_os(PDFIUM_LIB_PATH_ENV) {
        let lib = library_file(Path::new(&configured));
        match Pdfium::bind_to_library(&lib) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", lib.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => attempts.push(format!("{}: {:?}", lib.display(), e)),
        }
    }

    let local = Pdfium::pdfium_platform_library_name_at_path("./");
    match Pdfium::bind_to_library(&local) {
        Ok(bindings) => {
            debug!("Bound pdfium from {}", local.display());
            return Ok(Pdfium::new(bindings));
        }
        Err(e) => attempts.push(format!("{}: {:?}", local.display(), e)),
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound system pdfium");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            attempts.push(format!("system library: {:?}", e));
            Err(ExtractError::PdfiumBindingFailed(attempts.join("; ")))
        }
    }
}

/// Whether a pdfium library can be bound in this environment.
pub fn is_available() -> bool {
    bind().is_ok()
}

/// Resolve a configured location to a library file path.
fn library_file(configured: &Path) -> PathBuf {
    if configured.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(configured)
    } else {
        configured.to_path_buf()
    }
}
