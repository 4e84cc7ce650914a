//! Input resolution: normalise a user-supplied path or URL to a local file.
//!
//! The converters and pdfium all want a file-system path, so a URL input is
//! downloaded into a `TempDir` that lives inside [`ResolvedInput`] and is
//! removed when it drops. The downloaded file keeps the URL's last path
//! segment as its name, which preserves the extension format detection
//! relies on.

use crate::error::ExtractError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// The resolved input: either a local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; the body sits in a temp directory kept alive here.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Path to the document regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a readable local file.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, ExtractError> {
    if input.trim().is_empty() {
        return Err(ExtractError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Validate that a local path exists, is a file and can be opened.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, ExtractError> {
    let path = PathBuf::from(path_str);

    let meta = std::fs::metadata(&path).map_err(|e| ExtractError::from_io(&path, e))?;
    if meta.is_dir() {
        return Err(ExtractError::InvalidInput {
            input: path_str.to_string(),
        });
    }
    std::fs::File::open(&path).map_err(|e| ExtractError::from_io(&path, e))?;

    debug!("Resolved local input: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, ExtractError> {
    let parsed = reqwest::Url::parse(url).map_err(|_| ExtractError::InvalidInput {
        input: url.to_string(),
    })?;
    info!("Downloading document from: {}", url);

    let download_failed = |reason: String| ExtractError::DownloadFailed {
        url: url.to_string(),
        reason,
    };
    let classify = |e: reqwest::Error| {
        if e.is_timeout() {
            ExtractError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            download_failed(e.to_string())
        }
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| download_failed(e.to_string()))?;

    let response = client.get(parsed.clone()).send().await.map_err(classify)?;
    if !response.status().is_success() {
        return Err(download_failed(format!("HTTP {}", response.status())));
    }

    let bytes = response.bytes().await.map_err(classify)?;

    let temp_dir = TempDir::new().map_err(|e| ExtractError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(filename_from_url(&parsed));
    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| ExtractError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Last URL path segment if it looks like a file name, else `download`.
///
/// Without an extension the format is decided by magic bytes alone.
fn filename_from_url(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|last| !last.is_empty() && last.contains('.'))
        .filter(|last| !last.contains(['/', '\\']) && *last != "..")
        .map(str::to_string)
        .unwrap_or_else(|| "download".to_string())
}
