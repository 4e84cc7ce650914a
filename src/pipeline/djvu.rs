//! DJVU → PDF conversion through DjVuLibre's `ddjvu`.
//!
//! `ddjvu` reports problems on stderr even for conversions that succeed
//! (unknown chunks, missing annotations), so stderr alone is not a failure
//! signal. The exit status is, and so is a missing or empty output file.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::pipeline::tool::{run_tool, tool_name};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

const DDJVU_HINT: &str = "Install DjVuLibre (e.g. `apt install djvulibre-bin`, `brew install djvulibre`) \
or pass --ddjvu /path/to/ddjvu.";

/// Command-line arguments for one `ddjvu` run.
pub fn ddjvu_args(djvu_path: &Path, pdf_path: &Path, quality: u8) -> Vec<OsString> {
    vec![
        OsString::from("-format=pdf"),
        OsString::from(format!("-quality={quality}")),
        djvu_path.as_os_str().to_owned(),
        pdf_path.as_os_str().to_owned(),
    ]
}

/// Convert `djvu_path` into a PDF written at `pdf_path`.
///
/// Returns the converter's wall-clock time.
pub async fn convert_djvu_to_pdf(
    djvu_path: &Path,
    pdf_path: &Path,
    config: &ExtractionConfig,
) -> Result<Duration, ExtractError> {
    let tool = tool_name(&config.ddjvu_binary);
    let output = run_tool(
        &config.ddjvu_binary,
        ddjvu_args(djvu_path, pdf_path, config.djvu_quality),
        djvu_path,
        config.tool_timeout_secs,
        DDJVU_HINT,
    )
    .await?;

    if !output.status.success() {
        return Err(ExtractError::ConversionFailed {
            tool,
            path: djvu_path.to_path_buf(),
            status: output.status.to_string(),
            stderr: output.stderr,
        });
    }

    if !output.stderr.is_empty() {
        warn!("{} reported while converting {}: {}", tool, djvu_path.display(), output.stderr);
    }

    let produced = std::fs::metadata(pdf_path).map(|m| m.len()).unwrap_or(0);
    if produced == 0 {
        return Err(ExtractError::ConversionFailed {
            tool,
            path: djvu_path.to_path_buf(),
            status: output.status.to_string(),
            stderr: if output.stderr.is_empty() {
                format!("no output written to {}", pdf_path.display())
            } else {
                output.stderr
            },
        });
    }

    info!(
        "Converted {} → PDF ({} bytes) in {}ms",
        djvu_path.display(),
        produced,
        output.elapsed.as_millis()
    );
    Ok(output.elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_follow_ddjvu_convention() {
        let args = ddjvu_args(Path::new("in.djvu"), Path::new("/tmp/s/converted.pdf"), 85);
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec!["-format=pdf", "-quality=85", "in.djvu", "/tmp/s/converted.pdf"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_a_failure() {
        // `false` ignores its arguments and exits 1.
        let config = ExtractionConfig::builder()
            .ddjvu_binary("false")
            .build()
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = convert_djvu_to_pdf(
            Path::new("scan.djvu"),
            &dir.path().join("converted.pdf"),
            &config,
        )
        .await
        .unwrap_err();
        match err {
            ExtractError::ConversionFailed { tool, path, .. } => {
                assert_eq!(tool, "false");
                assert_eq!(path, Path::new("scan.djvu"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn success_without_output_is_a_failure() {
        // `true` exits 0 and writes nothing.
        let config = ExtractionConfig::builder()
            .ddjvu_binary("true")
            .build()
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = convert_djvu_to_pdf(
            Path::new("scan.djvu"),
            &dir.path().join("converted.pdf"),
            &config,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("no output written"), "got: {err}");
    }
}
