//! Word 97-2003 (`.doc`) → DOCX conversion through LibreOffice.
//!
//! `soffice --convert-to docx` writes `<outdir>/<stem>.docx`. Each run gets
//! its own LibreOffice profile inside the scratch directory: a shared
//! profile is locked by any other running soffice instance, which makes the
//! conversion silently produce nothing.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::format::CFB_MAGIC;
use crate::pipeline::tool::{run_tool, tool_name};
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const SOFFICE_HINT: &str = "Install LibreOffice (e.g. `apt install libreoffice-writer`, `brew install --cask libreoffice`) \
or pass --soffice /path/to/soffice.";

/// Whether `path` starts with the CFB signature of a Word 97-2003 file.
///
/// RTF, HTML and plain text saved under a `.doc` name lack it; soffice
/// imports those too, so the result only feeds a log line.
pub fn has_cfb_signature(path: &Path) -> Result<bool, ExtractError> {
    let mut file = std::fs::File::open(path).map_err(|e| ExtractError::from_io(path, e))?;
    let mut head = [0u8; 8];
    let read = file
        .read(&mut head)
        .map_err(|e| ExtractError::from_io(path, e))?;
    Ok(&head[..read] == CFB_MAGIC)
}

/// Command-line arguments for one headless conversion.
pub fn soffice_args(doc_path: &Path, out_dir: &Path, profile_url: &str) -> Vec<OsString> {
    vec![
        OsString::from("--headless"),
        OsString::from(format!("-env:UserInstallation={profile_url}")),
        OsString::from("--convert-to"),
        OsString::from("docx"),
        OsString::from("--outdir"),
        out_dir.as_os_str().to_owned(),
        doc_path.as_os_str().to_owned(),
    ]
}

/// Where soffice writes the converted file for `doc_path`.
pub fn converted_path(doc_path: &Path, out_dir: &Path) -> PathBuf {
    let stem = doc_path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("document"));
    let mut name = stem;
    name.push(".docx");
    out_dir.join(name)
}

/// Convert `doc_path` to DOCX inside `out_dir`.
///
/// Returns the DOCX path and the converter's wall-clock time.
pub async fn convert_doc_to_docx(
    doc_path: &Path,
    out_dir: &Path,
    config: &ExtractionConfig,
) -> Result<(PathBuf, Duration), ExtractError> {
    if !has_cfb_signature(doc_path)? {
        debug!(
            "{} has no OLE2 signature; leaving format detection to soffice",
            doc_path.display()
        );
    }

    let profile_dir = out_dir.join("lo-profile");
    let profile_url = reqwest::Url::from_directory_path(&profile_dir)
        .map_err(|_| {
            ExtractError::Internal(format!(
                "Scratch path {} is not absolute",
                profile_dir.display()
            ))
        })?
        .to_string();

    let tool = tool_name(&config.soffice_binary);
    let output = run_tool(
        &config.soffice_binary,
        soffice_args(doc_path, out_dir, &profile_url),
        doc_path,
        config.tool_timeout_secs,
        SOFFICE_HINT,
    )
    .await?;

    if !output.status.success() {
        return Err(ExtractError::ConversionFailed {
            tool,
            path: doc_path.to_path_buf(),
            status: output.status.to_string(),
            stderr: output.stderr,
        });
    }

    // soffice exits 0 even when it could not convert; the file is the signal.
    let docx_path = converted_path(doc_path, out_dir);
    if !docx_path.is_file() {
        return Err(ExtractError::ConversionFailed {
            tool,
            path: doc_path.to_path_buf(),
            status: output.status.to_string(),
            stderr: if output.stderr.is_empty() {
                format!("no output written to {}", docx_path.display())
            } else {
                output.stderr
            },
        });
    }
    if !output.stderr.is_empty() {
        warn!("{} reported while converting {}: {}", tool, doc_path.display(), output.stderr);
    }

    info!(
        "Converted {} → DOCX in {}ms",
        doc_path.display(),
        output.elapsed.as_millis()
    );
    Ok((docx_path, output.elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converted_name_follows_stem() {
        assert_eq!(
            converted_path(Path::new("/data/report.final.doc"), Path::new("/tmp/s")),
            PathBuf::from("/tmp/s/report.final.docx")
        );
    }

    #[test]
    fn args_are_headless_with_private_profile() {
        let args: Vec<String> = soffice_args(
            Path::new("in.doc"),
            Path::new("/tmp/s"),
            "file:///tmp/s/lo-profile/",
        )
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
        assert_eq!(
            args,
            vec![
                "--headless",
                "-env:UserInstallation=file:///tmp/s/lo-profile/",
                "--convert-to",
                "docx",
                "--outdir",
                "/tmp/s",
                "in.doc",
            ]
        );
    }

    #[test]
    fn signature_check_tells_binary_from_text() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("test.doc");
        std::fs::write(&text, "Текст для проверки.").unwrap();
        assert!(!has_cfb_signature(&text).unwrap());

        let binary = dir.path().join("binary.doc");
        let mut bytes = CFB_MAGIC.to_vec();
        bytes.extend_from_slice(&[0u8; 504]);
        std::fs::write(&binary, bytes).unwrap();
        assert!(has_cfb_signature(&binary).unwrap());
    }

    #[test]
    fn missing_doc_is_not_found() {
        let err = has_cfb_signature(Path::new("non_existent_file.doc")).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_without_output_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("memo.doc");
        std::fs::write(&doc, CFB_MAGIC).unwrap();
        let config = ExtractionConfig::builder()
            .soffice_binary("true")
            .build()
            .unwrap();
        let err = convert_doc_to_docx(&doc, dir.path(), &config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("memo.docx"), "got: {err}");
    }
}
