//! OCR: page image → text.
//!
//! [`OcrEngine`] is the seam between the pipeline and whatever performs
//! recognition. The default [`TesseractOcr`] shells out to the `tesseract`
//! CLI; callers can inject their own engine through
//! [`crate::config::ExtractionConfigBuilder::ocr_engine`].
//!
//! Pages are recognised one at a time in page order. The first failure
//! aborts the document: a text with a silently missing page is worse than
//! no text.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::PageText;
use crate::pipeline::tool::{run_tool, tool_name};
use crate::progress::ProgressCallback;
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

const TESSERACT_HINT: &str = "Install Tesseract (e.g. `apt install tesseract-ocr`, `brew install tesseract`) \
plus the language data you need, or pass --tesseract /path/to/tesseract.";

/// Something that turns an image file into text.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Recognise the text in the image at `image`.
    async fn recognize(&self, image: &Path) -> Result<String, ExtractError>;
}

/// OCR through the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: PathBuf,
    language: String,
    timeout_secs: u64,
}

impl TesseractOcr {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
            timeout_secs,
        }
    }

    /// Engine configured from `tesseract_binary`, `ocr_language` and `tool_timeout_secs`.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(
            config.tesseract_binary.clone(),
            config.ocr_language.clone(),
            config.tool_timeout_secs,
        )
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &Path) -> Result<String, ExtractError> {
        // `stdout` as the output base makes tesseract print instead of writing <base>.txt
        let args = [
            image.as_os_str(),
            OsStr::new("stdout"),
            OsStr::new("-l"),
            OsStr::new(&self.language),
        ];
        let output = run_tool(&self.binary, args, image, self.timeout_secs, TESSERACT_HINT).await?;

        if !output.status.success() {
            return Err(ExtractError::ConversionFailed {
                tool: tool_name(&self.binary),
                path: image.to_path_buf(),
                status: output.status.to_string(),
                stderr: output.stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Recognise `images` in order, one [`PageText`] per image.
///
/// Page numbers are 1-based positions in `images`.
pub async fn recognize_pages(
    engine: &dyn OcrEngine,
    images: &[PathBuf],
    progress: Option<&ProgressCallback>,
) -> Result<Vec<PageText>, ExtractError> {
    let total = images.len();
    let mut pages = Vec::with_capacity(total);

    for (idx, image) in images.iter().enumerate() {
        let page_num = idx + 1;
        if let Some(cb) = progress {
            cb.on_page_start(page_num, total);
        }

        let start = Instant::now();
        let text = match engine.recognize(image).await {
            Ok(text) => text,
            Err(e) => {
                if let Some(cb) = progress {
                    cb.on_page_error(page_num, total, &e.to_string());
                }
                return Err(match e {
                    // Nothing page-specific about these; keep them as-is.
                    ExtractError::ToolMissing { .. } | ExtractError::ToolTimeout { .. } => e,
                    other => ExtractError::OcrFailed {
                        page: page_num,
                        image: image.clone(),
                        detail: other.to_string(),
                    },
                });
            }
        };

        let page = PageText {
            page_num,
            text,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        debug!(
            "{}: page {}/{} → {} chars in {}ms",
            engine.name(),
            page_num,
            total,
            page.chars(),
            page.duration_ms
        );
        if let Some(cb) = progress {
            cb.on_page_complete(page_num, total, page.chars());
        }
        pages.push(page);
    }

    info!("{} recognised {} pages", engine.name(), pages.len());
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns the image's file stem, failing on a configured name.
    struct StemEngine {
        fail_on: Option<&'static str>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl OcrEngine for StemEngine {
        fn name(&self) -> &str {
            "stem"
        }

        async fn recognize(&self, image: &Path) -> Result<String, ExtractError> {
            let stem = image
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.seen.lock().unwrap().push(stem.clone());
            if self.fail_on == Some(stem.as_str()) {
                return Err(ExtractError::Internal("engine refused".into()));
            }
            Ok(format!("<{stem}>"))
        }
    }

    fn images(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("page_{i}.png"))).collect()
    }

    #[tokio::test]
    async fn pages_come_back_in_order() {
        let engine = StemEngine {
            fail_on: None,
            seen: Mutex::new(Vec::new()),
        };
        let pages = recognize_pages(&engine, &images(3), None).await.unwrap();
        let texts: Vec<&str> = pages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["<page_0>", "<page_1>", "<page_2>"]);
        let nums: Vec<usize> = pages.iter().map(|p| p.page_num).collect();
        assert_eq!(nums, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn first_failure_aborts() {
        let engine = StemEngine {
            fail_on: Some("page_1"),
            seen: Mutex::new(Vec::new()),
        };
        let err = recognize_pages(&engine, &images(3), None).await.unwrap_err();
        match err {
            ExtractError::OcrFailed { page, image, .. } => {
                assert_eq!(page, 2);
                assert_eq!(image, PathBuf::from("page_1.png"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // page_2 was never attempted
        assert_eq!(*engine.seen.lock().unwrap(), vec!["page_0", "page_1"]);
    }

    #[tokio::test]
    async fn empty_input_is_empty_output() {
        let engine = StemEngine {
            fail_on: None,
            seen: Mutex::new(Vec::new()),
        };
        assert!(recognize_pages(&engine, &[], None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_tesseract_is_tool_missing() {
        let engine = TesseractOcr::new("docs2text-no-such-tesseract", "eng", 5);
        let err = recognize_pages(&engine, &images(1), None).await.unwrap_err();
        assert!(matches!(err, ExtractError::ToolMissing { .. }), "got {err:?}");
    }

    /// Executable stand-in for the tesseract CLI.
    #[cfg(unix)]
    fn fake_tesseract(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("tesseract");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn tesseract_stdout_is_the_page_text() {
        let dir = tempfile::tempdir().unwrap();
        // tesseract <image> stdout -l <lang>
        let bin = fake_tesseract(dir.path(), r#"printf "%s|%s|%s|%s" "$1" "$2" "$3" "$4""#);
        let image = dir.path().join("page_0.png");
        std::fs::write(&image, b"png").unwrap();

        let engine = TesseractOcr::new(&bin, "rus+eng", 5);
        let text = engine.recognize(&image).await.unwrap();
        assert_eq!(text, format!("{}|stdout|-l|rus+eng", image.display()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn tesseract_failure_names_the_page() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_tesseract(
            dir.path(),
            r#"case "$1" in *page_1.png) echo "Error in pixReadStream" >&2; exit 2;; esac
echo "text of $1""#,
        );
        let images: Vec<PathBuf> = (0..3)
            .map(|i| dir.path().join(format!("page_{i}.png")))
            .collect();

        let direct = TesseractOcr::new(&bin, "eng", 5)
            .recognize(&images[1])
            .await
            .unwrap_err();
        match &direct {
            ExtractError::ConversionFailed { tool, stderr, .. } => {
                assert_eq!(tool, "tesseract");
                assert_eq!(stderr, "Error in pixReadStream");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let engine = TesseractOcr::new(&bin, "eng", 5);
        let err = recognize_pages(&engine, &images, None).await.unwrap_err();
        match err {
            ExtractError::OcrFailed { page, image, detail } => {
                assert_eq!(page, 2);
                assert_eq!(image, images[1]);
                assert!(detail.contains("pixReadStream"), "{detail}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn from_config_reads_language() {
        let config = ExtractionConfig::builder()
            .ocr_language("rus")
            .build()
            .unwrap();
        assert_eq!(TesseractOcr::from_config(&config).language(), "rus");
    }
}
