//! Configuration types for document extraction and news scraping.
//!
//! Extraction behaviour is controlled through [`ExtractionConfig`], built via
//! its [`ExtractionConfigBuilder`]; the scraper uses [`NewsConfig`] and
//! [`NewsConfigBuilder`]. Every knob lives in one struct so a config can be
//! shared across tasks and logged as a unit.

use crate::error::{ExtractError, ScrapeError};
use crate::pipeline::ocr::OcrEngine;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a document extraction.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use docs2text::{ExtractionConfig, PageSeparator};
///
/// let config = ExtractionConfig::builder()
///     .dpi(200)
///     .ocr_language("rus+eng")
///     .page_separator(PageSeparator::FormFeed)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Rendering DPI used when rasterising pages for OCR. Range: 72–400. Default: 150.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 2000.
    ///
    /// Caps the raster size independently of DPI so an oversized page
    /// cannot exhaust memory.
    pub max_rendered_pixels: u32,

    /// Separator inserted between pages in the assembled text. Default: [`PageSeparator::None`].
    pub page_separator: PageSeparator,

    /// Tesseract language code(s), e.g. `eng`, `rus`, `rus+eng`. Default: `eng`.
    pub ocr_language: String,

    /// `ddjvu -quality` value for the DJVU → PDF conversion. Range: 1–100. Default: 85.
    pub djvu_quality: u8,

    /// DjVuLibre converter binary. Default: `ddjvu`.
    pub ddjvu_binary: PathBuf,

    /// Tesseract binary used by the default OCR engine. Default: `tesseract`.
    pub tesseract_binary: PathBuf,

    /// LibreOffice binary used for DOC → DOCX conversion. Default: `soffice`.
    pub soffice_binary: PathBuf,

    /// Upper bound on any single external tool invocation, in seconds. Default: 300.
    pub tool_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Parent directory for per-invocation scratch directories.
    /// If None, uses the system temp directory.
    pub scratch_root: Option<PathBuf>,

    /// Pre-constructed OCR engine. Takes precedence over `tesseract_binary`.
    pub ocr_engine: Option<Arc<dyn OcrEngine>>,

    /// Receives per-page events while a document is processed.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            max_rendered_pixels: 2000,
            page_separator: PageSeparator::default(),
            ocr_language: "eng".to_string(),
            djvu_quality: 85,
            ddjvu_binary: PathBuf::from("ddjvu"),
            tesseract_binary: PathBuf::from("tesseract"),
            soffice_binary: PathBuf::from("soffice"),
            tool_timeout_secs: 300,
            download_timeout_secs: 120,
            password: None,
            scratch_root: None,
            ocr_engine: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("page_separator", &self.page_separator)
            .field("ocr_language", &self.ocr_language)
            .field("djvu_quality", &self.djvu_quality)
            .field("ddjvu_binary", &self.ddjvu_binary)
            .field("tesseract_binary", &self.tesseract_binary)
            .field("soffice_binary", &self.soffice_binary)
            .field("tool_timeout_secs", &self.tool_timeout_secs)
            .field("scratch_root", &self.scratch_root)
            .field(
                "ocr_engine",
                &self.ocr_engine.as_ref().map(|e| e.name().to_string()),
            )
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn djvu_quality(mut self, quality: u8) -> Self {
        self.config.djvu_quality = quality;
        self
    }

    pub fn ddjvu_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ddjvu_binary = path.into();
        self
    }

    pub fn tesseract_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_binary = path.into();
        self
    }

    pub fn soffice_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.soffice_binary = path.into();
        self
    }

    pub fn tool_timeout_secs(mut self, secs: u64) -> Self {
        self.config.tool_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = Some(dir.into());
        self
    }

    pub fn ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr_engine = Some(engine);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(ExtractError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.djvu_quality == 0 || c.djvu_quality > 100 {
            return Err(ExtractError::InvalidConfig(format!(
                "DJVU quality must be 1–100, got {}",
                c.djvu_quality
            )));
        }
        if c.tool_timeout_secs == 0 {
            return Err(ExtractError::InvalidConfig(
                "Tool timeout must be ≥ 1 second".into(),
            ));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How to separate pages in the assembled text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSeparator {
    /// Pages are concatenated as-is. (default)
    #[default]
    None,
    /// A single newline between pages.
    Newline,
    /// ASCII form feed (`\x0c`), the conventional plain-text page break.
    FormFeed,
    /// A marker line with the page number: "\n--- page N ---\n"
    Comment,
    /// Custom string inserted between pages.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator placed before the given page (1-indexed).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageSeparator::None => String::new(),
            PageSeparator::Newline => "\n".to_string(),
            PageSeparator::FormFeed => "\x0c".to_string(),
            PageSeparator::Comment => format!("\n--- page {} ---\n", page_num),
            PageSeparator::Custom(s) => s.clone(),
        }
    }
}

// ── News scraper ─────────────────────────────────────────────────────────

/// Configuration for [`crate::news::scrape`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Listing page holding the article links. Default: `https://www.gazeta.ru/news/`.
    pub listing_url: String,

    /// Origin that relative article hrefs are resolved against. Default: `https://www.gazeta.ru`.
    pub base_url: String,

    /// CSV destination. Default: `output.csv`.
    pub output_path: PathBuf,

    /// Stop after this many article links. Default: no limit.
    pub max_articles: Option<usize>,

    /// Per-request timeout in seconds. Default: 30.
    pub request_timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            listing_url: "https://www.gazeta.ru/news/".to_string(),
            base_url: "https://www.gazeta.ru".to_string(),
            output_path: PathBuf::from("output.csv"),
            max_articles: None,
            request_timeout_secs: 30,
            user_agent: concat!("docs2text/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl NewsConfig {
    /// Create a new builder for `NewsConfig`.
    pub fn builder() -> NewsConfigBuilder {
        NewsConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`NewsConfig`].
#[derive(Debug)]
pub struct NewsConfigBuilder {
    config: NewsConfig,
}

impl NewsConfigBuilder {
    pub fn listing_url(mut self, url: impl Into<String>) -> Self {
        self.config.listing_url = url.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn max_articles(mut self, n: usize) -> Self {
        self.config.max_articles = Some(n);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<NewsConfig, ScrapeError> {
        let c = &self.config;
        for (name, url) in [("listing URL", &c.listing_url), ("base URL", &c.base_url)] {
            if reqwest::Url::parse(url).is_err() {
                return Err(ScrapeError::InvalidConfig(format!(
                    "{name} is not a valid URL: '{url}'"
                )));
            }
        }
        if c.request_timeout_secs == 0 {
            return Err(ScrapeError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_converter_invocation() {
        let c = ExtractionConfig::default();
        assert_eq!(c.djvu_quality, 85);
        assert_eq!(c.ddjvu_binary, PathBuf::from("ddjvu"));
        assert_eq!(c.page_separator, PageSeparator::None);
        assert!(c.scratch_root.is_none());
    }

    #[test]
    fn builder_clamps_dpi() {
        let c = ExtractionConfig::builder().dpi(10_000).build().unwrap();
        assert_eq!(c.dpi, 400);
        let c = ExtractionConfig::builder().dpi(1).build().unwrap();
        assert_eq!(c.dpi, 72);
    }

    #[test]
    fn builder_rejects_bad_quality() {
        assert!(ExtractionConfig::builder().djvu_quality(0).build().is_err());
        assert!(ExtractionConfig::builder().djvu_quality(101).build().is_err());
        assert!(ExtractionConfig::builder().djvu_quality(100).build().is_ok());
    }

    #[test]
    fn builder_rejects_zero_timeout_and_blank_language() {
        assert!(ExtractionConfig::builder()
            .tool_timeout_secs(0)
            .build()
            .is_err());
        assert!(ExtractionConfig::builder().ocr_language("  ").build().is_err());
    }

    #[test]
    fn separator_rendering() {
        assert_eq!(PageSeparator::None.render(2), "");
        assert_eq!(PageSeparator::Newline.render(2), "\n");
        assert_eq!(PageSeparator::FormFeed.render(2), "\x0c");
        assert_eq!(PageSeparator::Comment.render(3), "\n--- page 3 ---\n");
        assert_eq!(PageSeparator::Custom("<>".into()).render(9), "<>");
    }

    #[test]
    fn news_builder_validates_urls() {
        assert!(NewsConfig::builder().listing_url("not a url").build().is_err());
        let c = NewsConfig::builder()
            .listing_url("http://127.0.0.1:8080/news/")
            .base_url("http://127.0.0.1:8080")
            .max_articles(5)
            .build()
            .unwrap();
        assert_eq!(c.max_articles, Some(5));
        assert_eq!(c.output_path, PathBuf::from("output.csv"));
    }
}
