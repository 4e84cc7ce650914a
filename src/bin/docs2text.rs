//! CLI binary for docs2text.
//!
//! A thin shim over the library crate: `extract` maps flags to
//! `ExtractionConfig` and prints the text, `news` maps flags to
//! `NewsConfig` and runs the scraper.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docs2text::{
    extract, extract_as, scrape, write_output, DocumentFormat, ExtractionConfig,
    ExtractionProgressCallback, NewsConfig, PageSeparator, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const SPINNER_TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while the document is converted
/// and rasterised, then a page bar with one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time of the page currently being processed.
    page_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Spinner-only until `on_extraction_start` reports the page count.
    fn new_dynamic(input: &str) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(SPINNER_TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message(format!("Opening {input}…"));
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(SPINNER_TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
    }

    fn take_elapsed_secs(&self) -> f64 {
        self.page_started
            .lock()
            .ok()
            .and_then(|mut started| started.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut started) = self.page_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, chars: usize) {
        let elapsed = self.take_elapsed_secs();
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{chars:>5} chars")),
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let elapsed = self.take_elapsed_secs();

        // Keep the log line on one screen row.
        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(std::iter::once('…')).collect()
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.finish_and_clear();
    }

    fn on_extraction_complete(&self, total_pages: usize, total_chars: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages extracted  {}",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&format!("{total_chars} chars")),
        );
    }
}

impl Drop for CliProgressCallback {
    fn drop(&mut self) {
        // Failures before the first page never reach on_page_error.
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # OCR a scanned DJVU book (stdout)
  docs2text extract book.djvu --lang rus+eng

  # Write to a file, form feed between pages
  docs2text extract book.djvu --separator formfeed -o book.txt

  # PDF text layer, DOCX and DOC paragraphs
  docs2text extract paper.pdf
  docs2text extract report.docx
  docs2text extract memo.doc

  # Download first, force the format
  docs2text extract https://example.com/get?id=42 --format pdf

  # JSON output with per-page text and timings
  docs2text extract book.djvu --json > book.json

  # Scrape the news listing into output.csv
  docs2text news --max-articles 20

EXTERNAL TOOLS:
  ddjvu       DjVuLibre, DJVU → PDF        (apt install djvulibre-bin)
  tesseract   OCR for DJVU pages           (apt install tesseract-ocr tesseract-ocr-rus)
  soffice     LibreOffice, DOC → DOCX      (apt install libreoffice-writer)
  pdfium      PDF rendering / text layer   (PDFIUM_LIB_PATH, ./, or system path)

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         pdfium library file or the directory containing it
  RUST_LOG                Override the log filter (e.g. docs2text=debug)
  DOCS2TEXT_*             Every flag, e.g. DOCS2TEXT_LANG=rus
"#;

/// Extract text from DJVU, DOC, DOCX and PDF documents, or scrape news to CSV.
#[derive(Parser, Debug)]
#[command(
    name = "docs2text",
    version,
    about = "Extract plain text from DJVU, DOC, DOCX and PDF documents",
    long_about = "Extract plain text from documents: DJVU through OCR (ddjvu + pdfium + tesseract), \
PDF from its text layer, DOCX from its body paragraphs and DOC via LibreOffice. \
The `news` subcommand scrapes a news listing into a CSV file.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCS2TEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCS2TEXT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the text of one document.
    Extract(ExtractArgs),
    /// Scrape the news listing and write a CSV.
    News(NewsArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Local document path or HTTP/HTTPS URL.
    input: String,

    /// Treat the input as this format instead of detecting it.
    #[arg(long, env = "DOCS2TEXT_FORMAT", value_enum)]
    format: Option<FormatArg>,

    /// Write the text to this file instead of stdout.
    #[arg(short, long, env = "DOCS2TEXT_OUTPUT")]
    output: Option<PathBuf>,

    /// Output structured JSON (text, pages, stats) instead of plain text.
    #[arg(long, env = "DOCS2TEXT_JSON")]
    json: bool,

    /// Tesseract language(s), e.g. eng, rus, rus+eng.
    #[arg(long = "lang", env = "DOCS2TEXT_LANG", default_value = "eng")]
    language: String,

    /// Page separator: none, newline, formfeed, comment, or a custom string.
    #[arg(long, env = "DOCS2TEXT_SEPARATOR", default_value = "none")]
    separator: String,

    /// Rendering DPI for OCR (72–400).
    #[arg(long, env = "DOCS2TEXT_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Maximum rendered page edge in pixels.
    #[arg(long, env = "DOCS2TEXT_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// Timeout for each external tool run, in seconds.
    #[arg(long, env = "DOCS2TEXT_TOOL_TIMEOUT", default_value_t = 300)]
    tool_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DOCS2TEXT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "DOCS2TEXT_PASSWORD")]
    password: Option<String>,

    /// Path to the ddjvu binary.
    #[arg(long, env = "DOCS2TEXT_DDJVU", default_value = "ddjvu")]
    ddjvu: PathBuf,

    /// Path to the tesseract binary.
    #[arg(long, env = "DOCS2TEXT_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Path to the soffice binary.
    #[arg(long, env = "DOCS2TEXT_SOFFICE", default_value = "soffice")]
    soffice: PathBuf,

    /// Disable progress bar.
    #[arg(long, env = "DOCS2TEXT_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct NewsArgs {
    /// Listing page with the article links.
    #[arg(long, env = "DOCS2TEXT_LISTING_URL", default_value = "https://www.gazeta.ru/news/")]
    listing_url: String,

    /// Origin relative article links are resolved against.
    #[arg(long, env = "DOCS2TEXT_BASE_URL", default_value = "https://www.gazeta.ru")]
    base_url: String,

    /// CSV output path.
    #[arg(short, long, env = "DOCS2TEXT_NEWS_OUTPUT", default_value = "output.csv")]
    output: PathBuf,

    /// Only scrape the first N articles.
    #[arg(long, env = "DOCS2TEXT_MAX_ARTICLES")]
    max_articles: Option<usize>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "DOCS2TEXT_TIMEOUT", default_value_t = 30)]
    timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Djvu,
    Doc,
    Docx,
    Pdf,
}

impl From<FormatArg> for DocumentFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Djvu => DocumentFormat::Djvu,
            FormatArg::Doc => DocumentFormat::Doc,
            FormatArg::Docx => DocumentFormat::Docx,
            FormatArg::Pdf => DocumentFormat::Pdf,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO-level library logs would tear the progress bar; keep them off
    // while it is shown.
    let show_progress = match &cli.command {
        Command::Extract(args) => !cli.quiet && !args.no_progress && !args.json,
        Command::News(_) => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Extract(args) => run_extract(args, cli.quiet, show_progress).await,
        Command::News(args) => run_news(args, cli.quiet).await,
    }
}

async fn run_extract(args: &ExtractArgs, quiet: bool, show_progress: bool) -> Result<()> {
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic(&args.input);
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(args, progress_cb)?;

    let output = match args.format {
        Some(format) => extract_as(&args.input, format.into(), &config).await,
        None => extract(&args.input, &config).await,
    }
    .with_context(|| format!("Extraction failed for '{}'", args.input))?;
    // Drops the progress bar before anything is printed.
    drop(config);

    if let Some(ref output_path) = args.output {
        write_output(&output, output_path)
            .await
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        if !quiet {
            eprintln!(
                "{}  {} pages  {}ms  →  {}",
                green("✔"),
                output.stats.total_pages,
                output.stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
        return Ok(());
    }

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.text.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if !quiet && !show_progress && !args.json {
        eprintln!(
            "Extracted {} pages ({}) in {}ms",
            output.stats.total_pages, output.format, output.stats.total_duration_ms
        );
    }
    Ok(())
}

async fn run_news(args: &NewsArgs, quiet: bool) -> Result<()> {
    let mut builder = NewsConfig::builder()
        .listing_url(&args.listing_url)
        .base_url(&args.base_url)
        .output_path(&args.output)
        .request_timeout_secs(args.timeout);
    if let Some(n) = args.max_articles {
        builder = builder.max_articles(n);
    }
    let config = builder.build().context("Invalid configuration")?;

    let report = scrape(&config)
        .await
        .with_context(|| format!("Scraping '{}' failed", config.listing_url))?;

    if !quiet {
        eprintln!(
            "{}  {}/{} articles  →  {}",
            if report.failures.is_empty() {
                green("✔")
            } else {
                cyan("⚠")
            },
            report.records.len(),
            report.links_found,
            bold(&report.output_path.display().to_string()),
        );
        for failure in &report.failures {
            eprintln!("   {} {}", red("✗"), dim(&failure.to_string()));
        }
    }
    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(args: &ExtractArgs, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .dpi(args.dpi)
        .max_rendered_pixels(args.max_pixels)
        .page_separator(parse_separator(&args.separator))
        .ocr_language(&args.language)
        .ddjvu_binary(&args.ddjvu)
        .tesseract_binary(&args.tesseract)
        .soffice_binary(&args.soffice)
        .tool_timeout_secs(args.tool_timeout)
        .download_timeout_secs(args.download_timeout);

    if let Some(ref password) = args.password {
        builder = builder.password(password);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--separator` string into `PageSeparator`.
fn parse_separator(s: &str) -> PageSeparator {
    match s.to_lowercase().as_str() {
        "none" => PageSeparator::None,
        "newline" | "nl" => PageSeparator::Newline,
        "formfeed" | "ff" => PageSeparator::FormFeed,
        "comment" => PageSeparator::Comment,
        _ => PageSeparator::Custom(s.to_string()),
    }
}
