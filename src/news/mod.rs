//! News listing scraper.
//!
//! Fetches a listing page, follows every article link inside the listing
//! container, extracts headline + body text + publication time from each
//! article and writes the lot to a CSV file.
//!
//! ```text
//! listing ──▶ collect_links ──▶ fetch article ──▶ parse_article ──▶ write_csv
//!                                   (sequential; failures are skipped)
//! ```
//!
//! A broken article never aborts the run: it is logged, kept in
//! [`ScrapeReport::failures`] and left out of the CSV. Only a failure to
//! fetch or parse the listing, or to write the CSV, is fatal.

pub mod export;
pub mod parse;

use crate::config::NewsConfig;
use crate::error::ScrapeError;
use chrono::NaiveDateTime;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

pub use export::write_csv;
pub use parse::{collect_links, parse_article, LISTING_CONTAINER};

/// One scraped article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Absolute article URL.
    pub link: String,
    /// Headline, sub-header and body paragraphs joined by single spaces.
    pub text: String,
    /// Publication time, local wall clock of the source.
    pub date: NaiveDateTime,
}

/// Outcome of a [`scrape`] run.
#[derive(Debug)]
pub struct ScrapeReport {
    /// Links found on the listing page (after the `max_articles` cut).
    pub links_found: usize,
    /// Articles that parsed, in listing order.
    pub records: Vec<ArticleRecord>,
    /// Articles that were skipped, with the reason.
    pub failures: Vec<ScrapeError>,
    /// Where the CSV was written.
    pub output_path: PathBuf,
}

/// Scrape the configured listing and write the CSV.
pub async fn scrape(config: &NewsConfig) -> Result<ScrapeReport, ScrapeError> {
    let base_url = Url::parse(&config.base_url)
        .map_err(|e| ScrapeError::InvalidConfig(format!("base URL '{}': {e}", config.base_url)))?;
    let client = build_client(config)?;

    info!("Fetching listing: {}", config.listing_url);
    let listing = fetch_html(&client, &config.listing_url).await?;
    let mut links =
        collect_links(&listing, &base_url, LISTING_CONTAINER).map_err(|e| match e {
            ScrapeError::MissingElement { selector, .. } => ScrapeError::MissingElement {
                url: config.listing_url.clone(),
                selector,
            },
            other => other,
        })?;
    if let Some(max) = config.max_articles {
        links.truncate(max);
    }
    info!("Got {} links", links.len());

    let mut records = Vec::with_capacity(links.len());
    let mut failures = Vec::new();
    for link in &links {
        match scrape_article(&client, link).await {
            Ok(record) => {
                debug!("Parsed {} ({} chars)", link, record.text.chars().count());
                records.push(record);
            }
            Err(e) => {
                warn!("Skipping article: {}", e);
                failures.push(e);
            }
        }
    }

    write_csv(&config.output_path, &records)?;
    info!(
        "Scrape complete: {} articles written, {} skipped",
        records.len(),
        failures.len()
    );

    Ok(ScrapeReport {
        links_found: links.len(),
        records,
        failures,
        output_path: config.output_path.clone(),
    })
}

/// Fetch and parse a single article.
pub async fn scrape_article(client: &Client, url: &str) -> Result<ArticleRecord, ScrapeError> {
    let html = fetch_html(client, url).await?;
    parse_article(url, &html)
}

/// HTTP client carrying the configured user agent and timeout.
pub fn build_client(config: &NewsConfig) -> Result<Client, ScrapeError> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| ScrapeError::Http {
            url: config.listing_url.clone(),
            reason: e.to_string(),
        })
}

async fn fetch_html(client: &Client, url: &str) -> Result<String, ScrapeError> {
    let http_err = |e: reqwest::Error| ScrapeError::Http {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let response = client.get(url).send().await.map_err(http_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(http_err)
}
