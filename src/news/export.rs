//! CSV export of scraped articles.

use super::parse::DATE_FORMAT;
use super::ArticleRecord;
use crate::error::ScrapeError;
use std::path::Path;
use tracing::info;

/// Column header, in row order: link, text, date.
pub const CSV_HEADER: [&str; 3] = ["Ссылка", "Текст", "Дата"];

/// Write `records` to `path` as CSV: the header row, then one row per record.
///
/// An existing file is overwritten. Missing parent directories are created.
pub fn write_csv(path: &Path, records: &[ArticleRecord]) -> Result<(), ScrapeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ScrapeError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let csv_err = |source: csv::Error| ScrapeError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(CSV_HEADER).map_err(csv_err)?;
    for record in records {
        let date = record.date.format(DATE_FORMAT).to_string();
        writer
            .write_record([record.link.as_str(), record.text.as_str(), date.as_str()])
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ScrapeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
