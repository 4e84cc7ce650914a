//! HTML parsing for the news listing and article pages.
//!
//! Pure functions over HTML strings; fetching lives in [`super`].

use super::ArticleRecord;
use crate::error::ScrapeError;
use chrono::{DateTime, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Container of the article links on the listing page.
pub const LISTING_CONTAINER: &str = "div#_id_article_listing";

const HEADLINE: &str = "h1";
const SUBHEADER: &str = "h2.subheader";
const BODY: &str = "div.b_article-text";
const PUBLISHED: &str = "time[itemprop=datePublished]";

/// Timestamp format written to the CSV.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static SEL_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static SEL_HEADLINE: Lazy<Selector> = Lazy::new(|| Selector::parse(HEADLINE).unwrap());
static SEL_SUBHEADER: Lazy<Selector> = Lazy::new(|| Selector::parse(SUBHEADER).unwrap());
static SEL_BODY: Lazy<Selector> = Lazy::new(|| Selector::parse(BODY).unwrap());
static SEL_PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static SEL_PUBLISHED: Lazy<Selector> = Lazy::new(|| Selector::parse(PUBLISHED).unwrap());

/// Any whitespace run, including U+00A0.
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collect the article links inside the element matched by `container`.
///
/// Hrefs are resolved against `base_url`; fragments, `javascript:` and
/// other non-HTTP links are dropped. Duplicates are removed keeping the
/// first occurrence. A missing container is reported against `base_url`;
/// [`crate::news::scrape`] rewrites it to the listing URL it fetched.
pub fn collect_links(html: &str, base_url: &Url, container: &str) -> Result<Vec<String>, ScrapeError> {
    let container_sel = Selector::parse(container).map_err(|e| {
        ScrapeError::InvalidConfig(format!("bad listing selector '{container}': {e:?}"))
    })?;

    let document = Html::parse_document(html);
    let listing = document
        .select(&container_sel)
        .next()
        .ok_or_else(|| ScrapeError::MissingElement {
            url: base_url.to_string(),
            selector: container.to_string(),
        })?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in listing.select(&SEL_LINK) {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        if href.is_empty() || href.starts_with('#') {
            continue;
        }
        let Ok(mut resolved) = base_url.join(href) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        resolved.set_fragment(None);
        let link = resolved.to_string();
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }
    Ok(links)
}

/// Parse one article page.
///
/// Text is the headline, the optional sub-header and every paragraph of the
/// article body, each whitespace-normalised and joined by single spaces.
pub fn parse_article(url: &str, html: &str) -> Result<ArticleRecord, ScrapeError> {
    let document = Html::parse_document(html);
    let missing = |selector: &str| ScrapeError::MissingElement {
        url: url.to_string(),
        selector: selector.to_string(),
    };

    let headline = document
        .select(&SEL_HEADLINE)
        .next()
        .ok_or_else(|| missing(HEADLINE))?;
    let body = document
        .select(&SEL_BODY)
        .next()
        .ok_or_else(|| missing(BODY))?;
    let published = document
        .select(&SEL_PUBLISHED)
        .next()
        .ok_or_else(|| missing(PUBLISHED))?;

    let mut parts = vec![element_text(headline)];
    if let Some(sub) = document.select(&SEL_SUBHEADER).next() {
        parts.push(element_text(sub));
    }
    parts.extend(body.select(&SEL_PARAGRAPH).map(element_text));
    parts.retain(|p| !p.is_empty());

    let raw_date = published
        .value()
        .attr("datetime")
        .ok_or_else(|| missing(&format!("{PUBLISHED}[datetime]")))?;
    let date = parse_published(raw_date).ok_or_else(|| ScrapeError::BadDate {
        url: url.to_string(),
        value: raw_date.to_string(),
    })?;

    Ok(ArticleRecord {
        link: url.to_string(),
        text: parts.join(" "),
        date,
    })
}

/// Publication timestamp as local wall-clock time; the UTC offset is dropped.
pub fn parse_published(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, DATE_FORMAT))
        .ok()
}

/// Collapse whitespace (U+00A0 included) to single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").trim().to_string()
}

fn element_text(el: ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const LISTING: &str = r##"
        <html><body>
          <nav><a href="/outside/1.shtml">not in listing</a></nav>
          <div id="_id_article_listing">
            <a href="/sport/news/2024/05/22/23074501.shtml">Спорт</a>
            <a href="/army/news/2024/05/22/23074423.shtml#comments">Армия</a>
            <a href="/sport/news/2024/05/22/23074501.shtml">Спорт (повтор)</a>
            <a href="https://www.gazeta.ru/tech/news/2024/05/16/23023147.shtml">Tech</a>
            <a href="#top">top</a>
            <a href="javascript:void(0)">js</a>
            <a>no href</a>
          </div>
        </body></html>"##;

    const ARTICLE: &str = r#"
        <html><body>
          <h1>  Заголовок
             новости </h1>
          <h2 class="subheader">Подзаголовок</h2>
          <time itemprop="datePublished" datetime="2024-05-22T12:00:00+03:00">22 мая</time>
          <div class="b_article-text">
            <p>Первый&nbsp;абзац.</p>
            <p>   </p>
            <p>Второй абзац.</p>
          </div>
        </body></html>"#;

    fn base() -> Url {
        Url::parse("https://www.gazeta.ru").unwrap()
    }

    #[test]
    fn links_are_resolved_and_deduplicated() {
        let links = collect_links(LISTING, &base(), LISTING_CONTAINER).unwrap();
        assert_eq!(
            links,
            vec![
                "https://www.gazeta.ru/sport/news/2024/05/22/23074501.shtml",
                "https://www.gazeta.ru/army/news/2024/05/22/23074423.shtml",
                "https://www.gazeta.ru/tech/news/2024/05/16/23023147.shtml",
            ]
        );
    }

    #[test]
    fn missing_listing_is_an_error() {
        let err = collect_links("<html><body></body></html>", &base(), LISTING_CONTAINER).unwrap_err();
        assert!(matches!(err, ScrapeError::MissingElement { .. }), "got {err:?}");
    }

    #[test]
    fn empty_listing_yields_no_links() {
        let html = r#"<div id="_id_article_listing"></div>"#;
        assert!(collect_links(html, &base(), LISTING_CONTAINER).unwrap().is_empty());
    }

    #[test]
    fn article_text_and_date() {
        let record = parse_article("https://www.gazeta.ru/a.shtml", ARTICLE).unwrap();
        assert_eq!(
            record.text,
            "Заголовок новости Подзаголовок Первый абзац. Второй абзац."
        );
        assert_eq!(
            record.date,
            NaiveDate::from_ymd_opt(2024, 5, 22)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        );
        assert_eq!(record.link, "https://www.gazeta.ru/a.shtml");
    }

    #[test]
    fn subheader_is_optional() {
        let html = ARTICLE.replace(r#"<h2 class="subheader">Подзаголовок</h2>"#, "");
        let record = parse_article("u", &html).unwrap();
        assert_eq!(record.text, "Заголовок новости Первый абзац. Второй абзац.");
    }

    #[test]
    fn missing_headline_is_an_error() {
        let html = ARTICLE.replace("h1", "h3");
        match parse_article("https://example.com/broken_link", &html).unwrap_err() {
            ScrapeError::MissingElement { url, selector } => {
                assert_eq!(url, "https://example.com/broken_link");
                assert_eq!(selector, "h1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_date_is_reported() {
        let html = ARTICLE.replace("2024-05-22T12:00:00+03:00", "вчера");
        assert!(matches!(
            parse_article("u", &html).unwrap_err(),
            ScrapeError::BadDate { .. }
        ));
    }

    #[test]
    fn offset_is_dropped_not_applied() {
        let dt = parse_published("2024-05-22T23:30:00-05:00").unwrap();
        assert_eq!(dt.format(DATE_FORMAT).to_string(), "2024-05-22 23:30:00");
        let naive = parse_published("2024-05-22T08:15:00").unwrap();
        assert_eq!(naive.format(DATE_FORMAT).to_string(), "2024-05-22 08:15:00");
    }

    #[test]
    fn whitespace_normalisation() {
        assert_eq!(normalize_whitespace("\u{a0} a \n\t b\u{a0}c "), "a b c");
    }
}
