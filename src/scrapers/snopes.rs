//! Snopes fact-check scraper.
//!
//! This module scrapes [Snopes](https://www.snopes.com/fact-check/), walking
//! the paginated fact-check index to discover article URLs and turning each
//! article page into a structured [`ArticleRecord`].
//!
//! # Discovery
//!
//! The index lists articles inside `div.article_wrapper` elements and links
//! consecutive pages through an `a.page-number.next` affordance. Discovery
//! follows that chain, resolving every href against the page it appeared on,
//! until the chain ends, a page budget is exhausted, or pagination cycles
//! back to a visited page.
//!
//! # Extraction
//!
//! Field extraction is tiered. A JSON-LD `Article` block supplies title,
//! author, date and summary when present; direct markup supplies the rest
//! and backfills whatever the structured data left at the sentinel; the
//! first body paragraph is the summary of last resort. Extraction never
//! fails: a page matching none of the selectors still yields a record, with
//! every field at the `"N/A"` sentinel and an empty tag list.

use crate::error::FetchError;
use crate::fetcher::Fetcher;
use crate::models::{ArticleRecord, UNKNOWN};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Index page where the crawl starts by default.
pub const START_URL: &str = "https://www.snopes.com/fact-check/";

/// Site-name suffix stripped from `<title>` fallbacks.
const TITLE_SUFFIX: &str = "| Snopes.com";

static ARTICLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.article_wrapper a.outer_article_link_wrapper").unwrap());
static NEXT_PAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("a.page-number.next").unwrap());
static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static TITLE_TAG: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static AUTHOR_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("section.author-container a.author_link").unwrap());
static COVER_IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img#cover-main").unwrap());
static POST_DATE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "#article_main > section > section > div > section:nth-of-type(1) > div > div > div:nth-of-type(2) > h3",
    )
    .unwrap()
});
static RATING: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "html body main section section div div:nth-of-type(2) div:nth-of-type(1) article section div:nth-of-type(2) a div:nth-of-type(2)",
    )
    .unwrap()
});
static TAG_BUTTON: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div#tag_section a.tag_button").unwrap());
static CLAIM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.claim_wrapper div.claim_cont").unwrap());
static CONTEXT_BLOCK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.outer_fact_check_context div.fact_check_info_wrapper").unwrap());
static CONTEXT_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.fact_check_info_title").unwrap());
static CONTEXT_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.fact_check_info_description").unwrap());
static ARTICLE_CONTENT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article#article-content").unwrap());
static ARTICLE_BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Walk the paginated fact-check index and collect every article URL.
///
/// Returns a deduplicated set: an article linked from several index pages
/// appears once. Pagination stops when the next-page link disappears, when
/// `max_pages` pages have been fetched, or when the chain cycles back to a
/// page already visited.
///
/// # Errors
///
/// A fetch failure on the very first index page is fatal (there is nothing
/// to process) and is returned to the caller. Failures on later pages only
/// truncate discovery: a warning is logged and the URLs accumulated so far
/// are returned.
#[instrument(level = "info", skip_all, fields(%start_url, max_pages))]
pub async fn discover_all(
    fetcher: &Fetcher,
    start_url: &str,
    max_pages: usize,
) -> Result<HashSet<String>, FetchError> {
    let start = Url::parse(start_url)
        .map_err(|e| FetchError::InvalidUrl(format!("{start_url}: {e}")))?;

    let mut links: HashSet<String> = HashSet::new();
    let mut visited: HashSet<Url> = HashSet::new();
    let mut current = start;
    let mut pages = 0usize;

    loop {
        if pages >= max_pages {
            debug!(pages, "Page budget reached; stopping pagination");
            break;
        }
        if !visited.insert(current.clone()) {
            debug!(url = %current, "Pagination cycled back to a visited page; stopping");
            break;
        }

        let body = match fetcher.fetch(current.as_str()).await {
            Ok(body) => body,
            Err(e) if pages == 0 => return Err(e),
            Err(e) => {
                warn!(error = %e, url = %current, "Index fetch failed; keeping links found so far");
                break;
            }
        };
        pages += 1;

        let document = Html::parse_document(&body);
        let mut found = 0usize;
        for anchor in document.select(&ARTICLE_LINK) {
            if let Some(href) = anchor.value().attr("href") {
                if let Ok(resolved) = current.join(href) {
                    links.insert(resolved.to_string());
                    found += 1;
                }
            }
        }
        debug!(page = pages, url = %current, found, unique = links.len(), "Collected article links");

        let next = document
            .select(&NEXT_PAGE)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .and_then(|href| current.join(href).ok());
        match next {
            Some(next_url) => current = next_url,
            None => {
                debug!(page = pages, "No next-page link; pagination exhausted");
                break;
            }
        }
    }

    info!(pages, count = links.len(), "Discovered unique article links");
    Ok(links)
}

/// Extract a structured fact-check record from an article page.
///
/// Never fails. Each field runs its strategies in priority order and keeps
/// the first value produced; a field where every strategy comes up empty
/// stays at the sentinel.
pub fn extract(body: &str, url: &str) -> ArticleRecord {
    let document = Html::parse_document(body);
    let meta = structured_metadata(&document);
    let mut record = ArticleRecord::unknown(url);

    record.Title = or_unknown(meta.title.or_else(|| title_from_page(&document)));
    record.Author = or_unknown(meta.author.or_else(|| author_from_byline(&document)));
    record.Date = or_unknown(meta.date);
    record.Summary = or_unknown(
        meta.summary
            .or_else(|| summary_from_meta_tag(&document))
            .or_else(|| summary_from_first_paragraph(&document)),
    );
    record.Image = or_unknown(image_from_cover(&document));
    record.PostDate = or_unknown(text_at(&document, &POST_DATE));
    record.Rating = or_unknown(text_at(&document, &RATING));
    record.Tags = tags_in_order(&document);
    record.Claim = or_unknown(text_at(&document, &CLAIM));
    record.Context = or_unknown(context_blocks(&document));
    record.ArticleContent = or_unknown(content_html(&document));

    record
}

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNKNOWN.to_string())
}

/// Metadata pulled from the first JSON-LD block whose `@type` is `Article`.
#[derive(Debug, Default)]
struct StructuredMeta {
    title: Option<String>,
    author: Option<String>,
    date: Option<String>,
    summary: Option<String>,
}

/// Tier 1: scan the embedded JSON-LD blocks for an `Article` descriptor.
///
/// The payload may be a single object or a list (first element taken).
/// Malformed JSON and non-Article types are skipped silently; the author
/// field is honored only when `author` is a JSON object, since the site
/// also emits author lists that carry no usable single name.
fn structured_metadata(document: &Html) -> StructuredMeta {
    for script in document.select(&JSON_LD) {
        let raw = script.text().collect::<String>();
        let parsed: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "Skipping unparseable structured-data block");
                continue;
            }
        };
        let item = match &parsed {
            Value::Array(items) => match items.first() {
                Some(first) => first,
                None => continue,
            },
            other => other,
        };
        if item.get("@type").and_then(Value::as_str) != Some("Article") {
            continue;
        }
        return StructuredMeta {
            title: string_field(item, "headline"),
            author: item
                .get("author")
                .filter(|author| author.is_object())
                .and_then(|author| string_field(author, "name")),
            date: string_field(item, "datePublished"),
            summary: string_field(item, "description"),
        };
    }
    StructuredMeta::default()
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Tier 2 title: the page `<title>` with the site suffix removed.
fn title_from_page(document: &Html) -> Option<String> {
    document
        .select(&TITLE_TAG)
        .next()
        .map(|el| {
            el.text()
                .collect::<String>()
                .replace(TITLE_SUFFIX, "")
                .trim()
                .to_string()
        })
        .filter(|s| !s.is_empty())
}

/// Tier 2 summary: the description meta tag.
fn summary_from_meta_tag(document: &Html) -> Option<String> {
    document
        .select(&META_DESCRIPTION)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Tier 2 author: the byline link inside the author container.
fn author_from_byline(document: &Html) -> Option<String> {
    document
        .select(&AUTHOR_LINK)
        .next()
        .map(text_of)
        .filter(|s| !s.is_empty())
}

/// Last-resort summary: the first paragraph of the article body.
fn summary_from_first_paragraph(document: &Html) -> Option<String> {
    let article = document.select(&ARTICLE_BODY).next()?;
    let paragraph = article.select(&PARAGRAPH).next()?;
    Some(text_of(paragraph)).filter(|s| !s.is_empty())
}

fn image_from_cover(document: &Html) -> Option<String> {
    document
        .select(&COVER_IMAGE)
        .next()
        .and_then(|el| el.value().attr("src"))
        .map(str::to_string)
}

/// Trimmed text of the first element matching `selector`, if any.
///
/// The positional selectors (post date, rating) go through here; when the
/// page structure deviates they simply match nothing.
fn text_at(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(text_of)
        .filter(|s| !s.is_empty())
}

/// Every tag button inside the tag section, in document order.
fn tags_in_order(document: &Html) -> Vec<String> {
    document.select(&TAG_BUTTON).map(text_of).collect()
}

/// `"<title>: <description>"` for each fact-check info block, joined with a
/// single space. Blocks missing either part are skipped.
fn context_blocks(document: &Html) -> Option<String> {
    let joined = document
        .select(&CONTEXT_BLOCK)
        .filter_map(|block| {
            let title = block.select(&CONTEXT_TITLE).next().map(text_of)?;
            let description = block.select(&CONTEXT_DESCRIPTION).next().map(text_of)?;
            Some(format!("{title}: {description}"))
        })
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

/// Serialized HTML of the main article container, markup preserved.
fn content_html(document: &Html) -> Option<String> {
    document
        .select(&ARTICLE_CONTENT)
        .next()
        .map(|el| el.html())
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
