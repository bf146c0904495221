//! # Fact Check Harvest
//!
//! A fact-check harvesting pipeline that crawls a fact-checking site's
//! article index, extracts structured records from each article page, and
//! writes JSON and CSV exports. Optional stages score each claim's
//! difficulty with a zero-shot classifier and upsert the results into a
//! Supabase table.
//!
//! ## Features
//!
//! - Walks the paginated fact-check index with polite, fixed-delay pacing
//! - Extracts title, claim, rating, tags and article content from each page
//! - Persists the full record list after every article, atomically
//! - Scores claim difficulty through a zero-shot classification endpoint
//! - Upserts scored records into Supabase, keyed on article URL
//!
//! ## Usage
//!
//! ```sh
//! fact_check_harvest --max-pages 10 -j out.json -c out.csv
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Discovery**: Walk the paginated index and collect unique article URLs
//! 2. **Crawling**: Fetch each article sequentially and extract a record
//! 3. **Scoring**: Send summaries to the classifier (parallel, 4 at a time)
//! 4. **Upload**: Upsert scored rows into the database in batches of 100

use clap::Parser;
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod cli;
mod error;
mod fetcher;
mod models;
mod outputs;
mod scrapers;
mod upload;
mod utils;

use api::score_with_backoff;
use cli::Cli;
use fetcher::{build_client, load_robots_txt, Fetcher};
use models::{ArticleRecord, ScoredRecord};
use outputs::{csv, json};
use utils::{ensure_parent_writable, scored_path, truncate_for_log};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("fact_check_harvest starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.start_url, ?args.json_output, ?args.csv_output, "Parsed CLI arguments");

    // Early check: ensure both output paths are writable
    for path in [args.json_output.as_str(), args.csv_output.as_str()] {
        if let Err(e) = ensure_parent_writable(path).await {
            error!(
                path = %path,
                error = %e,
                "Output path is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let client = build_client()?;

    // ---- Robots pre-flight ----
    let robots_txt = if args.ignore_robots {
        info!("Robots pre-flight disabled");
        None
    } else {
        load_robots_txt(&client, &args.start_url).await
    };

    let index_fetcher = Fetcher::new(
        client.clone(),
        Duration::from_millis(args.index_delay_ms),
        robots_txt.clone(),
    );
    let article_fetcher = Fetcher::new(
        client.clone(),
        Duration::from_millis(args.article_delay_ms),
        robots_txt,
    );

    // ---- Discover article URLs ----
    info!(start_url = %args.start_url, max_pages = args.max_pages, "Starting link discovery");
    let links =
        scrapers::snopes::discover_all(&index_fetcher, &args.start_url, args.max_pages).await?;

    // Sorted so repeat runs crawl in a stable order
    let mut urls: Vec<String> = links.into_iter().collect();
    urls.sort();

    // ---- Crawl articles sequentially ----
    use std::sync::Arc;

    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = Arc::clone(&cancelled);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received; finishing the current article before stopping");
                cancelled.store(true, Ordering::SeqCst);
            }
        });
    }

    let total = urls.len();
    let (records, failed) =
        crawl_articles(&article_fetcher, &urls, &args.json_output, &cancelled).await?;

    info!(total, processed = records.len(), failed, "Crawl completed");

    if let Err(e) = csv::write_records(&args.csv_output, &records).await {
        error!(path = %args.csv_output, error = %e, "Failed to write records CSV");
    }

    // ---- Difficulty scoring (optional) ----
    use futures::stream::{self, StreamExt};
    const SCORING_BATCH_SIZE: usize = 4;

    let scored: Vec<ScoredRecord> = match args.classifier_url.as_deref() {
        Some(endpoint) => {
            let total = records.len();
            info!(
                total,
                scoring_batch_size = SCORING_BATCH_SIZE,
                endpoint = %endpoint,
                "Starting difficulty scoring"
            );

            let scored: Vec<ScoredRecord> = stream::iter(records.into_iter().enumerate())
                .map(|(i, record)| {
                    let client = client.clone();
                    let endpoint = endpoint.to_string();
                    async move {
                        if !record.has_summary() {
                            debug!(index = i, "No usable summary; leaving record unscored");
                            return ScoredRecord {
                                record,
                                Difficulty_Score: None,
                            };
                        }
                        let score = match score_with_backoff(&client, &endpoint, &record.Summary)
                            .await
                        {
                            Ok(Some(score)) => Some(score),
                            Ok(None) => {
                                warn!(index = i, "Classifier ranked no usable label; leaving record unscored");
                                None
                            }
                            Err(e) => {
                                warn!(index = i, error = %e, "Difficulty scoring failed; leaving record unscored");
                                None
                            }
                        };
                        ScoredRecord {
                            record,
                            Difficulty_Score: score,
                        }
                    }
                })
                .buffered(SCORING_BATCH_SIZE)
                .collect()
                .await;

            let with_score = scored
                .iter()
                .filter(|s| s.Difficulty_Score.is_some())
                .count();
            info!(
                total,
                scored = with_score,
                unscored = total - with_score,
                "Completed difficulty scoring"
            );
            scored
        }
        None => {
            info!("No classifier endpoint configured; skipping difficulty scoring");
            records
                .into_iter()
                .map(|record| ScoredRecord {
                    record,
                    Difficulty_Score: None,
                })
                .collect()
        }
    };

    if args.classifier_url.is_some() {
        let scored_json = scored_path(&args.json_output);
        if let Err(e) = json::write_records(&scored_json, &scored).await {
            error!(path = %scored_json, error = %e, "Failed to write scored JSON");
        }
        let scored_csv = scored_path(&args.csv_output);
        if let Err(e) = csv::write_scored(&scored_csv, &scored).await {
            error!(path = %scored_csv, error = %e, "Failed to write scored CSV");
        }
    }

    // ---- Database upload (optional) ----
    match (&args.supabase_url, &args.supabase_key) {
        (Some(base_url), Some(api_key)) => {
            let uploader = upload::Uploader::new(
                client.clone(),
                base_url,
                api_key,
                &args.table,
                args.batch_size,
            );
            uploader.upload_all(&scored).await;
        }
        _ => {
            info!("Supabase URL or key not configured; skipping database upload");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Crawl every URL in order, extracting one record per page.
///
/// A failed fetch logs the URL and its cause, counts toward the failure
/// tally, and never stops the loop; extraction itself cannot fail. After
/// each successful article the full accumulated list is persisted to
/// `json_path`, so an interrupted run keeps everything it already earned.
/// The cancellation flag is honored between iterations, never mid-article.
#[instrument(level = "info", skip_all, fields(total = urls.len()))]
async fn crawl_articles(
    fetcher: &Fetcher,
    urls: &[String],
    json_path: &str,
    cancelled: &AtomicBool,
) -> Result<(Vec<ArticleRecord>, usize), Box<dyn Error>> {
    let total = urls.len();
    let mut records: Vec<ArticleRecord> = Vec::new();
    let mut failed = 0usize;

    for (index, url) in urls.iter().enumerate() {
        if cancelled.load(Ordering::SeqCst) {
            warn!(
                processed = records.len(),
                remaining = total - index,
                "Interrupted; stopping crawl"
            );
            break;
        }

        debug!(index = index + 1, total, %url, "Fetching article");
        let body = match fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, %url, "Article fetch failed; skipping");
                failed += 1;
                continue;
            }
        };

        let record = scrapers::snopes::extract(&body, url);
        debug!(title = %truncate_for_log(&record.Title, 120), "Extracted article");
        records.push(record);

        // Persist the full accumulated list so an aborted run keeps its work
        json::write_records(json_path, &records).await?;
    }

    Ok((records, failed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ARTICLE_HTML: &str =
        "<html><head><title>Some Claim | Snopes.com</title></head><body></body></html>";

    #[tokio::test]
    async fn test_crawl_articles_skips_failed_fetch_and_persists_the_rest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fact-check/first"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_HTML))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fact-check/second"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fact-check/third"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_HTML))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("records.json");
        let json_path = json_path.to_str().unwrap();

        let urls: Vec<String> = ["first", "second", "third"]
            .iter()
            .map(|slug| format!("{}/fact-check/{slug}", server.uri()))
            .collect();
        let fetcher = Fetcher::new(build_client().unwrap(), Duration::ZERO, None);
        let cancelled = AtomicBool::new(false);

        let (records, failed) = crawl_articles(&fetcher, &urls, json_path, &cancelled)
            .await
            .unwrap();

        assert_eq!(failed, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].URL, urls[0]);
        assert_eq!(records[0].Title, "Some Claim");
        assert_eq!(records[1].URL, urls[2]);

        let raw = std::fs::read_to_string(json_path).unwrap();
        let persisted: Vec<ArticleRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, records);
    }

    #[tokio::test]
    async fn test_crawl_articles_honors_cancellation_before_any_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_HTML))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("records.json");

        let urls = vec![format!("{}/fact-check/first", server.uri())];
        let fetcher = Fetcher::new(build_client().unwrap(), Duration::ZERO, None);
        let cancelled = AtomicBool::new(true);

        let (records, failed) =
            crawl_articles(&fetcher, &urls, json_path.to_str().unwrap(), &cancelled)
                .await
                .unwrap();

        assert!(records.is_empty());
        assert_eq!(failed, 0);
        assert!(!json_path.exists());
    }
}
