//! Command-line interface definitions for Fact Check Harvest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The crawl options have working defaults; the classifier and database
//! stages stay disabled until their endpoints are configured.

use crate::scrapers::snopes::START_URL;
use crate::upload::DEFAULT_BATCH_SIZE;
use clap::Parser;

/// Command-line arguments for the Fact Check Harvest application.
///
/// This struct defines all configuration options that can be passed to the
/// application at runtime. Options include crawl pacing, output paths, and
/// the optional classifier and database endpoints.
///
/// # Examples
///
/// ```sh
/// # Crawl with defaults, writing snopes_fact_checks.{json,csv}
/// fact_check_harvest
///
/// # Short crawl into custom output files
/// fact_check_harvest --max-pages 5 -j out.json -c out.csv
///
/// # With difficulty scoring and database upload enabled
/// fact_check_harvest --classifier-url http://localhost:8080/classify \
///     --supabase-url https://PROJECT.supabase.co --supabase-key KEY
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Index page where the crawl starts
    #[arg(long, default_value = START_URL)]
    pub start_url: String,

    /// Maximum number of index pages to walk
    #[arg(long, default_value_t = 300)]
    pub max_pages: usize,

    /// Minimum milliseconds between index page fetches
    #[arg(long, default_value_t = 1000)]
    pub index_delay_ms: u64,

    /// Minimum milliseconds between article fetches
    #[arg(long, default_value_t = 500)]
    pub article_delay_ms: u64,

    /// Output path for the JSON records file
    #[arg(short = 'j', long, default_value = "snopes_fact_checks.json")]
    pub json_output: String,

    /// Output path for the CSV records file
    #[arg(short = 'c', long, default_value = "snopes_fact_checks.csv")]
    pub csv_output: String,

    /// Skip the robots.txt pre-flight check
    #[arg(long)]
    pub ignore_robots: bool,

    /// Zero-shot classifier endpoint (optional, enables difficulty scoring)
    #[arg(long, env = "CLASSIFIER_URL")]
    pub classifier_url: Option<String>,

    /// Supabase project URL (optional, enables database upload)
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase API key, sent as both the apikey header and the bearer token
    #[arg(long, env = "SUPABASE_KEY")]
    pub supabase_key: Option<String>,

    /// Database table receiving the upserted rows
    #[arg(long, env = "SUPABASE_TABLE", default_value = "questions")]
    pub table: String,

    /// Rows per upload batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}
