//! Scrapers for fact-checking sources.
//!
//! Each scraper follows a consistent two-phase pattern:
//!
//! 1. **Discovery**: Walk the source's paginated index and collect a
//!    deduplicated set of article URLs
//! 2. **Extraction**: Turn a fetched article page into a structured
//!    [`ArticleRecord`](crate::models::ArticleRecord)
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Snopes | [`snopes`] | HTML scraping | Paginated fact-check index |
//!
//! # Common Patterns
//!
//! Scrapers use:
//! - Selectors compiled once as `Lazy` statics
//! - Tiered extraction: structured metadata first, direct markup second,
//!   content fallbacks last; missing markup leaves field sentinels
//! - Graceful degradation (a page that matches nothing still yields a record)

pub mod snopes;
