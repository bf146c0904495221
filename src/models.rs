//! Data models for fact-check records and collaborator payloads.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ArticleRecord`]: One extracted fact-check article
//! - [`ScoredRecord`]: An article plus its zero-shot difficulty score
//! - [`UploadRow`]: The redacted shape sent to the remote store
//! - [`ZeroShotRequest`] / [`ZeroShotResponse`]: Classifier wire payloads
//!
//! The record models use the literal column names of the established output
//! schema (`Title`, `PostDate`, ...) so serialization matches the files and
//! store table downstream tooling already consumes, hence the
//! `#[allow(non_snake_case)]` attributes.

use serde::{Deserialize, Serialize};

/// Placeholder recorded when every extraction strategy for a field came up
/// empty. Distinguishes "looked and found nothing" from an intentionally
/// empty value.
pub const UNKNOWN: &str = "N/A";

/// One fact-check article extracted from the target site.
///
/// A record is constructed once per unique URL with every field at the
/// [`UNKNOWN`] sentinel, populated as extraction strategies run, and treated
/// as immutable once persisted. `Tags` is always a sequence (possibly
/// empty), never the sentinel. `URL` is never the sentinel: a page with no
/// resolvable URL is never turned into a record.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// Article headline.
    pub Title: String,
    /// Byline author.
    pub Author: String,
    /// Publication date as printed by the page (kept verbatim).
    pub Date: String,
    /// Short description of the fact check.
    pub Summary: String,
    /// Canonical absolute URL. Unique key for deduplication and upsert.
    pub URL: String,
    /// Cover image URL.
    pub Image: String,
    /// Posted/updated date from the article header area.
    pub PostDate: String,
    /// Verdict rating ("True", "False", "Mixture", ...).
    pub Rating: String,
    /// Topic tags in document order.
    pub Tags: Vec<String>,
    /// The claim under examination.
    pub Claim: String,
    /// Concatenated fact-check context blocks.
    pub Context: String,
    /// Serialized HTML of the main article body.
    pub ArticleContent: String,
}

impl ArticleRecord {
    /// Create a record for `url` with every other field at the sentinel.
    pub fn unknown(url: &str) -> Self {
        Self {
            Title: UNKNOWN.to_string(),
            Author: UNKNOWN.to_string(),
            Date: UNKNOWN.to_string(),
            Summary: UNKNOWN.to_string(),
            URL: url.to_string(),
            Image: UNKNOWN.to_string(),
            PostDate: UNKNOWN.to_string(),
            Rating: UNKNOWN.to_string(),
            Tags: Vec::new(),
            Claim: UNKNOWN.to_string(),
            Context: UNKNOWN.to_string(),
            ArticleContent: UNKNOWN.to_string(),
        }
    }

    /// Whether the summary carries real text worth sending to the classifier.
    pub fn has_summary(&self) -> bool {
        self.Summary != UNKNOWN && !self.Summary.trim().is_empty()
    }
}

/// An [`ArticleRecord`] plus its difficulty score.
///
/// The score is the classifier's confidence for the "hard to know" label,
/// or `None` when the summary was empty or scoring failed. `None`
/// serializes as JSON null and an empty CSV cell.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: ArticleRecord,
    pub Difficulty_Score: Option<f64>,
}

impl ScoredRecord {
    /// The shape uploaded to the remote store.
    ///
    /// Bulk HTML and provisional scores stay out of the store:
    /// `ArticleContent` and `Difficulty_Score` are nulled. Tags collapse to
    /// the same joined string the CSV export uses, since the store column
    /// is text.
    pub fn redacted(&self) -> UploadRow {
        UploadRow {
            Title: self.record.Title.clone(),
            Author: self.record.Author.clone(),
            Date: self.record.Date.clone(),
            Summary: self.record.Summary.clone(),
            URL: self.record.URL.clone(),
            Image: self.record.Image.clone(),
            PostDate: self.record.PostDate.clone(),
            Rating: self.record.Rating.clone(),
            Tags: self.record.Tags.join(", "),
            Claim: self.record.Claim.clone(),
            Context: self.record.Context.clone(),
            ArticleContent: None,
            Difficulty_Score: None,
        }
    }
}

/// One row of the batched upsert payload.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Serialize)]
pub struct UploadRow {
    pub Title: String,
    pub Author: String,
    pub Date: String,
    pub Summary: String,
    pub URL: String,
    pub Image: String,
    pub PostDate: String,
    pub Rating: String,
    pub Tags: String,
    pub Claim: String,
    pub Context: String,
    pub ArticleContent: Option<String>,
    pub Difficulty_Score: Option<f64>,
}

/// Request body for the zero-shot classification endpoint.
#[derive(Debug, Serialize)]
pub struct ZeroShotRequest<'a> {
    /// The text to classify.
    pub inputs: &'a str,
    pub parameters: ZeroShotParameters<'a>,
}

/// Classification parameters: the fixed candidate label set.
#[derive(Debug, Serialize)]
pub struct ZeroShotParameters<'a> {
    pub candidate_labels: &'a [&'a str],
}

/// Response body from the zero-shot classification endpoint.
///
/// `scores` is parallel to `labels`; the service orders both by descending
/// confidence, so a label's score must be looked up by position.
#[derive(Debug, Clone, Deserialize)]
pub struct ZeroShotResponse {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl ZeroShotResponse {
    /// Confidence for `label`, or `None` if the service didn't echo it back.
    pub fn score_for(&self, label: &str) -> Option<f64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .and_then(|i| self.scores.get(i).copied())
    }
}
