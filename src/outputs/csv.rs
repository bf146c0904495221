//! CSV sink for harvested records.
//!
//! Flattens records into one row per article. The tag list becomes a single
//! comma-separated cell, so downstream spreadsheet tools see twelve fixed
//! columns (thirteen once difficulty scores are attached).

use crate::models::{ArticleRecord, ScoredRecord};
use std::error::Error;
use tracing::{debug, instrument};

/// Column order, matching the JSON field order.
const COLUMNS: [&str; 12] = [
    "Title",
    "Author",
    "Date",
    "Summary",
    "URL",
    "Image",
    "PostDate",
    "Rating",
    "Tags",
    "Claim",
    "Context",
    "ArticleContent",
];

fn record_row(record: &ArticleRecord) -> Vec<String> {
    vec![
        record.Title.clone(),
        record.Author.clone(),
        record.Date.clone(),
        record.Summary.clone(),
        record.URL.clone(),
        record.Image.clone(),
        record.PostDate.clone(),
        record.Rating.clone(),
        record.Tags.join(", "),
        record.Claim.clone(),
        record.Context.clone(),
        record.ArticleContent.clone(),
    ]
}

/// Write the full record list as CSV, header row included.
#[instrument(level = "debug", skip_all, fields(path = %path, count = records.len()))]
pub async fn write_records(
    path: &str,
    records: &[ArticleRecord],
) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&COLUMNS)?;
    for record in records {
        writer.write_record(&record_row(record))?;
    }
    let bytes = writer.into_inner()?;
    tokio::fs::write(path, &bytes).await?;
    debug!(bytes = bytes.len(), "Wrote records CSV");
    Ok(())
}

/// Write scored records as CSV with a trailing `Difficulty_Score` column.
///
/// Records without a score leave the cell empty.
#[instrument(level = "debug", skip_all, fields(path = %path, count = records.len()))]
pub async fn write_scored(
    path: &str,
    records: &[ScoredRecord],
) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header: Vec<&str> = COLUMNS.to_vec();
    header.push("Difficulty_Score");
    writer.write_record(&header)?;
    for scored in records {
        let mut row = record_row(&scored.record);
        row.push(match scored.Difficulty_Score {
            Some(score) => score.to_string(),
            None => String::new(),
        });
        writer.write_record(&row)?;
    }
    let bytes = writer.into_inner()?;
    tokio::fs::write(path, &bytes).await?;
    debug!(bytes = bytes.len(), "Wrote scored records CSV");
    Ok(())
}
