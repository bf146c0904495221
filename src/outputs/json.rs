//! JSON sink for harvested records.
//!
//! Serializes the full record list as a pretty-printed JSON array. The file
//! is replaced wholesale on every call so a reader always sees a complete
//! snapshot, never a half-written one: the bytes go to a sibling `.tmp`
//! file first and are renamed into place.

use serde::Serialize;
use std::error::Error;
use tracing::{debug, instrument};

/// Serialize `records` and atomically replace the file at `path`.
///
/// The temporary file lives next to the target so the rename stays on one
/// filesystem.
#[instrument(level = "debug", skip_all, fields(path = %path, count = records.len()))]
pub async fn write_records<T: Serialize>(
    path: &str,
    records: &[T],
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;
    let tmp = format!("{path}.tmp");
    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;
    debug!(bytes = json.len(), "Wrote records JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleRecord;

    #[tokio::test]
    async fn test_write_records_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let path = path.to_str().unwrap();

        let records = vec![
            ArticleRecord::unknown("https://example.com/a"),
            ArticleRecord::unknown("https://example.com/b"),
        ];
        write_records(path, &records).await.unwrap();

        let raw = std::fs::read_to_string(path).unwrap();
        assert!(raw.starts_with("[\n"), "expected a pretty-printed array");
        let parsed: Vec<ArticleRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, records);
    }

    #[tokio::test]
    async fn test_write_records_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let path = path.to_str().unwrap();

        let mut records = vec![ArticleRecord::unknown("https://example.com/a")];
        write_records(path, &records).await.unwrap();
        records.push(ArticleRecord::unknown("https://example.com/b"));
        write_records(path, &records).await.unwrap();

        let parsed: Vec<ArticleRecord> =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(!dir.path().join("records.json.tmp").exists());
    }
}
