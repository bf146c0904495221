//! Supabase (PostgREST) upload of scored records.
//!
//! Pushes the scored record list into a database table in fixed-size
//! batches. Rows are keyed on `URL`: re-running the pipeline against the
//! same table updates existing rows instead of duplicating them. Payloads
//! are redacted before upload, with the raw article HTML and the difficulty
//! score withheld.
//!
//! A failed batch is logged and skipped; the remaining batches still go out.

use crate::error::UploadError;
use crate::models::{ScoredRecord, UploadRow};
use tracing::{error, info, instrument};

/// Rows sent per request (Supabase handles this batch size comfortably).
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Batch uploader for a PostgREST endpoint.
pub struct Uploader {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
    batch_size: usize,
}

impl Uploader {
    /// Create an uploader for `table` behind `base_url`.
    ///
    /// The same key is sent both as the `apikey` header and as the bearer
    /// token, which is how Supabase expects anon-key access.
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: &str,
        table: &str,
        batch_size: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
            batch_size: batch_size.max(1),
        }
    }

    /// Upsert every record in batches, returning how many rows made it up.
    ///
    /// Never fails as a whole: batches that the endpoint rejects are logged
    /// and skipped.
    #[instrument(level = "info", skip_all, fields(total = records.len(), table = %self.table))]
    pub async fn upload_all(&self, records: &[ScoredRecord]) -> usize {
        let mut uploaded = 0usize;
        for (index, batch) in records.chunks(self.batch_size).enumerate() {
            match self.upsert_batch(batch).await {
                Ok(()) => {
                    uploaded += batch.len();
                    info!(batch = index + 1, count = batch.len(), uploaded, "Upserted batch");
                }
                Err(e) => {
                    error!(
                        batch = index + 1,
                        count = batch.len(),
                        error = %e,
                        "Batch upsert failed; continuing with the next batch"
                    );
                }
            }
        }
        info!(uploaded, total = records.len(), "Upload finished");
        uploaded
    }

    async fn upsert_batch(&self, batch: &[ScoredRecord]) -> Result<(), UploadError> {
        let rows: Vec<UploadRow> = batch.iter().map(ScoredRecord::redacted).collect();
        let url = format!("{}/rest/v1/{}?on_conflict=URL", self.base_url, self.table);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&rows)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected { status, body });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleRecord;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn scored(url: &str) -> ScoredRecord {
        ScoredRecord {
            record: ArticleRecord::unknown(url),
            Difficulty_Score: Some(0.5),
        }
    }

    #[tokio::test]
    async fn test_upsert_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/questions"))
            .and(query_param("on_conflict", "URL"))
            .and(header("apikey", "secret-key"))
            .and(header("Authorization", "Bearer secret-key"))
            .and(header("Prefer", "resolution=merge-duplicates"))
            .and(body_partial_json(serde_json::json!([{
                "URL": "https://example.com/a",
                "ArticleContent": null,
                "Difficulty_Score": null
            }])))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let uploader = Uploader::new(
            reqwest::Client::new(),
            &server.uri(),
            "secret-key",
            "questions",
            100,
        );
        let uploaded = uploader.upload_all(&[scored("https://example.com/a")]).await;

        assert_eq!(uploaded, 1);
    }

    #[tokio::test]
    async fn test_records_are_chunked_into_batches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/questions"))
            .respond_with(ResponseTemplate::new(201))
            .expect(2)
            .mount(&server)
            .await;

        let records: Vec<ScoredRecord> = (0..150)
            .map(|i| scored(&format!("https://example.com/{i}")))
            .collect();
        let uploader = Uploader::new(
            reqwest::Client::new(),
            &server.uri(),
            "secret-key",
            "questions",
            100,
        );
        let uploaded = uploader.upload_all(&records).await;

        assert_eq!(uploaded, 150);
    }

    #[tokio::test]
    async fn test_rejected_batch_does_not_stop_the_rest() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/questions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/questions"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let records: Vec<ScoredRecord> = (0..150)
            .map(|i| scored(&format!("https://example.com/{i}")))
            .collect();
        let uploader = Uploader::new(
            reqwest::Client::new(),
            &server.uri(),
            "secret-key",
            "questions",
            100,
        );
        let uploaded = uploader.upload_all(&records).await;

        assert_eq!(uploaded, 50);
    }
}
