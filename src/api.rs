//! Zero-shot classifier API interaction with exponential backoff retry logic.
//!
//! This module provides a robust interface for communicating with a
//! zero-shot classification endpoint (any HuggingFace-style inference
//! server). It includes automatic retry logic with exponential backoff and
//! jitter to handle transient failures gracefully.
//!
//! # Architecture
//!
//! The module uses a trait-based design for flexibility:
//! - [`ClassifyAsync`]: Core trait defining async classification
//! - [`HttpClassifier`]: HTTP implementation speaking the zero-shot protocol
//! - [`RetryClassify`]: Decorator that adds retry logic to any `ClassifyAsync` implementation
//!
//! # Retry Strategy
//!
//! - Maximum 5 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::models::{ZeroShotParameters, ZeroShotRequest, ZeroShotResponse};
use rand::{rng, Rng};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Candidate labels presented to the classifier for every article summary.
pub const DIFFICULTY_LABELS: [&str; 2] = ["easy", "hard to know"];

/// The label whose probability becomes the difficulty score.
pub const HARD_LABEL: &str = "hard to know";

/// Trait for async zero-shot classification.
///
/// Implementors of this trait can send text to a classifier and receive a
/// response. This abstraction allows for different backends or decorators
/// (like retry logic).
pub trait ClassifyAsync {
    /// The type of response returned by the classifier.
    type Response;

    /// Send text to the classifier and receive a response.
    ///
    /// # Arguments
    ///
    /// * `text` - The input text to classify
    ///
    /// # Returns
    ///
    /// The classifier's response, or an error if the request failed.
    async fn classify(&self, text: &str) -> Result<Self::Response, Box<dyn Error + Send + Sync>>;
}

/// Wrapper that adds exponential backoff retry logic to any [`ClassifyAsync`] implementation.
///
/// This decorator transparently adds retry logic with exponential backoff
/// and jitter to handle transient API failures. It's designed to be resilient
/// against rate limiting, network issues, and temporary server errors.
///
/// # Backoff Strategy
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryClassify<T> {
    /// The underlying classifier to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryClassify<T>
where
    T: ClassifyAsync,
{
    /// Create a new retry wrapper around an existing [`ClassifyAsync`] implementation.
    ///
    /// # Arguments
    ///
    /// * `inner` - The underlying classifier to wrap
    /// * `max_retries` - Maximum number of retry attempts (5 recommended)
    /// * `base_delay` - Initial delay between retries (1 second recommended)
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryClassify<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryClassify")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> ClassifyAsync for RetryClassify<T>
where
    T: ClassifyAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn classify(&self, text: &str) -> Result<Self::Response, Box<dyn Error + Send + Sync>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.classify(text).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                            elapsed_ms_total = total_dt.as_millis() as u128,
                            error = %e,
                            "classify() exhausted retries"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                        elapsed_ms_total = total_dt.as_millis() as u128,
                        ?delay,
                        error = %e,
                        "classify() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// HTTP client for a zero-shot classification endpoint.
///
/// Sends the article summary with the fixed [`DIFFICULTY_LABELS`] candidate
/// set and decodes the ranked label/score response.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

impl ClassifyAsync for HttpClassifier {
    type Response = ZeroShotResponse;

    #[instrument(level = "info", skip_all)]
    async fn classify(&self, text: &str) -> Result<Self::Response, Box<dyn Error + Send + Sync>> {
        let t0 = Instant::now();
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: &DIFFICULTY_LABELS,
            },
        };
        let res: Result<ZeroShotResponse, reqwest::Error> = match self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .and_then(|response| response.error_for_status())
        {
            Ok(response) => response.json().await,
            Err(e) => Err(e),
        };
        let dt = t0.elapsed();

        match &res {
            Ok(_) => {}
            Err(e) => warn!(elapsed_ms = dt.as_millis() as u128, error = %e, "Classifier call failed"),
        }
        res.map_err(Into::into)
    }
}

/// High-level function to score one text with exponential backoff retry logic.
///
/// This is the primary entry point for difficulty scoring. It automatically
/// wraps the request with retry logic to handle transient failures
/// gracefully and reduces the ranked response to the probability of the
/// [`HARD_LABEL`].
///
/// # Returns
///
/// `Ok(Some(score))` when the classifier ranked the hard label,
/// `Ok(None)` when the response did not contain it, or an error if all
/// retry attempts fail.
///
/// # Retry Behavior
///
/// - Up to 5 retry attempts
/// - Exponential backoff: 1s, 2s, 4s, 8s, 16s (capped at 30s)
/// - Random jitter added to prevent thundering herd
#[instrument(level = "info", skip_all)]
pub async fn score_with_backoff(
    client: &reqwest::Client,
    endpoint: &str,
    text: &str,
) -> Result<Option<f64>, Box<dyn Error + Send + Sync>> {
    let t0 = Instant::now();
    let classifier = HttpClassifier::new(client.clone(), endpoint.to_string());
    let api = RetryClassify::new(classifier, 5, StdDuration::from_secs(1));
    let res = api.classify(text).await;
    let dt = t0.elapsed();

    match &res {
        Ok(_) => info!(
            elapsed_ms_total = dt.as_millis() as u128,
            "score_with_backoff succeeded"
        ),
        Err(e) => {
            error!(elapsed_ms_total = dt.as_millis() as u128, error = %e, "score_with_backoff failed")
        }
    }
    res.map(|response| response.score_for(HARD_LABEL))
}
