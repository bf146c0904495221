//! Error types for the fetch and upload seams.
//!
//! Extraction deliberately has no error type: a selector that matches
//! nothing leaves the field at its sentinel, and a structured-data block
//! that fails to decode falls through to the next tier. The only
//! operations that can fail hard are talking to the network.

use thiserror::Error;

/// Errors that can occur while fetching pages from the target site.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network-level failure: DNS, connect, timeout, or body read.
    #[error("request for {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// robots.txt disallows this URL for our user agent.
    #[error("robots.txt disallows {url}")]
    RobotsDisallowed { url: String },

    /// A URL that could not be parsed or resolved.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors from the batched upsert against the remote store.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The upsert request itself failed.
    #[error("upsert request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store rejected batch with HTTP {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}
