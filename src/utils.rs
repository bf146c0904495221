//! Utility functions for string manipulation and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - String truncation for logging
//! - Derived filenames for the scored output variants
//! - File system validation for output locations

use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` bytes with an ellipsis and byte count
/// indicator appended. The cut backs up to the nearest character boundary,
/// so multibyte text is never split mid-character.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Upper bound in bytes for the kept prefix
///
/// # Returns
///
/// The original string if it fits in `max` bytes, otherwise a truncated
/// version with `"…(+N bytes)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Derive the filename for a scored output variant.
///
/// Inserts `_with_difficulty_score` between the file stem and extension,
/// so the scored files land next to the plain ones.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(scored_path("snopes_fact_checks.json"),
///            "snopes_fact_checks_with_difficulty_score.json");
/// ```
pub fn scored_path(path: &str) -> String {
    let p = Path::new(path);
    match (
        p.file_stem().and_then(|s| s.to_str()),
        p.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(ext)) => p
            .with_file_name(format!("{stem}_with_difficulty_score.{ext}"))
            .to_string_lossy()
            .into_owned(),
        _ => format!("{path}_with_difficulty_score"),
    }
}

/// Ensure the directory holding an output file exists and is writable.
///
/// Creates the parent directory if it doesn't exist, then performs a
/// write test by creating and immediately deleting a probe file. Output
/// paths without a directory component are checked against the current
/// directory.
///
/// # Arguments
///
/// * `path` - The output file whose location should be validated
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_parent_writable(path: &str) -> Result<(), Box<dyn Error>> {
    let parent = match Path::new(path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    if let Err(e) = fs::create_dir_all(&parent).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = parent.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output location is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
