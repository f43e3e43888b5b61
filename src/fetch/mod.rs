// src/fetch/mod.rs
// =============================================================================
// This module demonstrates four ways of issuing many HTTP requests.
//
// Submodules:
// - sequential: one request after another
// - concurrent: spawned tasks with callbacks, gather, and a semaphore limiter
//
// All four issue `count` GET requests against the same URL and return a
// FetchSummary, so their elapsed times can be compared directly.
//
// Transport errors are not recovered from: the first failed request aborts
// the whole run. Non-2xx responses are recorded, not treated as errors.
// =============================================================================

mod concurrent;
mod sequential;

pub use concurrent::{gather, throttled, with_callbacks};
pub use sequential::sequential;

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;

/// Which request pattern produced a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    Sequential,
    Callbacks,
    Gather,
    Throttled,
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchMode::Sequential => "sequential",
            FetchMode::Callbacks => "callbacks",
            FetchMode::Gather => "gather",
            FetchMode::Throttled => "throttled",
        };
        f.write_str(name)
    }
}

/// Outcome of one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRecord {
    /// Position of the request in submission order
    pub index: usize,
    /// HTTP status code
    pub status: u16,
    /// Size of the response body
    pub bytes: usize,
}

impl FetchRecord {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outcome of a whole demo run
#[derive(Debug, Clone, Serialize)]
pub struct FetchSummary {
    pub mode: FetchMode,
    pub url: String,
    pub requests: usize,
    pub elapsed_secs: f64,
    /// Highest number of requests observed in flight (throttled mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_in_flight: Option<usize>,
    pub records: Vec<FetchRecord>,
}

impl FetchSummary {
    fn new(mode: FetchMode, url: &str, records: Vec<FetchRecord>, elapsed: Duration) -> Self {
        Self {
            mode,
            url: url.to_string(),
            requests: records.len(),
            elapsed_secs: elapsed.as_secs_f64(),
            peak_in_flight: None,
            records,
        }
    }

    /// Number of responses outside the 2xx range
    pub fn failures(&self) -> usize {
        self.records.iter().filter(|r| !r.is_success()).count()
    }
}

// Issues a single GET and reads the whole body
async fn fetch_once(client: &Client, url: &str, index: usize) -> Result<FetchRecord> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request #{} to {} failed", index, url))?;

    let status = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .with_context(|| format!("reading body of request #{} failed", index))?;

    Ok(FetchRecord {
        index,
        status,
        bytes: body.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_counts_non_success() {
        let records = vec![
            FetchRecord { index: 0, status: 200, bytes: 2 },
            FetchRecord { index: 1, status: 503, bytes: 0 },
            FetchRecord { index: 2, status: 404, bytes: 9 },
        ];
        let summary = FetchSummary::new(
            FetchMode::Gather,
            "http://localhost/",
            records,
            Duration::from_millis(1500),
        );

        assert_eq!(summary.requests, 3);
        assert_eq!(summary.failures(), 2);
        assert!((summary.elapsed_secs - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_json_omits_missing_peak() {
        let summary = FetchSummary::new(
            FetchMode::Sequential,
            "http://localhost/",
            Vec::new(),
            Duration::ZERO,
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["mode"], "sequential");
        assert!(json.get("peak_in_flight").is_none());
    }
}
