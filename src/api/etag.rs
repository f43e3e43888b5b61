// src/api/etag.rs
// =============================================================================
// Watches a page for changes using its ETag header.
//
// A HEAD request is cheap: no body is transferred. We poll with HEAD and
// only download the page (GET) when the ETag differs from the last one we
// saw. A response without an ETag cannot be compared, so it is always
// downloaded.
// =============================================================================

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::header::ETAG;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
pub struct WatchReport {
    pub polls: usize,
    pub downloads: usize,
    /// Distinct ETags seen, in order
    pub versions: Vec<String>,
    pub elapsed_secs: f64,
}

pub async fn watch(
    client: &Client,
    url: &str,
    polls: usize,
    interval: Duration,
) -> Result<WatchReport> {
    let start = Instant::now();
    let mut last_known: Option<String> = None;
    let mut versions = Vec::new();
    let mut downloads = 0;

    for poll in 0..polls {
        if poll > 0 && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }

        let head = client
            .head(url)
            .send()
            .await
            .with_context(|| format!("HEAD {} failed", url))?;
        let current = head
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        if current.is_some() && current == last_known {
            debug!(poll, "unchanged, skipping download");
            continue;
        }

        let body = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()?
            .bytes()
            .await?;
        downloads += 1;
        info!(poll, bytes = body.len(), etag = ?current, "downloaded new version");

        if let Some(etag) = current {
            versions.push(etag.clone());
            last_known = Some(etag);
        }
    }

    Ok(WatchReport {
        polls,
        downloads,
        versions,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unchanged_etag_downloads_once() {
        let mut server = mockito::Server::new_async().await;
        let head = server
            .mock("HEAD", "/")
            .with_status(200)
            .with_header("etag", "\"v1\"")
            .expect(3)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("<html></html>")
            .expect(1)
            .create_async()
            .await;

        let report = watch(&Client::new(), &server.url(), 3, Duration::ZERO)
            .await
            .unwrap();

        head.assert_async().await;
        get.assert_async().await;
        assert_eq!(report.polls, 3);
        assert_eq!(report.downloads, 1);
        assert_eq!(report.versions, vec!["\"v1\"".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_etag_downloads_every_time() {
        let mut server = mockito::Server::new_async().await;
        let _head = server
            .mock("HEAD", "/")
            .with_status(200)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("fresh")
            .expect(2)
            .create_async()
            .await;

        let report = watch(&Client::new(), &server.url(), 2, Duration::ZERO)
            .await
            .unwrap();

        get.assert_async().await;
        assert_eq!(report.downloads, 2);
        assert!(report.versions.is_empty());
    }
}
