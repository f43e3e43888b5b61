// src/fetch/concurrent.rs
// =============================================================================
// Three concurrent request patterns built on tokio primitives.
//
// - with_callbacks: every request is its own spawned task; a callback runs
//   as each task finishes, in whatever order they finish
// - gather: all requests run together and we wait for every one;
//   results come back in submission order
// - throttled: like gather, but a Semaphore admits at most `limit`
//   requests at a time
//
// Rust concepts:
// - tokio::task::JoinSet: owns spawned tasks, yields them as they complete
// - futures::future::try_join_all: await many futures, stop at first error
// - tokio::sync::Semaphore: counting permits; waiters are served FIFO
// - RAII guards: the permit is released when it goes out of scope
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use futures::future::try_join_all;
use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use super::{fetch_once, FetchMode, FetchRecord, FetchSummary};

// Spawns `count` requests and calls `on_complete` for each as it finishes.
//
// The returned records are in completion order, not submission order.
pub async fn with_callbacks<F>(
    client: &Client,
    url: &str,
    count: usize,
    mut on_complete: F,
) -> Result<FetchSummary>
where
    F: FnMut(&FetchRecord),
{
    let start = Instant::now();
    let mut tasks = JoinSet::new();

    for index in 0..count {
        // Spawned tasks must be 'static, so each one gets owned copies
        let client = client.clone();
        let url = url.to_string();
        tasks.spawn(async move { fetch_once(&client, &url, index).await });
    }

    let mut records = Vec::with_capacity(count);
    while let Some(joined) = tasks.join_next().await {
        let record = joined.context("request task panicked")??;
        on_complete(&record);
        records.push(record);
    }

    Ok(FetchSummary::new(
        FetchMode::Callbacks,
        url,
        records,
        start.elapsed(),
    ))
}

// Runs `count` requests concurrently and waits for all of them
pub async fn gather(client: &Client, url: &str, count: usize) -> Result<FetchSummary> {
    let start = Instant::now();

    let requests = (0..count).map(|index| fetch_once(client, url, index));
    let records = try_join_all(requests).await?;

    Ok(FetchSummary::new(
        FetchMode::Gather,
        url,
        records,
        start.elapsed(),
    ))
}

// Runs `count` requests concurrently with at most `limit` in flight
pub async fn throttled(
    client: &Client,
    url: &str,
    count: usize,
    limit: usize,
) -> Result<FetchSummary> {
    if limit == 0 {
        bail!("concurrency limit must be at least 1");
    }

    let start = Instant::now();
    let limiter = Semaphore::new(limit);
    let gauge = InFlight::default();
    let (limiter, gauge) = (&limiter, &gauge);

    let requests = (0..count).map(move |index| async move {
        let _permit = limiter
            .acquire()
            .await
            .context("request limiter was closed")?;
        let _in_flight = gauge.enter();
        debug!(index, available = limiter.available_permits(), "request admitted");
        fetch_once(client, url, index).await
    });
    let records = try_join_all(requests).await?;

    let mut summary = FetchSummary::new(FetchMode::Throttled, url, records, start.elapsed());
    summary.peak_in_flight = Some(gauge.peak());
    Ok(summary)
}

// Tracks how many requests currently hold a permit, and the maximum seen
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) -> InFlightGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(self)
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a>(&'a InFlight);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does with_callbacks clone the client and URL?
//    - tokio::spawn runs the task independently of the current function
//    - The task could outlive our borrowed &Client and &str
//    - So every task owns its own clone (Client clones share one pool)
//
// 2. Why is gather's result in order but with_callbacks' isn't?
//    - try_join_all keeps one slot per future and fills it in place
//    - JoinSet::join_next hands back whichever task finished first
//
// 3. How does the Semaphore limit concurrency?
//    - acquire() waits until a permit is free, then returns a guard
//    - When the guard (_permit) is dropped, the permit goes back
//    - Locals drop in reverse order, so _in_flight is released before
//      _permit and the gauge can never exceed the limit
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    async fn delay_server(count: usize) -> (mockito::ServerGuard, mockito::Mock, String) {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/delay/1")
            .with_status(200)
            .with_body("{}")
            .expect(count)
            .create_async()
            .await;
        let url = format!("{}/delay/1", server.url());
        (server, mock, url)
    }

    #[tokio::test]
    async fn test_callbacks_fire_once_per_request() {
        let (_server, mock, url) = delay_server(6).await;
        let mut seen = Vec::new();

        let summary = with_callbacks(&Client::new(), &url, 6, |record| seen.push(record.index))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(summary.requests, 6);
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_gather_preserves_submission_order() {
        let (_server, mock, url) = delay_server(10).await;

        let summary = gather(&Client::new(), &url, 10).await.unwrap();

        mock.assert_async().await;
        let indices: Vec<usize> = summary.records.iter().map(|r| r.index).collect();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());
        assert_eq!(summary.failures(), 0);
    }

    #[tokio::test]
    async fn test_throttled_never_exceeds_limit() {
        let (_server, mock, url) = delay_server(20).await;

        let summary = throttled(&Client::new(), &url, 20, 3).await.unwrap();

        mock.assert_async().await;
        assert_eq!(summary.requests, 20);
        let peak = summary.peak_in_flight.unwrap();
        assert!(peak >= 1 && peak <= 3, "peak was {}", peak);
        let indices: Vec<usize> = summary.records.iter().map(|r| r.index).collect();
        assert_eq!(indices, (0..20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_throttled_rejects_zero_limit() {
        let result = throttled(&Client::new(), "http://127.0.0.1:1/", 5, 0).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_non_success_status_is_recorded() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(503)
            .expect(2)
            .create_async()
            .await;

        let summary = gather(&Client::new(), &server.url(), 2).await.unwrap();
        assert_eq!(summary.failures(), 2);
    }

    #[test]
    fn test_in_flight_gauge_tracks_peak() {
        let gauge = InFlight::default();
        {
            let _a = gauge.enter();
            let _b = gauge.enter();
        }
        let _c = gauge.enter();
        assert_eq!(gauge.peak(), 2);
        assert_eq!(gauge.current.load(Ordering::SeqCst), 1);
    }
}
