// src/fetch/sequential.rs
// =============================================================================
// The baseline: each request starts only after the previous one finished.
//
// Against an endpoint that always takes one second, 100 requests take
// about 100 seconds here. Compare with the concurrent variants.
// =============================================================================

use std::time::Instant;

use anyhow::Result;
use reqwest::Client;
use tracing::debug;

use super::{fetch_once, FetchMode, FetchSummary};

pub async fn sequential(client: &Client, url: &str, count: usize) -> Result<FetchSummary> {
    let start = Instant::now();
    let mut records = Vec::with_capacity(count);

    for index in 0..count {
        let record = fetch_once(client, url, index).await?;
        debug!(index, status = record.status, "request finished");
        records.push(record);
    }

    Ok(FetchSummary::new(
        FetchMode::Sequential,
        url,
        records,
        start.elapsed(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sequential_issues_every_request_in_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/delay/1")
            .with_status(200)
            .with_body("done")
            .expect(4)
            .create_async()
            .await;

        let url = format!("{}/delay/1", server.url());
        let summary = sequential(&Client::new(), &url, 4).await.unwrap();

        mock.assert_async().await;
        assert_eq!(summary.mode, FetchMode::Sequential);
        assert_eq!(summary.requests, 4);
        let indices: Vec<usize> = summary.records.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(summary.records.iter().all(|r| r.bytes == 4));
    }

    #[tokio::test]
    async fn test_sequential_zero_requests() {
        let summary = sequential(&Client::new(), "http://127.0.0.1:1/", 0)
            .await
            .unwrap();
        assert!(summary.records.is_empty());
        assert_eq!(summary.failures(), 0);
    }

    #[tokio::test]
    async fn test_sequential_aborts_on_transport_error() {
        // Bind then release a port so nothing is listening on it
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = format!("http://127.0.0.1:{}/", port);

        let result = sequential(&Client::new(), &url, 2).await;
        assert!(result.is_err());
    }
}
