// src/crawl/crawler.rs
// =============================================================================
// This module implements a breadth-first, same-domain crawler.
//
// How it works:
// 1. The seed URLs form the first frontier (and are marked visited)
// 2. Every URL in the frontier is fetched concurrently; a Semaphore keeps
//    at most `concurrency` requests in flight
// 3. As each page arrives, its same-domain links are extracted and
//    classified:
//    - "save" links (content pages) are reported through the callback
//    - "follow" links (navigable pages) go into the next frontier
// 4. When a layer produces no links to follow, the crawl is over
//
// Failures are quiet: a page that fails to load, or answers with anything
// other than 200, is skipped and never retried.
//
// Rust concepts:
// - FuturesUnordered: a set of futures polled together, yielding each
//   result as soon as it is ready (not in submission order)
// - Disjoint field borrows: the in-flight requests borrow `client` and
//   `limiter` while we mutate `seen`
// =============================================================================

use std::collections::HashSet;

use anyhow::{anyhow, bail, Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info};
use url::Url;

use super::links::{find_links, same_origin};

/// What to save, what to follow, and how hard to hit the site
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Links matching this are content pages and get saved
    pub save_pattern: Regex,
    /// Links matching this are navigation pages and get crawled
    pub follow_pattern: Regex,
    /// Whether saved links may also be followed
    pub follow_saved: bool,
    /// Maximum requests in flight at once
    pub concurrency: usize,
    /// Stop after this many layers (None = until the frontier is empty)
    pub max_layers: Option<usize>,
}

// The CLI builds its config from clap's own defaults; this is for library
// callers and tests
impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            save_pattern: Regex::new(r"/productpage\.").expect("default save pattern is valid"),
            follow_pattern: Regex::new(r"\.html").expect("default follow pattern is valid"),
            follow_saved: false,
            concurrency: 5,
            max_layers: None,
        }
    }
}

/// Totals for a finished crawl
#[derive(Debug, Default, Clone, Serialize)]
pub struct CrawlReport {
    /// Saved URLs in the order they were discovered
    pub saved: Vec<String>,
    /// Number of breadth-first layers crawled
    pub layers: usize,
    /// Pages fetched successfully
    pub fetched: usize,
    /// Pages skipped because the request failed or was not a 200
    pub skipped: usize,
}

pub struct Crawler {
    client: Client,
    limiter: Semaphore,
    config: CrawlerConfig,
    seen: HashSet<String>,
}

// A page that loaded with 200 OK
struct Page {
    // Final URL after redirects; relative links resolve against it
    url: Url,
    body: String,
}

impl Crawler {
    pub fn new(client: Client, config: CrawlerConfig) -> Result<Self> {
        if config.concurrency == 0 {
            bail!("crawl concurrency must be at least 1");
        }

        Ok(Self {
            client,
            limiter: Semaphore::new(config.concurrency),
            config,
            seen: HashSet::new(),
        })
    }

    /// Every URL queued so far, seeds included
    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    // Crawls breadth first from `seeds`, calling `on_save` for each saved URL
    pub async fn crawl<F>(&mut self, seeds: &[String], mut on_save: F) -> Result<CrawlReport>
    where
        F: FnMut(&str),
    {
        let mut frontier = Vec::new();
        for seed in seeds {
            let mut url =
                Url::parse(seed).map_err(|e| anyhow!("Invalid URL '{}': {}", seed, e))?;
            url.set_fragment(None);
            let url = url.to_string();
            if self.seen.insert(url.clone()) {
                frontier.push(url);
            }
        }

        let mut report = CrawlReport::default();

        while !frontier.is_empty() {
            if let Some(max) = self.config.max_layers {
                if report.layers >= max {
                    info!(
                        pending = frontier.len(),
                        "layer limit reached, stopping crawl"
                    );
                    break;
                }
            }

            report.layers += 1;
            info!(layer = report.layers, urls = frontier.len(), "crawling layer");

            let client = &self.client;
            let limiter = &self.limiter;
            let mut pending: FuturesUnordered<_> = std::mem::take(&mut frontier)
                .into_iter()
                .map(move |url| async move {
                    let outcome = fetch_page(client, limiter, &url).await;
                    (url, outcome)
                })
                .collect();

            let mut to_follow = Vec::new();
            while let Some((url, outcome)) = pending.next().await {
                let page = match outcome {
                    Ok(page) => page,
                    Err(e) => {
                        debug!(%url, error = %e, "skipping page");
                        report.skipped += 1;
                        continue;
                    }
                };
                report.fetched += 1;
                // A redirect lands on a URL nobody queued; mark it so a
                // self-link doesn't fetch it again next layer
                self.seen.insert(page.url.to_string());

                for link in find_links(&page.body, &page.url, &mut self.seen) {
                    if self.config.save_pattern.is_match(&link) {
                        on_save(&link);
                        report.saved.push(link.clone());
                        if !self.config.follow_saved {
                            continue;
                        }
                    }
                    if self.config.follow_pattern.is_match(&link) {
                        debug!(%link, "following");
                        to_follow.push(link);
                    }
                }
            }

            frontier = to_follow;
        }

        info!(
            layers = report.layers,
            fetched = report.fetched,
            skipped = report.skipped,
            saved = report.saved.len(),
            "crawl finished"
        );
        Ok(report)
    }
}

// Fetches one page while holding a limiter permit
async fn fetch_page(client: &Client, limiter: &Semaphore, url: &str) -> Result<Page> {
    let _permit = limiter
        .acquire()
        .await
        .context("crawl limiter was closed")?;

    let response = client.get(url).send().await?;
    if response.status() != StatusCode::OK {
        return Err(anyhow!("HTTP {}", response.status()));
    }

    let requested = Url::parse(url)?;
    let mut final_url = response.url().clone();
    final_url.set_fragment(None);
    if !same_origin(&requested, &final_url) {
        return Err(anyhow!("redirected off-site to {}", final_url));
    }

    let body = response.text().await?;
    Ok(Page {
        url: final_url,
        body,
    })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why collect the frontier into FuturesUnordered instead of spawning?
//    - The futures only borrow the client and limiter; no 'static needed
//    - Everything runs on the current task, so `seen` needs no Mutex
//    - The Semaphore still caps how many requests are actually in flight
//
// 2. Why mark seeds visited before fetching them?
//    - A page linking back to the seed would otherwise queue it again
//
// 3. What does std::mem::take do?
//    - Moves the Vec out and leaves an empty Vec in its place
//    - We consume the current frontier while building the next one
// -----------------------------------------------------------------------------
