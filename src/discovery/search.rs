// src/discovery/search.rs
// =============================================================================
// Harvests every result of a paginated search API.
//
// Strategy:
// 1. Fetch the first page; it tells us the page size (itemsShown) and how
//    many results exist in total
// 2. Plan every remaining page up front
// 3. Fetch all planned pages concurrently and append products as pages
//    arrive
//
// The API refuses offsets deeper than 10,000. Past that point we start
// over from the other end: same query, reversed sort, offset - 10,000.
// This reaches up to 20,000 results.
// =============================================================================

use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Deepest offset the API serves in one sort order
pub const SORT_SWITCH_OFFSET: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    #[serde(rename = "ascPrice")]
    Ascending,
    #[serde(rename = "descPrice")]
    Descending,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascPrice",
            SortOrder::Descending => "descPrice",
        }
    }
}

/// One page to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub sort: SortOrder,
}

/// One page of search results as the API returns it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub products: Vec<Value>,
    pub items_shown: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
    /// Result count the API reported on the first page
    pub total: u64,
    /// Page requests made, the first page included
    pub requests: usize,
    pub products: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    pub query: String,
    pub page_size: u64,
    pub concurrency: usize,
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www2.hm.com/en_us/search-results/_jcr_content/search.display.json"
                .to_string(),
            query: " ".to_string(),
            page_size: 500,
            concurrency: 50,
            timeout: Duration::from_secs(120),
        }
    }
}

// Plans every page after the first one.
//
// Offsets step by `items_shown` up to `total`. Offsets below
// SORT_SWITCH_OFFSET keep ascending order; the rest are re-based onto
// descending order.
pub fn plan_pages(items_shown: u64, total: u64) -> Vec<PageRequest> {
    let mut plan = Vec::new();
    if items_shown == 0 {
        return plan;
    }

    let mut offset = items_shown;
    while offset < total {
        let request = if offset < SORT_SWITCH_OFFSET {
            PageRequest {
                offset,
                sort: SortOrder::Ascending,
            }
        } else {
            PageRequest {
                offset: offset - SORT_SWITCH_OFFSET,
                sort: SortOrder::Descending,
            }
        };
        plan.push(request);
        offset += items_shown;
    }

    plan
}

pub struct Harvester {
    client: Client,
    config: SearchConfig,
}

impl Harvester {
    pub fn new(client: Client, config: SearchConfig) -> Result<Self> {
        if config.concurrency == 0 {
            bail!("search concurrency must be at least 1");
        }
        Ok(Self { client, config })
    }

    pub async fn fetch_page(&self, request: PageRequest) -> Result<SearchPage> {
        info!(
            "scraping range {}:{} sorted by: {}",
            request.offset,
            request.offset + self.config.page_size,
            request.sort.as_str()
        );

        let response = self
            .client
            .get(&self.config.endpoint)
            .timeout(self.config.timeout)
            .query(&[
                ("q", self.config.query.clone()),
                ("offset", request.offset.to_string()),
                ("page-size", self.config.page_size.to_string()),
                ("sort", request.sort.as_str().to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("search request at offset {} failed", request.offset))?
            .error_for_status()?;

        response
            .json::<SearchPage>()
            .await
            .with_context(|| format!("malformed search page at offset {}", request.offset))
    }

    pub async fn harvest(&self) -> Result<HarvestReport> {
        let first = self
            .fetch_page(PageRequest {
                offset: 0,
                sort: SortOrder::Ascending,
            })
            .await?;

        let mut products = first.products;
        let plan = plan_pages(first.items_shown, first.total);
        let requests = plan.len() + 1;
        info!("scheduling {} scrape tasks concurrently", plan.len());

        // Pages land in completion order
        let mut pages = stream::iter(plan)
            .map(|request| self.fetch_page(request))
            .buffer_unordered(self.config.concurrency);
        while let Some(page) = pages.next().await {
            products.extend(page?.products);
        }

        info!(
            "found {} products in {} page requests",
            products.len(),
            requests
        );
        Ok(HarvestReport {
            total: first.total,
            requests,
            products,
        })
    }
}
