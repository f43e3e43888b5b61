// src/crawl/mod.rs
// =============================================================================
// This module handles breadth-first website crawling.
//
// Features:
// - Layer-by-layer crawling from one or more seed URLs
// - Same-domain restriction (never leaves the seed's host)
// - Regex classification of links into "save" and "follow"
// - A Semaphore limiting how many pages are fetched at once
// - Optional layer limit
// =============================================================================

mod crawler;
mod links;

pub use crawler::{CrawlReport, Crawler, CrawlerConfig};
pub use links::{find_links, resolve_link, same_origin};
