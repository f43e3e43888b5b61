// src/discovery/mod.rs
// =============================================================================
// This module finds content URLs without crawling page by page.
//
// Submodules:
// - search: walks a paginated JSON search API to enumerate every result
// - sitemap: reads a sitemap index and the sitemaps it points to
// =============================================================================

mod search;
mod sitemap;

pub use search::{
    plan_pages, Harvester, HarvestReport, PageRequest, SearchConfig, SearchPage, SortOrder,
    SORT_SWITCH_OFFSET,
};
pub use sitemap::{parse_sitemap, SitemapConfig, SitemapWalker, WalkReport};
