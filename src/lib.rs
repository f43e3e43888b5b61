// src/lib.rs
// =============================================================================
// Library root: the scraping techniques, usable without the CLI.
//
// - client: builds the shared reqwest::Client
// - fetch: sequential / spawned / gathered / throttled request demos
// - crawl: breadth-first same-domain crawler
// - discovery: paginated search harvesting and sitemap walking
// - api: POST queries and ETag change polling
// =============================================================================

pub mod api;
pub mod client;
pub mod crawl;
pub mod discovery;
pub mod fetch;
