// src/api/mod.rs
// =============================================================================
// This module talks to endpoints directly instead of scraping HTML.
//
// Submodules:
// - query: POST a search term to a JSON API
// - etag: poll a page with HEAD and download only when its ETag changes
// =============================================================================

mod etag;
mod query;

pub use etag::{watch, WatchReport};
pub use query::{run_query, QueryConfig, QueryResult};
