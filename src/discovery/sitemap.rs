// src/discovery/sitemap.rs
// =============================================================================
// Collects content URLs from a sitemap index.
//
// A sitemap index lists further sitemaps; each of those lists page URLs.
// We read the index, descend exactly one level into the sitemaps whose URL
// matches `sitemap_pattern`, and keep the page URLs matching
// `url_pattern`. Entries of a nested sitemap that are themselves sitemaps
// are filtered like any other URL, never fetched.
// =============================================================================

use std::collections::BTreeSet;
use std::io::Cursor;

use anyhow::{bail, Context, Result};
use futures::stream::{self, StreamExt};
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use ::sitemap::reader::{SiteMapEntity, SiteMapReader};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SitemapConfig {
    pub index_url: String,
    /// Which nested sitemaps to descend into
    pub sitemap_pattern: Regex,
    /// Which final URLs to keep
    pub url_pattern: Regex,
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalkReport {
    /// Matching URLs, de-duplicated and sorted
    pub urls: BTreeSet<String>,
    /// Nested sitemaps fetched
    pub sitemaps: usize,
}

// Extracts every <loc> from a sitemap document: nested sitemap entries
// first, then page entries, each in document order.
pub fn parse_sitemap(xml: &[u8]) -> Vec<String> {
    let mut sitemaps = Vec::new();
    let mut urls = Vec::new();

    for entity in SiteMapReader::new(Cursor::new(xml)) {
        match entity {
            SiteMapEntity::SiteMap(entry) => {
                if let Some(url) = entry.loc.get_url() {
                    sitemaps.push(url.to_string());
                }
            }
            SiteMapEntity::Url(entry) => {
                if let Some(url) = entry.loc.get_url() {
                    urls.push(url.to_string());
                }
            }
            // The XML parser repeats its error forever once it fails
            SiteMapEntity::Err(error) => {
                debug!(?error, "malformed sitemap, keeping entries read so far");
                break;
            }
        }
    }

    sitemaps.extend(urls);
    sitemaps
}

pub struct SitemapWalker {
    client: Client,
    config: SitemapConfig,
}

impl SitemapWalker {
    pub fn new(client: Client, config: SitemapConfig) -> Result<Self> {
        if config.concurrency == 0 {
            bail!("sitemap concurrency must be at least 1");
        }
        Ok(Self { client, config })
    }

    pub async fn fetch_sitemap(&self, url: &str) -> Result<Vec<String>> {
        info!("scraping: {}", url);
        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to fetch sitemap {}", url))?
            .error_for_status()?
            .bytes()
            .await?;

        let entries = parse_sitemap(&body);
        debug!(%url, entries = entries.len(), "parsed sitemap");
        Ok(entries)
    }

    pub async fn walk(&self) -> Result<WalkReport> {
        let nested: Vec<String> = self
            .fetch_sitemap(&self.config.index_url)
            .await?
            .into_iter()
            .filter(|url| self.config.sitemap_pattern.is_match(url))
            .collect();
        let sitemaps = nested.len();
        info!("descending into {} sitemap(s)", sitemaps);

        let mut children = stream::iter(nested)
            .map(move |url| async move { self.fetch_sitemap(&url).await })
            .buffer_unordered(self.config.concurrency);

        let mut urls = BTreeSet::new();
        while let Some(entries) = children.next().await {
            urls.extend(
                entries?
                    .into_iter()
                    .filter(|url| self.config.url_pattern.is_match(url)),
            );
        }

        Ok(WalkReport { urls, sitemaps })
    }
}
