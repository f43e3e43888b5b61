// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every scraping technique gets its own subcommand. Options that apply to
// every command (user agent, timeout, output format, verbosity) live in
// GlobalArgs and are flattened into the top-level Cli struct.
//
// Rust concepts:
// - Derive macros: clap generates the parser from our structs
// - #[command(flatten)]: reuse one group of arguments in another struct
// - value_parser: validate arguments (like regexes) while parsing
// =============================================================================

use clap::{Args, Parser, Subcommand};
use regex::Regex;

use scrapecrow::client::DEFAULT_USER_AGENT;

// Every fetch demo hits this endpoint by default: it always takes one second
// to answer, which makes the timing difference between techniques obvious.
const DEFAULT_DELAY_URL: &str = "http://httpbin.org/delay/1";

#[derive(Parser, Debug)]
#[command(
    name = "scrapecrow",
    version = "0.1.0",
    about = "Web-scraping techniques as runnable commands",
    long_about = "scrapecrow bundles common web-scraping techniques: sequential and concurrent \
                  fetching, throttling with a semaphore, breadth-first crawling, paginated API \
                  harvesting and sitemap discovery."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// User-Agent header sent with every request
    ///
    /// Defaults to a desktop Firefox string because many sites block
    /// obvious bot user agents.
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in seconds (no timeout when omitted)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output results in JSON format instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    /// Log debug output to stderr (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// Arguments for the four request-pattern demos
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// URL requested by every request
    #[arg(long, default_value = DEFAULT_DELAY_URL)]
    pub url: String,

    /// How many requests to issue
    #[arg(short = 'n', long, default_value_t = 100)]
    pub count: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a URL N times, one request after another
    ///
    /// Example: scrapecrow sequential -n 10
    Sequential {
        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Spawn N requests as tasks and report each one as it completes
    Callbacks {
        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Run N requests concurrently and wait for all of them
    Gather {
        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Run N requests concurrently with at most --limit in flight
    ///
    /// Example: scrapecrow throttled -n 100 --limit 10
    Throttled {
        #[command(flatten)]
        fetch: FetchArgs,

        /// Maximum number of requests in flight at once
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Crawl a website breadth first, printing URLs that match --save
    ///
    /// Example: scrapecrow crawl https://www2.hm.com/en_us/index.html
    Crawl {
        /// Start URLs (at least one)
        #[arg(required = true)]
        seeds: Vec<String>,

        /// Regex for content URLs to save
        #[arg(long, default_value = r"/productpage\.", value_parser = parse_regex)]
        save: Regex,

        /// Regex for navigable pages to follow
        #[arg(long, default_value = r"\.html", value_parser = parse_regex)]
        follow: Regex,

        /// Also follow URLs that were saved
        #[arg(long)]
        follow_saved: bool,

        /// Maximum concurrent requests
        #[arg(long, default_value_t = 5)]
        concurrency: usize,

        /// Stop after this many breadth-first layers
        #[arg(long)]
        max_layers: Option<usize>,
    },

    /// Harvest every result of a paginated search API
    Search {
        /// Search endpoint returning products, itemsShown and total
        #[arg(
            long,
            default_value = "https://www2.hm.com/en_us/search-results/_jcr_content/search.display.json"
        )]
        endpoint: String,

        /// Query string sent as the `q` parameter
        #[arg(short, long, default_value = " ")]
        query: String,

        /// Results requested per page
        #[arg(long, default_value_t = 500)]
        page_size: u64,

        /// Maximum pages requested concurrently
        #[arg(long, default_value_t = 50)]
        concurrency: usize,
    },

    /// Collect product URLs from a sitemap index
    ///
    /// Example: scrapecrow sitemap https://www2.hm.com/en_us.sitemap.xml
    Sitemap {
        /// Sitemap index URL
        #[arg(default_value = "https://www2.hm.com/en_us.sitemap.xml")]
        index_url: String,

        /// Regex selecting which nested sitemaps to descend into
        #[arg(long, default_value = r"\.product\.", value_parser = parse_regex)]
        sitemap_pattern: Regex,

        /// Regex that final URLs must match
        #[arg(long, default_value = r"hm\.com/.+?\.html", value_parser = parse_regex)]
        url_pattern: Regex,

        /// Maximum nested sitemaps fetched concurrently
        #[arg(long, default_value_t = 8)]
        concurrency: usize,
    },

    /// Send a POST search query to a JSON API
    Query {
        /// API endpoint
        #[arg(long, default_value = "https://api.food.com/external/v1/nlp/search")]
        endpoint: String,

        /// Search term
        #[arg(default_value = "Toast")]
        term: String,

        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Poll a page's ETag and download it only when it changes
    Etag {
        /// Page to watch
        #[arg(default_value = "https://www.coindesk.com/")]
        url: String,

        /// Number of polls
        #[arg(long, default_value_t = 10)]
        polls: usize,

        /// Seconds to wait between polls
        #[arg(long, default_value_t = 0)]
        interval: u64,
    },
}

fn parse_regex(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_throttled_defaults() {
        let cli = Cli::parse_from(["scrapecrow", "throttled"]);
        match cli.command {
            Commands::Throttled { fetch, limit } => {
                assert_eq!(fetch.count, 100);
                assert_eq!(fetch.url, DEFAULT_DELAY_URL);
                assert_eq!(limit, 10);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.global.user_agent, DEFAULT_USER_AGENT);
        assert!(!cli.global.json);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["scrapecrow", "gather", "-n", "3", "--json", "--timeout", "5"]);
        assert!(cli.global.json);
        assert_eq!(cli.global.timeout, Some(5));
    }

    #[test]
    fn test_crawl_requires_seed() {
        assert!(Cli::try_parse_from(["scrapecrow", "crawl"]).is_err());
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let result = Cli::try_parse_from([
            "scrapecrow",
            "crawl",
            "https://example.com/",
            "--save",
            "(unclosed",
        ]);
        assert!(result.is_err());
    }
}
