// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, filtered by RUST_LOG or --verbose)
// 3. Build one HTTP client and dispatch to the subcommand handler
// 4. Exit with proper code (0 = success, 1 = failed responses, 2 = error)
// =============================================================================

mod cli;    // src/cli.rs - command-line parsing
mod report; // src/report.rs - printing results

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use reqwest::Client;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, FetchArgs, GlobalArgs};
use scrapecrow::client::{build_client, ClientOptions};
use scrapecrow::fetch::FetchSummary;
use scrapecrow::{api, crawl, discovery, fetch};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "scrapecrow=debug"
    } else {
        "scrapecrow=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Returns:
//   Ok(0) = everything succeeded
//   Ok(1) = the run completed but some responses were not 2xx
//   Err = the run was aborted
async fn run(cli: Cli) -> Result<i32> {
    let client = build_client(&client_options(&cli.global))?;
    let json = cli.global.json;

    match cli.command {
        Commands::Sequential { fetch: args } => {
            let summary = fetch::sequential(&client, &args.url, args.count).await?;
            finish_fetch(&summary, json)
        }
        Commands::Callbacks { fetch: args } => handle_callbacks(&client, &args, json).await,
        Commands::Gather { fetch: args } => {
            let summary = fetch::gather(&client, &args.url, args.count).await?;
            finish_fetch(&summary, json)
        }
        Commands::Throttled { fetch: args, limit } => {
            let summary = fetch::throttled(&client, &args.url, args.count, limit).await?;
            finish_fetch(&summary, json)
        }
        Commands::Crawl {
            seeds,
            save,
            follow,
            follow_saved,
            concurrency,
            max_layers,
        } => {
            let config = crawl::CrawlerConfig {
                save_pattern: save,
                follow_pattern: follow,
                follow_saved,
                concurrency,
                max_layers,
            };
            handle_crawl(client, config, &seeds, json).await
        }
        Commands::Search {
            endpoint,
            query,
            page_size,
            concurrency,
        } => {
            let mut config = discovery::SearchConfig {
                endpoint,
                query,
                page_size,
                concurrency,
                ..discovery::SearchConfig::default()
            };
            if let Some(timeout) = cli.global.timeout {
                config.timeout = Duration::from_secs(timeout);
            }
            let harvester = discovery::Harvester::new(client, config)?;
            let report = harvester.harvest().await?;
            report::print_harvest(&report, json)?;
            Ok(0)
        }
        Commands::Sitemap {
            index_url,
            sitemap_pattern,
            url_pattern,
            concurrency,
        } => {
            let config = discovery::SitemapConfig {
                index_url,
                sitemap_pattern,
                url_pattern,
                concurrency,
            };
            let walker = discovery::SitemapWalker::new(client, config)?;
            let report = walker.walk().await?;
            report::print_walk(&report, json)?;
            Ok(0)
        }
        Commands::Query {
            endpoint,
            term,
            page,
        } => {
            let config = api::QueryConfig {
                endpoint,
                search_term: term,
                page,
            };
            let result = api::run_query(&client, &config).await?;
            report::print_query(&result, json)?;
            Ok(0)
        }
        Commands::Etag {
            url,
            polls,
            interval,
        } => {
            let report = api::watch(&client, &url, polls, Duration::from_secs(interval)).await?;
            report::print_watch(&report, json)?;
            Ok(0)
        }
    }
}

fn client_options(global: &GlobalArgs) -> ClientOptions {
    ClientOptions {
        user_agent: global.user_agent.clone(),
        timeout: global.timeout.map(Duration::from_secs),
    }
}

// Each completed request is printed by the callback as soon as it lands
async fn handle_callbacks(client: &Client, args: &FetchArgs, json: bool) -> Result<i32> {
    let summary = fetch::with_callbacks(client, &args.url, args.count, |record| {
        if !json {
            report::print_record(record);
        }
    })
    .await?;
    finish_fetch(&summary, json)
}

// Saved URLs are printed the moment they are discovered
async fn handle_crawl(
    client: Client,
    config: crawl::CrawlerConfig,
    seeds: &[String],
    json: bool,
) -> Result<i32> {
    let mut crawler = crawl::Crawler::new(client, config)?;
    let report = crawler
        .crawl(seeds, |url| {
            if !json {
                println!("{}", url);
            }
        })
        .await?;
    tracing::debug!(visited = crawler.seen().len(), "visited set size");
    report::print_crawl(&report, json)?;
    Ok(0)
}

fn finish_fetch(summary: &FetchSummary, json: bool) -> Result<i32> {
    report::print_fetch(summary, json)?;
    if summary.failures() > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}
