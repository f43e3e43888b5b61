// src/report.rs
// =============================================================================
// Prints command results to stdout, either as text or as pretty JSON.
//
// Logs go to stderr (see main.rs), so `--json` output can be piped
// straight into other tools.
// =============================================================================

use anyhow::Result;
use serde::Serialize;

use scrapecrow::api::{QueryResult, WatchReport};
use scrapecrow::crawl::CrawlReport;
use scrapecrow::discovery::{HarvestReport, WalkReport};
use scrapecrow::fetch::{FetchRecord, FetchSummary};

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// One line per completed request (used as the callbacks demo's callback)
pub fn print_record(record: &FetchRecord) {
    println!(
        "  request #{:<4} HTTP {}  {} bytes",
        record.index, record.status, record.bytes
    );
}

pub fn print_fetch(summary: &FetchSummary, json: bool) -> Result<()> {
    if json {
        return print_json(summary);
    }

    println!("{:<12} {}", "MODE", summary.mode);
    println!("{:<12} {}", "URL", summary.url);
    println!("{:<12} {}", "REQUESTS", summary.requests);
    if let Some(peak) = summary.peak_in_flight {
        println!("{:<12} {}", "PEAK", peak);
    }
    println!("{:<12} {}", "FAILED", summary.failures());
    println!();
    println!("finished scraping in: {:.1} seconds", summary.elapsed_secs);
    Ok(())
}

pub fn print_crawl(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }

    println!();
    println!("📊 Summary:");
    println!("   Layers:  {}", report.layers);
    println!("   Fetched: {}", report.fetched);
    println!("   Skipped: {}", report.skipped);
    println!("   Saved:   {}", report.saved.len());
    Ok(())
}

pub fn print_harvest(report: &HarvestReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }

    println!(
        "found {} products in {} page requests (API reported {})",
        report.products.len(),
        report.requests,
        report.total
    );
    Ok(())
}

pub fn print_walk(report: &WalkReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }

    for url in &report.urls {
        println!("{}", url);
    }
    println!();
    println!(
        "{} unique URL(s) from {} sitemap(s)",
        report.urls.len(),
        report.sitemaps
    );
    Ok(())
}

pub fn print_query(result: &QueryResult, json: bool) -> Result<()> {
    if json {
        return print_json(result);
    }

    println!(
        "found {} results from {} total",
        result.results.len(),
        result.total_results_count
    );
    Ok(())
}

pub fn print_watch(report: &WatchReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }

    println!(
        "{} poll(s), {} download(s), {} distinct version(s)",
        report.polls,
        report.downloads,
        report.versions.len()
    );
    println!("finished in {:.1} seconds", report.elapsed_secs);
    Ok(())
}
