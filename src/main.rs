//! # Streamic Feeds
//!
//! Aggregates broadcast-industry news from RSS and Atom feeds into JSON
//! snapshots for a static site build.
//!
//! ## Features
//!
//! - Fetches a fixed table of vendor and trade-press feeds per category
//!   (newsroom, playout, infrastructure, graphics, cloud, streaming, audio-ai)
//! - Normalizes RSS 2.0 and Atom items into one shape, including a
//!   representative image for RSS items
//! - Deduplicates by link (or title + source) per category and globally
//! - Annotates every item with a rule-based impact brief
//! - Writes per-category files, a bounded global window and run metrics
//!
//! ## Usage
//!
//! ```sh
//! streamic_feeds -d ./data
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: one GET per feed, sequential, with a pause between feeds
//! 2. **Parsing**: RSS/Atom into [`models::NewsItem`]s; bad XML yields nothing
//! 3. **Dedup**: per category (≤ 60 items) and globally (≤ 100 items)
//! 4. **Output**: `<category>.json`, `news.json`, `metrics.json`
//!
//! Individual feed failures never fail the run.

use clap::Parser;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod brief;
mod cli;
mod dedup;
mod feed;
mod fetch;
mod metrics;
mod models;
mod outputs;
mod pipeline;
mod sources;
mod utils;

use brief::RuleBasedBrief;
use cli::Cli;
use fetch::HttpFetcher;
use outputs::json;
use pipeline::{PipelineSettings, RunReport};
use sources::FeedTable;
use utils::{ensure_writable_dir, truncate_chars};

/// Errors surfaced in the closing summary.
const SUMMARY_ERROR_COUNT: usize = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("streamic_feeds starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // Fail before any fetch if outputs cannot be written
    if let Err(e) = ensure_writable_dir(&args.data_dir).await {
        error!(
            path = %args.data_dir.display(),
            error = %e,
            "Data directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let table = match &args.feeds {
        Some(path) => FeedTable::from_yaml_file(path).await?,
        None => FeedTable::builtin(),
    };
    info!(
        categories = table.categories.len(),
        feeds = table.feed_count(),
        "Feed table ready"
    );

    let fetcher = HttpFetcher::new(Duration::from_secs(args.timeout_secs))?;
    let settings = PipelineSettings {
        pacing: Duration::from_millis(args.delay_ms),
        category_limit: args.category_limit,
        window: args.window,
        sort: args.sort,
    };

    let RunReport {
        categories,
        news,
        mut metrics,
    } = pipeline::run(&fetcher, &RuleBasedBrief, &table, &settings).await;

    for snapshot in &categories {
        if let Err(e) = json::write_category(&args.data_dir, &snapshot.category, &snapshot.items).await {
            error!(category = %snapshot.category, error = %e, "Failed to write category file");
        }
    }

    if let Err(e) = json::write_news(&args.data_dir, &news).await {
        error!(error = %e, "Failed to write news.json");
    }

    metrics.finish(start_time);
    if let Err(e) = json::write_metrics(&args.data_dir, &metrics).await {
        error!(error = %e, "Failed to write metrics.json");
    }

    // ---- Summary ----
    info!(
        total_feeds_checked = metrics.total_feeds_checked,
        successful_fetches = metrics.successful_fetches,
        failed_fetches = metrics.failed_fetches,
        total_items_fetched = metrics.total_items_fetched,
        duplicates_removed = metrics.duplicates_removed,
        final_items = news.len(),
        execution_time_seconds = metrics.execution_time_seconds,
        last_run = metrics.last_run.as_deref().unwrap_or_default(),
        "Execution summary"
    );

    if !metrics.errors.is_empty() {
        warn!(count = metrics.errors.len(), "Errors occurred during fetching");
        for record in metrics.errors.iter().take(SUMMARY_ERROR_COUNT) {
            warn!(url = %record.url, error = %truncate_chars(&record.error, 80), "Fetch error");
        }
    }

    info!("All feeds built");
    Ok(())
}
