//! The aggregation run: fetch, parse, annotate, dedup, merge.
//!
//! ```text
//! for each category (table order):
//!     for each source (table order):   fetch -> parse -> label/category/brief
//!     category items -> dedup -> first `category_limit`      => <category>.json
//! all category items -> dedup -> sort by pubDate desc -> first `window`  => news.json
//! ```
//!
//! Everything runs sequentially on one task with a fixed pause between
//! fetches. Dedup and sort only ever run after every fetch of their scope has
//! finished. Counters go into the [`RunMetrics`] passed down by the caller.

use crate::brief::BriefGenerator;
use crate::dedup::deduplicate;
use crate::fetch::FeedFetcher;
use crate::feed::parse_feed;
use crate::metrics::RunMetrics;
use crate::models::{FeedSource, NewsItem};
use crate::sources::FeedTable;
use chrono::{DateTime, FixedOffset};
use clap::ValueEnum;
use std::cmp::Reverse;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

/// Pause between consecutive fetches within a category.
pub const PACING_DELAY: Duration = Duration::from_millis(500);

/// Maximum items written to a category file.
pub const CATEGORY_LIMIT: usize = 60;

/// Maximum items written to the global file.
pub const WINDOW_SIZE: usize = 100;

/// How the global merge orders items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortMode {
    /// Compare the raw `pubDate` strings, newest-looking first. RFC 822 and
    /// ISO 8601 strings do not interleave correctly.
    #[default]
    Raw,
    /// Parse RFC 2822 / RFC 3339 dates and sort newest first; unparseable
    /// dates go last in their original order.
    Parsed,
}

/// Run-wide knobs.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub pacing: Duration,
    pub category_limit: usize,
    pub window: usize,
    pub sort: SortMode,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            pacing: PACING_DELAY,
            category_limit: CATEGORY_LIMIT,
            window: WINDOW_SIZE,
            sort: SortMode::Raw,
        }
    }
}

/// A category's output: deduplicated and truncated, in fetch order.
#[derive(Debug, Clone)]
pub struct CategorySnapshot {
    pub category: String,
    pub items: Vec<NewsItem>,
}

/// Everything a run produces before it is written to disk.
#[derive(Debug)]
pub struct RunReport {
    pub categories: Vec<CategorySnapshot>,
    pub news: Vec<NewsItem>,
    pub metrics: RunMetrics,
}

/// Fetch and annotate every source of one category.
///
/// A failed fetch contributes no items. The result keeps source order and
/// item order and is not deduplicated.
///
/// # Arguments
///
/// * `fetcher` - Transport for the feed bodies
/// * `briefs` - Generator for each item's impact brief
/// * `category` - Category name passed to the brief generator
/// * `sources` - Feeds of the category, fetched in order
/// * `pacing` - Pause between two consecutive fetches
/// * `metrics` - Receives feed, fetch and item counts plus fetch errors
///
/// # Returns
///
/// Every parsed item with `source`, `category` and `impact_brief` filled in.
#[instrument(level = "info", skip_all, fields(category = %category, sources = sources.len()))]
pub async fn build_category<F, B>(
    fetcher: &F,
    briefs: &B,
    category: &str,
    sources: &[FeedSource],
    pacing: Duration,
    metrics: &mut RunMetrics,
) -> Vec<NewsItem>
where
    F: FeedFetcher,
    B: BriefGenerator,
{
    info!("Building {} feed", category.to_uppercase());
    let mut all_items = Vec::new();

    for (i, source) in sources.iter().enumerate() {
        if i > 0 && !pacing.is_zero() {
            sleep(pacing).await;
        }

        metrics.record_feed_checked();
        info!(label = %source.label, url = %source.url, "Fetching");

        let bytes = match fetcher.fetch(&source.url).await {
            Ok(bytes) => {
                metrics.record_fetch_success();
                bytes
            }
            Err(e) => {
                warn!(url = %source.url, kind = ?e.kind(), error = %e, "Fetch failed; skipping source");
                metrics.record_fetch_failure(&source.url, &e);
                continue;
            }
        };

        let mut items = parse_feed(&bytes);
        for item in &mut items {
            item.source = source.label.clone();
            item.category = source.category.clone();
            item.impact_brief = briefs.brief(&item.title, &item.description, category);
        }

        metrics.record_items_fetched(items.len());
        info!(label = %source.label, count = items.len(), "Got items");
        all_items.extend(items);
    }

    all_items
}

/// Dedup a category's items and keep the first `limit`.
pub fn category_snapshot(
    category: &str,
    items: Vec<NewsItem>,
    limit: usize,
    metrics: &mut RunMetrics,
) -> CategorySnapshot {
    let (mut unique, stats) = deduplicate(items);
    metrics.record_category_dedup(category, stats);
    unique.truncate(limit);
    CategorySnapshot {
        category: category.to_string(),
        items: unique,
    }
}

/// Global dedup, newest-first sort and truncation to `window` items.
///
/// # Arguments
///
/// * `items` - All category items, in category order
/// * `window` - Maximum number of items kept
/// * `sort` - How publication dates are compared
/// * `metrics` - Receives the global dedup counts
///
/// # Returns
///
/// At most `window` unique items, newest first. Items with equal dates keep
/// their relative order.
#[instrument(level = "info", skip_all, fields(input = items.len(), window = window, sort = ?sort))]
pub fn merge_window(
    items: Vec<NewsItem>,
    window: usize,
    sort: SortMode,
    metrics: &mut RunMetrics,
) -> Vec<NewsItem> {
    let (mut unique, stats) = deduplicate(items);
    metrics.record_global_dedup(stats);

    sort_newest_first(&mut unique, sort);
    unique.truncate(window);
    info!(
        duplicates_removed = stats.duplicates_removed,
        kept = unique.len(),
        "Global deduplication & sliding window"
    );
    unique
}

/// Stable sort by publication date, newest first.
pub fn sort_newest_first(items: &mut [NewsItem], sort: SortMode) {
    match sort {
        SortMode::Raw => items.sort_by(|a, b| b.pub_date.cmp(&a.pub_date)),
        SortMode::Parsed => items.sort_by_cached_key(|item| Reverse(parse_pub_date(&item.pub_date))),
    }
}

/// RFC 2822 (RSS) or RFC 3339 (Atom) date, `None` if neither parses.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

/// Run the whole table.
///
/// Never fails: fetch errors land in the report's metrics and parse errors in
/// the log. Execution time and `last_run` are left for the caller to stamp
/// once the outputs are written.
pub async fn run<F, B>(
    fetcher: &F,
    briefs: &B,
    table: &FeedTable,
    settings: &PipelineSettings,
) -> RunReport
where
    F: FeedFetcher,
    B: BriefGenerator,
{
    let mut metrics = RunMetrics::new();
    let mut all_items = Vec::new();
    let mut categories = Vec::with_capacity(table.categories.len());

    for category in &table.categories {
        let sources = category.sources();
        let items = build_category(
            fetcher,
            briefs,
            &category.name,
            &sources,
            settings.pacing,
            &mut metrics,
        )
        .await;
        all_items.extend(items.iter().cloned());

        let snapshot = category_snapshot(&category.name, items, settings.category_limit, &mut metrics);
        info!(category = %snapshot.category, count = snapshot.items.len(), "Category snapshot ready");
        categories.push(snapshot);
    }

    let news = merge_window(all_items, settings.window, settings.sort, &mut metrics);

    RunReport {
        categories,
        news,
        metrics,
    }
}
