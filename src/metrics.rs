//! Per-run counters written to `metrics.json`.
//!
//! A [`RunMetrics`] value is created when the run starts, handed to each stage
//! as `&mut RunMetrics`, and serialized once at the end. Nothing is carried
//! over between runs.

use crate::dedup::DedupStats;
use crate::fetch::{ErrorKind, FetchError};
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;

/// One failed fetch in the structured error log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchErrorRecord {
    pub url: String,
    pub error: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
}

/// Dedup outcome of a single category, in run order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDedup {
    pub category: String,
    pub duplicates_removed: usize,
    pub items_after_dedup: usize,
}

/// Counters for one aggregation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunMetrics {
    pub total_feeds_checked: usize,
    pub successful_fetches: usize,
    pub failed_fetches: usize,
    pub total_items_fetched: usize,
    /// Duplicates removed by the most recent dedup pass (the global one once
    /// the run completes).
    pub duplicates_removed: usize,
    /// Survivors of the most recent dedup pass.
    pub items_after_dedup: usize,
    pub execution_time_seconds: f64,
    pub last_run: Option<String>,
    pub errors: Vec<FetchErrorRecord>,
    pub category_dedup: Vec<CategoryDedup>,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_feed_checked(&mut self) {
        self.total_feeds_checked += 1;
    }

    pub fn record_fetch_success(&mut self) {
        self.successful_fetches += 1;
    }

    pub fn record_fetch_failure(&mut self, url: &str, error: &FetchError) {
        self.failed_fetches += 1;
        self.errors.push(FetchErrorRecord {
            url: url.to_string(),
            error: error.to_string(),
            kind: error.kind(),
        });
    }

    pub fn record_items_fetched(&mut self, count: usize) {
        self.total_items_fetched += count;
    }

    /// Record a per-category dedup pass.
    ///
    /// Also overwrites the top-level dedup fields, which therefore always
    /// describe the latest pass.
    pub fn record_category_dedup(&mut self, category: &str, stats: DedupStats) {
        self.category_dedup.push(CategoryDedup {
            category: category.to_string(),
            duplicates_removed: stats.duplicates_removed,
            items_after_dedup: stats.items_after_dedup,
        });
        self.record_dedup(stats);
    }

    /// Record the global dedup pass.
    pub fn record_global_dedup(&mut self, stats: DedupStats) {
        self.record_dedup(stats);
    }

    fn record_dedup(&mut self, stats: DedupStats) {
        self.duplicates_removed = stats.duplicates_removed;
        self.items_after_dedup = stats.items_after_dedup;
    }

    /// Stamp execution time (rounded to hundredths of a second) and the UTC
    /// completion time.
    pub fn finish(&mut self, started: Instant) {
        let secs = started.elapsed().as_secs_f64();
        self.execution_time_seconds = (secs * 100.0).round() / 100.0;
        self.last_run = Some(Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string());
    }
}
