//! Command-line interface definitions.
//!
//! Every option can also come from an environment variable where noted.

use crate::fetch::DEFAULT_TIMEOUT;
use crate::pipeline::{CATEGORY_LIMIT, PACING_DELAY, SortMode, WINDOW_SIZE};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the feed aggregator.
///
/// # Examples
///
/// ```sh
/// # Built-in feed table, outputs in ./data
/// streamic_feeds
///
/// # Custom feed table and output directory
/// streamic_feeds -f feeds.yaml -d ./site/data
///
/// # Order the global window by parsed dates instead of raw strings
/// streamic_feeds --sort parsed
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory the JSON snapshots are written to
    #[arg(short, long, env = "STREAMIC_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// YAML feed table replacing the built-in one
    #[arg(short, long, env = "STREAMIC_FEEDS")]
    pub feeds: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Pause between fetches within a category, in milliseconds
    #[arg(long, default_value_t = PACING_DELAY.as_millis() as u64)]
    pub delay_ms: u64,

    /// Maximum items per category file
    #[arg(long, default_value_t = CATEGORY_LIMIT)]
    pub category_limit: usize,

    /// Maximum items in news.json
    #[arg(long, default_value_t = WINDOW_SIZE)]
    pub window: usize,

    /// Ordering of news.json
    #[arg(long, value_enum, default_value_t = SortMode::Raw)]
    pub sort: SortMode,
}
