//! JSON snapshot writers.
//!
//! Every file is pretty-printed with two-space indentation and written as
//! UTF-8 with non-ASCII characters left as-is.
//!
//! ```text
//! data_dir/
//! ├── newsroom.json     # ≤ 60 items per category
//! ├── ...
//! ├── news.json         # ≤ 100 items, global window
//! └── metrics.json      # RunMetrics
//! ```

use crate::metrics::RunMetrics;
use crate::models::NewsItem;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Serialize `value` to `path`, replacing any existing file.
///
/// # Arguments
///
/// * `path` - Destination file; its directory must exist
/// * `value` - Anything `serde` can serialize
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn write_json<T>(path: &Path, value: &T) -> Result<(), Box<dyn Error>>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).await?;
    Ok(())
}

/// Write `<data_dir>/<category>.json`.
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Propagates [`write_json`] failures.
pub async fn write_category(
    data_dir: &Path,
    category: &str,
    items: &[NewsItem],
) -> Result<PathBuf, Box<dyn Error>> {
    let path = data_dir.join(format!("{category}.json"));
    write_json(&path, items).await?;
    info!(path = %path.display(), count = items.len(), "Saved category file");
    Ok(path)
}

/// Write `<data_dir>/news.json`.
pub async fn write_news(data_dir: &Path, items: &[NewsItem]) -> Result<PathBuf, Box<dyn Error>> {
    let path = data_dir.join("news.json");
    write_json(&path, items).await?;
    info!(path = %path.display(), count = items.len(), "Saved global window");
    Ok(path)
}

/// Write `<data_dir>/metrics.json`.
pub async fn write_metrics(data_dir: &Path, metrics: &RunMetrics) -> Result<PathBuf, Box<dyn Error>> {
    let path = data_dir.join("metrics.json");
    write_json(&path, metrics).await?;
    info!(path = %path.display(), "Saved run metrics");
    Ok(path)
}
