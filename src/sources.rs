//! Feed table: which feeds are fetched for which category.
//!
//! The built-in table mirrors the production deployment. A YAML file with the
//! same shape can replace it:
//!
//! ```yaml
//! categories:
//!   - name: newsroom
//!     feeds:
//!       - url: https://www.dalet.com/feed/
//!         label: Dalet
//!       - url: https://www.avid.com/press-center/rss
//!         label: Avid
//! ```
//!
//! Category order and feed order are preserved; both determine output order.

use crate::fetch::parse_feed_url;
use crate::models::FeedSource;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading feed table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing feed table: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("category name `{0}` cannot be used as a file name")]
    InvalidCategory(String),
    #[error("category `{0}` is listed more than once")]
    DuplicateCategory(String),
    #[error("category `{category}`: {reason}")]
    InvalidFeed { category: String, reason: String },
}

/// One configured feed inside a category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedEntry {
    pub url: String,
    #[serde(default = "default_label")]
    pub label: String,
}

fn default_label() -> String {
    "Unknown".to_string()
}

/// A category and its feeds, in fetch order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryFeeds {
    pub name: String,
    #[serde(default)]
    pub feeds: Vec<FeedEntry>,
}

impl CategoryFeeds {
    /// The category's feeds as [`FeedSource`]s.
    pub fn sources(&self) -> Vec<FeedSource> {
        self.feeds
            .iter()
            .map(|feed| FeedSource {
                url: feed.url.clone(),
                label: feed.label.clone(),
                category: self.name.clone(),
            })
            .collect()
    }
}

/// All categories, in output order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedTable {
    pub categories: Vec<CategoryFeeds>,
}

const BUILTIN: &[(&str, &[(&str, &str)])] = &[
    (
        "newsroom",
        &[
            ("https://www.dalet.com/feed/", "Dalet"),
            ("https://www.avid.com/press-center/rss", "Avid"),
            ("https://www.tvtechnology.com/rss.xml", "TV Technology"),
        ],
    ),
    (
        "playout",
        &[
            ("https://www.rossvideo.com/news/feed/", "Ross Video"),
            ("https://www.imaginecommunications.com/feed/", "Imagine Communications"),
            ("https://www.tvtechnology.com/rss.xml", "TV Technology"),
        ],
    ),
    (
        "infrastructure",
        &[
            ("https://www.smpte.org/rss.xml", "SMPTE"),
            ("https://www.tvtechnology.com/feed", "TV Technology"),
            ("https://www.ibc.org/rss", "IBC"),
        ],
    ),
    (
        "graphics",
        &[
            ("https://www.vizrt.com/news/rss.xml", "Vizrt"),
            ("https://www.newscaststudio.com/category/graphics/feed/", "Newscast Studio"),
            ("https://www.rossvideo.com/news/feed/", "Ross Video"),
        ],
    ),
    (
        "cloud",
        &[
            ("https://blog.frame.io/feed/", "Frame.io"),
            ("https://www.adobe.com/video-audio.rss.xml", "Adobe"),
            ("https://www.tvtechnology.com/rss.xml", "TV Technology"),
        ],
    ),
    (
        "streaming",
        &[
            ("https://www.streamingmedia.com/RSS/RSSFeed.aspx", "Streaming Media"),
            ("https://aws.amazon.com/about-aws/whats-new/recent/feed/", "AWS Media"),
            ("https://www.broadcastingcable.com/feeds/all", "Broadcasting & Cable"),
        ],
    ),
    (
        "audio-ai",
        &[
            ("https://www.prosoundnetwork.com/feed", "Pro Sound Network"),
            ("https://www.tvtechnology.com/rss.xml", "TV Technology"),
            ("https://www.sportsvideo.org/feed/", "Sports Video Group"),
        ],
    ),
];

impl FeedTable {
    /// The broadcast-industry table used when no file is given.
    pub fn builtin() -> Self {
        let categories = BUILTIN
            .iter()
            .map(|(name, feeds)| CategoryFeeds {
                name: name.to_string(),
                feeds: feeds
                    .iter()
                    .map(|(url, label)| FeedEntry {
                        url: url.to_string(),
                        label: label.to_string(),
                    })
                    .collect(),
            })
            .collect();
        Self { categories }
    }

    /// Parse and validate a YAML feed table.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let table: FeedTable = serde_yaml::from_str(yaml)?;
        table.validate()?;
        Ok(table)
    }

    /// Read, parse and validate a YAML feed table from disk.
    ///
    /// # Arguments
    ///
    /// * `path` - YAML file with a top-level `categories` list
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, and the
    /// parse or validation error of [`FeedTable::from_yaml`] otherwise.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path).await.map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_yaml(&yaml)?;
        info!(
            categories = table.categories.len(),
            feeds = table.feed_count(),
            "Loaded feed table"
        );
        Ok(table)
    }

    /// Total number of configured feeds across all categories.
    pub fn feed_count(&self) -> usize {
        self.categories.iter().map(|c| c.feeds.len()).sum()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for category in &self.categories {
            if !is_valid_category_name(&category.name) {
                return Err(ConfigError::InvalidCategory(category.name.clone()));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(ConfigError::DuplicateCategory(category.name.clone()));
            }
            for feed in &category.feeds {
                parse_feed_url(&feed.url).map_err(|e| ConfigError::InvalidFeed {
                    category: category.name.clone(),
                    reason: e.to_string(),
                })?;
            }
        }
        Ok(())
    }
}

/// Category names become `<name>.json`, so they must be plain file stems.
fn is_valid_category_name(name: &str) -> bool {
    !name.is_empty()
        && name != "news"
        && name != "metrics"
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        let table = FeedTable::builtin();
        table.validate().unwrap();
        assert_eq!(table.categories.len(), 7);
        assert_eq!(table.feed_count(), 21);
        assert_eq!(table.categories[0].name, "newsroom");
        assert_eq!(table.categories[6].name, "audio-ai");
    }

    #[test]
    fn test_sources_carry_category_and_order() {
        let table = FeedTable::builtin();
        let sources = table.categories[1].sources();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].label, "Ross Video");
        assert_eq!(sources[2].label, "TV Technology");
        assert!(sources.iter().all(|s| s.category == "playout"));
    }

    #[test]
    fn test_from_yaml_with_default_label() {
        let yaml = r#"
categories:
  - name: newsroom
    feeds:
      - url: https://www.dalet.com/feed/
        label: Dalet
      - url: https://example.com/rss
  - name: empty
"#;
        let table = FeedTable::from_yaml(yaml).unwrap();
        assert_eq!(table.categories.len(), 2);
        assert_eq!(table.categories[0].feeds[1].label, "Unknown");
        assert!(table.categories[1].feeds.is_empty());
    }

    #[test]
    fn test_rejects_path_like_category() {
        let yaml = "categories:\n  - name: ../etc\n    feeds: []\n";
        let err = FeedTable::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCategory(name) if name == "../etc"));
    }

    #[test]
    fn test_rejects_reserved_category_names() {
        let yaml = "categories:\n  - name: news\n";
        assert!(matches!(
            FeedTable::from_yaml(yaml).unwrap_err(),
            ConfigError::InvalidCategory(_)
        ));
    }

    #[test]
    fn test_rejects_duplicate_category() {
        let yaml = "categories:\n  - name: cloud\n  - name: cloud\n";
        assert!(matches!(
            FeedTable::from_yaml(yaml).unwrap_err(),
            ConfigError::DuplicateCategory(name) if name == "cloud"
        ));
    }

    #[test]
    fn test_rejects_bad_feed_url() {
        let yaml = "categories:\n  - name: cloud\n    feeds:\n      - url: ftp://example.com/feed\n";
        let err = FeedTable::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("category `cloud`"));
    }

    #[test]
    fn test_rejects_malformed_yaml() {
        assert!(matches!(
            FeedTable::from_yaml("categories: [").unwrap_err(),
            ConfigError::Yaml(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let err = FeedTable::from_yaml_file(Path::new("/nonexistent/feeds.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[tokio::test]
    async fn test_loads_feed_table_from_file() {
        let path = std::env::temp_dir().join(format!("streamic_feeds_{}.yaml", std::process::id()));
        tokio::fs::write(
            &path,
            "categories:\n  - name: playout\n    feeds:\n      - url: https://www.grassvalley.com/feed/\n        label: Grass Valley\n",
        )
        .await
        .unwrap();

        let table = FeedTable::from_yaml_file(&path).await.unwrap();
        assert_eq!(table.categories.len(), 1);
        assert_eq!(table.categories[0].name, "playout");
        assert_eq!(table.feed_count(), 1);

        let _ = tokio::fs::remove_file(&path).await;
    }
}
