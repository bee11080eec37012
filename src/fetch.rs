//! Feed download.
//!
//! [`FeedFetcher`] is the seam between the pipeline and the network: the
//! pipeline only ever sees `url -> bytes | FetchError`. [`HttpFetcher`] is the
//! production implementation, one `GET` per call with a fixed user agent and
//! timeout and no retries.

use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// User agent sent with every feed request. Several vendor sites reject
/// non-browser agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
AppleWebKit/537.36 (KHTML, like Gecko) \
Chrome/122.0 Safari/537.36";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Failure class written to the `type` field of the error log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// DNS, connect, TLS, timeout, non-2xx status or body read failure.
    Transport,
    /// Anything else, e.g. a URL that cannot be requested at all.
    Other,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid feed URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport(_) => ErrorKind::Transport,
            FetchError::InvalidUrl { .. } => ErrorKind::Other,
        }
    }
}

/// Anything that can turn a feed URL into raw bytes.
pub trait FeedFetcher {
    /// Fetch the body at `url`. Exactly one attempt is made.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`FeedFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests time out after `timeout`.
    ///
    /// Every request carries the browser-like [`USER_AGENT`].
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the TLS backend cannot be
    /// initialised.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FeedFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = parse_feed_url(url)?;
        let t0 = Instant::now();

        let result = async {
            let resp = self.client.get(parsed).send().await?.error_for_status()?;
            let body = resp.bytes().await?;
            Ok::<_, reqwest::Error>(body.to_vec())
        }
        .await;

        let elapsed_ms = t0.elapsed().as_millis();
        match result {
            Ok(body) => {
                debug!(elapsed_ms, bytes = body.len(), "Fetched feed");
                Ok(body)
            }
            Err(e) => {
                warn!(elapsed_ms, error = %e, timeout = e.is_timeout(), "Feed request failed");
                Err(e.into())
            }
        }
    }
}

/// Parse `url` and require an http(s) scheme.
pub fn parse_feed_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme `{other}`"),
        }),
    }
}
