use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::FeedError;

/// The USGS summary feed of every event recorded in the past month.
pub const USGS_ALL_MONTH_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_month.csv";

/// Where a raw feed body comes from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Stable identifier of the source; doubles as the session cache key.
    fn describe(&self) -> &str;

    async fn fetch(&self) -> Result<String, FeedError>;
}

/// Fetches the feed over HTTP.
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("quakeview/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|source| FeedError::Http {
                url: url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn usgs(timeout: Duration) -> Result<Self, FeedError> {
        Self::new(USGS_ALL_MONTH_URL, timeout)
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    fn describe(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<String, FeedError> {
        debug!(url = %self.url, "fetching earthquake feed");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| FeedError::Http {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Fetch {
                origin: self.url.clone(),
                message: format!("server returned {status}"),
            });
        }

        response.text().await.map_err(|source| FeedError::Http {
            url: self.url.clone(),
            source,
        })
    }
}

/// Reads a previously downloaded feed from disk.
pub struct FileFeedSource {
    path: PathBuf,
    label: String,
}

impl FileFeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }
}

#[async_trait]
impl FeedSource for FileFeedSource {
    fn describe(&self) -> &str {
        &self.label
    }

    async fn fetch(&self) -> Result<String, FeedError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FeedError::Io {
                path: self.label.clone(),
                source,
            })
    }
}

/// Serves a fixed in-memory body.
#[derive(Debug, Clone)]
pub struct StaticFeedSource {
    label: String,
    body: String,
}

impl StaticFeedSource {
    pub fn new(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            body: body.into(),
        }
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    fn describe(&self) -> &str {
        &self.label
    }

    async fn fetch(&self) -> Result<String, FeedError> {
        Ok(self.body.clone())
    }
}
