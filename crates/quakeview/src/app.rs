use std::sync::Arc;

use anyhow::{Context, Result};
use quake_core::{ContinentMap, Settings};
use quake_feed::{FeedLoader, FileFeedSource, HttpFeedSource};

/// Shared, read-only state: the cached feed and the continent map.
pub struct AppState {
    pub loader: FeedLoader,
    pub regions: Arc<ContinentMap>,
}

impl AppState {
    pub fn new(loader: FeedLoader, regions: ContinentMap) -> Self {
        Self {
            loader,
            regions: Arc::new(regions),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let regions = settings
            .load_regions()
            .context("failed to load continent map")?;
        Ok(Self::new(feed_loader(settings)?, regions))
    }
}

/// A local feed file wins over the feed URL.
pub fn feed_loader(settings: &Settings) -> Result<FeedLoader> {
    match &settings.feed_file {
        Some(path) => Ok(FeedLoader::new(FileFeedSource::new(path.clone()))),
        None => {
            let source = HttpFeedSource::new(&settings.feed_url, settings.http_timeout)
                .context("failed to configure HTTP feed source")?;
            Ok(FeedLoader::new(source))
        }
    }
}
