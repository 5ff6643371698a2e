use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use crate::decode::{decode_feed, DecodedFeed};
use crate::errors::FeedError;
use crate::source::FeedSource;

/// What the loader caches: the decoded table plus its load report.
pub type LoadedFeed = DecodedFeed;

/// Loads the feed once per process and hands out the cached result afterwards.
///
/// A failed load leaves the cache empty so the next call fetches again.
pub struct FeedLoader {
    source: Box<dyn FeedSource>,
    cache: OnceCell<Arc<LoadedFeed>>,
}

impl FeedLoader {
    pub fn new(source: impl FeedSource + 'static) -> Self {
        Self::from_boxed(Box::new(source))
    }

    pub fn from_boxed(source: Box<dyn FeedSource>) -> Self {
        Self {
            source,
            cache: OnceCell::new(),
        }
    }

    pub fn cache_key(&self) -> &str {
        self.source.describe()
    }

    pub fn cached(&self) -> Option<Arc<LoadedFeed>> {
        self.cache.get().cloned()
    }

    pub async fn load(&self) -> Result<Arc<LoadedFeed>, FeedError> {
        let loaded = self
            .cache
            .get_or_try_init(|| async {
                let origin = self.source.describe();
                info!(origin, "loading earthquake feed");
                let body = self.source.fetch().await?;
                Ok::<_, FeedError>(Arc::new(decode_feed(origin, &body)?))
            })
            .await?;
        Ok(Arc::clone(loaded))
    }
}
