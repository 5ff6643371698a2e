pub mod decode;
pub mod errors;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod source;

pub use decode::{decode_feed, DecodedFeed, LoadReport};
pub use errors::{FeedError, RowRejection};
pub use loader::{FeedLoader, LoadedFeed};
pub use model::{columns, Event, EventTable};
pub use normalize::normalize_place;
pub use source::{
    FeedSource, FileFeedSource, HttpFeedSource, StaticFeedSource, USGS_ALL_MONTH_URL,
};

pub type Result<T> = std::result::Result<T, FeedError>;
