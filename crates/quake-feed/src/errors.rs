use std::fmt;

use polars::prelude::PolarsError;
use thiserror::Error;

/// A feed row that was dropped during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    /// 1-indexed line in the feed body (the header is line 1).
    pub line: u64,
    pub reason: String,
}

impl RowRejection {
    pub fn new(line: u64, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to fetch feed from {origin}: {message}")]
    Fetch { origin: String, message: String },

    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read feed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("feed header could not be read: {0}")]
    Csv(#[from] csv::Error),

    #[error("feed is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("feed body was empty")]
    EmptyFeed,

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

impl FeedError {
    /// True when the source itself could not be reached or read, as opposed to a
    /// body that arrived but could not be decoded.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            FeedError::Fetch { .. } | FeedError::Http { .. } | FeedError::Io { .. }
        )
    }
}
