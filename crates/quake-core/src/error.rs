// crates/quake-core/src/error.rs

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("unknown continent '{0}'")]
    InvalidSelection(String),

    #[error("Start date must be <= End date")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("histogram needs at least one bin")]
    InvalidBinCount,

    #[error("continent map is invalid: {0}")]
    Regions(String),

    #[error("continent map could not be parsed: {0}")]
    RegionsToml(#[from] toml::de::Error),

    #[error("File I/O error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl ViewError {
    /// Errors caused by the user's filter choice rather than by the data or the code.
    /// The previous view stays valid when one of these is returned.
    pub fn is_rejected_selection(&self) -> bool {
        matches!(
            self,
            ViewError::InvalidSelection(_) | ViewError::InvalidDateRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ViewError>;
