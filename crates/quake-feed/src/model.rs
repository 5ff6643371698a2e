use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Canonical column names of the event table, in schema order.
pub mod columns {
    pub const OCCURRED_AT: &str = "occurred_at";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const DEPTH: &str = "depth";
    pub const MAGNITUDE: &str = "magnitude";
    pub const PLACE_RAW: &str = "place_raw";
    pub const PLACE: &str = "place";
    pub const EVENT_TYPE: &str = "event_type";

    pub const ALL: [&str; 8] = [
        OCCURRED_AT,
        LATITUDE,
        LONGITUDE,
        DEPTH,
        MAGNITUDE,
        PLACE_RAW,
        PLACE,
        EVENT_TYPE,
    ];
}

/// One row of the normalized feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub occurred_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: Option<f64>,
    pub magnitude: Option<f64>,
    pub place_raw: String,
    pub place: String,
    pub event_type: String,
}

impl Event {
    /// Calendar date of the event in UTC, the feed's reporting timezone.
    pub fn date(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }
}

/// An immutable table of events backed by a polars `DataFrame` with the canonical schema.
///
/// Filtering never mutates a table; every narrowing produces a new `EventTable`.
#[derive(Debug, Clone)]
pub struct EventTable {
    df: DataFrame,
}

impl EventTable {
    /// Wraps an existing frame after checking it carries every canonical column.
    pub fn from_dataframe(df: DataFrame) -> PolarsResult<Self> {
        for name in columns::ALL {
            df.column(name)?;
        }
        let df = df.select(columns::ALL)?;
        Ok(Self { df })
    }

    /// Builds a table from rows, keeping their order.
    pub fn from_events(events: &[Event]) -> PolarsResult<Self> {
        let occurred_at = Series::new(
            columns::OCCURRED_AT.into(),
            events
                .iter()
                .map(|event| event.occurred_at.timestamp_micros())
                .collect::<Vec<i64>>(),
        )
        .cast(&DataType::Datetime(
            TimeUnit::Microseconds,
            Some(polars::prelude::TimeZone::UTC),
        ))?;

        let latitude: Vec<f64> = events.iter().map(|event| event.latitude).collect();
        let longitude: Vec<f64> = events.iter().map(|event| event.longitude).collect();
        let depth: Vec<Option<f64>> = events.iter().map(|event| event.depth).collect();
        let magnitude: Vec<Option<f64>> = events.iter().map(|event| event.magnitude).collect();
        let place_raw: Vec<&str> = events.iter().map(|event| event.place_raw.as_str()).collect();
        let place: Vec<&str> = events.iter().map(|event| event.place.as_str()).collect();
        let event_type: Vec<&str> = events.iter().map(|event| event.event_type.as_str()).collect();

        let df = DataFrame::new(vec![
            occurred_at.into(),
            Series::new(columns::LATITUDE.into(), latitude).into(),
            Series::new(columns::LONGITUDE.into(), longitude).into(),
            Series::new(columns::DEPTH.into(), depth).into(),
            Series::new(columns::MAGNITUDE.into(), magnitude).into(),
            Series::new(columns::PLACE_RAW.into(), place_raw).into(),
            Series::new(columns::PLACE.into(), place).into(),
            Series::new(columns::EVENT_TYPE.into(), event_type).into(),
        ])?;

        Ok(Self { df })
    }

    pub fn empty() -> PolarsResult<Self> {
        Self::from_events(&[])
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Keeps the rows where `mask` is true, preserving row order.
    pub fn filter(&self, mask: &BooleanChunked) -> PolarsResult<Self> {
        Ok(Self {
            df: self.df.filter(mask)?,
        })
    }

    /// Keeps row `i` when `keep[i]` is true.
    pub fn retain(&self, keep: &[bool]) -> PolarsResult<Self> {
        if keep.len() != self.df.height() {
            return Err(PolarsError::ShapeMismatch(
                format!(
                    "row mask has {} entries but the table has {} rows",
                    keep.len(),
                    self.df.height()
                )
                .into(),
            ));
        }
        let mask = BooleanChunked::new("keep".into(), keep);
        self.filter(&mask)
    }

    /// Row timestamps as UTC microseconds.
    pub fn timestamps_micros(&self) -> PolarsResult<Vec<Option<i64>>> {
        let ts = self.df.column(columns::OCCURRED_AT)?.datetime()?;
        Ok((0..self.df.height()).map(|idx| ts.get(idx)).collect())
    }

    /// Row timestamps truncated to their UTC calendar date.
    pub fn dates(&self) -> PolarsResult<Vec<Option<NaiveDate>>> {
        Ok(self
            .timestamps_micros()?
            .into_iter()
            .map(|micros| {
                micros
                    .and_then(DateTime::<Utc>::from_timestamp_micros)
                    .map(|dt| dt.date_naive())
            })
            .collect())
    }

    pub fn f64_column(&self, name: &str) -> PolarsResult<Vec<Option<f64>>> {
        Ok(self.df.column(name)?.f64()?.into_iter().collect())
    }

    pub fn str_column(&self, name: &str) -> PolarsResult<Vec<Option<String>>> {
        Ok(self
            .df
            .column(name)?
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect())
    }

    /// Materializes every row, e.g. for the tabular overview.
    pub fn events(&self) -> PolarsResult<Vec<Event>> {
        let timestamps = self.timestamps_micros()?;
        let latitude = self.df.column(columns::LATITUDE)?.f64()?;
        let longitude = self.df.column(columns::LONGITUDE)?.f64()?;
        let depth = self.df.column(columns::DEPTH)?.f64()?;
        let magnitude = self.df.column(columns::MAGNITUDE)?.f64()?;
        let place_raw = self.df.column(columns::PLACE_RAW)?.str()?;
        let place = self.df.column(columns::PLACE)?.str()?;
        let event_type = self.df.column(columns::EVENT_TYPE)?.str()?;

        let mut events = Vec::with_capacity(self.df.height());
        for (idx, micros) in timestamps.into_iter().enumerate() {
            let occurred_at = micros
                .and_then(DateTime::<Utc>::from_timestamp_micros)
                .ok_or_else(|| {
                    PolarsError::ComputeError(
                        format!("row {idx} has no valid occurred_at timestamp").into(),
                    )
                })?;
            events.push(Event {
                occurred_at,
                latitude: latitude.get(idx).unwrap_or(f64::NAN),
                longitude: longitude.get(idx).unwrap_or(f64::NAN),
                depth: depth.get(idx),
                magnitude: magnitude.get(idx),
                place_raw: place_raw.get(idx).unwrap_or_default().to_string(),
                place: place.get(idx).unwrap_or_default().to_string(),
                event_type: event_type.get(idx).unwrap_or_default().to_string(),
            });
        }
        Ok(events)
    }
}
