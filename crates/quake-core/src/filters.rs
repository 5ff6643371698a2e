use std::collections::BTreeSet;

use chrono::NaiveDate;
use quake_feed::{columns, EventTable};
use tracing::debug;

use crate::error::{Result, ViewError};

/// Which places survive the place filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceFilter {
    /// Places resolved from the selected continents.
    Regions(BTreeSet<String>),
    /// Exactly one place, chosen directly by the user.
    Single(String),
}

impl PlaceFilter {
    pub fn matches(&self, place: &str) -> bool {
        match self {
            PlaceFilter::Regions(regions) => regions.contains(place),
            PlaceFilter::Single(selected) => selected == place,
        }
    }
}

pub fn filter_by_place(table: &EventTable, filter: &PlaceFilter) -> Result<EventTable> {
    let keep: Vec<bool> = table
        .str_column(columns::PLACE)?
        .iter()
        .map(|place| place.as_deref().is_some_and(|place| filter.matches(place)))
        .collect();
    let filtered = table.retain(&keep)?;
    debug!(
        before = table.height(),
        after = filtered.height(),
        "applied place filter"
    );
    Ok(filtered)
}

/// Keeps events whose UTC calendar date lies in `[start, end]`, both ends inclusive.
pub fn filter_by_date_range(
    table: &EventTable,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<EventTable> {
    if start > end {
        return Err(ViewError::InvalidDateRange { start, end });
    }
    let keep: Vec<bool> = table
        .dates()?
        .into_iter()
        .map(|date| date.is_some_and(|date| start <= date && date <= end))
        .collect();
    Ok(table.retain(&keep)?)
}

/// Keeps events with a magnitude of at least `threshold`. Events without a magnitude
/// never pass.
pub fn magnitude_at_least(table: &EventTable, threshold: f64) -> Result<EventTable> {
    let keep: Vec<bool> = table
        .f64_column(columns::MAGNITUDE)?
        .into_iter()
        .map(|magnitude| magnitude.is_some_and(|magnitude| magnitude >= threshold))
        .collect();
    Ok(table.retain(&keep)?)
}

pub fn by_type(table: &EventTable, event_type: &str) -> Result<EventTable> {
    let keep: Vec<bool> = table
        .str_column(columns::EVENT_TYPE)?
        .iter()
        .map(|value| value.as_deref() == Some(event_type))
        .collect();
    Ok(table.retain(&keep)?)
}
