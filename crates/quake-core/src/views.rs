use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use quake_feed::{columns, EventTable};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewError};
use crate::filters::{by_type, magnitude_at_least};

/// Minimum magnitude plotted on the bubble chart.
pub const BUBBLE_MIN_MAGNITUDE: f64 = 3.0;
/// Minimum magnitude fed to the density map.
pub const DENSITY_MIN_MAGNITUDE: f64 = 1.0;
/// Bin count of the magnitude repartition histogram.
pub const REPARTITION_BINS: usize = 50;
/// Event type the magnitude repartition is restricted to.
pub const REPARTITION_EVENT_TYPE: &str = "earthquake";

/// Numeric columns a histogram can be built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistogramColumn {
    Magnitude,
    Depth,
    Latitude,
    Longitude,
}

impl HistogramColumn {
    pub fn column_name(&self) -> &'static str {
        match self {
            HistogramColumn::Magnitude => columns::MAGNITUDE,
            HistogramColumn::Depth => columns::DEPTH,
            HistogramColumn::Latitude => columns::LATITUDE,
            HistogramColumn::Longitude => columns::LONGITUDE,
        }
    }
}

/// Equal-width bins over `[min, max]` of a column.
///
/// `edges` has one more entry than `counts`. Every bin is half-open except the last,
/// which also holds the maximum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl Histogram {
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn bins(&self) -> Vec<HistogramBin> {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, &count)| HistogramBin {
                lower: edge[0],
                upper: edge[1],
                count,
            })
            .collect()
    }

    /// Bins the given values. No values gives an empty histogram.
    pub fn from_values(values: &[f64], bin_count: usize) -> Result<Self> {
        if bin_count == 0 {
            return Err(ViewError::InvalidBinCount);
        }
        if values.is_empty() {
            return Ok(Self::default());
        }

        let (mut min, mut max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if min == max {
            min -= 0.5;
            max += 0.5;
        }

        let width = (max - min) / bin_count as f64;
        let mut edges: Vec<f64> = (0..bin_count)
            .map(|idx| min + width * idx as f64)
            .collect();
        edges.push(max);

        let mut counts = vec![0usize; bin_count];
        for &value in values {
            let raw = ((value - min) / width).floor();
            let mut idx = if raw < 0.0 { 0 } else { raw as usize };
            if idx >= bin_count {
                idx = bin_count - 1;
            }
            // float rounding can land a value one bin off its edges
            if idx > 0 && value < edges[idx] {
                idx -= 1;
            } else if idx + 1 < bin_count && value >= edges[idx + 1] {
                idx += 1;
            }
            counts[idx] += 1;
        }

        Ok(Self { edges, counts })
    }
}

pub fn histogram_buckets(
    table: &EventTable,
    column: HistogramColumn,
    bin_count: usize,
) -> Result<Histogram> {
    let values: Vec<f64> = table
        .f64_column(column.column_name())?
        .into_iter()
        .flatten()
        .collect();
    Histogram::from_values(&values, bin_count)
}

/// Magnitude distribution of the earthquakes in the table.
pub fn magnitude_repartition(table: &EventTable) -> Result<Histogram> {
    let earthquakes = by_type(table, REPARTITION_EVENT_TYPE)?;
    histogram_buckets(&earthquakes, HistogramColumn::Magnitude, REPARTITION_BINS)
}

/// Magnitudes in row order; missing magnitudes stay `None`.
pub fn project_magnitude_series(table: &EventTable) -> Result<Vec<Option<f64>>> {
    Ok(table.f64_column(columns::MAGNITUDE)?)
}

pub fn proportions_by_type(table: &EventTable) -> Result<BTreeMap<String, usize>> {
    let mut counts = BTreeMap::new();
    for event_type in table.str_column(columns::EVENT_TYPE)? {
        *counts.entry(event_type.unwrap_or_default()).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Point cloud for the heat map: parallel coordinate and weight columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DensityGrid {
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    pub magnitudes: Vec<f64>,
}

impl DensityGrid {
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }
}

pub fn density_grid(table: &EventTable, min_magnitude: f64) -> Result<DensityGrid> {
    let strong = magnitude_at_least(table, min_magnitude)?;
    let latitude = strong.f64_column(columns::LATITUDE)?;
    let longitude = strong.f64_column(columns::LONGITUDE)?;
    let magnitude = strong.f64_column(columns::MAGNITUDE)?;

    let mut grid = DensityGrid::default();
    for ((lat, lon), mag) in latitude.into_iter().zip(longitude).zip(magnitude) {
        if let (Some(lat), Some(lon), Some(mag)) = (lat, lon, mag) {
            grid.latitudes.push(lat);
            grid.longitudes.push(lon);
            grid.magnitudes.push(mag);
        }
    }
    Ok(grid)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub depth: Option<f64>,
    pub magnitude: Option<f64>,
}

/// Depth against magnitude for every row, nulls included.
pub fn depth_magnitude_scatter(table: &EventTable) -> Result<Vec<ScatterPoint>> {
    let depth = table.f64_column(columns::DEPTH)?;
    let magnitude = table.f64_column(columns::MAGNITUDE)?;
    Ok(depth
        .into_iter()
        .zip(magnitude)
        .map(|(depth, magnitude)| ScatterPoint { depth, magnitude })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubblePoint {
    pub occurred_at: DateTime<Utc>,
    pub magnitude: f64,
}

/// Events of magnitude 3 and above, for the bubble chart.
pub fn bubble_points(table: &EventTable) -> Result<Vec<BubblePoint>> {
    let strong = magnitude_at_least(table, BUBBLE_MIN_MAGNITUDE)?;
    let timestamps = strong.timestamps_micros()?;
    let magnitude = strong.f64_column(columns::MAGNITUDE)?;

    Ok(timestamps
        .into_iter()
        .zip(magnitude)
        .filter_map(|(micros, magnitude)| {
            let occurred_at = micros.and_then(DateTime::<Utc>::from_timestamp_micros)?;
            Some(BubblePoint {
                occurred_at,
                magnitude: magnitude?,
            })
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTypeCount {
    pub date: NaiveDate,
    pub event_type: String,
    pub count: usize,
}

/// Number of events per UTC day and event type, ordered by date then type.
pub fn daily_counts_by_type(table: &EventTable) -> Result<Vec<DailyTypeCount>> {
    let dates = table.dates()?;
    let types = table.str_column(columns::EVENT_TYPE)?;

    let mut counts: BTreeMap<(NaiveDate, String), usize> = BTreeMap::new();
    for (date, event_type) in dates.into_iter().zip(types) {
        if let Some(date) = date {
            *counts
                .entry((date, event_type.unwrap_or_default()))
                .or_insert(0) += 1;
        }
    }

    Ok(counts
        .into_iter()
        .map(|((date, event_type), count)| DailyTypeCount {
            date,
            event_type,
            count,
        })
        .collect())
}

/// Earliest and latest UTC calendar dates present in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateBounds {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min <= date && date <= self.max
    }
}

pub fn date_bounds(table: &EventTable) -> Result<Option<DateBounds>> {
    let mut bounds: Option<DateBounds> = None;
    for date in table.dates()?.into_iter().flatten() {
        bounds = Some(match bounds {
            None => DateBounds {
                min: date,
                max: date,
            },
            Some(current) => DateBounds {
                min: current.min.min(date),
                max: current.max.max(date),
            },
        });
    }
    Ok(bounds)
}
