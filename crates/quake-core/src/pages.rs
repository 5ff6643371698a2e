use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use quake_feed::{Event, EventTable};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::views::{
    bubble_points, daily_counts_by_type, density_grid, depth_magnitude_scatter,
    magnitude_repartition, project_magnitude_series, proportions_by_type, BubblePoint,
    DailyTypeCount, DensityGrid, Histogram, ScatterPoint, DENSITY_MIN_MAGNITUDE,
};

/// The sets of views a client can ask for at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Home,
    Summary,
}

impl Page {
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Summary => "summary",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Page::Home),
            "summary" | "data-summary" | "data_summary" => Ok(Page::Summary),
            other => Err(format!("unknown page '{other}'")),
        }
    }
}

/// Overview table, density map, depth/magnitude scatter, magnitude line and bubble chart.
#[derive(Debug, Clone, Serialize)]
pub struct HomeViews {
    pub rows: Vec<Event>,
    pub density: DensityGrid,
    pub depth_magnitude: Vec<ScatterPoint>,
    pub magnitude_series: Vec<Option<f64>>,
    pub bubbles: Vec<BubblePoint>,
}

impl HomeViews {
    pub fn compute(table: &EventTable) -> Result<Self> {
        Ok(Self {
            rows: table.events()?,
            density: density_grid(table, DENSITY_MIN_MAGNITUDE)?,
            depth_magnitude: depth_magnitude_scatter(table)?,
            magnitude_series: project_magnitude_series(table)?,
            bubbles: bubble_points(table)?,
        })
    }
}

/// Events per day, magnitude repartition and event-type proportions.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryViews {
    pub daily_counts: Vec<DailyTypeCount>,
    pub repartition: Histogram,
    pub proportions: BTreeMap<String, usize>,
}

impl SummaryViews {
    pub fn compute(table: &EventTable) -> Result<Self> {
        Ok(Self {
            daily_counts: daily_counts_by_type(table)?,
            repartition: magnitude_repartition(table)?,
            proportions: proportions_by_type(table)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageViews {
    Home(HomeViews),
    Summary(SummaryViews),
}

pub fn compute_page(page: Page, table: &EventTable) -> Result<PageViews> {
    match page {
        Page::Home => HomeViews::compute(table).map(PageViews::Home),
        Page::Summary => SummaryViews::compute(table).map(PageViews::Summary),
    }
}
