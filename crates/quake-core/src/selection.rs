use std::sync::Arc;

use chrono::NaiveDate;
use quake_feed::EventTable;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, ViewError};
use crate::filters::{filter_by_date_range, filter_by_place, PlaceFilter};
use crate::pages::{compute_page, Page, PageViews};
use crate::regions::ContinentMap;
use crate::views::{date_bounds, DateBounds};

/// What the user picked in the sidebar. Recomputed on every interaction, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub continents: Vec<String>,
    /// When set, replaces the continent regions with this one place.
    pub single_place: Option<String>,
    /// `None` means the earliest date in the data.
    pub start: Option<NaiveDate>,
    /// `None` means the latest date in the data.
    pub end: Option<NaiveDate>,
}

impl FilterSelection {
    /// Every continent, every date.
    pub fn all(regions: &ContinentMap) -> Self {
        Self {
            continents: regions
                .continents()
                .into_iter()
                .map(str::to_string)
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_continents<S: Into<String>>(
        mut self,
        continents: impl IntoIterator<Item = S>,
    ) -> Self {
        self.continents = continents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_single_place(mut self, place: impl Into<String>) -> Self {
        self.single_place = Some(place.into());
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Resolves the place half of the selection. Continent names are checked even when a
    /// single place overrides them.
    pub fn place_filter(&self, regions: &ContinentMap) -> Result<PlaceFilter> {
        let resolved = regions.resolve_regions(self.continents.as_slice())?;
        Ok(match &self.single_place {
            Some(place) => PlaceFilter::Single(place.clone()),
            None => PlaceFilter::Regions(resolved),
        })
    }

    fn check_date_order(&self) -> Result<()> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => {
                Err(ViewError::InvalidDateRange { start, end })
            }
            _ => Ok(()),
        }
    }
}

/// Narrows `table` to `selection`: place filter first, then the date range.
///
/// An open end of the range falls back to the date bounds of the place-filtered table.
/// Requested dates are used as given, so a range outside the data yields an empty table.
pub fn apply_selection(
    table: &EventTable,
    regions: &ContinentMap,
    selection: &FilterSelection,
) -> Result<EventTable> {
    selection.check_date_order()?;

    let place_filter = selection.place_filter(regions)?;
    let by_place = filter_by_place(table, &place_filter)?;

    let Some(bounds) = date_bounds(&by_place)? else {
        return Ok(by_place);
    };
    let start = selection.start.unwrap_or(bounds.min);
    let end = selection.end.unwrap_or(bounds.max);

    filter_by_date_range(&by_place, start, end)
}

/// One user's view over the loaded feed.
///
/// Holds the immutable base table and the last view that passed validation. A rejected
/// selection leaves both the previous view and the previous selection in place.
pub struct ViewSession {
    base: Arc<EventTable>,
    regions: Arc<ContinentMap>,
    selection: FilterSelection,
    view: EventTable,
    rejection: Option<String>,
}

impl ViewSession {
    /// Starts with every continent and the full date range selected.
    pub fn new(base: Arc<EventTable>, regions: Arc<ContinentMap>) -> Result<Self> {
        let selection = FilterSelection::all(&regions);
        let view = apply_selection(&base, &regions, &selection)?;
        Ok(Self {
            base,
            regions,
            selection,
            view,
            rejection: None,
        })
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn view(&self) -> &EventTable {
        &self.view
    }

    pub fn regions(&self) -> &ContinentMap {
        &self.regions
    }

    /// User-facing text for the most recent rejected selection, cleared by the next
    /// accepted one.
    pub fn validation_message(&self) -> Option<&str> {
        self.rejection.as_deref()
    }

    /// Recomputes the view from the base table.
    pub fn update(&mut self, selection: FilterSelection) -> Result<&EventTable> {
        match apply_selection(&self.base, &self.regions, &selection) {
            Ok(view) => {
                info!(rows = view.height(), "filter selection applied");
                self.view = view;
                self.selection = selection;
                self.rejection = None;
                Ok(&self.view)
            }
            Err(err) if err.is_rejected_selection() => {
                warn!(error = %err, "filter selection rejected; keeping previous view");
                self.rejection = Some(err.to_string());
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Date limits for the pickers: the span of the base table narrowed to the current
    /// place selection.
    pub fn date_bounds(&self) -> Result<Option<DateBounds>> {
        let place_filter = self.selection.place_filter(&self.regions)?;
        let by_place = filter_by_place(&self.base, &place_filter)?;
        date_bounds(&by_place)
    }

    pub fn page(&self, page: Page) -> Result<PageViews> {
        compute_page(page, &self.view)
    }
}
