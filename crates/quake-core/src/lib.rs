pub mod error;
pub mod filters;
pub mod pages;
pub mod regions;
pub mod selection;
pub mod settings;
pub mod views;

pub use error::{Result, ViewError};
pub use filters::PlaceFilter;
pub use pages::{compute_page, HomeViews, Page, PageViews, SummaryViews};
pub use regions::ContinentMap;
pub use selection::{apply_selection, FilterSelection, ViewSession};
pub use settings::{Settings, SettingsError};
pub use views::DateBounds;
