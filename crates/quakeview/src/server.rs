use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use quake_core::views::date_bounds;
use quake_core::{apply_selection, compute_page, DateBounds, FilterSelection, Page, PageViews, ViewError};
use quake_feed::{columns, Event, EventTable, FeedError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::app::AppState;

/// Filter parameters shared by every view endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    /// Comma-separated continent names; absent means all continents.
    pub continents: Option<String>,
    pub place: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ViewQuery {
    fn selection(&self, state: &AppState) -> FilterSelection {
        let base = match &self.continents {
            None => FilterSelection::all(&state.regions),
            Some(list) => FilterSelection::default().with_continents(
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty()),
            ),
        };
        let base = match self.place.as_deref().map(str::trim) {
            Some(place) if !place.is_empty() => base.with_single_place(place),
            _ => base,
        };
        base.with_dates(self.start, self.end)
    }
}

pub enum ApiError {
    Load(FeedError),
    View(ViewError),
    NotFound(String),
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        ApiError::Load(err)
    }
}

impl From<ViewError> for ApiError {
    fn from(err: ViewError) -> Self {
        ApiError::View(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Load(err) => {
                error!("feed load failed: {err}");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            ApiError::View(err) if err.is_rejected_selection() => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            ApiError::View(err) => {
                error!("view computation failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/continents", get(continents))
        .route("/meta", get(meta))
        .route("/table", get(table))
        .route("/views/{page}", get(views))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<()> {
    // fail fast on an unreachable feed instead of on the first request
    let loaded = state.loader.load().await?;
    info!(
        origin = %loaded.report.origin,
        rows = loaded.table.height(),
        "feed loaded"
    );

    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state).into_make_service()).await?;
    Ok(())
}

async fn filtered(state: &AppState, query: &ViewQuery) -> Result<EventTable, ApiError> {
    let loaded = state.loader.load().await?;
    let selection = query.selection(state);
    Ok(apply_selection(&loaded.table, &state.regions, &selection)?)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
struct ContinentEntry<'a> {
    name: &'a str,
    regions: &'a [String],
}

async fn continents(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let entries: Vec<ContinentEntry<'_>> = state
        .regions
        .continents()
        .into_iter()
        .map(|name| ContinentEntry {
            name,
            regions: state.regions.regions_of(name).unwrap_or_default(),
        })
        .collect();
    Json(json!(entries))
}

#[derive(Debug, Serialize)]
struct Meta {
    origin: String,
    total_rows: usize,
    loaded_rows: usize,
    dropped_rows: usize,
    continents: Vec<String>,
    places: Vec<String>,
    date_bounds: Option<DateBounds>,
}

async fn meta(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<Meta> {
    let loaded = state.loader.load().await?;

    let places: BTreeSet<String> = loaded
        .table
        .str_column(columns::PLACE)
        .map_err(ViewError::from)?
        .into_iter()
        .flatten()
        .collect();

    // picker bounds come from the place selection only
    let selection = query.selection(&state).with_dates(None, None);
    let by_place = apply_selection(&loaded.table, &state.regions, &selection)?;

    Ok(Json(Meta {
        origin: loaded.report.origin.clone(),
        total_rows: loaded.report.total_rows,
        loaded_rows: loaded.table.height(),
        dropped_rows: loaded.report.dropped_rows(),
        continents: state
            .regions
            .continents()
            .into_iter()
            .map(str::to_string)
            .collect(),
        places: places.into_iter().collect(),
        date_bounds: date_bounds(&by_place)?,
    }))
}

async fn table(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<Vec<Event>> {
    let view = filtered(&state, &query).await?;
    Ok(Json(view.events().map_err(ViewError::from)?))
}

async fn views(
    State(state): State<Arc<AppState>>,
    Path(page): Path<String>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<PageViews> {
    let page: Page = page.parse().map_err(ApiError::NotFound)?;
    let view = filtered(&state, &query).await?;
    Ok(Json(compute_page(page, &view)?))
}
