use std::collections::BTreeSet;

use chrono::{NaiveDate, TimeZone, Utc};
use quake_core::filters::{by_type, filter_by_date_range, filter_by_place, magnitude_at_least};
use quake_core::{ContinentMap, PlaceFilter, ViewError};
use quake_feed::{normalize_place, Event, EventTable};

fn event(day: u32, hms: (u32, u32, u32), place_raw: &str, magnitude: Option<f64>, kind: &str) -> Event {
    Event {
        occurred_at: Utc
            .with_ymd_and_hms(2023, 6, day, hms.0, hms.1, hms.2)
            .unwrap(),
        latitude: 10.0,
        longitude: 20.0,
        depth: Some(5.0),
        magnitude,
        place_raw: place_raw.to_string(),
        place: normalize_place(place_raw),
        event_type: kind.to_string(),
    }
}

fn sample_table() -> EventTable {
    EventTable::from_events(&[
        event(1, (0, 0, 0), "1km N of Anchorage, Alaska", Some(2.0), "earthquake"),
        event(2, (12, 0, 0), "3km S of Irwindale, California", Some(1.0), "quarry blast"),
        event(3, (23, 59, 59), "5km E of Tokyo, Japan", Some(0.999), "earthquake"),
        event(4, (8, 30, 0), "Tonga", None, "earthquake"),
        event(5, (1, 0, 0), "10km W of Athens, Greece", Some(4.2), "explosion"),
    ])
    .unwrap()
}

fn places(table: &EventTable) -> Vec<String> {
    table
        .events()
        .unwrap()
        .into_iter()
        .map(|event| event.place)
        .collect()
}

fn regions(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn place_filter_keeps_member_rows_in_order() {
    let table = sample_table();
    let filtered =
        filter_by_place(&table, &PlaceFilter::Regions(regions(&["Tonga", "Alaska"]))).unwrap();
    assert_eq!(places(&filtered), vec!["Alaska", "Tonga"]);
}

#[test]
fn single_place_filter() {
    let table = sample_table();
    let filtered = filter_by_place(&table, &PlaceFilter::Single("Japan".to_string())).unwrap();
    assert_eq!(places(&filtered), vec!["Japan"]);
}

#[test]
fn place_filter_is_monotone_in_the_region_set() {
    let table = sample_table();
    let small = regions(&["Alaska"]);
    let large = regions(&["Alaska", "Greece", "Japan"]);

    let from_small = filter_by_place(&table, &PlaceFilter::Regions(small)).unwrap();
    let from_large = filter_by_place(&table, &PlaceFilter::Regions(large)).unwrap();

    let large_rows = from_large.events().unwrap();
    for row in from_small.events().unwrap() {
        assert!(large_rows.contains(&row), "{row:?} missing from larger selection");
    }
    assert!(from_small.height() <= from_large.height());
}

#[test]
fn empty_region_set_yields_empty_table() {
    let table = sample_table();
    let filtered = filter_by_place(&table, &PlaceFilter::Regions(BTreeSet::new())).unwrap();
    assert!(filtered.is_empty());
}

#[test]
fn date_range_bounds_are_inclusive() {
    let table = sample_table();
    let start = NaiveDate::from_ymd_opt(2023, 6, 2).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 6, 3).unwrap();

    let filtered = filter_by_date_range(&table, start, end).unwrap();
    // June 2nd at noon and June 3rd at 23:59:59 are in, June 1st and 4th are out
    assert_eq!(places(&filtered), vec!["California", "Japan"]);
}

#[test]
fn single_day_range() {
    let table = sample_table();
    let day = NaiveDate::from_ymd_opt(2023, 6, 4).unwrap();
    let filtered = filter_by_date_range(&table, day, day).unwrap();
    assert_eq!(places(&filtered), vec!["Tonga"]);
}

#[test]
fn reversed_date_range_is_rejected() {
    let table = sample_table();
    let start = NaiveDate::from_ymd_opt(2023, 6, 10).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();

    match filter_by_date_range(&table, start, end) {
        Err(ViewError::InvalidDateRange { start: s, end: e }) => {
            assert_eq!(s, start);
            assert_eq!(e, end);
        }
        other => panic!("expected InvalidDateRange, got {other:?}"),
    }
}

#[test]
fn magnitude_threshold_is_exact() {
    let table = sample_table();
    let filtered = magnitude_at_least(&table, 1.0).unwrap();
    // 0.999 and the null magnitude are excluded, 1.0 is included
    assert_eq!(places(&filtered), vec!["Alaska", "California", "Greece"]);
}

#[test]
fn by_type_matches_exactly() {
    let table = sample_table();
    assert_eq!(places(&by_type(&table, "earthquake").unwrap()), vec!["Alaska", "Japan", "Tonga"]);
    assert_eq!(places(&by_type(&table, "quarry blast").unwrap()), vec!["California"]);
    assert!(by_type(&table, "Earthquake").unwrap().is_empty());
}

#[test]
fn filters_leave_the_source_table_untouched() {
    let table = sample_table();
    let before = table.events().unwrap();
    let _ = magnitude_at_least(&table, 3.0).unwrap();
    let _ = by_type(&table, "explosion").unwrap();
    assert_eq!(table.events().unwrap(), before);
}

#[test]
fn continent_selection_end_to_end() {
    let map = ContinentMap::from_toml_str(
        r#"
        [[continent]]
        name = "North America"
        regions = ["California"]

        [[continent]]
        name = "Asia"
        regions = ["Tokyo"]

        [[continent]]
        name = "Europe"
        regions = ["Paris"]
        "#,
    )
    .unwrap();
    let table = EventTable::from_events(&[
        event(1, (0, 0, 0), "California", Some(2.0), "earthquake"),
        event(1, (1, 0, 0), "Tokyo", Some(2.0), "earthquake"),
        event(1, (2, 0, 0), "Paris", Some(2.0), "earthquake"),
    ])
    .unwrap();

    let regions = map.resolve_regions(&["Asia"]).unwrap();
    let filtered = filter_by_place(&table, &PlaceFilter::Regions(regions)).unwrap();

    assert_eq!(places(&filtered), vec!["Tokyo"]);
}
