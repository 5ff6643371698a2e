use quake_core::{ContinentMap, ViewError};

#[test]
fn builtin_map_keeps_curated_order() {
    let map = ContinentMap::builtin().expect("builtin map should parse");
    assert_eq!(
        map.continents(),
        vec![
            "Africa",
            "Antarctica",
            "Asia",
            "Australia",
            "Europe",
            "North America",
            "South America",
            "Oceania",
            "Polar regions",
        ]
    );
    assert_eq!(map.regions_of("Antarctica"), Some(&[][..]));
    assert!(map.regions_of("Atlantis").is_none());
}

#[test]
fn resolve_regions_takes_the_union() {
    let map = ContinentMap::builtin().unwrap();
    let regions = map.resolve_regions(&["Asia", "Europe"]).unwrap();

    assert!(regions.contains("Japan"));
    assert!(regions.contains("Greece"));
    assert!(regions.contains("Cyprus"));
    assert!(!regions.contains("California"));

    let asia = map.regions_of("Asia").unwrap().len();
    let europe = map.regions_of("Europe").unwrap().len();
    // Cyprus is listed under both
    assert_eq!(regions.len(), asia + europe - 1);
}

#[test]
fn empty_selection_resolves_to_no_regions() {
    let map = ContinentMap::builtin().unwrap();
    let regions = map.resolve_regions::<&str>(&[]).unwrap();
    assert!(regions.is_empty());
}

#[test]
fn unknown_continent_is_rejected() {
    let map = ContinentMap::builtin().unwrap();
    match map.resolve_regions(&["Asia", "Atlantis"]) {
        Err(ViewError::InvalidSelection(name)) => assert_eq!(name, "Atlantis"),
        other => panic!("expected InvalidSelection, got {other:?}"),
    }
}

#[test]
fn names_match_case_sensitively() {
    let map = ContinentMap::builtin().unwrap();
    assert!(map.resolve_regions(&["asia"]).is_err());
    let regions = map.resolve_regions(&["Asia"]).unwrap();
    assert!(!regions.contains("japan"));
}

#[test]
fn places_can_belong_to_several_continents() {
    let map = ContinentMap::builtin().unwrap();
    assert_eq!(map.continents_of("Cyprus"), vec!["Asia", "Europe"]);
    assert_eq!(map.continents_of("Papua New Guinea"), vec!["Asia", "Oceania"]);
    assert_eq!(map.continents_of("Tokyo"), Vec::<&str>::new());
}

#[test]
fn custom_map_from_toml() {
    let map = ContinentMap::from_toml_str(
        r#"
        [[continent]]
        name = "Ring of Fire"
        regions = ["Japan", "Chile"]

        [[continent]]
        name = "Quiet"
        "#,
    )
    .expect("custom map should parse");

    assert_eq!(map.continents(), vec!["Ring of Fire", "Quiet"]);
    assert_eq!(map.regions_of("Quiet"), Some(&[][..]));
    assert!(map.contains("Ring of Fire"));
}

#[test]
fn continent_names_are_trimmed() {
    let map = ContinentMap::from_toml_str(
        r#"
        [[continent]]
        name = " Asia "
        regions = ["Japan"]
        "#,
    )
    .unwrap();
    assert_eq!(map.continents(), vec!["Asia"]);
    assert!(map.resolve_regions(&["Asia"]).unwrap().contains("Japan"));

    let err = ContinentMap::from_toml_str(
        r#"
        [[continent]]
        name = "Asia"

        [[continent]]
        name = "Asia  "
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ViewError::Regions(_)));
}

#[test]
fn duplicate_continents_are_rejected() {
    let err = ContinentMap::from_toml_str(
        r#"
        [[continent]]
        name = "Asia"
        regions = ["Japan"]

        [[continent]]
        name = "Asia"
        regions = ["China"]
        "#,
    )
    .expect_err("duplicate continent should fail");
    assert!(matches!(err, ViewError::Regions(_)));
}

#[test]
fn malformed_toml_is_reported() {
    let err = ContinentMap::from_toml_str("[[continent]\nname = ")
        .expect_err("malformed toml should fail");
    assert!(matches!(err, ViewError::RegionsToml(_)));
}
