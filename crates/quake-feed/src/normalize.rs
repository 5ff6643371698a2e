/// Strips the leading `"<qualifier>, "` from a feed place description.
///
/// Only the first comma is a split point, so `"10km SE of X, Y, Chile"` becomes
/// `"Y, Chile"`. The continent map is curated against exactly this behavior.
pub fn normalize_place(raw: &str) -> String {
    match raw.split_once(',') {
        Some((_, rest)) => rest.trim_start().to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_place;

    #[test]
    fn strips_distance_qualifier() {
        assert_eq!(normalize_place("10km SE of Somewhere, Japan"), "Japan");
        assert_eq!(normalize_place("5 km W of Athens,Greece"), "Greece");
    }

    #[test]
    fn leaves_plain_region_untouched() {
        assert_eq!(normalize_place("Tonga"), "Tonga");
        assert_eq!(normalize_place(""), "");
    }

    #[test]
    fn splits_on_first_comma_only() {
        assert_eq!(normalize_place("10km SE of X, Y, Chile"), "Y, Chile");
    }

    #[test]
    fn single_comma_places_are_stable_under_renormalization() {
        for raw in [
            "12km SE of Coso Junction, California",
            "Fiji region",
            "south of the Fiji Islands, Fiji",
            "Leading comma,   Alaska",
        ] {
            let once = normalize_place(raw);
            assert_eq!(normalize_place(&once), once, "input {raw:?}");
        }
    }
}
