use comfy_table::{presets::UTF8_FULL, Table};
use quake_core::ContinentMap;
use quake_feed::LoadReport;

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table
}

pub fn continents_table(regions: &ContinentMap) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Continent", "Regions", "Members"]);
    for name in regions.continents() {
        let members = regions.regions_of(name).unwrap_or_default();
        table.add_row(vec![
            name.to_string(),
            members.len().to_string(),
            members.join(", "),
        ]);
    }
    table
}

pub fn load_table(report: &LoadReport) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["origin".to_string(), report.origin.clone()]);
    table.add_row(vec!["blake3".to_string(), report.content_hash.clone()]);
    table.add_row(vec!["rows read".to_string(), report.total_rows.to_string()]);
    table.add_row(vec!["rows kept".to_string(), report.kept_rows.to_string()]);
    table.add_row(vec!["rows dropped".to_string(), report.dropped_rows().to_string()]);
    table
}

/// `None` when nothing was dropped.
pub fn rejections_table(report: &LoadReport) -> Option<Table> {
    if report.rejections.is_empty() {
        return None;
    }
    let mut table = new_table();
    table.set_header(vec!["Line", "Reason"]);
    for rejection in &report.rejections {
        table.add_row(vec![rejection.line.to_string(), rejection.reason.clone()]);
    }
    Some(table)
}

#[cfg(test)]
mod tests {
    use quake_feed::RowRejection;

    use super::*;

    fn report(rejections: Vec<RowRejection>) -> LoadReport {
        LoadReport {
            origin: "memory://feed".to_string(),
            content_hash: "abc".to_string(),
            total_rows: 3,
            kept_rows: 3 - rejections.len(),
            rejections,
        }
    }

    #[test]
    fn clean_load_has_no_rejection_table() {
        let report = report(Vec::new());
        assert!(rejections_table(&report).is_none());
        let rendered = load_table(&report).to_string();
        assert!(rendered.contains("memory://feed"));
    }

    #[test]
    fn rejections_are_listed_by_line() {
        let report = report(vec![RowRejection::new(
            7,
            "invalid timestamp 'not-a-time'",
        )]);
        let rendered = rejections_table(&report).unwrap().to_string();
        assert!(rendered.contains("not-a-time"));
        assert!(rendered.contains('7'));
    }

    #[test]
    fn continents_keep_curated_order() {
        let map = ContinentMap::builtin().unwrap();
        let rendered = continents_table(&map).to_string();
        let africa = rendered.find("Africa").unwrap();
        let polar = rendered.find("Polar regions").unwrap();
        assert!(africa < polar);
    }
}
