use chrono::{DateTime, NaiveDateTime, Utc};
use csv::StringRecord;
use tracing::{info, warn};

use crate::errors::{FeedError, RowRejection};
use crate::model::{Event, EventTable};
use crate::normalize::normalize_place;

/// Diagnostics collected while decoding one feed body.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Where the body came from (URL or path).
    pub origin: String,
    /// blake3 hex digest of the raw body.
    pub content_hash: String,
    pub total_rows: usize,
    pub kept_rows: usize,
    pub rejections: Vec<RowRejection>,
}

impl LoadReport {
    pub fn dropped_rows(&self) -> usize {
        self.rejections.len()
    }
}

#[derive(Debug, Clone)]
pub struct DecodedFeed {
    pub table: EventTable,
    pub report: LoadReport,
}

/// Header positions of the feed columns the pipeline keeps. Everything else in the
/// feed (magType, nst, gap, dmin, rms, net, id, error margins, sources) is ignored.
#[derive(Debug, Clone, Copy)]
struct FeedColumns {
    time: usize,
    latitude: usize,
    longitude: usize,
    depth: usize,
    magnitude: usize,
    place: usize,
    event_type: usize,
}

impl FeedColumns {
    fn locate(headers: &StringRecord) -> Result<Self, FeedError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or(FeedError::MissingColumn(name))
        };

        Ok(Self {
            time: find("time")?,
            latitude: find("latitude")?,
            longitude: find("longitude")?,
            depth: find("depth")?,
            magnitude: find("mag")?,
            place: find("place")?,
            event_type: find("type")?,
        })
    }

    fn width(&self) -> usize {
        [
            self.time,
            self.latitude,
            self.longitude,
            self.depth,
            self.magnitude,
            self.place,
            self.event_type,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

/// Decodes a CSV feed body into the canonical event table.
///
/// Rows that cannot be decoded are dropped and recorded in the report; a missing
/// required header column fails the whole decode. The result is sorted by `place`
/// with ties kept in feed order.
pub fn decode_feed(origin: &str, content: &str) -> Result<DecodedFeed, FeedError> {
    if content.trim().is_empty() {
        return Err(FeedError::EmptyFeed);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let feed_columns = FeedColumns::locate(&headers)?;

    let mut events = Vec::new();
    let mut rejections = Vec::new();
    let mut total_rows = 0usize;

    for (row_idx, record) in reader.records().enumerate() {
        total_rows += 1;
        // header occupies line 1
        let fallback_line = row_idx as u64 + 2;

        let record = match record {
            Ok(record) => record,
            Err(err) => {
                let line = err
                    .position()
                    .map(|pos| pos.line())
                    .unwrap_or(fallback_line);
                rejections.push(RowRejection::new(line, format!("unreadable row: {err}")));
                continue;
            }
        };
        let line = record
            .position()
            .map(|pos| pos.line())
            .unwrap_or(fallback_line);

        match decode_row(&record, &feed_columns) {
            Ok(event) => events.push(event),
            Err(reason) => rejections.push(RowRejection::new(line, reason)),
        }
    }

    for rejection in &rejections {
        warn!(origin, line = rejection.line, reason = %rejection.reason, "dropped feed row");
    }

    events.sort_by(|a, b| a.place.cmp(&b.place));
    let table = EventTable::from_events(&events)?;

    let report = LoadReport {
        origin: origin.to_string(),
        content_hash: blake3::hash(content.as_bytes()).to_hex().to_string(),
        total_rows,
        kept_rows: events.len(),
        rejections,
    };

    info!(
        origin,
        total_rows = report.total_rows,
        kept_rows = report.kept_rows,
        dropped_rows = report.dropped_rows(),
        "decoded earthquake feed"
    );

    Ok(DecodedFeed { table, report })
}

fn decode_row(record: &StringRecord, cols: &FeedColumns) -> Result<Event, String> {
    if record.len() < cols.width() {
        return Err(format!(
            "expected at least {} fields but found {}",
            cols.width(),
            record.len()
        ));
    }

    let field = |idx: usize| record.get(idx).unwrap_or("");

    let occurred_at = parse_timestamp(field(cols.time))?;
    let latitude = parse_required_f64(field(cols.latitude), "latitude")?;
    let longitude = parse_required_f64(field(cols.longitude), "longitude")?;
    let depth = parse_optional_f64(field(cols.depth), "depth")?;
    let magnitude = parse_optional_f64(field(cols.magnitude), "mag")?;
    let place_raw = field(cols.place).trim().to_string();
    let place = normalize_place(&place_raw);
    let event_type = field(cols.event_type).trim().to_string();

    Ok(Event {
        occurred_at,
        latitude,
        longitude,
        depth,
        magnitude,
        place_raw,
        place,
        event_type,
    })
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    static NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ];
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("missing time".to_string());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt.and_utc());
        }
    }
    Err(format!("invalid timestamp '{trimmed}'"))
}

fn parse_required_f64(value: &str, column: &str) -> Result<f64, String> {
    parse_optional_f64(value, column)?.ok_or_else(|| format!("missing {column}"))
}

pub(crate) fn parse_optional_f64(value: &str, column: &str) -> Result<Option<f64>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(Some(parsed)),
        Ok(_) => Err(format!("column '{column}' is not finite: '{trimmed}'")),
        Err(err) => Err(format!(
            "failed to parse column '{column}' as float: {err}"
        )),
    }
}
