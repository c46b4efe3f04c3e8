/// US Drought Monitor county export loader.
///
/// The USDM "comprehensive statistics" CSV has one row per week with
/// cumulative area percentages per category (`D1` includes `D2`..`D4`).
/// Unlike the tank log, a bad `ValidStart` is fatal: the export is machine
/// generated, so an unreadable date means the wrong file was supplied.

use crate::ingest::{file_label, open_csv, IngestStats};
use crate::logging::{self, Stage};
use crate::model::{DroughtRecord, Result, TankmonError};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::path::Path;

pub const COL_VALID_START: &str = "ValidStart";
pub const SEVERITY_COLUMNS: [&str; 5] = ["D0", "D1", "D2", "D3", "D4"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Deserialize)]
struct RawDroughtRow {
    #[serde(rename = "ValidStart")]
    valid_start: String,
    #[serde(rename = "D0", default, deserialize_with = "csv::invalid_option")]
    d0: Option<f64>,
    #[serde(rename = "D1", default, deserialize_with = "csv::invalid_option")]
    d1: Option<f64>,
    #[serde(rename = "D2", default, deserialize_with = "csv::invalid_option")]
    d2: Option<f64>,
    #[serde(rename = "D3", default, deserialize_with = "csv::invalid_option")]
    d3: Option<f64>,
    #[serde(rename = "D4", default, deserialize_with = "csv::invalid_option")]
    d4: Option<f64>,
}

/// Parses a `ValidStart` value. Date-times keep only their date.
pub fn parse_valid_start(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Missing percentages count as 0; everything is clipped to [0, 100].
fn clean_percent(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0),
        _ => 0.0,
    }
}

/// Loads every weekly record, sorted by `valid_start`.
pub fn load_drought(path: &Path) -> Result<(Vec<DroughtRecord>, IngestStats)> {
    let mut required = vec![COL_VALID_START];
    required.extend_from_slice(&SEVERITY_COLUMNS);
    let mut reader = open_csv(path, &required)?;
    let label = file_label(path);

    let mut records = Vec::new();
    let mut stats = IngestStats::default();

    for (i, result) in reader.deserialize::<RawDroughtRow>().enumerate() {
        // Header is line 1.
        let line = i + 2;
        stats.total += 1;

        let row = result.map_err(|source| TankmonError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let valid_start =
            parse_valid_start(&row.valid_start).ok_or_else(|| TankmonError::MalformedDate {
                path: path.to_path_buf(),
                row: line,
                value: row.valid_start.clone(),
            })?;

        records.push(DroughtRecord {
            valid_start,
            d0: clean_percent(row.d0),
            d1: clean_percent(row.d1),
            d2: clean_percent(row.d2),
            d3: clean_percent(row.d3),
            d4: clean_percent(row.d4),
        });
        stats.kept += 1;
    }

    logging::log_ingest_summary(Stage::Drought, &label, stats.total, stats.kept);

    records.sort_by_key(|r| r.valid_start);
    Ok((records, stats))
}
