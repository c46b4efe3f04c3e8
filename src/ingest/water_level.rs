/// Holding tank depth log loader.
///
/// The log is written by hand from a dipstick reading, so dates and times
/// arrive in a few different shapes and the occasional row is garbage.
/// Rows with an unreadable timestamp or level are dropped and counted
/// rather than failing the run.

use crate::ingest::{file_label, open_csv, IngestStats};
use crate::logging::{self, Stage};
use crate::model::{Result, TankmonError, WaterReading};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::Path;

pub const COL_DATE: &str = "Date";
pub const COL_TIME: &str = "TimeOfDay";
pub const COL_LEVEL: &str = "WaterLevel_inches";

/// Accepted `Date TimeOfDay` shapes, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

#[derive(Debug, Deserialize)]
struct RawWaterRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "TimeOfDay")]
    time_of_day: String,
    #[serde(rename = "WaterLevel_inches", deserialize_with = "csv::invalid_option")]
    level_in: Option<f64>,
}

/// Parses the joined `Date` and `TimeOfDay` fields. Returns `None` when no
/// accepted format matches.
pub fn parse_timestamp(date: &str, time_of_day: &str) -> Option<NaiveDateTime> {
    let joined = format!("{} {}", date.trim(), time_of_day.trim());
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&joined, fmt).ok())
}

/// Loads every usable reading, sorted by timestamp.
pub fn load_water_levels(path: &Path) -> Result<(Vec<WaterReading>, IngestStats)> {
    let mut reader = open_csv(path, &[COL_DATE, COL_TIME, COL_LEVEL])?;
    let label = file_label(path);

    let mut readings = Vec::new();
    let mut stats = IngestStats::default();
    let mut bad_timestamps = 0usize;
    let mut bad_levels = 0usize;

    for (i, result) in reader.deserialize::<RawWaterRow>().enumerate() {
        stats.total += 1;
        let row = match result {
            Ok(row) => row,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(TankmonError::Csv {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                logging::debug(Stage::Water, Some(&label), &format!("row {} unreadable: {}", i + 2, e));
                continue;
            }
        };

        let Some(timestamp) = parse_timestamp(&row.date, &row.time_of_day) else {
            bad_timestamps += 1;
            logging::debug(
                Stage::Water,
                Some(&label),
                &format!("row {}: unparseable timestamp '{} {}'", i + 2, row.date, row.time_of_day),
            );
            continue;
        };

        let Some(level_in) = row.level_in.filter(|v| v.is_finite()) else {
            bad_levels += 1;
            continue;
        };

        readings.push(WaterReading { timestamp, level_in });
        stats.kept += 1;
    }

    if bad_timestamps > 0 {
        logging::warn(
            Stage::Water,
            Some(&label),
            &format!("{} rows dropped for unparseable timestamps", bad_timestamps),
        );
    }
    if bad_levels > 0 {
        logging::warn(
            Stage::Water,
            Some(&label),
            &format!("{} rows dropped for missing water level", bad_levels),
        );
    }
    logging::log_ingest_summary(Stage::Water, &label, stats.total, stats.kept);

    readings.sort_by_key(|r| r.timestamp);
    Ok((readings, stats))
}
