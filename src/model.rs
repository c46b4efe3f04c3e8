/// Core data types for the drought-vs-tank-level chart.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O, only types and the crate error.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single depth reading from the holding tank log.
///
/// Depth is measured down from the top of the tank, so a larger value
/// means less water.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterReading {
    pub timestamp: NaiveDateTime,
    pub level_in: f64,
}

/// One calendar day of a resampled series. `None` marks a day with no readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyValue {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Contiguous day-by-day series, ascending, one entry per day.
///
/// Produced by `analysis::resample::daily_max`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySeries {
    pub days: Vec<DailyValue>,
}

/// One weekly row of the US Drought Monitor county export.
///
/// Percentages are cumulative: `d1` is the share of county area in D1 *or
/// worse*, so `d0 >= d1 >= ... >= d4` for a consistent row.
#[derive(Debug, Clone, PartialEq)]
pub struct DroughtRecord {
    pub valid_start: NaiveDate,
    pub d0: f64,
    pub d1: f64,
    pub d2: f64,
    pub d3: f64,
    pub d4: f64,
}

// ---------------------------------------------------------------------------
// Severity categories
// ---------------------------------------------------------------------------

/// US Drought Monitor severity, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeverityCategory {
    D0,
    D1,
    D2,
    D3,
    D4,
}

impl SeverityCategory {
    /// Stacking order, bottom band first. D4 sits on the axis so the most
    /// severe drought is always visible.
    pub const PLOT_ORDER: [SeverityCategory; 5] = [
        SeverityCategory::D4,
        SeverityCategory::D3,
        SeverityCategory::D2,
        SeverityCategory::D1,
        SeverityCategory::D0,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SeverityCategory::D0 => "D0",
            SeverityCategory::D1 => "D1",
            SeverityCategory::D2 => "D2",
            SeverityCategory::D3 => "D3",
            SeverityCategory::D4 => "D4",
        }
    }
}

impl fmt::Display for SeverityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Exclusive (non-overlapping) band percentages for one drought week,
/// indexed in `SeverityCategory::PLOT_ORDER`.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedDrought {
    pub date: NaiveDate,
    pub bands: [f64; 5],
}

/// A manual tank fill, annotated with a marker on the chart.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct FillEvent {
    pub date: NaiveDate,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise while loading, transforming or rendering.
#[derive(Debug, Error)]
pub enum TankmonError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("missing column '{column}' in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("malformed date '{value}' in {} (row {row})", path.display())]
    MalformedDate {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("tank log has no days between {start} and {end}")]
    EmptyWaterWindow { start: NaiveDate, end: NaiveDate },

    #[error("image error on {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, TankmonError>;
