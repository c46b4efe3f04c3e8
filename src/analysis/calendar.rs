//! X-axis calendar helpers.

use chrono::{Datelike, NaiveDate};

/// First-of-month dates within `[start, end]`.
pub fn month_starts(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut cursor = NaiveDate::from_ymd_opt(start.year(), start.month(), 1);
    while let Some(month) = cursor {
        if month > end {
            break;
        }
        if month >= start {
            out.push(month);
        }
        cursor = month.checked_add_months(chrono::Months::new(1));
    }
    out
}

/// January 1st dates within `[start, end]`.
pub fn year_starts(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    (start.year()..=end.year())
        .filter_map(|y| NaiveDate::from_ymd_opt(y, 1, 1))
        .filter(|d| *d >= start && *d <= end)
        .collect()
}

/// Two-line tick label: abbreviated month over the year.
pub fn month_tick_label(date: NaiveDate) -> (String, String) {
    (date.format("%b").to_string(), date.format("%Y").to_string())
}
