//! Daily resampling of the tank log.
//!
//! Several dipstick readings on one day collapse to the day's maximum depth
//! (the lowest water seen). Days with no reading are kept as gaps so the
//! series stays contiguous, then filled by interpolation for plotting.

use crate::model::{DailySeries, DailyValue, DroughtRecord, WaterReading};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Groups readings by calendar day and keeps the maximum level.
///
/// The result covers every day from the first to the last reading,
/// with `None` on days without readings. Input order does not matter.
pub fn daily_max(readings: &[WaterReading]) -> DailySeries {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for reading in readings {
        by_day
            .entry(reading.timestamp.date())
            .and_modify(|max| *max = max.max(reading.level_in))
            .or_insert(reading.level_in);
    }

    let (Some(&first), Some(&last)) = (by_day.keys().next(), by_day.keys().next_back()) else {
        return DailySeries::default();
    };

    let days = first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|date| DailyValue {
            date,
            value: by_day.get(&date).copied(),
        })
        .collect();

    DailySeries { days }
}

/// Keeps drought records whose `valid_start` falls in `[start, end]`.
pub fn window_drought(records: &[DroughtRecord], start: NaiveDate, end: NaiveDate) -> Vec<DroughtRecord> {
    records
        .iter()
        .filter(|r| r.valid_start >= start && r.valid_start <= end)
        .cloned()
        .collect()
}

impl DailySeries {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|d| d.date)
    }

    /// Number of days holding a value.
    pub fn known_count(&self) -> usize {
        self.days.iter().filter(|d| d.value.is_some()).count()
    }

    /// Days in `[start, end]`, inclusive.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> DailySeries {
        DailySeries {
            days: self
                .days
                .iter()
                .filter(|d| d.date >= start && d.date <= end)
                .copied()
                .collect(),
        }
    }

    /// Fills gaps by linear interpolation in time.
    ///
    /// Interior gaps are interpolated between the neighbouring known days;
    /// trailing gaps repeat the last known value; leading gaps (before the
    /// first known value) stay empty.
    pub fn interpolate_time(&self) -> DailySeries {
        let mut days = self.days.clone();
        let mut prev: Option<(NaiveDate, f64)> = None;

        let mut i = 0;
        while i < days.len() {
            let Some(value) = days[i].value else {
                i += 1;
                continue;
            };
            let here = (days[i].date, value);

            if let Some((prev_date, prev_value)) = prev {
                let span = (here.0 - prev_date).num_days() as f64;
                for day in days.iter_mut().take(i).rev().take_while(|d| d.value.is_none()) {
                    let t = (day.date - prev_date).num_days() as f64 / span;
                    day.value = Some(prev_value + (here.1 - prev_value) * t);
                }
            }

            prev = Some(here);
            i += 1;
        }

        if let Some((_, last_value)) = prev {
            for day in days.iter_mut().rev().take_while(|d| d.value.is_none()) {
                day.value = Some(last_value);
            }
        }

        DailySeries { days }
    }

    /// Known `(date, value)` pairs, in order.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.days.iter().filter_map(|d| d.value.map(|v| (d.date, v)))
    }

    /// Smallest and largest known value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.points().fold(None, |acc, (_, v)| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}
