//! Data-to-pixel mapping for the two y axes and the shared date axis.

use chrono::NaiveDate;

/// Plot rectangle in pixels, edges inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotArea {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl PlotArea {
    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> (i64, i64) {
        ((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }
}

/// Linear date axis. Dates are measured in whole days from `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateAxis {
    pub start: NaiveDate,
    pub end: NaiveDate,
    left: i64,
    right: i64,
}

impl DateAxis {
    pub fn new(start: NaiveDate, end: NaiveDate, left: i64, right: i64) -> Self {
        Self {
            start,
            end,
            left,
            right,
        }
    }

    fn span_days(&self) -> f64 {
        ((self.end - self.start).num_days() as f64).max(1.0)
    }

    /// Days after `start`, as a float.
    pub fn offset(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64
    }

    pub fn x_at(&self, days: f64) -> i64 {
        let frac = days / self.span_days();
        self.left + (frac * (self.right - self.left) as f64).round() as i64
    }

    pub fn x(&self, date: NaiveDate) -> i64 {
        self.x_at(self.offset(date))
    }

    /// Inverse of `x_at`.
    pub fn days_at(&self, px: i64) -> f64 {
        let width = ((self.right - self.left) as f64).max(1.0);
        (px - self.left) as f64 / width * self.span_days()
    }
}

/// Linear value axis mapping `lo` to pixel `px_lo` and `hi` to `px_hi`.
/// Swapping the pixel ends inverts the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueAxis {
    pub lo: f64,
    pub hi: f64,
    px_lo: i64,
    px_hi: i64,
}

impl ValueAxis {
    pub fn new(lo: f64, hi: f64, px_lo: i64, px_hi: i64) -> Self {
        Self { lo, hi, px_lo, px_hi }
    }

    /// Axis over the data range `[lo, hi]` padded by `margin` of the range
    /// on each side. A degenerate range is widened by one unit.
    pub fn padded(lo: f64, hi: f64, margin: f64, px_lo: i64, px_hi: i64) -> Self {
        let pad = if hi > lo { (hi - lo) * margin } else { 1.0 };
        Self::new(lo - pad, hi + pad, px_lo, px_hi)
    }

    pub fn y(&self, value: f64) -> i64 {
        let frac = (value - self.lo) / (self.hi - self.lo);
        self.px_lo + (frac * (self.px_hi - self.px_lo) as f64).round() as i64
    }

    /// Tick values at multiples of `step` inside the axis range.
    pub fn ticks(&self, step: f64) -> Vec<f64> {
        if !(step > 0.0) {
            return Vec::new();
        }
        let first = (self.lo / step).ceil() as i64;
        let last = (self.hi / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// A 1/2/5 × 10ⁿ step giving roughly `target` ticks over `range`.
pub fn nice_step(range: f64, target: usize) -> f64 {
    if !(range > 0.0) || target == 0 {
        return 1.0;
    }
    let raw = range / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let norm = raw / magnitude;
    let nice = if norm < 1.5 {
        1.0
    } else if norm < 3.0 {
        2.0
    } else if norm < 7.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}
