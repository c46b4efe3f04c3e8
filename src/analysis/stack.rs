//! Drought band derivation.
//!
//! USDM percentages overlap (D1 area is also counted in D0), so stacking
//! them directly would double count. Each band here is the area in exactly
//! that category.

use crate::model::{DroughtRecord, StackedDrought};

/// Exclusive bands for one week, in plot order (D4-only first).
///
/// A negative difference can only come from an inconsistent source row;
/// it is floored at zero so bands never overlap downward.
pub fn stack_record(record: &DroughtRecord) -> StackedDrought {
    let only = |outer: f64, inner: f64| (outer - inner).max(0.0);
    StackedDrought {
        date: record.valid_start,
        bands: [
            record.d4,
            only(record.d3, record.d4),
            only(record.d2, record.d3),
            only(record.d1, record.d2),
            only(record.d0, record.d1),
        ],
    }
}

pub fn stack_all(records: &[DroughtRecord]) -> Vec<StackedDrought> {
    records.iter().map(stack_record).collect()
}

impl StackedDrought {
    /// Running band tops from the axis up; the last entry is the total
    /// area in any drought category.
    pub fn cumulative_tops(&self) -> [f64; 5] {
        let mut tops = [0.0; 5];
        let mut running = 0.0;
        for (top, band) in tops.iter_mut().zip(self.bands) {
            running += band;
            *top = running;
        }
        tops
    }
}
