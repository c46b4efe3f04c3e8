/// Data shaping between ingest and the chart.
///
/// Submodules:
/// - `resample`: daily max, date windows and gap interpolation
/// - `stack`: cumulative USDM percentages to exclusive bands
/// - `calendar`: month ticks and year boundaries for the x axis

pub mod calendar;
pub mod resample;
pub mod stack;
