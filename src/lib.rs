//! tankmon: overlays holding tank water level on US Drought Monitor
//! severity for one county and renders the result as a PNG.

pub mod analysis;
pub mod chart;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod pipeline;

pub use config::PlotConfig;
pub use model::{Result, TankmonError};
pub use pipeline::{run, RunSummary};
