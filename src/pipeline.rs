//! The whole run, start to finish.
//!
//! load water → daily max → load drought → window both → stack →
//! interpolate → render → save. Each step logs what it kept.

use crate::analysis::resample::{daily_max, window_drought};
use crate::analysis::stack::stack_all;
use crate::chart::{render_chart, save_png, ChartData};
use crate::config::PlotConfig;
use crate::ingest::drought::load_drought;
use crate::ingest::water_level::load_water_levels;
use crate::ingest::IngestStats;
use crate::logging::{self, Stage};
use crate::model::{Result, TankmonError};
use std::path::PathBuf;

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub water: IngestStats,
    pub drought: IngestStats,
    /// Days of tank data inside the window.
    pub water_days: usize,
    /// Drought weeks inside the window.
    pub drought_weeks: usize,
    pub image_size: (u32, u32),
}

pub fn run(config: &PlotConfig) -> Result<RunSummary> {
    config.validate()?;
    let (start, end) = (config.window.start, config.window.end);
    logging::debug(Stage::Config, None, &format!("window {} .. {}", start, end));

    // Tank depth, one value per day.
    let (readings, water_stats) = load_water_levels(&config.inputs.water_level_csv)?;
    let daily = daily_max(&readings).window(start, end);
    // A window inside a logging gap still has days, just no values.
    if daily.is_empty() {
        return Err(TankmonError::EmptyWaterWindow { start, end });
    }
    if daily.known_count() == 0 {
        logging::warn(
            Stage::Water,
            None,
            &format!("{} days in window but no readings; chart will have no water line", daily.len()),
        );
    } else {
        logging::info(
            Stage::Water,
            None,
            &format!("{} days in window, {} with readings", daily.len(), daily.known_count()),
        );
    }

    // Drought bands.
    let (records, drought_stats) = load_drought(&config.inputs.drought_csv)?;
    let records = window_drought(&records, start, end);
    if records.is_empty() {
        logging::warn(
            Stage::Drought,
            None,
            &format!("no drought weeks between {} and {}; chart will have no areas", start, end),
        );
    } else {
        logging::info(Stage::Drought, None, &format!("{} weeks in window", records.len()));
    }
    let stacked = stack_all(&records);

    let water = daily.interpolate_time();
    let img = render_chart(
        config,
        &ChartData {
            stacked: &stacked,
            water: &water,
        },
    );

    let output_path = config.output_path();
    save_png(&img, &output_path)?;
    logging::info(
        Stage::Chart,
        None,
        &format!("wrote {}x{} chart", img.width(), img.height()),
    );

    Ok(RunSummary {
        output_path,
        water: water_stats,
        drought: drought_stats,
        water_days: daily.len(),
        drought_weeks: records.len(),
        image_size: img.dimensions(),
    })
}
