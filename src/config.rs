//! Run configuration.
//!
//! Every constant of a run lives here. The defaults reproduce the chart the
//! tank report has always used; a `tankmon.toml` next to the binary can
//! override any field. Dates are quoted ISO strings (`"2024-05-01"`).

use crate::model::{FillEvent, Result, TankmonError};
use chrono::NaiveDate;
use image::Rgb;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory by the binary.
pub const DEFAULT_CONFIG_FILE: &str = "tankmon.toml";

/// Highest accepted output resolution.
pub const MAX_DPI: u32 = 1200;
/// Largest canvas the renderer will allocate (about 600 MB of RGB).
pub const MAX_PIXELS: f64 = 200_000_000.0;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub water_level_csv: PathBuf,
    pub drought_csv: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            water_level_csv: PathBuf::from("data/holding-tank-water-level.csv"),
            drought_csv: PathBuf::from("data/usdm-washington-county-pa-2000-to-present.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub plot_folder: PathBuf,
    pub dpi: u32,
    pub log_file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            plot_folder: PathBuf::from("figs"),
            dpi: 300,
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: ymd(2024, 5, 1),
            end: ymd(2025, 4, 9),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FigureConfig {
    pub width_in: f64,
    pub height_in: f64,
    /// Band colors in stacking order, D4 first.
    pub drought_colors: Vec<String>,
    pub water_color: String,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width_in: 11.0,
            height_in: 8.5,
            drought_colors: ["maroon", "red", "orange", "navajowhite", "yellow"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            water_color: "steelblue".to_string(),
        }
    }
}

/// Tank geometry, in inches of depth measured from the top.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TankConfig {
    pub top_in: f64,
    pub bottom_in: f64,
    /// Depth at which fill markers are drawn.
    pub fill_marker_in: f64,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            top_in: 27.5,
            bottom_in: 88.0,
            fill_marker_in: 27.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlotConfig {
    pub inputs: InputConfig,
    pub output: OutputConfig,
    pub window: WindowConfig,
    pub figure: FigureConfig,
    pub tank: TankConfig,
    pub fill_events: Vec<FillEvent>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            inputs: InputConfig::default(),
            output: OutputConfig::default(),
            window: WindowConfig::default(),
            figure: FigureConfig::default(),
            tank: TankConfig::default(),
            fill_events: vec![
                FillEvent {
                    date: ymd(2024, 9, 5),
                    label: "Fill 1".to_string(),
                },
                FillEvent {
                    date: ymd(2024, 11, 12),
                    label: "Fill 2".to_string(),
                },
            ],
        }
    }
}

impl PlotConfig {
    /// Checks the constraints the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if self.window.start > self.window.end {
            return Err(TankmonError::Config(format!(
                "window start {} is after end {}",
                self.window.start, self.window.end
            )));
        }
        if !(self.figure.width_in > 0.0 && self.figure.height_in > 0.0) {
            return Err(TankmonError::Config(
                "figure width and height must be positive".to_string(),
            ));
        }
        if self.output.dpi == 0 || self.output.dpi > MAX_DPI {
            return Err(TankmonError::Config(format!(
                "dpi must be between 1 and {}, got {}",
                MAX_DPI, self.output.dpi
            )));
        }
        let dpi = self.output.dpi as f64;
        let pixels = (self.figure.width_in * dpi) * (self.figure.height_in * dpi);
        if pixels > MAX_PIXELS {
            return Err(TankmonError::Config(format!(
                "{}x{} in at {} dpi is too large to render",
                self.figure.width_in, self.figure.height_in, self.output.dpi
            )));
        }
        if self.tank.top_in >= self.tank.bottom_in {
            return Err(TankmonError::Config(format!(
                "tank top ({}) must be above tank bottom ({})",
                self.tank.top_in, self.tank.bottom_in
            )));
        }
        if self.figure.drought_colors.len() != 5 {
            return Err(TankmonError::Config(format!(
                "expected 5 drought colors, got {}",
                self.figure.drought_colors.len()
            )));
        }
        for name in self
            .figure
            .drought_colors
            .iter()
            .chain(std::iter::once(&self.figure.water_color))
        {
            if parse_color(name).is_none() {
                return Err(TankmonError::Config(format!("unknown color '{}'", name)));
            }
        }
        Ok(())
    }

    /// Canvas size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.output.dpi as f64;
        (
            (self.figure.width_in * dpi).round().max(1.0) as u32,
            (self.figure.height_in * dpi).round().max(1.0) as u32,
        )
    }

    pub fn output_filename(&self) -> String {
        format!(
            "drought-vs-waterlevel_{}_to_{}.png",
            self.window.start.format("%Y-%m-%d"),
            self.window.end.format("%Y-%m-%d")
        )
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.plot_folder.join(self.output_filename())
    }

    /// Chart title, one entry per line.
    pub fn title(&self) -> [String; 2] {
        [
            "Drought Conditions overlaid with Water Tank Level".to_string(),
            format!(
                "{} thru {}",
                self.window.start.format("%Y-%m-%d"),
                self.window.end.format("%Y-%m-%d")
            ),
        ]
    }

    /// Resolved band colors, D4 first. Call `validate` first.
    pub fn drought_rgb(&self) -> Vec<Rgb<u8>> {
        self.figure
            .drought_colors
            .iter()
            .map(|c| parse_color(c).unwrap_or(Rgb([0, 0, 0])))
            .collect()
    }

    pub fn water_rgb(&self) -> Rgb<u8> {
        parse_color(&self.figure.water_color).unwrap_or(Rgb([70, 130, 180]))
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses a TOML config file. Missing sections and fields keep their defaults.
pub fn load_config(path: &Path) -> Result<PlotConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| TankmonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> Result<PlotConfig> {
    toml::from_str(text).map_err(|e| TankmonError::Config(e.to_string()))
}

/// Like `load_config`, but a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<PlotConfig> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(PlotConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// Resolves a named color or a `#rrggbb` hex string.
pub fn parse_color(name: &str) -> Option<Rgb<u8>> {
    let name = name.trim();
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(Rgb([channel(0)?, channel(2)?, channel(4)?]));
    }

    let rgb = match name.to_ascii_lowercase().as_str() {
        "maroon" => [128, 0, 0],
        "red" => [255, 0, 0],
        "orange" => [255, 165, 0],
        "navajowhite" => [255, 222, 173],
        "yellow" => [255, 255, 0],
        "steelblue" => [70, 130, 180],
        "darkblue" => [0, 0, 139],
        "gray" | "grey" => [128, 128, 128],
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        _ => return None,
    };
    Some(Rgb(rgb))
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    // Only called with literal calendar dates.
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        PlotConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_output_path_is_derived_from_window() {
        let cfg = PlotConfig::default();
        assert_eq!(
            cfg.output_path(),
            PathBuf::from("figs/drought-vs-waterlevel_2024-05-01_to_2025-04-09.png")
        );
    }

    #[test]
    fn test_default_pixel_size_is_letter_landscape_at_300_dpi() {
        assert_eq!(PlotConfig::default().pixel_size(), (3300, 2550));
    }

    #[test]
    fn test_title_second_line_names_window() {
        let [first, second] = PlotConfig::default().title();
        assert_eq!(first, "Drought Conditions overlaid with Water Tank Level");
        assert_eq!(second, "2024-05-01 thru 2025-04-09");
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let cfg = parse_config(
            r#"
            [window]
            start = "2023-01-01"

            [output]
            dpi = 72
            "#,
        )
        .unwrap();
        assert_eq!(cfg.window.start, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(cfg.window.end, NaiveDate::from_ymd_opt(2025, 4, 9).unwrap());
        assert_eq!(cfg.output.dpi, 72);
        assert_eq!(cfg.tank, TankConfig::default());
        assert_eq!(cfg.fill_events.len(), 2);
    }

    #[test]
    fn test_fill_events_replace_defaults() {
        let cfg = parse_config(
            r#"
            [[fill_events]]
            date = "2025-01-15"
            label = "Delivery"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.fill_events.len(), 1);
        assert_eq!(cfg.fill_events[0].label, "Delivery");
    }

    #[test]
    fn test_bad_date_is_config_error() {
        let err = parse_config("[window]\nstart = \"May 1\"\n").unwrap_err();
        assert!(matches!(err, TankmonError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let mut cfg = PlotConfig::default();
        cfg.window.start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert!(matches!(cfg.validate(), Err(TankmonError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_tank() {
        let mut cfg = PlotConfig::default();
        cfg.tank.top_in = 90.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_dpi_and_canvas_area() {
        let mut cfg = PlotConfig::default();
        cfg.output.dpi = 30000;
        assert!(matches!(cfg.validate(), Err(TankmonError::Config(_))));

        cfg.output.dpi = MAX_DPI;
        assert!(cfg.validate().is_ok(), "letter size at max dpi should fit");

        cfg.figure.width_in = 500.0;
        assert!(matches!(cfg.validate(), Err(TankmonError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_wrong_color_count_and_unknown_color() {
        let mut cfg = PlotConfig::default();
        cfg.figure.drought_colors.pop();
        assert!(cfg.validate().is_err());

        let mut cfg = PlotConfig::default();
        cfg.figure.water_color = "chartreuse-ish".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_parse_color_named_and_hex() {
        assert_eq!(parse_color("SteelBlue"), Some(Rgb([70, 130, 180])));
        assert_eq!(parse_color("#800000"), Some(Rgb([128, 0, 0])));
        assert_eq!(parse_color("#80000"), None);
        assert_eq!(parse_color("#zz0000"), None);
        assert_eq!(parse_color("mauve"), None);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(cfg, PlotConfig::default());
    }
}
