//! The drought-vs-tank-level chart.
//!
//! Left axis: percent of county area, drought bands stacked D4 at the
//! bottom. Right axis (twin, inverted): tank depth in inches, so a rising
//! line means more water. Both share the date axis fixed to the window.

use crate::analysis::calendar::{month_starts, month_tick_label, year_starts};
use crate::chart::axis::{nice_step, DateAxis, PlotArea, ValueAxis};
use crate::chart::canvas::{self, LineStyle};
use crate::chart::colors;
use crate::chart::text::{draw_text, draw_text_vertical, HAlign, TextStyle};
use crate::config::PlotConfig;
use crate::model::{DailySeries, SeverityCategory, StackedDrought};
use chrono::Duration;
use image::{Rgb, RgbImage};

pub const LEFT_AXIS_LABEL: &str = "Percent of County Area";
pub const RIGHT_AXIS_LABEL: &str = "Tank Depth (inches)";
pub const WATER_LEGEND_LABEL: &str = "Tank Water Level";
pub const TOP_OF_TANK: &str = "Top of Tank";
pub const BOTTOM_OF_TANK: &str = "Bottom of Tank";

/// Fraction of the depth range added above and below the data.
const DEPTH_MARGIN: f64 = 0.05;
/// Tank reference labels end this many days before the last reading.
const TANK_LABEL_LEAD_DAYS: i64 = 7;

/// Everything the chart plots, already windowed.
#[derive(Debug, Clone, Copy)]
pub struct ChartData<'a> {
    pub stacked: &'a [StackedDrought],
    /// Interpolated daily tank depth.
    pub water: &'a DailySeries,
}

/// Pixel geometry for one render, derived from the config and the water
/// series (which drives the right axis range).
#[derive(Debug, Clone)]
pub struct Layout {
    pub width: i64,
    pub height: i64,
    pub plot: PlotArea,
    pub dates: DateAxis,
    pub percent: ValueAxis,
    pub depth: ValueAxis,
    pub small: i64,
    pub title: i64,
    pub gap: i64,
    pub tick_len: i64,
    pub line_width: i64,
    pub marker_size: i64,
}

/// Converts a length in points to pixels at `dpi`.
fn pt(dpi: u32, points: f64) -> i64 {
    ((points * dpi as f64 / 72.0).round() as i64).max(1)
}

/// Font scale whose 8px glyphs come closest to `points` tall.
fn font_scale(dpi: u32, points: f64) -> i64 {
    ((points * dpi as f64 / 72.0 / 8.0).round() as i64).max(1)
}

impl Layout {
    pub fn new(config: &PlotConfig, water: &DailySeries) -> Self {
        let dpi = config.output.dpi;
        let (w, h) = config.pixel_size();
        let (width, height) = (w as i64, h as i64);

        let small = font_scale(dpi, 9.0);
        let title = font_scale(dpi, 12.0);
        let gap = pt(dpi, 3.0);
        let tick_len = pt(dpi, 3.5);

        let small_style = TextStyle::new(small, colors::BLACK);
        let title_style = TextStyle::new(title, colors::BLACK);

        let side = gap * 3 + small_style.glyph_height() + small_style.width("100") + tick_len;
        let top = gap * 3 + title_style.line_height() * 2;
        let bottom = tick_len + gap * 4 + small_style.line_height() * 3 + small_style.glyph_height();

        let left = side;
        let right = (width - side - 1).max(left + 1);
        let plot_top = top;
        let plot_bottom = (height - bottom - 1).max(plot_top + 1);
        let plot = PlotArea {
            left,
            top: plot_top,
            right,
            bottom: plot_bottom,
        };

        let dates = DateAxis::new(config.window.start, config.window.end, left, right);
        let percent = ValueAxis::new(0.0, 100.0, plot_bottom, plot_top);

        let mut lo = config.tank.top_in;
        let mut hi = config.tank.bottom_in;
        if let Some((min, max)) = water.value_range() {
            lo = lo.min(min);
            hi = hi.max(max);
        }
        if !config.fill_events.is_empty() {
            lo = lo.min(config.tank.fill_marker_in);
            hi = hi.max(config.tank.fill_marker_in);
        }
        // Inverted: shallow depth (full tank) at the top.
        let depth = ValueAxis::padded(lo, hi, DEPTH_MARGIN, plot_top, plot_bottom);

        Self {
            width,
            height,
            plot,
            dates,
            percent,
            depth,
            small,
            title,
            gap,
            tick_len,
            line_width: pt(dpi, 2.0),
            marker_size: pt(dpi, 8.0),
        }
    }

    fn small_text(&self, color: Rgb<u8>) -> TextStyle {
        TextStyle::new(self.small, color)
    }
}

/// Renders the full chart.
pub fn render_chart(config: &PlotConfig, data: &ChartData<'_>) -> RgbImage {
    let layout = Layout::new(config, data.water);
    let mut img = RgbImage::from_pixel(layout.width as u32, layout.height as u32, colors::WHITE);
    let band_colors = config.drought_rgb();
    let water_color = config.water_rgb();

    draw_drought_areas(&mut img, &layout, data.stacked, &band_colors);
    draw_year_lines(&mut img, &layout);
    draw_tank_lines(&mut img, &layout, config, data.water);
    draw_water_line(&mut img, &layout, data.water, water_color);
    draw_fill_events(&mut img, &layout, config, water_color);
    draw_axes(&mut img, &layout, water_color);
    draw_title(&mut img, &layout, &config.title());
    draw_legend(&mut img, &layout, &band_colors, water_color);

    img
}

/// Stacked bands, linear between weekly samples.
fn draw_drought_areas(img: &mut RgbImage, layout: &Layout, stacked: &[StackedDrought], band_colors: &[Rgb<u8>]) {
    if stacked.len() < 2 {
        return;
    }
    let offsets: Vec<f64> = stacked.iter().map(|s| layout.dates.offset(s.date)).collect();
    let tops: Vec<[f64; 5]> = stacked.iter().map(|s| s.cumulative_tops()).collect();

    let first_px = layout.dates.x_at(offsets[0]).max(layout.plot.left);
    let last_px = layout.dates.x_at(offsets[offsets.len() - 1]).min(layout.plot.right);

    for px in first_px..=last_px {
        let days = layout.dates.days_at(px).clamp(offsets[0], offsets[offsets.len() - 1]);
        // Segment [i, i + 1] containing `days`.
        let i = offsets
            .partition_point(|o| *o <= days)
            .saturating_sub(1)
            .min(offsets.len() - 2);
        let span = offsets[i + 1] - offsets[i];
        let t = if span > 0.0 { (days - offsets[i]) / span } else { 0.0 };

        let mut below = layout.percent.y(0.0);
        for (band, color) in band_colors.iter().enumerate().take(5) {
            let top = tops[i][band] + (tops[i + 1][band] - tops[i][band]) * t;
            let y_top = layout.percent.y(top);
            canvas::fill_rect(img, px, y_top, px + 1, below, *color);
            below = y_top;
        }
    }
}

fn draw_year_lines(img: &mut RgbImage, layout: &Layout) {
    let dash = LineStyle::Dashed {
        on: layout.gap * 2,
        off: layout.gap,
    };
    for year in year_starts(layout.dates.start, layout.dates.end) {
        let x = layout.dates.x(year);
        canvas::vline(
            img,
            x,
            layout.plot.top,
            layout.plot.bottom,
            (layout.line_width / 2).max(1),
            dash,
            colors::GRAY,
            0.3,
        );
    }
}

fn draw_tank_lines(img: &mut RgbImage, layout: &Layout, config: &PlotConfig, water: &DailySeries) {
    let lw = (layout.line_width / 2).max(1);
    let dotted = LineStyle::Dashed { on: lw, off: lw * 2 };
    let style = layout.small_text(colors::GRAY);

    let label_x = water
        .last_date()
        .map(|d| layout.dates.x(d - Duration::days(TANK_LABEL_LEAD_DAYS)));

    for (depth, label) in [(config.tank.top_in, TOP_OF_TANK), (config.tank.bottom_in, BOTTOM_OF_TANK)] {
        let y = layout.depth.y(depth);
        canvas::hline(img, y, layout.plot.left, layout.plot.right, lw, dotted, colors::GRAY);
        if let Some(x) = label_x {
            let text_top = y - layout.gap / 2 - style.glyph_height();
            draw_text(img, label, x, text_top, HAlign::Right, style);
        }
    }
}

fn draw_water_line(img: &mut RgbImage, layout: &Layout, water: &DailySeries, color: Rgb<u8>) {
    let points: Vec<(i64, i64)> = water
        .points()
        .map(|(date, value)| (layout.dates.x(date), layout.depth.y(value)))
        .collect();

    match points.as_slice() {
        [] => {}
        [(x, y)] => {
            let half = layout.line_width / 2;
            canvas::fill_rect(img, x - half, y - half, x - half + layout.line_width, y - half + layout.line_width, color);
        }
        _ => {
            for pair in points.windows(2) {
                let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
                canvas::line(img, x0, y0, x1, y1, layout.line_width, color);
            }
        }
    }
}

fn draw_fill_events(img: &mut RgbImage, layout: &Layout, config: &PlotConfig, color: Rgb<u8>) {
    let style = layout.small_text(color).bold();
    let y = layout.depth.y(config.tank.fill_marker_in);

    for event in &config.fill_events {
        if event.date < config.window.start || event.date > config.window.end {
            continue;
        }
        let x = layout.dates.x(event.date);
        canvas::fill_triangle_down(img, x, y, layout.marker_size, color);
        let text_top = y - layout.marker_size / 2 - layout.gap - style.glyph_height();
        draw_text(img, &event.label, x, text_top, HAlign::Center, style);
    }
}

fn format_tick(value: f64, step: f64) -> String {
    if step >= 1.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn draw_axes(img: &mut RgbImage, layout: &Layout, depth_color: Rgb<u8>) {
    let plot = layout.plot;
    let black = layout.small_text(colors::BLACK);
    let blue = layout.small_text(depth_color);
    let solid = LineStyle::Solid;

    canvas::stroke_rect(img, plot.left, plot.top, plot.right, plot.bottom, colors::BLACK);

    // Left: percent of area.
    for value in layout.percent.ticks(20.0) {
        let y = layout.percent.y(value);
        canvas::hline(img, y, plot.left - layout.tick_len, plot.left - 1, 1, solid, colors::BLACK);
        let x = plot.left - layout.tick_len - layout.gap;
        draw_text(img, &format_tick(value, 20.0), x, y - black.glyph_height() / 2, HAlign::Right, black);
    }
    let (_, mid_y) = plot.center();
    draw_text_vertical(img, LEFT_AXIS_LABEL, layout.gap, mid_y, black);

    // Right: tank depth.
    let depth_step = nice_step(layout.depth.hi - layout.depth.lo, 6);
    for value in layout.depth.ticks(depth_step) {
        let y = layout.depth.y(value);
        canvas::hline(img, y, plot.right + 1, plot.right + layout.tick_len, 1, solid, depth_color);
        let x = plot.right + layout.tick_len + layout.gap;
        draw_text(img, &format_tick(value, depth_step), x, y - blue.glyph_height() / 2, HAlign::Left, blue);
    }
    let right_label_x = layout.width - layout.gap - blue.glyph_height();
    draw_text_vertical(img, RIGHT_AXIS_LABEL, right_label_x, mid_y, blue);

    // Bottom: month ticks with month over year.
    for month in month_starts(layout.dates.start, layout.dates.end) {
        let x = layout.dates.x(month);
        canvas::vline(img, x, plot.bottom + 1, plot.bottom + layout.tick_len, 1, solid, colors::BLACK, 1.0);
        let (month_label, year_label) = month_tick_label(month);
        let y = plot.bottom + layout.tick_len + layout.gap;
        draw_text(img, &month_label, x, y, HAlign::Center, black);
        draw_text(img, &year_label, x, y + black.line_height(), HAlign::Center, black);
    }
}

fn draw_title(img: &mut RgbImage, layout: &Layout, lines: &[String]) {
    let style = TextStyle::new(layout.title, colors::BLACK);
    for (i, line) in lines.iter().enumerate() {
        let y = layout.gap + i as i64 * style.line_height();
        draw_text(img, line, layout.width / 2, y, HAlign::Center, style);
    }
}

/// Single centred row under the month labels: five band swatches then the
/// water line.
fn draw_legend(img: &mut RgbImage, layout: &Layout, band_colors: &[Rgb<u8>], water_color: Rgb<u8>) {
    let style = layout.small_text(colors::BLACK);
    let swatch = style.glyph_height();
    let spacing = layout.gap * 4;

    let mut entries: Vec<(&str, Rgb<u8>, bool)> = SeverityCategory::PLOT_ORDER
        .iter()
        .zip(band_colors)
        .map(|(category, color)| (category.label(), *color, false))
        .collect();
    entries.push((WATER_LEGEND_LABEL, water_color, true));

    let entry_width = |label: &str| swatch * 2 + layout.gap + style.width(label);
    let total: i64 = entries.iter().map(|(label, _, _)| entry_width(label)).sum::<i64>()
        + spacing * (entries.len() as i64 - 1);

    let y = layout.plot.bottom + layout.tick_len + layout.gap * 3 + style.line_height() * 2;
    let mut x = (layout.width - total) / 2;

    for (label, color, is_line) in entries {
        if is_line {
            let mid = y + swatch / 2;
            canvas::line(img, x, mid, x + swatch * 2, mid, layout.line_width, color);
        } else {
            canvas::fill_rect(img, x, y, x + swatch * 2, y + swatch, color);
        }
        draw_text(img, label, x + swatch * 2 + layout.gap, y, HAlign::Left, style);
        x += entry_width(label) + spacing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DailyValue, FillEvent};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn small_config() -> PlotConfig {
        let mut config = PlotConfig::default();
        config.output.dpi = 50;
        config
    }

    fn flat_water(depth: f64) -> DailySeries {
        DailySeries {
            days: date(2024, 5, 1)
                .iter_days()
                .take_while(|d| *d <= date(2025, 4, 9))
                .map(|d| DailyValue { date: d, value: Some(depth) })
                .collect(),
        }
    }

    fn full_d4(dates: &[NaiveDate]) -> Vec<StackedDrought> {
        dates
            .iter()
            .map(|d| StackedDrought {
                date: *d,
                bands: [100.0, 0.0, 0.0, 0.0, 0.0],
            })
            .collect()
    }

    #[test]
    fn test_image_size_follows_figure_and_dpi() {
        let config = small_config();
        let water = flat_water(50.0);
        let img = render_chart(&config, &ChartData { stacked: &[], water: &water });
        assert_eq!((img.width(), img.height()), (550, 425));
    }

    #[test]
    fn test_layout_keeps_plot_inside_canvas() {
        let config = PlotConfig::default();
        let layout = Layout::new(&config, &flat_water(50.0));
        assert!(layout.plot.left > 0 && layout.plot.top > 0);
        assert!(layout.plot.right < layout.width);
        assert!(layout.plot.bottom < layout.height);
        assert!(layout.plot.width() > layout.width / 2);
        assert!(layout.plot.height() > layout.height / 2);
    }

    #[test]
    fn test_depth_axis_is_inverted_and_covers_tank() {
        let config = small_config();
        let layout = Layout::new(&config, &flat_water(50.0));
        assert!(layout.depth.y(config.tank.top_in) < layout.depth.y(config.tank.bottom_in));
        assert!(layout.depth.y(config.tank.top_in) > layout.plot.top);
        assert!(layout.depth.y(config.tank.bottom_in) < layout.plot.bottom);
    }

    #[test]
    fn test_depth_axis_grows_to_fit_water_outside_tank_marks() {
        let config = small_config();
        let layout = Layout::new(&config, &flat_water(95.0));
        assert!(layout.depth.hi > 95.0);
    }

    #[test]
    fn test_drought_area_is_filled_between_samples() {
        let config = small_config();
        let water = flat_water(50.0);
        let stacked = full_d4(&[date(2024, 6, 4), date(2024, 8, 27)]);
        let img = render_chart(&config, &ChartData { stacked: &stacked, water: &water });

        let layout = Layout::new(&config, &water);
        let x = layout.dates.x(date(2024, 7, 15));
        let y = layout.percent.y(50.0);
        assert_eq!(*img.get_pixel(x as u32, y as u32), crate::config::parse_color("maroon").unwrap());
    }

    #[test]
    fn test_no_drought_leaves_plot_background() {
        let config = small_config();
        let water = flat_water(50.0);
        let img = render_chart(&config, &ChartData { stacked: &[], water: &water });

        let layout = Layout::new(&config, &water);
        let x = layout.dates.x(date(2024, 7, 15));
        let y = layout.percent.y(50.0);
        assert_eq!(*img.get_pixel(x as u32, y as u32), colors::WHITE);
    }

    #[test]
    fn test_water_line_is_drawn_at_depth() {
        let config = small_config();
        let water = flat_water(50.0);
        let img = render_chart(&config, &ChartData { stacked: &[], water: &water });

        let layout = Layout::new(&config, &water);
        let x = layout.dates.x(date(2024, 7, 15));
        let y = layout.depth.y(50.0);
        assert_eq!(*img.get_pixel(x as u32, y as u32), config.water_rgb());
    }

    /// Pixels of `color` inside the half-open box `[x0, x1) × [y0, y1)`.
    fn count_in(img: &RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) -> usize {
        let mut n = 0;
        for y in y0.max(0)..y1.min(img.height() as i64) {
            for x in x0.max(0)..x1.min(img.width() as i64) {
                if *img.get_pixel(x as u32, y as u32) == color {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn test_empty_water_series_draws_no_line_but_keeps_tank_marks() {
        let config = small_config();
        let water = DailySeries {
            days: date(2024, 5, 1)
                .iter_days()
                .take_while(|d| *d <= date(2025, 4, 9))
                .map(|d| DailyValue { date: d, value: None })
                .collect(),
        };
        let img = render_chart(&config, &ChartData { stacked: &[], water: &water });

        let layout = Layout::new(&config, &water);
        let x = layout.dates.x(date(2024, 7, 15));
        assert_eq!(*img.get_pixel(x as u32, layout.depth.y(50.0) as u32), colors::WHITE);

        let y = layout.depth.y(config.tank.bottom_in);
        let gray = count_in(&img, layout.plot.left + 1, y, layout.plot.right, y + 1, colors::GRAY);
        assert!(gray > 0, "bottom-of-tank line should still be drawn");
    }

    #[test]
    fn test_fill_events_draw_marker_and_bold_label_at_marker_depth() {
        let config = small_config();
        let water = flat_water(50.0);
        let img = render_chart(&config, &ChartData { stacked: &[], water: &water });

        let layout = Layout::new(&config, &water);
        let blue = config.water_rgb();
        let y = layout.depth.y(config.tank.fill_marker_in);
        let style = layout.small_text(blue).bold();

        for event in &config.fill_events {
            let x = layout.dates.x(event.date);
            assert_eq!(*img.get_pixel(x as u32, y as u32), blue, "marker for {}", event.label);

            let text_bottom = y - layout.marker_size / 2 - layout.gap;
            let text_top = text_bottom - style.glyph_height();
            let half = style.width(&event.label) / 2 + 1;
            let lit = count_in(&img, x - half, text_top, x + half, text_bottom, blue);
            assert!(lit > 20, "label '{}' should be drawn above the marker, got {}", event.label, lit);
        }
    }

    #[test]
    fn test_fill_event_outside_window_is_skipped() {
        let mut config = small_config();
        // Marker depth inside the tank range so the axis does not depend on
        // whether any events are configured.
        config.tank.fill_marker_in = 40.0;
        let water = flat_water(50.0);

        config.fill_events = Vec::new();
        let without = render_chart(&config, &ChartData { stacked: &[], water: &water });

        config.fill_events = vec![
            FillEvent {
                date: date(2023, 8, 1),
                label: "Old fill".to_string(),
            },
            FillEvent {
                date: date(2025, 6, 1),
                label: "Next fill".to_string(),
            },
        ];
        let with = render_chart(&config, &ChartData { stacked: &[], water: &water });

        assert!(without == with, "events outside the window must not change the chart");
    }

    #[test]
    fn test_tank_lines_are_dotted_and_labelled() {
        let mut config = small_config();
        config.fill_events = Vec::new();
        let water = flat_water(50.0);
        let img = render_chart(&config, &ChartData { stacked: &[], water: &water });

        let layout = Layout::new(&config, &water);
        let style = layout.small_text(colors::GRAY);
        let label_right = layout.dates.x(date(2025, 4, 9) - Duration::days(TANK_LABEL_LEAD_DAYS));
        let inner = layout.plot.width() - 2;

        for (depth, label) in [(config.tank.top_in, TOP_OF_TANK), (config.tank.bottom_in, BOTTOM_OF_TANK)] {
            let y = layout.depth.y(depth);
            let gray = count_in(&img, layout.plot.left + 1, y, layout.plot.right, y + 1, colors::GRAY) as i64;
            assert!(gray > inner / 4, "{} line too sparse: {} of {}", label, gray, inner);
            assert!(gray < inner, "{} line should be dotted, not solid", label);

            let text_bottom = y - layout.gap / 2;
            let text_top = text_bottom - style.glyph_height();
            let lit = count_in(&img, label_right - style.width(label), text_top, label_right, text_bottom, colors::GRAY);
            assert!(lit > 20, "'{}' label missing, got {}", label, lit);
        }
    }

    #[test]
    fn test_year_start_gets_faint_dashed_line() {
        let config = small_config();
        let water = flat_water(50.0);
        let img = render_chart(&config, &ChartData { stacked: &[], water: &water });
        let layout = Layout::new(&config, &water);

        // Gray at 30% over white, as drawn by `vline`.
        let faint = |x: i64| {
            (layout.plot.top + 1..layout.plot.bottom)
                .map(|y| *img.get_pixel(x as u32, y as u32))
                .filter(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2] && p.0[0] > 128 && p.0[0] < 255)
                .count() as i64
        };

        let on_year = faint(layout.dates.x(date(2025, 1, 1)));
        assert!(on_year > layout.plot.height() / 3, "dashed year line expected, got {}", on_year);
        assert!(on_year < layout.plot.height() - 2, "year line should be dashed");
        assert_eq!(faint(layout.dates.x(date(2024, 12, 15))), 0);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(40.0, 10.0), "40");
        assert_eq!(format_tick(27.5, 0.5), "27.5");
    }
}
