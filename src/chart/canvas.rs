//! Raster drawing primitives.
//!
//! All coordinates are signed pixels; anything outside the image is
//! silently clipped, so callers can draw without bounds checks.

use image::{Rgb, RgbImage};

/// Stroke pattern for straight lines. Lengths are in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineStyle {
    Solid,
    Dashed { on: i64, off: i64 },
}

impl LineStyle {
    fn is_on(self, step: i64) -> bool {
        match self {
            LineStyle::Solid => true,
            LineStyle::Dashed { on, off } => {
                let period = (on + off).max(1);
                step.rem_euclid(period) < on
            }
        }
    }
}

/// Sets one pixel if it lies inside the image.
pub fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u64) < img.width() as u64 && (y as u64) < img.height() as u64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Alpha-blends `color` over the existing pixel.
pub fn blend(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, alpha: f64) {
    if x < 0 || y < 0 || x as u64 >= img.width() as u64 || y as u64 >= img.height() as u64 {
        return;
    }
    let alpha = alpha.clamp(0.0, 1.0);
    let base = *img.get_pixel(x as u32, y as u32);
    let mix = |b: u8, c: u8| ((1.0 - alpha) * b as f64 + alpha * c as f64).round() as u8;
    img.put_pixel(
        x as u32,
        y as u32,
        Rgb([mix(base.0[0], color.0[0]), mix(base.0[1], color.0[1]), mix(base.0[2], color.0[2])]),
    );
}

/// Fills the half-open rectangle `[x0, x1) × [y0, y1)`. Corners may be
/// given in either order.
pub fn fill_rect(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
    let (xa, xb) = (x0.min(x1).max(0), x0.max(x1).min(img.width() as i64));
    let (ya, yb) = (y0.min(y1).max(0), y0.max(y1).min(img.height() as i64));
    for y in ya..yb {
        for x in xa..xb {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Horizontal line from `x0` to `x1` inclusive, `thickness` pixels tall
/// starting at `y`.
pub fn hline(img: &mut RgbImage, y: i64, x0: i64, x1: i64, thickness: i64, style: LineStyle, color: Rgb<u8>) {
    let (start, end) = (x0.min(x1), x0.max(x1));
    for x in start..=end {
        if style.is_on(x - start) {
            for dy in 0..thickness.max(1) {
                put(img, x, y + dy, color);
            }
        }
    }
}

/// Vertical line from `y0` to `y1` inclusive, blended at `alpha`.
#[allow(clippy::too_many_arguments)]
pub fn vline(
    img: &mut RgbImage,
    x: i64,
    y0: i64,
    y1: i64,
    thickness: i64,
    style: LineStyle,
    color: Rgb<u8>,
    alpha: f64,
) {
    let (start, end) = (y0.min(y1), y0.max(y1));
    for y in start..=end {
        if style.is_on(y - start) {
            for dx in 0..thickness.max(1) {
                blend(img, x + dx, y, color, alpha);
            }
        }
    }
}

/// Straight segment with a square brush of side `width`, using
/// Bresenham's walk for the centre line.
pub fn line(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, width: i64, color: Rgb<u8>) {
    let width = width.max(1);
    let half = width / 2;
    let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
    let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
    let (mut x, mut y, mut err) = (x0, y0, dx + dy);

    loop {
        fill_rect(img, x - half, y - half, x - half + width, y - half + width, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// One-pixel rectangle outline around `[x0, x1] × [y0, y1]`.
pub fn stroke_rect(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
    hline(img, y0, x0, x1, 1, LineStyle::Solid, color);
    hline(img, y1, x0, x1, 1, LineStyle::Solid, color);
    for y in y0.min(y1)..=y0.max(y1) {
        put(img, x0, y, color);
        put(img, x1, y, color);
    }
}

/// Filled downward-pointing triangle: flat edge of width `size` on top,
/// apex `size` pixels lower, centred on `(cx, cy)`.
pub fn fill_triangle_down(img: &mut RgbImage, cx: i64, cy: i64, size: i64, color: Rgb<u8>) {
    let size = size.max(2);
    let top = cy - size / 2;
    for row in 0..=size {
        let half = (size - row) / 2;
        hline(img, top + row, cx - half, cx + half, 1, LineStyle::Solid, color);
    }
}
