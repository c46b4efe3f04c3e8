//! Bitmap text.
//!
//! Glyphs come from the public-domain 8×8 font in `font8x8`, scaled up by
//! an integer factor. Only ASCII is covered; anything else renders as `?`.

use crate::chart::canvas::fill_rect;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};

pub const GLYPH_SIZE: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub scale: i64,
    pub color: Rgb<u8>,
    pub bold: bool,
}

impl TextStyle {
    pub fn new(scale: i64, color: Rgb<u8>) -> Self {
        Self {
            scale: scale.max(1),
            color,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Height of one glyph row, without leading.
    pub fn glyph_height(&self) -> i64 {
        GLYPH_SIZE * self.scale
    }

    /// Distance between consecutive baselines.
    pub fn line_height(&self) -> i64 {
        (GLYPH_SIZE + 2) * self.scale
    }

    pub fn width(&self, text: &str) -> i64 {
        let extra = if self.bold { self.bold_offset() } else { 0 };
        text.chars().count() as i64 * GLYPH_SIZE * self.scale + extra
    }

    fn bold_offset(&self) -> i64 {
        (self.scale / 2).max(1)
    }
}

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Calls `plot(col, row)` for every lit pixel of `text` in unscaled glyph
/// space, where `col` runs along the text.
fn for_each_lit(text: &str, mut plot: impl FnMut(i64, i64)) {
    for (i, c) in text.chars().enumerate() {
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..8u32 {
                if bits & (1u8 << col) != 0 {
                    plot(i as i64 * GLYPH_SIZE + col as i64, row as i64);
                }
            }
        }
    }
}

/// Draws one line of text with its top edge at `y`; `x` is the left edge,
/// centre or right edge depending on `align`.
pub fn draw_text(img: &mut RgbImage, text: &str, x: i64, y: i64, align: HAlign, style: TextStyle) {
    let width = style.width(text);
    let left = match align {
        HAlign::Left => x,
        HAlign::Center => x - width / 2,
        HAlign::Right => x - width,
    };
    let s = style.scale;
    let passes = if style.bold { vec![0, style.bold_offset()] } else { vec![0] };

    for offset in passes {
        for_each_lit(text, |col, row| {
            let px = left + offset + col * s;
            let py = y + row * s;
            fill_rect(img, px, py, px + s, py + s, style.color);
        });
    }
}

/// Draws text rotated a quarter turn counter-clockwise (reading bottom to
/// top), centred vertically on `y_center` with its left edge at `x`.
pub fn draw_text_vertical(img: &mut RgbImage, text: &str, x: i64, y_center: i64, style: TextStyle) {
    let length = style.width(text);
    let bottom = y_center + length / 2;
    let s = style.scale;

    for_each_lit(text, |col, row| {
        let px = x + row * s;
        let py = bottom - (col + 1) * s;
        fill_rect(img, px, py, px + s, py + s, style.color);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn lit_columns(img: &RgbImage) -> Vec<u32> {
        (0..img.width())
            .filter(|x| (0..img.height()).any(|y| *img.get_pixel(*x, y) == BLACK))
            .collect()
    }

    #[test]
    fn test_width_scales_with_length_and_scale() {
        let style = TextStyle::new(3, BLACK);
        assert_eq!(style.width("D4"), 2 * 8 * 3);
        assert_eq!(style.glyph_height(), 24);
        assert!(style.bold().width("D4") > style.width("D4"));
    }

    #[test]
    fn test_zero_scale_is_promoted() {
        assert_eq!(TextStyle::new(0, BLACK).scale, 1);
    }

    #[test]
    fn test_space_draws_nothing() {
        let mut img = RgbImage::from_pixel(16, 8, WHITE);
        draw_text(&mut img, "  ", 0, 0, HAlign::Left, TextStyle::new(1, BLACK));
        assert!(img.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_alignment_keeps_text_inside_anchor() {
        let style = TextStyle::new(1, BLACK);

        let mut img = RgbImage::from_pixel(64, 10, WHITE);
        draw_text(&mut img, "Fill", 40, 1, HAlign::Right, style);
        let cols = lit_columns(&img);
        assert!(*cols.first().unwrap() >= 40 - 32);
        assert!(*cols.last().unwrap() < 40);

        let mut img = RgbImage::from_pixel(64, 10, WHITE);
        draw_text(&mut img, "Fill", 32, 1, HAlign::Center, style);
        let cols = lit_columns(&img);
        assert!(*cols.first().unwrap() >= 16);
        assert!(*cols.last().unwrap() < 48);
    }

    #[test]
    fn test_vertical_text_is_taller_than_wide() {
        let mut img = RgbImage::from_pixel(20, 80, WHITE);
        draw_text_vertical(&mut img, "Depth", 2, 40, TextStyle::new(1, BLACK));
        let lit: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == BLACK)
            .map(|(x, y, _)| (x, y))
            .collect();
        let xs = lit.iter().map(|(x, _)| *x);
        let ys = lit.iter().map(|(_, y)| *y);
        let width = xs.clone().max().unwrap() - xs.min().unwrap();
        let height = ys.clone().max().unwrap() - ys.min().unwrap();
        assert!(height > width);
        assert!(width < 8);
    }

    #[test]
    fn test_non_ascii_falls_back_to_question_mark() {
        assert_eq!(glyph('é'), glyph('?'));
    }
}
