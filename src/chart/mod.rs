//! Chart rendering.
//!
//! Draws the drought/tank overlay onto an RGB raster and encodes it as PNG.

pub mod axis;
pub mod canvas;
pub mod overlay;
pub mod text;

pub use overlay::{render_chart, ChartData, Layout};

use crate::model::{Result, TankmonError};
use image::RgbImage;
use std::path::Path;

/// Fixed chart colors; data colors come from the config.
pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const GRAY: Rgb<u8> = Rgb([128, 128, 128]);
}

/// Writes `img` as PNG, creating the parent folder if needed.
pub fn save_png(img: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| TankmonError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| TankmonError::Image {
            path: path.to_path_buf(),
            source,
        })
}
