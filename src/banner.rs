use crate::error::Result;

use console::style;
use image::imageops::FilterType;
use image::{ImageReader, RgbImage};
use std::path::Path;
use tracing::debug;

/// Terminal cells per banner row
pub const BANNER_WIDTH: u32 = 78;
/// Pixel rows; two pixels share one terminal cell
pub const BANNER_HEIGHT: u32 = 50;

/// Maps a color onto the xterm 256-color palette
pub fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        if r < 8 {
            return 16;
        }
        if r > 248 {
            return 231;
        }
        return 232 + ((r as u16 - 8) * 24 / 247) as u8;
    }

    let level = |c: u8| (c as u16 * 5 + 127) / 255;
    (16 + 36 * level(r) + 6 * level(g) + level(b)) as u8
}

/// Draws an image using upper half blocks, one output line per pixel pair
pub fn render_banner(image: &RgbImage) -> Vec<String> {
    let (width, height) = image.dimensions();
    let mut rows = Vec::with_capacity(height.div_ceil(2) as usize);

    for y in (0..height).step_by(2) {
        let mut line = String::new();
        for x in 0..width {
            let top = image.get_pixel(x, y).0;
            let bottom = if y + 1 < height {
                image.get_pixel(x, y + 1).0
            } else {
                top
            };

            let cell = style("▀")
                .color256(rgb_to_ansi256(top[0], top[1], top[2]))
                .on_color256(rgb_to_ansi256(bottom[0], bottom[1], bottom[2]));
            line.push_str(&cell.to_string());
        }
        rows.push(line);
    }

    rows
}

/// Loads the banner file and scales it to the fixed banner size.
///
/// The file carries no extension, so the format is sniffed from its header.
pub fn load_banner(path: &Path) -> Result<Vec<String>> {
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "banner loaded"
    );

    let scaled = image
        .resize_exact(BANNER_WIDTH, BANNER_HEIGHT, FilterType::Lanczos3)
        .to_rgb8();

    Ok(render_banner(&scaled))
}
