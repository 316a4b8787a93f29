//! Palette output: the line-per-colour text format and swatch images.

use std::fs;
use std::path::Path;

use crate::error::{MipaError, Result};
use crate::types::{canvas, Colour, Image, Palette};

use super::save_image;

/// Swatch cell size in pixels.
pub const SWATCH_CELL_WIDTH: u32 = 50;
pub const SWATCH_CELL_HEIGHT: u32 = 150;

/// Render `palette` as text, one lowercase `rrggbb` per line. Alpha is not
/// written.
pub fn palette_to_string(palette: &Palette) -> String {
    let mut out = String::with_capacity(palette.len() * 7);
    for colour in palette {
        out.push_str(&colour.to_hex6());
        out.push('\n');
    }
    out
}

/// Write `palette` in text format to `path`.
pub fn write_palette(palette: &Palette, path: &Path) -> Result<()> {
    fs::write(path, palette_to_string(palette)).map_err(|e| MipaError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write palette: {}", e),
    })
}

/// Lay the palette out as a grid of `SWATCH_CELL_WIDTH`×`SWATCH_CELL_HEIGHT`
/// cells, `rows` rows high, filled row by row. Unused cells stay transparent.
pub fn swatch(palette: &Palette, rows: u32) -> Image {
    let rows = rows.max(1);
    let count = palette.len().max(1) as u32;
    let columns = count.div_ceil(rows);
    let rows = count.div_ceil(columns);

    let mut image = canvas(columns * SWATCH_CELL_WIDTH, rows * SWATCH_CELL_HEIGHT, Colour::TRANSPARENT);
    for (i, colour) in palette.iter().enumerate() {
        let (col, row) = (i as u32 % columns, i as u32 / columns);
        for y in 0..SWATCH_CELL_HEIGHT {
            for x in 0..SWATCH_CELL_WIDTH {
                image.put_pixel(
                    col * SWATCH_CELL_WIDTH + x,
                    row * SWATCH_CELL_HEIGHT + y,
                    image::Rgba(colour.to_rgba()),
                );
            }
        }
    }
    image
}

/// Write the swatch of `palette` to `path`.
pub fn write_swatch(palette: &Palette, path: &Path, rows: u32) -> Result<()> {
    save_image(&swatch(palette, rows), path)
}
