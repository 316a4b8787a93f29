//! Raster file I/O.
//!
//! Loading and saving go through the `image` codecs; preview output adds
//! nearest-neighbour integer scaling.

use std::path::Path;

use image::{ImageBuffer, RgbaImage};

use crate::error::{MipaError, Result};
use crate::types::Image;

fn image_error(path: &Path, e: impl std::fmt::Display) -> MipaError {
    MipaError::ImageIo {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Decode any supported raster file into RGBA.
pub fn load_image(path: &Path) -> Result<Image> {
    Ok(image::open(path).map_err(|e| image_error(path, e))?.to_rgba8())
}

/// Encode `image` to `path`; the format follows the extension.
pub fn save_image(image: &Image, path: &Path) -> Result<()> {
    image.save(path).map_err(|e| image_error(path, e))
}

/// Upper bound on the pixel count of a scaled image.
pub const MAX_SCALED_PIXELS: u64 = 1 << 28;

/// Write `image` as a PNG, every pixel blown up to `scale`×`scale`.
pub fn write_png(image: &Image, path: &Path, scale: u32) -> Result<()> {
    save_image(&scale_pixels(image, scale)?, path)
}

/// Nearest-neighbour integer upscale. Scales below 2 return a copy.
///
/// Fails with `Limit` when the result would exceed [`MAX_SCALED_PIXELS`].
pub fn scale_pixels(image: &Image, scale: u32) -> Result<Image> {
    if scale <= 1 {
        return Ok(image.clone());
    }
    let (width, height) = image.dimensions();
    // u32::MAX^4 fits in u128
    let pixels = u128::from(width) * u128::from(height) * u128::from(scale) * u128::from(scale);
    if pixels > u128::from(MAX_SCALED_PIXELS) {
        return Err(MipaError::limit("scaled image pixel count", MAX_SCALED_PIXELS, pixels));
    }
    let mut scaled: RgbaImage = ImageBuffer::new(width * scale, height * scale);

    for (x, y, pixel) in image.enumerate_pixels() {
        for sy in 0..scale {
            for sx in 0..scale {
                scaled.put_pixel(x * scale + sx, y * scale + sy, *pixel);
            }
        }
    }
    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{canvas, colour_at, set_colour, Colour};
    use tempfile::tempdir;

    fn checker() -> Image {
        let mut image = canvas(2, 2, Colour::BLACK);
        set_colour(&mut image, 1, 0, Colour::WHITE);
        set_colour(&mut image, 0, 1, Colour::WHITE);
        image
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checker.png");

        save_image(&checker(), &path).unwrap();
        let back = load_image(&path).unwrap();
        assert_eq!(back, checker());
    }

    #[test]
    fn test_transparency_survives() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alpha.png");
        let image = canvas(1, 1, Colour::new(255, 0, 0, 128));

        save_image(&image, &path).unwrap();
        assert_eq!(load_image(&path).unwrap().get_pixel(0, 0).0, [255, 0, 0, 128]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_image(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, MipaError::ImageIo { .. }));
    }

    #[test]
    fn test_write_png_scaled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scaled.png");

        write_png(&checker(), &path, 3).unwrap();
        let img = load_image(&path).unwrap();
        assert_eq!(img.dimensions(), (6, 6));
        assert_eq!(colour_at(&img, 2, 2), Colour::BLACK);
        assert_eq!(colour_at(&img, 3, 0), Colour::WHITE);
        assert_eq!(colour_at(&img, 5, 5), Colour::BLACK);
    }

    #[test]
    fn test_scale_zero_treated_as_one() {
        assert_eq!(scale_pixels(&checker(), 0).unwrap(), checker());
    }

    #[test]
    fn test_oversized_scale_is_an_error() {
        let err = scale_pixels(&canvas(100, 100, Colour::BLACK), 100_000_000).unwrap_err();
        assert!(matches!(err, MipaError::Limit { .. }));

        let dir = tempdir().unwrap();
        let path = dir.path().join("huge.png");
        assert!(write_png(&checker(), &path, u32::MAX).is_err());
        assert!(!path.exists());
    }
}
