//! RGBA raster helpers.

use image::{Rgba, RgbaImage};

use super::Colour;

/// The raster type every runtime image value holds.
pub type Image = RgbaImage;

/// Colour of the pixel at `(x, y)`.
pub fn colour_at(image: &Image, x: u32, y: u32) -> Colour {
    Colour::from_rgba(image.get_pixel(x, y).0)
}

/// Overwrite the pixel at `(x, y)`.
pub fn set_colour(image: &mut Image, x: u32, y: u32, colour: Colour) {
    image.put_pixel(x, y, Rgba(colour.to_rgba()));
}

/// A `width`×`height` image filled with `fill`.
pub fn canvas(width: u32, height: u32, fill: Colour) -> Image {
    RgbaImage::from_pixel(width, height, Rgba(fill.to_rgba()))
}
