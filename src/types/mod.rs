//! Core domain types for mipa.
//!
//! This module contains the data every other layer works on:
//! - `Colour` - RGBA colour values and per-colour math
//! - `Hsv` - the auxiliary HSV form
//! - `Palette` - ordered colour sequences and their ranking algorithms
//! - `DitherMatrix` - ordered-dither threshold grids
//! - `Image` - RGBA raster helpers

mod colour;
mod hsv;
mod raster;
mod matrix;
mod palette;

pub use colour::{Colour, BLUE_BRIGHTNESS, GREEN_BRIGHTNESS, RED_BRIGHTNESS};
pub use hsv::Hsv;
pub use raster::{canvas, colour_at, set_colour, Image};
pub use matrix::{BuiltinMatrices, DitherMatrix};
pub use self::palette::{average, Palette, Scheme, Spectre};
