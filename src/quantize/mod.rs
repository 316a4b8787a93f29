//! Quantization engine.
//!
//! A [`ColourStrategy`] decides which colour a pixel becomes; a [`Quantizer`]
//! decides how the image is walked and whether errors or matrix offsets
//! influence that decision.

mod dither;
mod strategy;

pub use dither::{Quantizer, Sparsity};
pub use strategy::{ColourStrategy, Picker};
