//! Pixel-rewrite algorithms.
//!
//! Each quantizer walks the image row-major and replaces every pixel with a
//! colour chosen by a [`ColourStrategy`], optionally perturbing the input
//! (ordered dithering) or diffusing the quantization error to unvisited
//! neighbours (Floyd-Steinberg).

use std::fmt;

use crate::types::{colour_at, set_colour, Colour, DitherMatrix, Image};

use super::ColourStrategy;

/// Floyd-Steinberg error weights for the forward and lower neighbours:
///
/// ```text
///        *   7/16
///  3/16 5/16 1/16
/// ```
const FS_NEIGHBOURS: [(i64, i64, f32); 4] = [
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

/// Perturbation magnitude for ordered dithering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sparsity {
    /// Always use this magnitude.
    Fixed(f32),
    /// Ask the strategy; fall back to the value when it has no opinion.
    Auto { fallback: f32 },
}

impl Sparsity {
    pub fn resolve(self, strategy: &ColourStrategy) -> f32 {
        match self {
            Sparsity::Fixed(value) => value,
            Sparsity::Auto { fallback } => strategy.recommended_sparsity().unwrap_or(fallback),
        }
    }
}

/// An image rewrite algorithm.
#[derive(Debug, Clone, PartialEq)]
pub enum Quantizer {
    /// Replace each pixel with `strategy(pixel)`.
    Direct,
    /// Matrix-driven perturbation before the strategy lookup.
    Ordered {
        matrix: DitherMatrix,
        sparsity: Sparsity,
        threshold: f32,
    },
    /// Error diffusion to the four forward neighbours.
    FloydSteinberg { threshold: f32 },
}

impl Quantizer {
    pub fn ordered(matrix: DitherMatrix, sparsity: Sparsity, threshold: f32) -> Self {
        Quantizer::Ordered {
            matrix,
            sparsity,
            threshold,
        }
    }

    pub fn floyd_steinberg(threshold: f32) -> Self {
        Quantizer::FloydSteinberg { threshold }
    }

    /// Rewrite `image` in place.
    pub fn apply(&self, image: &mut Image, strategy: &ColourStrategy) {
        match self {
            Quantizer::Direct => quantize_direct(image, strategy),
            Quantizer::Ordered {
                matrix,
                sparsity,
                threshold,
            } => dither_ordered(image, strategy, matrix, sparsity.resolve(strategy), *threshold),
            Quantizer::FloydSteinberg { threshold } => {
                dither_floyd_steinberg(image, strategy, *threshold)
            }
        }
    }
}

impl fmt::Display for Quantizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantizer::Direct => write!(f, "direct"),
            Quantizer::Ordered {
                matrix,
                sparsity,
                threshold,
            } => {
                write!(f, "dither_ord({}, sparsity=", matrix.name())?;
                match sparsity {
                    Sparsity::Fixed(value) => write!(f, "{}", value)?,
                    Sparsity::Auto { .. } => write!(f, "auto")?,
                }
                write!(f, ", threshold={})", threshold)
            }
            Quantizer::FloydSteinberg { threshold } => {
                write!(f, "dither_fs(threshold={})", threshold)
            }
        }
    }
}

/// Whether two colours differ by more than `threshold` in RGB space.
fn exceeds(a: Colour, b: Colour, threshold: f32) -> bool {
    a.squared_distance(b) as f32 > threshold * threshold
}

fn quantize_direct(image: &mut Image, strategy: &ColourStrategy) {
    for pixel in image.pixels_mut() {
        pixel.0 = strategy.apply(Colour::from_rgba(pixel.0)).to_rgba();
    }
}

/// Ordered dithering.
///
/// Each RGB channel is shifted by `sparsity * offset(x, y)` before the
/// strategy lookup. The perturbed result wins only where it lands further
/// than `threshold` from the unperturbed one. Alpha is always kept.
fn dither_ordered(
    image: &mut Image,
    strategy: &ColourStrategy,
    matrix: &DitherMatrix,
    sparsity: f32,
    threshold: f32,
) {
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let old = Colour::from_rgba(pixel.0);
        let shift = sparsity * matrix.offset(x as usize, y as usize);
        let nudge = |c: u8| (c as f32 + shift).round().clamp(0.0, 255.0) as u8;

        let perturbed = Colour::new(nudge(old.r), nudge(old.g), nudge(old.b), old.a);
        let quantized_old = strategy.apply(old);
        let quantized_new = strategy.apply(perturbed);

        let chosen = if exceeds(quantized_old, quantized_new, threshold) {
            quantized_new
        } else {
            quantized_old
        };
        pixel.0 = chosen.with_alpha(old.a).to_rgba();
    }
}

/// Floyd-Steinberg error diffusion.
///
/// Errors are accumulated directly in the image, so each neighbour channel
/// is clamped to `[0, 255]` as it receives its share.
fn dither_floyd_steinberg(image: &mut Image, strategy: &ColourStrategy, threshold: f32) {
    let (width, height) = image.dimensions();

    for y in 0..height {
        for x in 0..width {
            let old = colour_at(image, x, y);
            let new = strategy.apply(old);
            set_colour(image, x, y, new);

            if !exceeds(old, new, threshold) {
                continue;
            }

            let err = [
                old.r as f32 - new.r as f32,
                old.g as f32 - new.g as f32,
                old.b as f32 - new.b as f32,
            ];

            for (dx, dy, weight) in FS_NEIGHBOURS {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                let n = colour_at(image, nx, ny);
                let spread = |c: u8, e: f32| (c as f32 + e * weight).round().clamp(0.0, 255.0) as u8;
                set_colour(
                    image,
                    nx,
                    ny,
                    Colour::new(spread(n.r, err[0]), spread(n.g, err[1]), spread(n.b, err[2]), n.a),
                );
            }
        }
    }
}
