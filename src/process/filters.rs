//! Whole-image filters: channel normalisation, kernel convolution, blur and
//! Sobel edge outlining.

use crate::types::{colour_at, Colour, Image};

/// Below this strength `outline` leaves the image untouched.
const MIN_OUTLINE: f32 = 0.001;

/// A rectangular convolution kernel, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    width: usize,
    height: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Returns `None` if the weight count does not match the dimensions.
    pub fn new(width: usize, height: usize, weights: Vec<f32>) -> Option<Self> {
        if width == 0 || height == 0 || weights.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            weights,
        })
    }

    /// 3×3 Gaussian approximation.
    pub fn gaussian() -> Self {
        Self::fixed([
            1.0 / 16.0, 1.0 / 8.0, 1.0 / 16.0, //
            1.0 / 8.0, 1.0 / 4.0, 1.0 / 8.0, //
            1.0 / 16.0, 1.0 / 8.0, 1.0 / 16.0,
        ])
    }

    /// Horizontal Sobel gradient.
    pub fn sobel_x() -> Self {
        Self::fixed([
            -1.0, 0.0, 1.0, //
            -1.0, 0.0, 1.0, //
            -1.0, 0.0, 1.0,
        ])
    }

    /// Vertical Sobel gradient.
    pub fn sobel_y() -> Self {
        Self::fixed([
            1.0, 1.0, 1.0, //
            0.0, 0.0, 0.0, //
            -1.0, -1.0, -1.0,
        ])
    }

    fn fixed(weights: [f32; 9]) -> Self {
        Self {
            width: 3,
            height: 3,
            weights: weights.to_vec(),
        }
    }

    fn get(&self, row: usize, col: usize) -> f32 {
        self.weights[row * self.width + col]
    }
}

/// Stretch each RGB channel to the full `[0, 255]` range.
///
/// Channels whose values are all equal are left as they are.
pub fn normalize(image: &mut Image) {
    let mut min = [u8::MAX; 3];
    let mut max = [u8::MIN; 3];
    for pixel in image.pixels() {
        for ch in 0..3 {
            min[ch] = min[ch].min(pixel.0[ch]);
            max[ch] = max[ch].max(pixel.0[ch]);
        }
    }

    for pixel in image.pixels_mut() {
        for ch in 0..3 {
            let range = max[ch] as f32 - min[ch] as f32;
            if range > 0.0 {
                let v = 255.0 * (pixel.0[ch] as f32 - min[ch] as f32) / range;
                pixel.0[ch] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Convolve the RGB channels with `kernel`, centred on each pixel.
///
/// Samples falling outside the image contribute nothing. Results are
/// taken in absolute value and clamped; alpha is copied from the source.
pub fn convolve(image: &Image, kernel: &Kernel) -> Image {
    let (width, height) = image.dimensions();
    let half_w = (kernel.width / 2) as i64;
    let half_h = (kernel.height / 2) as i64;
    let mut out = image.clone();

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let mut acc = [0.0f32; 3];
        for row in 0..kernel.height {
            for col in 0..kernel.width {
                let sx = x as i64 - half_w + col as i64;
                let sy = y as i64 - half_h + row as i64;
                if sx < 0 || sy < 0 || sx >= width as i64 || sy >= height as i64 {
                    continue;
                }
                let src = image.get_pixel(sx as u32, sy as u32).0;
                let factor = kernel.get(row, col);
                for ch in 0..3 {
                    acc[ch] += factor * src[ch] as f32;
                }
            }
        }
        for ch in 0..3 {
            pixel.0[ch] = acc[ch].abs().round().min(255.0) as u8;
        }
    }
    out
}

/// Apply the Gaussian kernel `times` times.
pub fn blur(image: &Image, times: usize) -> Image {
    let kernel = Kernel::gaussian();
    let mut out = image.clone();
    for _ in 0..times {
        out = convolve(&out, &kernel);
    }
    out
}

/// Sobel edge magnitude of the gray-scale image.
///
/// Magnitudes below `threshold * 255` are dropped to black. Edge pixels are
/// opaque grays.
pub fn sobel(image: &Image, threshold: f32) -> Image {
    let mut gray = image.clone();
    for pixel in gray.pixels_mut() {
        pixel.0 = Colour::from_rgba(pixel.0).gray_scale().to_rgba();
    }

    let edges_x = convolve(&gray, &Kernel::sobel_x());
    let edges_y = convolve(&gray, &Kernel::sobel_y());
    let cutoff = threshold * 255.0;

    let mut edges = gray;
    for (x, y, pixel) in edges.enumerate_pixels_mut() {
        let gx = colour_at(&edges_x, x, y).r as f32;
        let gy = colour_at(&edges_y, x, y).r as f32;
        let g = (gx * gx + gy * gy).sqrt().min(255.0);
        let v = if g >= cutoff { g as u8 } else { 0 };
        pixel.0 = [v, v, v, 255];
    }
    edges
}

/// Darken `image` along its edges.
///
/// `strength` in `[0, 1]`: higher values keep weaker edges.
pub fn outline(image: &mut Image, strength: f32) {
    if strength < MIN_OUTLINE {
        return;
    }
    let edges = sobel(image, 1.0 - strength);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let edge = edges.get_pixel(x, y).0;
        for ch in 0..3 {
            pixel.0[ch] = pixel.0[ch].saturating_sub(edge[ch]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{canvas, set_colour};

    fn half_split() -> Image {
        let mut image = canvas(6, 4, Colour::BLACK);
        for y in 0..4 {
            for x in 3..6 {
                set_colour(&mut image, x, y, Colour::WHITE);
            }
        }
        image
    }

    #[test]
    fn test_normalize_stretches_channels() {
        let mut image = canvas(2, 1, Colour::rgb(50, 10, 77));
        set_colour(&mut image, 1, 0, Colour::rgb(150, 20, 77));
        normalize(&mut image);
        assert_eq!(colour_at(&image, 0, 0), Colour::rgb(0, 0, 77));
        assert_eq!(colour_at(&image, 1, 0), Colour::rgb(255, 255, 77));
    }

    #[test]
    fn test_identity_kernel() {
        let image = half_split();
        let identity = Kernel::new(1, 1, vec![1.0]).unwrap();
        assert_eq!(convolve(&image, &identity), image);
    }

    #[test]
    fn test_kernel_shape_checked() {
        assert!(Kernel::new(3, 3, vec![0.0; 8]).is_none());
    }

    #[test]
    fn test_blur_keeps_flat_interior() {
        let image = canvas(5, 5, Colour::rgb(80, 80, 80));
        let blurred = blur(&image, 2);
        assert_eq!(colour_at(&blurred, 2, 2), Colour::rgb(80, 80, 80));
        // zero padding darkens corners
        assert!(colour_at(&blurred, 0, 0).r < 80);
    }

    #[test]
    fn test_blur_zero_times() {
        let image = half_split();
        assert_eq!(blur(&image, 0), image);
    }

    #[test]
    fn test_sobel_finds_vertical_edge() {
        let edges = sobel(&half_split(), 0.5);
        assert_eq!(colour_at(&edges, 3, 1).r, 255);
        assert_eq!(colour_at(&edges, 0, 1).r, 0);
    }

    #[test]
    fn test_outline_darkens_edge() {
        let mut image = half_split();
        outline(&mut image, 0.5);
        assert_eq!(colour_at(&image, 3, 1), Colour::BLACK);
        assert_eq!(colour_at(&image, 5, 1).a, 255);
    }

    #[test]
    fn test_outline_weak_strength_is_noop() {
        let mut image = half_split();
        outline(&mut image, 0.0);
        assert_eq!(image, half_split());
    }
}
