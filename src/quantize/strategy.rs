//! Colour-selection strategies.
//!
//! A strategy maps an arbitrary colour onto one drawn from a palette or a
//! discretisation grid. Every strategy keeps the alpha of its input.

use std::fmt;

use crate::types::{Colour, Hsv, Palette};

/// How a palette strategy ranks candidate colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Picker {
    /// Squared Euclidean RGB distance.
    Rgb,
    /// Gray-value difference.
    Gray,
    /// Circular hue distance.
    Hue,
}

impl Picker {
    /// Nearest palette colour under this metric, first occurrence on ties.
    pub fn pick(self, palette: &Palette, colour: Colour) -> Option<Colour> {
        match self {
            Picker::Rgb => palette.nearest_by_colour(colour),
            Picker::Gray => palette.nearest_by_brightness(colour),
            Picker::Hue => palette.nearest_by_hue(colour),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Picker::Rgb => "closest_rgb",
            Picker::Gray => "closest_gray",
            Picker::Hue => "closest_hue",
        }
    }
}

/// A colour-selection policy.
#[derive(Debug, Clone, PartialEq)]
pub enum ColourStrategy {
    /// Leaves colours untouched.
    Identity,
    /// Nearest colour of a captured palette.
    Palette { palette: Palette, picker: Picker },
    /// Snap each RGB channel down to a grid of `levels` steps.
    DiscreteRgb { levels: [u32; 3] },
    /// Snap hue, saturation and value down to grids of `levels` steps.
    DiscreteHsv { levels: [u32; 3] },
}

impl ColourStrategy {
    pub fn closest(palette: Palette, picker: Picker) -> Self {
        ColourStrategy::Palette { palette, picker }
    }

    /// Zero levels are treated as one.
    pub fn discrete_rgb(r: u32, g: u32, b: u32) -> Self {
        ColourStrategy::DiscreteRgb {
            levels: [r.max(1), g.max(1), b.max(1)],
        }
    }

    /// Zero levels are treated as one.
    pub fn discrete_hsv(h: u32, s: u32, v: u32) -> Self {
        ColourStrategy::DiscreteHsv {
            levels: [h.max(1), s.max(1), v.max(1)],
        }
    }

    /// Map `colour` through the strategy.
    pub fn apply(&self, colour: Colour) -> Colour {
        match self {
            ColourStrategy::Identity => colour,
            ColourStrategy::Palette { palette, picker } => picker
                .pick(palette, colour)
                .map_or(colour, |c| c.with_alpha(colour.a)),
            ColourStrategy::DiscreteRgb { levels } => Colour::new(
                snap_channel(colour.r, levels[0]),
                snap_channel(colour.g, levels[1]),
                snap_channel(colour.b, levels[2]),
                colour.a,
            ),
            ColourStrategy::DiscreteHsv { levels } => {
                let hsv = colour.to_hsv();
                Hsv::new(
                    snap_unit(hsv.h / 360.0, levels[0]) * 360.0,
                    snap_unit(hsv.s, levels[1]),
                    snap_unit(hsv.v, levels[2]),
                    colour.a,
                )
                .to_colour()
            }
        }
    }

    /// Perturbation magnitude ordered dithering should use by default.
    ///
    /// Palette strategies recommend the square root of the palette size,
    /// discrete ones their coarsest channel step. Identity has no opinion.
    pub fn recommended_sparsity(&self) -> Option<f32> {
        match self {
            ColourStrategy::Identity => None,
            ColourStrategy::Palette { palette, .. } if palette.is_empty() => None,
            ColourStrategy::Palette { palette, .. } => Some((palette.len() as f32).sqrt()),
            ColourStrategy::DiscreteRgb { levels } | ColourStrategy::DiscreteHsv { levels } => {
                levels.iter().min().map(|&l| 255.0 / l as f32)
            }
        }
    }
}

impl fmt::Display for ColourStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColourStrategy::Identity => write!(f, "identity"),
            ColourStrategy::Palette { palette, picker } => {
                write!(f, "{}({} colours)", picker.name(), palette.len())
            }
            ColourStrategy::DiscreteRgb { levels: [r, g, b] } => {
                write!(f, "discrete_rgb({}, {}, {})", r, g, b)
            }
            ColourStrategy::DiscreteHsv { levels: [h, s, v] } => {
                write!(f, "discrete_hsv({}, {}, {})", h, s, v)
            }
        }
    }
}

/// Largest grid value `round(k * 255 / levels)` not above `value`.
///
/// Grid values map to themselves, so already-snapped colours are fixed points.
fn snap_channel(value: u8, levels: u32) -> u8 {
    let step = 255.0 / levels as f32;
    let grid = |k: f32| (k * step).round();
    let mut k = (value as f32 / step).floor();
    if grid(k + 1.0) <= value as f32 {
        k += 1.0;
    }
    grid(k).clamp(0.0, 255.0) as u8
}

/// Snap a unit value down to a multiple of `1 / levels`.
fn snap_unit(value: f32, levels: u32) -> f32 {
    let levels = levels as f32;
    ((value * levels + 1e-4).floor() / levels).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bw() -> Palette {
        Palette::from_colours(vec![Colour::BLACK, Colour::WHITE])
    }

    #[test]
    fn test_closest_rgb_picks_black() {
        let strategy = ColourStrategy::closest(bw(), Picker::Rgb);
        assert_eq!(strategy.apply(Colour::rgb(10, 10, 10)), Colour::BLACK);
        assert_eq!(strategy.apply(Colour::rgb(240, 200, 250)), Colour::WHITE);
    }

    #[test]
    fn test_palette_strategy_keeps_alpha() {
        let strategy = ColourStrategy::closest(bw(), Picker::Gray);
        assert_eq!(strategy.apply(Colour::new(250, 250, 250, 9)), Colour::new(255, 255, 255, 9));
    }

    #[test]
    fn test_empty_palette_is_identity() {
        let strategy = ColourStrategy::closest(Palette::new(), Picker::Hue);
        let c = Colour::rgb(1, 2, 3);
        assert_eq!(strategy.apply(c), c);
        assert_eq!(strategy.recommended_sparsity(), None);
    }

    #[test]
    fn test_discrete_rgb_snaps_down() {
        let strategy = ColourStrategy::discrete_rgb(4, 4, 4);
        assert_eq!(strategy.apply(Colour::rgb(0, 100, 255)), Colour::rgb(0, 64, 255));
        assert_eq!(strategy.apply(Colour::rgb(63, 64, 190)), Colour::rgb(0, 64, 128));
    }

    #[test]
    fn test_discrete_rgb_is_idempotent() {
        let strategy = ColourStrategy::discrete_rgb(4, 5, 7);
        for v in 0..=255u8 {
            let once = strategy.apply(Colour::rgb(v, v, v));
            assert_eq!(strategy.apply(once), once);
        }
    }

    #[test]
    fn test_discrete_hsv_snaps() {
        let strategy = ColourStrategy::discrete_hsv(6, 1, 1);
        // hue 100 snaps to 60 (yellow); full saturation and value survive
        let snapped = strategy.apply(Hsv::new(100.0, 1.0, 1.0, 255).to_colour());
        assert_eq!(snapped, Colour::rgb(255, 255, 0));
    }

    #[test]
    fn test_recommended_sparsity() {
        let p = Palette::from_colours(vec![Colour::BLACK; 16]);
        assert_eq!(ColourStrategy::closest(p, Picker::Rgb).recommended_sparsity(), Some(4.0));
        assert_eq!(ColourStrategy::discrete_rgb(2, 8, 4).recommended_sparsity(), Some(127.5));
        assert_eq!(ColourStrategy::Identity.recommended_sparsity(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ColourStrategy::closest(bw(), Picker::Rgb).to_string(), "closest_rgb(2 colours)");
        assert_eq!(ColourStrategy::discrete_hsv(12, 4, 4).to_string(), "discrete_hsv(12, 4, 4)");
    }
}
