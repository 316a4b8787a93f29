//! Ordered colour palettes and the algorithms that rank and build them.

use std::fmt;
use std::str::FromStr;

use crate::error::{MipaError, Result};

use super::Colour;

/// An ordered sequence of colours.
///
/// Duplicates are allowed. Order matters for gradients and spectre layouts
/// but not for nearest-colour queries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    colours: Vec<Colour>,
}

impl Palette {
    /// Create a new empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_colours(colours: Vec<Colour>) -> Self {
        Self { colours }
    }

    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }

    pub fn into_colours(self) -> Vec<Colour> {
        self.colours
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Colour> {
        self.colours.iter()
    }

    /// Get the number of colours.
    pub fn len(&self) -> usize {
        self.colours.len()
    }

    /// Check if the palette is empty.
    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Colour> {
        self.colours.get(index).copied()
    }

    pub fn first(&self) -> Option<Colour> {
        self.colours.first().copied()
    }

    pub fn last(&self) -> Option<Colour> {
        self.colours.last().copied()
    }

    pub fn push(&mut self, colour: Colour) {
        self.colours.push(colour);
    }

    /// Append every colour of `other`, preserving order.
    pub fn extend_from(&mut self, other: &Palette) {
        self.colours.extend_from_slice(&other.colours);
    }

    /// Apply a per-colour transform.
    pub fn map(&self, f: impl Fn(Colour) -> Colour) -> Palette {
        Palette::from_colours(self.colours.iter().map(|&c| f(c)).collect())
    }

    pub fn reversed(&self) -> Palette {
        Palette::from_colours(self.colours.iter().rev().copied().collect())
    }

    /// Sort by ascending gray value.
    pub fn gray_sorted(&self) -> Palette {
        let mut colours = self.colours.clone();
        colours.sort_by(|a, b| a.gray_value().total_cmp(&b.gray_value()));
        Palette::from_colours(colours)
    }

    /// Remove adjacent duplicates.
    pub fn dedup(&self) -> Palette {
        let mut colours = self.colours.clone();
        colours.dedup();
        Palette::from_colours(colours)
    }

    /// Copy sorted by ascending squared RGB distance to `colour`.
    ///
    /// The sort is stable, so ties keep their palette order and index 0 is
    /// the nearest match.
    pub fn closest_by_colour(&self, colour: Colour) -> Palette {
        let mut colours = self.colours.clone();
        colours.sort_by_key(|c| colour.squared_distance(*c));
        Palette::from_colours(colours)
    }

    /// Copy sorted by ascending gray-value difference to `colour`.
    pub fn closest_by_brightness(&self, colour: Colour) -> Palette {
        let key = colour.gray_value();
        let mut colours = self.colours.clone();
        colours.sort_by(|a, b| (key - a.gray_value()).abs().total_cmp(&(key - b.gray_value()).abs()));
        Palette::from_colours(colours)
    }

    /// Copy sorted by ascending circular hue distance to `colour`.
    pub fn closest_by_hue(&self, colour: Colour) -> Palette {
        let mut colours = self.colours.clone();
        colours.sort_by(|a, b| colour.hue_distance(*a).total_cmp(&colour.hue_distance(*b)));
        Palette::from_colours(colours)
    }

    /// First colour with minimal squared RGB distance.
    pub fn nearest_by_colour(&self, colour: Colour) -> Option<Colour> {
        self.colours
            .iter()
            .copied()
            .min_by_key(|c| colour.squared_distance(*c))
    }

    /// First colour with minimal gray-value difference.
    pub fn nearest_by_brightness(&self, colour: Colour) -> Option<Colour> {
        let key = colour.gray_value();
        self.colours
            .iter()
            .copied()
            .min_by(|a, b| (key - a.gray_value()).abs().total_cmp(&(key - b.gray_value()).abs()))
    }

    /// First colour with minimal circular hue distance.
    pub fn nearest_by_hue(&self, colour: Colour) -> Option<Colour> {
        self.colours
            .iter()
            .copied()
            .min_by(|a, b| colour.hue_distance(*a).total_cmp(&colour.hue_distance(*b)))
    }

    /// Append `steps` colours interpolated between the last colour of `self`
    /// and the first colour of `to`, then all of `to`.
    ///
    /// With `steps == 0` this is plain concatenation.
    pub fn gradient(&self, to: &Palette, steps: usize) -> Palette {
        let mut out = self.clone();
        if let (Some(last), Some(first)) = (self.last(), to.first()) {
            let step = 1.0 / (steps + 1) as f32;
            for i in 1..=steps {
                out.push(last.lerp(first, step * i as f32));
            }
        }
        out.extend_from(to);
        out
    }

    /// Base colours of a colour-harmony scheme around `main`.
    pub fn scheme(main: Colour, scheme: Scheme) -> Palette {
        let hues: &[f32] = match scheme {
            Scheme::Mono => &[0.0],
            Scheme::Analogous => &[30.0, 0.0, 330.0, -30.0],
            Scheme::Complementary => &[180.0, -180.0, 0.0],
            Scheme::Triadic => &[120.0, 0.0, -120.0, 240.0],
            Scheme::SplitComplementary => &[150.0, 0.0, 210.0, -150.0],
            Scheme::Rectangle => &[0.0, 60.0, 180.0, -180.0, -120.0, 240.0],
            Scheme::Square => &[0.0, 90.0, 180.0, -180.0, -90.0, 270.0],
        };
        Palette::from_colours(
            hues.iter()
                .map(|&angle| if angle == 0.0 { main } else { main.shift_hue(angle) })
                .collect(),
        )
    }

    /// Extend a palette toward black and white.
    ///
    /// The darkest end is the first colour pulled toward black by
    /// `disparity`, the lightest is the last colour pulled toward white; `inter`
    /// intermediate steps are split across both gradients.
    pub fn spectre(&self, inter: usize, disparity: f32, layout: Spectre) -> Palette {
        match layout {
            Spectre::Linear => self.closest_by_brightness(Colour::BLACK).spectre_of(inter, disparity),
            Spectre::Complete => {
                let mut out = Palette::new();
                for &colour in &self.colours {
                    out.extend_from(&Palette::from_colours(vec![colour]).spectre_of(inter, disparity));
                }
                out
            }
        }
    }

    fn spectre_of(&self, inter: usize, disparity: f32) -> Palette {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return Palette::new();
        };
        let darkest = first.lerp(Colour::BLACK, disparity);
        let lightest = last.lerp(Colour::WHITE, disparity);
        let half = Palette::from_colours(vec![darkest]).gradient(self, inter / 2);
        half.gradient(&Palette::from_colours(vec![lightest]), inter.div_ceil(2))
    }
}

/// Per-channel mean (alpha included), `None` for an empty slice.
pub fn average(colours: &[Colour]) -> Option<Colour> {
    if colours.is_empty() {
        return None;
    }
    let n = colours.len() as u64;
    let mut sum = [0u64; 4];
    for c in colours {
        for (acc, v) in sum.iter_mut().zip(c.to_rgba()) {
            *acc += v as u64;
        }
    }
    Some(Colour::new(
        (sum[0] / n) as u8,
        (sum[1] / n) as u8,
        (sum[2] / n) as u8,
        (sum[3] / n) as u8,
    ))
}

impl FromIterator<Colour> for Palette {
    fn from_iter<I: IntoIterator<Item = Colour>>(iter: I) -> Self {
        Palette::from_colours(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Colour;
    type IntoIter = std::slice::Iter<'a, Colour>;

    fn into_iter(self) -> Self::IntoIter {
        self.colours.iter()
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.colours.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "]")
    }
}

/// Colour-harmony schemes for `Palette::scheme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Mono,
    Analogous,
    Complementary,
    Triadic,
    SplitComplementary,
    Rectangle,
    Square,
}

impl FromStr for Scheme {
    type Err = MipaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mono" => Ok(Scheme::Mono),
            "analogous" => Ok(Scheme::Analogous),
            "complementary" => Ok(Scheme::Complementary),
            "triadic" => Ok(Scheme::Triadic),
            "split_complementary" => Ok(Scheme::SplitComplementary),
            "rectangle" => Ok(Scheme::Rectangle),
            "square" => Ok(Scheme::Square),
            _ => Err(MipaError::Parse {
                message: format!("Unknown colour scheme: {}", s),
                help: Some(
                    "Available schemes: mono, analogous, complementary, triadic, \
                     split_complementary, rectangle, square"
                        .to_string(),
                ),
            }),
        }
    }
}

/// Layout of `Palette::spectre`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spectre {
    /// One brightness-sorted run from dark to light.
    #[default]
    Linear,
    /// One dark-to-light run per base colour, concatenated.
    Complete,
}

impl FromStr for Spectre {
    type Err = MipaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Spectre::Linear),
            "complete" => Ok(Spectre::Complete),
            _ => Err(MipaError::Parse {
                message: format!("Unknown spectre layout: {}", s),
                help: Some("Use \"linear\" or \"complete\"".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rgb(r: u8, g: u8, b: u8) -> Colour {
        Colour::rgb(r, g, b)
    }

    #[test]
    fn test_gradient_zero_steps_is_concatenation() {
        let p = Palette::from_colours(vec![rgb(1, 2, 3), rgb(4, 5, 6)]);
        let q = Palette::from_colours(vec![rgb(7, 8, 9)]);
        let g = p.gradient(&q, 0);
        assert_eq!(g.colours(), &[rgb(1, 2, 3), rgb(4, 5, 6), rgb(7, 8, 9)]);
    }

    #[test]
    fn test_gradient_interpolates_between_edges() {
        let p = Palette::from_colours(vec![Colour::BLACK]);
        let q = Palette::from_colours(vec![Colour::WHITE]);
        let g = p.gradient(&q, 1);
        assert_eq!(g.colours(), &[Colour::BLACK, rgb(128, 128, 128), Colour::WHITE]);
        assert_eq!(p.gradient(&q, 3).len(), 5);
    }

    #[test]
    fn test_gradient_with_empty_side() {
        let p = Palette::new();
        let q = Palette::from_colours(vec![Colour::WHITE]);
        assert_eq!(p.gradient(&q, 4), q);
        assert_eq!(q.gradient(&p, 4), q);
    }

    #[test]
    fn test_closest_by_colour_first_is_minimal() {
        let palette = Palette::from_colours(vec![
            rgb(200, 0, 0),
            rgb(0, 0, 0),
            rgb(255, 255, 255),
            rgb(20, 20, 20),
        ]);
        let target = rgb(12, 12, 12);
        let sorted = palette.closest_by_colour(target);
        let best = sorted.get(0).unwrap();
        for c in palette.iter() {
            assert!(target.squared_distance(best) <= target.squared_distance(*c));
        }
        assert_eq!(palette.nearest_by_colour(target), Some(best));
    }

    #[test]
    fn test_closest_ties_keep_first_occurrence() {
        let a = rgb(10, 0, 0);
        let b = rgb(0, 10, 0);
        let palette = Palette::from_colours(vec![a, b]);
        assert_eq!(palette.closest_by_colour(Colour::BLACK).get(0), Some(a));
        assert_eq!(palette.nearest_by_colour(Colour::BLACK), Some(a));
    }

    #[test]
    fn test_closest_by_brightness() {
        let palette = Palette::from_colours(vec![Colour::WHITE, Colour::BLACK, rgb(128, 128, 128)]);
        let sorted = palette.closest_by_brightness(rgb(100, 100, 100));
        assert_eq!(sorted.get(0), Some(rgb(128, 128, 128)));
        assert_eq!(sorted.get(2), Some(Colour::WHITE));
    }

    #[test]
    fn test_nearest_by_hue() {
        let palette = Palette::from_colours(vec![rgb(0, 0, 255), rgb(0, 255, 0), rgb(255, 0, 0)]);
        assert_eq!(palette.nearest_by_hue(rgb(40, 200, 30)), Some(rgb(0, 255, 0)));
    }

    #[test]
    fn test_gray_sorted() {
        let palette = Palette::from_colours(vec![Colour::WHITE, Colour::BLACK, rgb(0, 0, 255)]);
        let sorted = palette.gray_sorted();
        assert_eq!(sorted.colours(), &[Colour::BLACK, rgb(0, 0, 255), Colour::WHITE]);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&[]), None);
        assert_eq!(average(&[Colour::BLACK, Colour::WHITE]), Some(rgb(127, 127, 127)));
    }

    #[test]
    fn test_scheme_sizes() {
        let main = rgb(0, 255, 0);
        assert_eq!(Palette::scheme(main, Scheme::Mono).colours(), &[main]);
        assert_eq!(Palette::scheme(main, Scheme::Analogous).len(), 4);
        assert_eq!(Palette::scheme(main, Scheme::Square).len(), 6);
        let comp = Palette::scheme(main, Scheme::Complementary);
        assert_eq!(comp.get(0), Some(rgb(255, 0, 255)));
    }

    #[test]
    fn test_scheme_parse() {
        assert_eq!("triadic".parse::<Scheme>().unwrap(), Scheme::Triadic);
        assert!("plaid".parse::<Scheme>().is_err());
    }

    #[test]
    fn test_spectre_linear_bounds() {
        let base = Palette::from_colours(vec![rgb(0, 200, 0)]);
        let spectre = base.spectre(2, 1.0, Spectre::Linear);
        // darkest, 1 step, base, 1 step, lightest
        assert_eq!(spectre.len(), 5);
        assert_eq!(spectre.first(), Some(Colour::BLACK));
        assert_eq!(spectre.last(), Some(Colour::WHITE));
        assert_eq!(spectre.get(2), Some(rgb(0, 200, 0)));
    }

    #[test]
    fn test_spectre_complete_one_run_per_colour() {
        let base = Palette::from_colours(vec![rgb(255, 0, 0), rgb(0, 0, 255)]);
        let spectre = base.spectre(0, 0.5, Spectre::Complete);
        assert_eq!(spectre.len(), 6);
    }

    #[test]
    fn test_display() {
        let p = Palette::from_colours(vec![Colour::BLACK, Colour::WHITE]);
        insta::assert_snapshot!(p.to_string(), @"[#000000, #FFFFFF]");
    }
}
