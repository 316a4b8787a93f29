//! HSV auxiliary colour form.

use std::fmt;

use super::Colour;

/// Below this chroma a colour counts as gray and its hue collapses to 0.
const GRAY_EPSILON: f32 = 1e-5;

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`, integer alpha.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
    pub a: u8,
}

impl Hsv {
    pub fn new(h: f32, s: f32, v: f32, a: u8) -> Self {
        Self { h, s, v, a }
    }

    /// Standard six-sector conversion from RGB.
    ///
    /// Gray and black have an undefined hue, reported as 0 with saturation 0.
    pub fn from_colour(colour: Colour) -> Self {
        let r = colour.r as f32 / 255.0;
        let g = colour.g as f32 / 255.0;
        let b = colour.b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        if delta < GRAY_EPSILON || max <= 0.0 {
            return Self::new(0.0, 0.0, max, colour.a);
        }

        let sector = if r >= max {
            (g - b) / delta
        } else if g >= max {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };

        let mut h = sector * 60.0;
        if h < 0.0 {
            h += 360.0;
        }
        Self::new(h, delta / max, max, colour.a)
    }

    /// Convert back to RGB. Hues outside `[0, 360)` wrap around.
    pub fn to_colour(self) -> Colour {
        let max = (self.v.clamp(0.0, 1.0) * 255.0).round();
        if self.s <= 0.0 {
            let gray = max as u8;
            return Colour::new(gray, gray, gray, self.a);
        }
        let s = self.s.min(1.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative hues
        let hue = match self.h.rem_euclid(360.0) {
            h if h >= 360.0 => 0.0,
            h => h / 60.0,
        };
        let sector = hue.floor();
        let ff = hue - sector;

        let p = max * (1.0 - s);
        let q = max * (1.0 - s * ff);
        let t = max * (1.0 - s * (1.0 - ff));

        let (r, g, b) = match sector as u32 {
            0 => (max, t, p),
            1 => (q, max, p),
            2 => (p, max, t),
            3 => (p, q, max),
            4 => (t, p, max),
            _ => (max, p, q),
        };
        let channel = |x: f32| x.round().clamp(0.0, 255.0) as u8;
        Colour::new(channel(r), channel(g), channel(b), self.a)
    }
}

impl From<Colour> for Hsv {
    fn from(colour: Colour) -> Self {
        Self::from_colour(colour)
    }
}

impl From<Hsv> for Colour {
    fn from(hsv: Hsv) -> Self {
        hsv.to_colour()
    }
}

impl fmt::Display for Hsv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsv({:.1}, {:.3}, {:.3}, {})", self.h, self.s, self.v, self.a)
    }
}
