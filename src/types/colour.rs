//! Colour type, parsing and per-colour math.

use std::fmt;
use std::str::FromStr;

use palette::{Hsl, IntoColor, Srgb};

use crate::error::{MipaError, Result};

use super::hsv::Hsv;

/// Red weight of the perceptual gray value.
pub const RED_BRIGHTNESS: f32 = 0.241;
/// Green weight of the perceptual gray value.
pub const GREEN_BRIGHTNESS: f32 = 0.601;
/// Blue weight of the perceptual gray value.
pub const BLUE_BRIGHTNESS: f32 = 0.068;

/// An RGBA colour value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    /// Create a new colour from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque colour from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fully transparent colour.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Parse a hex colour string.
    ///
    /// Supports formats:
    /// - `#RGB` (3 digits, expanded to 6)
    /// - `#RGBA` (4 digits, expanded to 8)
    /// - `#RRGGBB` (6 digits)
    /// - `#RRGGBBAA` (8 digits)
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);
        let digits: Vec<u8> = hex
            .chars()
            .map(parse_hex_digit)
            .collect::<Result<_>>()?;

        match digits.as_slice() {
            [r, g, b] => Ok(Self::rgb(r << 4 | r, g << 4 | g, b << 4 | b)),
            [r, g, b, a] => Ok(Self::new(r << 4 | r, g << 4 | g, b << 4 | b, a << 4 | a)),
            [r1, r2, g1, g2, b1, b2] => Ok(Self::rgb(r1 << 4 | r2, g1 << 4 | g2, b1 << 4 | b2)),
            [r1, r2, g1, g2, b1, b2, a1, a2] => Ok(Self::new(
                r1 << 4 | r2,
                g1 << 4 | g2,
                b1 << 4 | b2,
                a1 << 4 | a2,
            )),
            _ => Err(MipaError::Parse {
                message: format!("Invalid hex colour: {}", s),
                help: Some("Use #RGB, #RGBA, #RRGGBB, or #RRGGBBAA format".to_string()),
            }),
        }
    }

    /// Lowercase `rrggbb` form used by palette files (alpha dropped).
    pub fn to_hex6(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert to RGBA tuple.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Build from an RGBA tuple.
    pub fn from_rgba(rgba: [u8; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    /// Check if the colour is fully transparent.
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Check if the colour is fully opaque.
    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Same colour with another alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Convert to HSV.
    pub fn to_hsv(self) -> Hsv {
        Hsv::from_colour(self)
    }

    /// Perceptual brightness in `[0, 1)`.
    ///
    /// Yellow reads brighter than blue at equal channel magnitude.
    pub fn gray_value(self) -> f32 {
        self.weighted_magnitude() / 255.0
    }

    /// Gray colour of the same perceptual brightness.
    pub fn gray_scale(self) -> Colour {
        let gray = self.weighted_magnitude() as u8;
        Colour::new(gray, gray, gray, self.a)
    }

    fn weighted_magnitude(self) -> f32 {
        let (r, g, b) = (self.r as f32, self.g as f32, self.b as f32);
        (r * r * RED_BRIGHTNESS + g * g * GREEN_BRIGHTNESS + b * b * BLUE_BRIGHTNESS).sqrt()
    }

    /// Squared Euclidean RGB distance.
    pub fn squared_distance(self, other: Colour) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Euclidean RGB distance.
    pub fn distance(self, other: Colour) -> f32 {
        (self.squared_distance(other) as f32).sqrt()
    }

    /// Absolute difference of gray values.
    pub fn gray_distance(self, other: Colour) -> f32 {
        (self.gray_value() - other.gray_value()).abs()
    }

    /// Circular hue distance in degrees, `[0, 180]`.
    pub fn hue_distance(self, other: Colour) -> f32 {
        let d = (self.to_hsv().h - other.to_hsv().h).abs();
        d.min(360.0 - d)
    }

    /// Linear interpolation, `t = 0` is `self`, `t = 1` is `to`.
    pub fn lerp(self, to: Colour, t: f32) -> Colour {
        let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8;
        Colour::new(
            channel(self.r, to.r),
            channel(self.g, to.g),
            channel(self.b, to.b),
            channel(self.a, to.a),
        )
    }

    /// Rotate hue by `degrees`.
    pub fn shift_hue(self, degrees: f32) -> Colour {
        let mut hsv = self.to_hsv();
        hsv.h += degrees;
        hsv.to_colour()
    }

    /// Replace HSV saturation with `t`.
    pub fn with_saturation(self, t: f32) -> Colour {
        let mut hsv = self.to_hsv();
        hsv.s = t.clamp(0.0, 1.0);
        hsv.to_colour()
    }

    /// Move HSL lightness toward white (positive) or black (negative) by percent.
    pub fn adjust_lightness(self, percent: f32) -> Colour {
        self.adjust_hsl(|hsl| {
            hsl.lightness = towards(hsl.lightness, percent / 100.0);
        })
    }

    /// Move HSL saturation toward full (positive) or gray (negative) by percent.
    pub fn adjust_saturation(self, percent: f32) -> Colour {
        self.adjust_hsl(|hsl| {
            hsl.saturation = towards(hsl.saturation, percent / 100.0);
        })
    }

    fn adjust_hsl(self, f: impl FnOnce(&mut Hsl)) -> Colour {
        let rgb: Srgb<f32> = Srgb::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        );
        let mut hsl: Hsl = rgb.into_color();
        f(&mut hsl);
        let out: Srgb<f32> = hsl.into_color();
        Colour::new(
            (out.red * 255.0).round().clamp(0.0, 255.0) as u8,
            (out.green * 255.0).round().clamp(0.0, 255.0) as u8,
            (out.blue * 255.0).round().clamp(0.0, 255.0) as u8,
            self.a,
        )
    }
}

/// Move a unit value toward 1.0 (positive delta) or 0.0 (negative delta),
/// relative to the remaining range.
fn towards(value: f32, delta: f32) -> f32 {
    let moved = if delta > 0.0 {
        value + (1.0 - value) * delta
    } else {
        value + value * delta
    };
    moved.clamp(0.0, 1.0)
}

impl FromStr for Colour {
    type Err = MipaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Parse a single hex digit.
fn parse_hex_digit(c: char) -> Result<u8> {
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| MipaError::Parse {
            message: format!("Invalid hex digit: {}", c),
            help: None,
        })
}
