//! Dither matrices and the registry of named presets.

use std::fmt;

use crate::error::{MipaError, Result};

/// A fixed grid of integer thresholds used by ordered dithering.
#[derive(Debug, Clone, PartialEq)]
pub struct DitherMatrix {
    name: String,
    width: usize,
    height: usize,
    cells: Vec<u32>,
}

impl DitherMatrix {
    /// Build a matrix from row-major cells.
    ///
    /// Returns `None` if the cell count does not match the dimensions or a
    /// dimension is zero.
    pub fn new(name: impl Into<String>, width: usize, height: usize, cells: Vec<u32>) -> Option<Self> {
        if width == 0 || height == 0 || cells.len() != width * height {
            return None;
        }
        Some(Self {
            name: name.into(),
            width,
            height,
            cells,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw threshold at `(x, y)`, tiled over the plane.
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.cells[(y % self.height) * self.width + (x % self.width)]
    }

    /// Threshold at `(x, y)` normalised by the cell count and centred on the
    /// matrix mean, so a matrix of equal cells never perturbs.
    ///
    /// For the Bayer presets the mean is `(n - 1) / 2`, so this is the usual
    /// `cell / n - 0.5` shifted by half a step and lies in `(-0.5, 0.5)`.
    /// Presets whose cells are not a permutation of `0..n` (`horizontal4`,
    /// `heart` and the other decorative ones) get a different bias than
    /// `cell / n - 0.5` would give them: their offsets average to zero
    /// instead of leaning towards darker or lighter.
    pub fn offset(&self, x: usize, y: usize) -> f32 {
        let n = self.cells.len() as f32;
        (self.get(x, y) as f32 - self.mean()) / n
    }

    fn mean(&self) -> f32 {
        self.cells.iter().map(|&c| c as f32).sum::<f32>() / self.cells.len() as f32
    }
}

impl fmt::Display for DitherMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{})", self.name, self.width, self.height)
    }
}

const BAYER_2: [u32; 4] = [
    0, 2, //
    3, 1,
];

const BAYER_4: [u32; 16] = [
    0, 8, 2, 10, //
    12, 4, 14, 6, //
    3, 11, 1, 9, //
    15, 7, 13, 5,
];

const BAYER_8: [u32; 64] = [
    0, 32, 8, 40, 2, 34, 10, 42, //
    48, 16, 56, 24, 50, 18, 58, 26, //
    12, 44, 4, 36, 14, 46, 6, 38, //
    60, 28, 52, 20, 62, 30, 54, 22, //
    3, 35, 11, 43, 1, 33, 9, 41, //
    51, 19, 59, 27, 49, 17, 57, 25, //
    15, 47, 7, 39, 13, 45, 5, 37, //
    63, 31, 55, 23, 61, 29, 53, 21,
];

const HORIZONTAL_2: [u32; 4] = [
    0, 1, //
    3, 3,
];

const HORIZONTAL_4: [u32; 16] = [
    0, 5, 0, 5, //
    5, 5, 5, 5, //
    15, 10, 15, 10, //
    15, 15, 15, 15,
];

const VERTICAL_2: [u32; 4] = [
    0, 3, //
    1, 3,
];

const VERTICAL_4: [u32; 16] = [
    0, 5, 15, 15, //
    5, 5, 10, 15, //
    0, 5, 15, 15, //
    5, 5, 10, 15,
];

const HEART: [u32; 64] = [
    0, 63, 63, 0, 63, 63, 0, 0, //
    63, 30, 30, 63, 30, 30, 63, 0, //
    63, 30, 15, 30, 15, 30, 63, 0, //
    63, 30, 15, 15, 15, 30, 63, 0, //
    0, 63, 30, 15, 30, 63, 0, 0, //
    1, 0, 63, 30, 63, 0, 0, 1, //
    2, 4, 0, 63, 0, 0, 4, 2, //
    3, 5, 6, 0, 0, 6, 5, 3,
];

/// Collection of builtin dither matrices.
pub struct BuiltinMatrices;

impl BuiltinMatrices {
    const PRESETS: [(&'static str, usize, &'static [u32]); 8] = [
        ("bayer2", 2, &BAYER_2),
        ("bayer4", 4, &BAYER_4),
        ("bayer8", 8, &BAYER_8),
        ("horizontal2", 2, &HORIZONTAL_2),
        ("horizontal4", 4, &HORIZONTAL_4),
        ("vertical2", 2, &VERTICAL_2),
        ("vertical4", 4, &VERTICAL_4),
        ("heart", 8, &HEART),
    ];

    /// Names of every preset, in registry order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::PRESETS.iter().map(|(name, _, _)| *name)
    }

    /// Get a builtin matrix by name (case-insensitive).
    pub fn get(name: &str) -> Option<DitherMatrix> {
        let wanted = name.to_lowercase();
        Self::PRESETS
            .iter()
            .find(|(preset, _, _)| *preset == wanted)
            .and_then(|(preset, side, cells)| DitherMatrix::new(*preset, *side, *side, cells.to_vec()))
    }

    /// Like `get`, failing with `UnknownMatrix`.
    pub fn resolve(name: &str) -> Result<DitherMatrix> {
        Self::get(name).ok_or_else(|| MipaError::UnknownMatrix {
            name: name.to_string(),
            help: Some(format!(
                "Available matrices: {}",
                Self::names().collect::<Vec<_>>().join(", ")
            )),
        })
    }
}
