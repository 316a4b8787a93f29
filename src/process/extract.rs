//! Palette extraction from images.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{MipaError, Result};
use crate::types::{average, Colour, Image, Palette};

/// Palette extraction algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMethod {
    /// Equal RGB sub-cubes, `depth³` of them.
    Simple,
    /// Recursive median cuts, `depth` rounds.
    #[default]
    MedianCut,
}

impl FromStr for ExtractMethod {
    type Err = MipaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "simple" => Ok(ExtractMethod::Simple),
            "median" | "median_cut" => Ok(ExtractMethod::MedianCut),
            other => Err(MipaError::Parse {
                message: format!("Unknown extraction method: {}", other),
                help: Some("Use \"simple\" or \"median\"".to_string()),
            }),
        }
    }
}

impl ExtractMethod {
    /// Largest meaningful depth: one sub-cube per 8-bit channel value for
    /// `Simple`, and enough cuts to separate any image for `MedianCut`.
    pub fn max_depth(self) -> u32 {
        match self {
            ExtractMethod::Simple => 256,
            ExtractMethod::MedianCut => 32,
        }
    }

    /// `depth` if it is within [`ExtractMethod::max_depth`].
    pub fn check_depth(self, depth: u32) -> Result<u32> {
        let max = self.max_depth();
        if depth > max {
            return Err(MipaError::limit(format!("{} extraction depth", self), max as u64, depth));
        }
        Ok(depth)
    }
}

impl fmt::Display for ExtractMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractMethod::Simple => write!(f, "simple"),
            ExtractMethod::MedianCut => write!(f, "median"),
        }
    }
}

/// Extract a palette with the given method.
pub fn extract(image: &Image, method: ExtractMethod, depth: u32, allow_unexistent: bool) -> Palette {
    match method {
        ExtractMethod::Simple => extract_simple(image, depth, allow_unexistent),
        ExtractMethod::MedianCut => extract_median_cut(image, depth, allow_unexistent),
    }
}

/// Partition the RGB cube into `factor³` equal sub-cubes and emit one colour
/// per non-empty sub-cube, in red-major cube order.
///
/// Factors above 256 give the same result as 256 and are clamped.
pub fn extract_simple(image: &Image, factor: u32, allow_unexistent: bool) -> Palette {
    let factor = factor.clamp(1, ExtractMethod::Simple.max_depth()) as usize;
    let cell = |v: u8| (factor * v as usize) / 256;

    // only occupied cubes are stored, keyed by cube index
    let mut cubes: BTreeMap<usize, Vec<Colour>> = BTreeMap::new();
    for pixel in image.pixels() {
        let c = Colour::from_rgba(pixel.0);
        let index = (cell(c.r) * factor + cell(c.g)) * factor + cell(c.b);
        cubes.entry(index).or_default().push(c);
    }

    cubes
        .values()
        .filter_map(|members| representative(members, allow_unexistent))
        .collect()
}

/// Median-cut extraction: up to `2^cuts` colours.
///
/// Pixels are ordered brightest first and adjacent duplicates dropped before
/// cutting. Each cut splits every subset at the median of its widest RGB
/// channel.
pub fn extract_median_cut(image: &Image, cuts: u32, allow_unexistent: bool) -> Palette {
    let pixels: Palette = image.pixels().map(|p| Colour::from_rgba(p.0)).collect();
    let seed = pixels.closest_by_brightness(Colour::WHITE).dedup().into_colours();

    let mut subsets = vec![seed];
    for _ in 0..cuts {
        subsets = subsets
            .into_iter()
            .filter(|s| !s.is_empty())
            .flat_map(|s| {
                let (low, high) = median_cut(s);
                [low, high]
            })
            .collect();
    }

    subsets
        .iter()
        .filter_map(|members| representative(members, allow_unexistent))
        .collect()
}

/// Split at the median of the channel with the widest value range.
fn median_cut(mut subset: Vec<Colour>) -> (Vec<Colour>, Vec<Colour>) {
    let range = |f: fn(&Colour) -> u8| {
        let (min, max) = subset
            .iter()
            .map(f)
            .fold((u8::MAX, u8::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        max.saturating_sub(min)
    };
    let (dr, dg, db) = (range(|c| c.r), range(|c| c.g), range(|c| c.b));

    if dr >= dg && dr >= db {
        subset.sort_by_key(|c| c.r);
    } else if dg >= db {
        subset.sort_by_key(|c| c.g);
    } else {
        subset.sort_by_key(|c| c.b);
    }
    let high = subset.split_off(subset.len() / 2);
    (subset, high)
}

/// Mean of `members`, optionally snapped to the nearest actual member.
fn representative(members: &[Colour], allow_unexistent: bool) -> Option<Colour> {
    let avg = average(members)?;
    if allow_unexistent {
        Some(avg)
    } else {
        Palette::from_colours(members.to_vec()).nearest_by_colour(avg)
    }
}
