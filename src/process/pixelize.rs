//! Block downscaling.

use std::fmt;
use std::str::FromStr;

use crate::error::{MipaError, Result};
use crate::types::{average, canvas, colour_at, set_colour, Colour, Image, Palette};

/// How one output pixel is chosen from its source block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelSelector {
    /// Per-channel mean.
    #[default]
    Average,
    /// Median by gray value.
    Median,
    /// Darkest by gray value.
    Min,
    /// Brightest by gray value.
    Max,
}

impl PixelSelector {
    fn select(self, block: &[Colour]) -> Option<Colour> {
        if let PixelSelector::Average = self {
            return average(block);
        }
        let sorted = Palette::from_colours(block.to_vec()).gray_sorted();
        match self {
            PixelSelector::Median => sorted.get(sorted.len() / 2),
            PixelSelector::Min => sorted.first(),
            _ => sorted.last(),
        }
    }
}

impl FromStr for PixelSelector {
    type Err = MipaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "avg" => Ok(PixelSelector::Average),
            "med" => Ok(PixelSelector::Median),
            "min" => Ok(PixelSelector::Min),
            "max" => Ok(PixelSelector::Max),
            other => Err(MipaError::UnknownPixelSelector(other.to_string())),
        }
    }
}

impl fmt::Display for PixelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelSelector::Average => "avg",
            PixelSelector::Median => "med",
            PixelSelector::Min => "min",
            PixelSelector::Max => "max",
        };
        write!(f, "{}", name)
    }
}

/// Output size for `pixelize`: the longer side takes its bound and the other
/// follows the source aspect ratio.
pub fn target_size(source: (u32, u32), max_width: u32, max_height: u32) -> (u32, u32) {
    let (w, h) = source;
    let ratio = h as f32 / w as f32;
    let (width, height) = if w > h {
        (max_width, (max_width as f32 * ratio) as u32)
    } else {
        ((max_height as f32 / ratio) as u32, max_height)
    };
    (width.max(1), height.max(1))
}

/// Downscale `image` to fit `max_width`×`max_height`, one selected colour per
/// source block.
pub fn pixelize(image: &Image, max_width: u32, max_height: u32, selector: PixelSelector) -> Image {
    let (src_w, src_h) = image.dimensions();
    if src_w == 0 || src_h == 0 {
        return image.clone();
    }
    let (width, height) = target_size((src_w, src_h), max_width, max_height);
    let block_w = src_w as f32 / width as f32;
    let block_h = src_h as f32 / height as f32;
    let span = |i: u32, block: f32, limit: u32| {
        let start = ((i as f32 * block) as u32).min(limit - 1);
        let end = (((i + 1) as f32 * block).ceil() as u32).clamp(start + 1, limit);
        start..end
    };

    let mut out = canvas(width, height, Colour::TRANSPARENT);
    let mut block = Vec::new();
    for j in 0..height {
        for i in 0..width {
            block.clear();
            for y in span(j, block_h, src_h) {
                for x in span(i, block_w, src_w) {
                    block.push(colour_at(image, x, y));
                }
            }
            if let Some(colour) = selector.select(&block) {
                set_colour(&mut out, i, j, colour);
            }
        }
    }
    out
}
