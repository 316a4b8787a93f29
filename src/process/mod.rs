//! Image processing: filters, downscaling and palette extraction.

mod extract;
mod filters;
mod pixelize;

pub use extract::{extract, extract_median_cut, extract_simple, ExtractMethod};
pub use filters::{blur, convolve, normalize, outline, sobel, Kernel};
pub use pixelize::{pixelize, target_size, PixelSelector};
