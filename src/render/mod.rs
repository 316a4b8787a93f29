//! Output side of the runtime: raster codecs, preview scaling and palette
//! files.

mod palette;
mod png;

pub use self::palette::{palette_to_string, swatch, write_palette, write_swatch};
pub use png::{load_image, save_image, scale_pixels, write_png};
