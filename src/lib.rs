//! mipa - colours, palettes and pixel-art quantization
//!
//! A small interactive language whose values are colours, palettes, images
//! and quantization recipes, plus the engine that rewrites images against
//! them.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod preview;
pub mod process;
pub mod quantize;
pub mod render;
pub mod runtime;
pub mod types;

pub use config::Config;
pub use error::{MipaError, Result};
pub use parser::{parse_palette, parse_script, read_palette, Expr, Statement};
pub use process::{extract, ExtractMethod, PixelSelector};
pub use quantize::{ColourStrategy, Picker, Quantizer, Sparsity};
pub use render::{load_image, palette_to_string, save_image, write_png, write_swatch};
pub use runtime::{Builtins, Flow, Handle, Interpreter, ProgramState, Value, ValueType};
pub use types::{canvas, BuiltinMatrices, Colour, DitherMatrix, Hsv, Image, Palette, Scheme, Spectre};
