//! Parsers for mipa scripts and palette text files.

mod lexer;
pub mod palette;
mod script;
pub mod span;

pub use self::palette::{parse_palette, read_palette};
pub use lexer::{tokenize, Lexer, Token};
pub use script::{parse_script, Expr, Parser, Statement};
pub use span::{Location, Spanned};
