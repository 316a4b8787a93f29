//! Palette text files.
//!
//! One colour per line as `rrggbb` (a leading `#` is tolerated). Alpha
//! digits, if present, are ignored: every colour read is opaque. Blank lines
//! are skipped.

use std::fs;
use std::path::Path;

use crate::error::{MipaError, Result};
use crate::types::{Colour, Palette};

/// Parse palette text.
pub fn parse_palette(source: &str) -> Result<Palette> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_palette_line(line).map_err(|e| at_line(e, i + 1)))
        .collect()
}

/// Read a palette file from disk.
pub fn read_palette(path: &Path) -> Result<Palette> {
    let source = fs::read_to_string(path).map_err(|e| MipaError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read palette: {}", e),
    })?;
    parse_palette(&source)
}

fn parse_palette_line(line: &str) -> Result<Colour> {
    let hex = line.trim();
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 && digits.len() != 8 {
        return Err(MipaError::Parse {
            message: format!("Invalid palette entry: {}", hex),
            help: Some("Palette lines hold six hex digits, e.g. ff0000".to_string()),
        });
    }
    Ok(Colour::from_hex(digits)?.with_alpha(255))
}

fn at_line(err: MipaError, line: usize) -> MipaError {
    match err {
        MipaError::Parse { message, help } => MipaError::Parse {
            message: format!("line {}: {}", line, message),
            help,
        },
        other => other,
    }
}
