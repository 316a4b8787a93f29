//! Status lines for the mipa CLI.
//!
//! Verbs are right-aligned and coloured in the Cargo manner. Everything here
//! goes to stderr; stdout carries program output only.

use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use miette::Diagnostic;

use crate::error::MipaError;
use crate::parser::Location;

/// Width of the verb column.
const VERB_WIDTH: usize = 12;

const RESET: &str = "\x1b[0m";

/// ANSI styles used by the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Green,
    Cyan,
    Yellow,
    Red,
    Dim,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Green => "\x1b[1;32m",
            Style::Cyan => "\x1b[1;36m",
            Style::Yellow => "\x1b[1;33m",
            Style::Red => "\x1b[1;31m",
            Style::Dim => "\x1b[2m",
        }
    }
}

/// Terminal-aware status printer. Colour is on when stderr is a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    /// A printer that never emits escape codes.
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// e.g. "     Running scripts/bw.mipa".
    pub fn status(&self, verb: &str, message: &str) {
        self.emit(Style::Green, verb, message);
    }

    pub fn success(&self, verb: &str, message: &str) {
        self.emit(Style::Green, verb, message);
    }

    pub fn info(&self, verb: &str, message: &str) {
        self.emit(Style::Cyan, verb, message);
    }

    pub fn warning(&self, verb: &str, message: &str) {
        self.emit(Style::Yellow, verb, message);
    }

    pub fn error(&self, verb: &str, message: &str) {
        self.emit(Style::Red, verb, message);
    }

    /// Report a statement failure, with its script position when known.
    pub fn script_error(&self, source: &str, at: Option<Location>, error: &MipaError) {
        self.error("Error", &self.describe(source, at, error));
    }

    /// `source:line:col message (help)`, help dimmed.
    fn describe(&self, source: &str, at: Option<Location>, error: &MipaError) -> String {
        let mut out = match at {
            Some(at) => self.paint(Style::Cyan, &format!("{}:{}", source, at)),
            None => self.paint(Style::Cyan, source),
        };
        let _ = write!(out, " {}", error);
        if let Some(help) = error.help() {
            out.push_str(&self.paint(Style::Dim, &format!(" ({})", help)));
        }
        out
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.color {
            format!("{}{}{}", style.code(), text, RESET)
        } else {
            text.to_string()
        }
    }

    fn emit(&self, style: Style, verb: &str, message: &str) {
        let verb = self.paint(style, &format!("{:>width$}", verb, width = VERB_WIDTH));
        let _ = writeln!(io::stderr().lock(), "{} {}", verb, message);
    }
}

/// `plural(1, "colour", "colours")` is "1 colour".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    let noun = if n == 1 { singular } else { pluralized };
    format!("{} {}", n, noun)
}

/// `path` relative to the working directory when it lies inside it.
pub fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));
    match relative {
        Some(p) if p.as_os_str().is_empty() => ".".to_string(),
        Some(p) => p.display().to_string(),
        None => path.display().to_string(),
    }
}
