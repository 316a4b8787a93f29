//! Run command implementation.
//!
//! Evaluates script files in one shared session, so bindings made by one
//! script are visible to the next.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use walkdir::WalkDir;

use crate::error::{MipaError, Result};
use crate::output::{display_path, plural, Printer};
use crate::runtime::Flow;

use super::{Session, SessionArgs};

/// Extension of script files picked up from directories.
pub const SCRIPT_EXTENSION: &str = "mipa";

/// Run script files
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scripts, or directories searched for `*.mipa` scripts
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub session: SessionArgs,
}

pub fn run(args: RunArgs, printer: &Printer) -> Result<()> {
    let scripts = collect_scripts(&args.paths)?;
    let mut session = Session::open(&args.session, printer)?;

    let mut failures = 0;
    for script in &scripts {
        let display = display_path(script);
        let source = fs::read_to_string(script).map_err(|e| MipaError::Io {
            path: script.clone(),
            message: format!("Failed to read script: {}", e),
        })?;

        printer.status("Running", &display);
        let (flow, failed) = session.run(&source, &display, printer, false);
        failures += failed;
        if let Flow::Exit = flow {
            printer.info("Exited", &display);
            break;
        }
    }
    session.close(printer);

    let summary = format!(
        "{} with {}",
        plural(scripts.len(), "script", "scripts"),
        plural(failures, "error", "errors")
    );
    if failures == 0 {
        printer.success("Finished", &summary);
    } else {
        printer.warning("Finished", &summary);
    }
    Ok(())
}

/// Files are taken as given; directories contribute their `*.mipa` files
/// in file-name order.
pub fn collect_scripts(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut scripts = Vec::new();
    for path in paths {
        if path.is_dir() {
            scripts.extend(scripts_in(path));
        } else if path.is_file() {
            scripts.push(path.clone());
        } else {
            return Err(MipaError::Io {
                path: path.clone(),
                message: "No such file or directory".to_string(),
            });
        }
    }
    Ok(scripts)
}

fn scripts_in(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION))
}
