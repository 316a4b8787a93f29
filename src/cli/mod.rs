pub mod completions;
pub mod palette;
pub mod repl;
pub mod run;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::preview::{PngSurface, Preview};
use crate::runtime::{Flow, Interpreter};

/// mipa - colours, palettes and pixel-art quantization
#[derive(Parser, Debug)]
#[command(name = "mipa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run script files
    Run(run::RunArgs),

    /// Evaluate statements read from stdin
    Repl(repl::ReplArgs),

    /// Extract a palette from an image
    Palette(palette::PaletteArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Options shared by everything that evaluates statements.
#[derive(Args, Debug, Default)]
pub struct SessionArgs {
    /// Configuration file (defaults to ./mipa.yaml when present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// JSON merge-patch applied over the configuration
    #[arg(long, value_name = "JSON")]
    pub set: Option<String>,

    /// Keep this PNG updated with the displayed image
    #[arg(long, value_name = "PNG")]
    pub preview: Option<PathBuf>,
}

impl SessionArgs {
    pub fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::discover(&std::env::current_dir()?)?,
        };
        match &self.set {
            Some(patch) => config.merge_json(patch),
            None => Ok(config),
        }
    }
}

/// An interpreter plus its optional live preview.
pub struct Session {
    interpreter: Interpreter,
    preview: Option<Preview>,
}

impl Session {
    pub fn open(args: &SessionArgs, printer: &Printer) -> Result<Self> {
        let config = args.load_config()?;
        let preview = args.preview.clone().or_else(|| config.preview.clone()).map(|path| {
            printer.info("Preview", &display_path(&path));
            let reporter = *printer;
            Preview::spawn(
                PngSurface::new(path),
                Duration::from_millis(config.cadence_ms),
                move |e| reporter.warning("Preview", &e.to_string()),
            )
        });
        Ok(Self {
            interpreter: Interpreter::with_config(&config),
            preview,
        })
    }

    /// Evaluate `source`, reporting failures under `name`. With `echo`,
    /// statement values are printed to stdout. Returns the final flow and
    /// how many statements failed.
    pub fn run(&mut self, source: &str, name: &str, printer: &Printer, echo: bool) -> (Flow, usize) {
        let preview = &self.preview;
        let mut failures = 0;
        let flow = self.interpreter.run_source(source, |interpreter, at, result| {
            match result {
                Ok(Flow::Continue(Some(value))) if echo => println!("{}", value),
                Ok(_) => {}
                Err(e) => {
                    failures += 1;
                    printer.script_error(name, at, &e);
                }
            }
            if let Some(frame) = interpreter.take_frame() {
                if let Some(preview) = preview {
                    preview.send(frame.0, frame.1);
                }
            }
        });
        (flow, failures)
    }

    /// Stop the preview and release every remaining value.
    pub fn close(mut self, printer: &Printer) {
        if let Some(preview) = self.preview.take() {
            let frames = preview.stop();
            printer.info("Preview", &format!("{} written", plural(frames, "frame", "frames")));
        }
        self.interpreter.shutdown();
    }
}
