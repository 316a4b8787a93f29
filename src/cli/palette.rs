use std::path::PathBuf;

use clap::Args;

use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::process::{extract, ExtractMethod};
use crate::render::{load_image, palette_to_string, write_palette, write_swatch};
use crate::types::Palette;

/// Extract a palette from an image
#[derive(Args, Debug)]
pub struct PaletteArgs {
    /// Image to extract colours from
    #[arg(required = true)]
    pub file: PathBuf,

    /// Extraction algorithm: "median" or "simple"
    #[arg(long, default_value = "median")]
    pub method: ExtractMethod,

    /// Median cut rounds, or cube divisions per channel for "simple"
    #[arg(long, default_value_t = 3)]
    pub depth: u32,

    /// Snap each extracted colour to one present in the image
    #[arg(long)]
    pub exact: bool,

    /// Write the palette file here instead of only printing it
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write a swatch PNG
    #[arg(long, value_name = "PNG")]
    pub swatch: Option<PathBuf>,

    /// Swatch rows
    #[arg(long, default_value_t = 1)]
    pub rows: u32,
}

pub fn run(args: PaletteArgs, printer: &Printer) -> Result<()> {
    let palette = sample(&args)?;

    printer.status(
        "Sampled",
        &format!("{} from {}", plural(palette.len(), "colour", "colours"), display_path(&args.file)),
    );
    print!("{}", palette_to_string(&palette));

    if let Some(path) = &args.output {
        write_palette(&palette, path)?;
        printer.success("Wrote", &display_path(path));
    }
    if let Some(path) = &args.swatch {
        write_swatch(&palette, path, args.rows)?;
        printer.success("Wrote", &display_path(path));
    }
    Ok(())
}

fn sample(args: &PaletteArgs) -> Result<Palette> {
    let depth = args.method.check_depth(args.depth)?;
    let image = load_image(&args.file)?;
    Ok(extract(&image, args.method, depth, !args.exact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::read_palette;
    use crate::render::save_image;
    use crate::types::{canvas, Colour};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn args(file: PathBuf) -> PaletteArgs {
        PaletteArgs {
            file,
            method: ExtractMethod::MedianCut,
            depth: 3,
            exact: false,
            output: None,
            swatch: None,
            rows: 1,
        }
    }

    #[test]
    fn test_run_writes_palette_and_swatch() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("red.png");
        save_image(&canvas(4, 4, Colour::rgb(255, 0, 0)), &image).unwrap();

        let mut args = args(image);
        args.exact = true;
        args.output = Some(dir.path().join("red.txt"));
        args.swatch = Some(dir.path().join("red-swatch.png"));
        run(args, &Printer::new()).unwrap();

        let written = read_palette(&dir.path().join("red.txt")).unwrap();
        assert!(written.iter().all(|c| *c == Colour::rgb(255, 0, 0)));
        assert!(!written.is_empty());
        assert!(dir.path().join("red-swatch.png").is_file());
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(sample(&args(dir.path().join("none.png"))).is_err());
    }

    #[test]
    fn test_depth_over_limit_is_rejected_before_loading() {
        let mut args = args(PathBuf::from("never-read.png"));
        args.depth = 33;
        let err = sample(&args).unwrap_err();
        assert!(matches!(err, crate::error::MipaError::Limit { max: 32, .. }));
    }

    #[test]
    fn test_method_parsed_from_flag() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            palette: PaletteArgs,
        }

        let parsed = Wrapper::parse_from(["mipa", "img.png", "--method", "simple", "--exact"]);
        assert_eq!(parsed.palette.method, ExtractMethod::Simple);
        assert_eq!(parsed.palette.depth, 3);
        assert!(parsed.palette.exact);
    }
}
