use clap::Parser;
use miette::Result;
use mipa::cli::{Cli, Commands};
use mipa::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Run(args) => mipa::cli::run::run(args, &printer)?,
        Commands::Repl(args) => mipa::cli::repl::run(args, &printer)?,
        Commands::Palette(args) => mipa::cli::palette::run(args, &printer)?,
        Commands::Completions(args) => mipa::cli::completions::run(args)?,
    }

    Ok(())
}
