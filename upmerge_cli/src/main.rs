//! `upmerge` entry-point: install reporting, parse flags, run the command.

use clap::Parser;

use upmerge_cli::cli::CommandLine;
use upmerge_cli::{logging, run};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    logging::init()?;
    let cli = CommandLine::parse();
    run(&cli).map_err(color_eyre::eyre::Report::from)
}
