//! Library facade for the `upmerge` binary so tests can drive commands
//! without spawning a process.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod settings;

use cli::{CommandLine, Commands};
use error::Result;
use settings::Settings;

/// Execute the parsed command line, writing primary output to standard
/// output.
///
/// # Errors
///
/// Returns any settings, engine or I/O failure of the selected command.
pub fn run(cli: &CommandLine) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    match &cli.command {
        Commands::Merge(args) => {
            let settings = Settings::load(cli.config_path.as_deref(), args)?;
            commands::merge(&settings, &mut stdout)?;
        }
        Commands::Inspect(args) => {
            commands::inspect_stream(args, &mut stdout)?;
        }
    }
    Ok(())
}
