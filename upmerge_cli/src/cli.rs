//! Command-line surface of the `upmerge` binary.
//!
//! Every merge option is optional on the command line: an absent flag leaves
//! the value from the settings file, the environment or the defaults in
//! place. Present flags are serialised into the top settings layer.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use upmerge::EmptyOverridePolicy;

/// Merge base and override deployment manifests.
#[derive(Debug, Parser)]
#[command(
    name = "upmerge",
    bin_name = "upmerge",
    about = "Merge base and override deployment manifests into one stream",
    version
)]
pub struct CommandLine {
    /// Overrides settings file discovery with an explicit path.
    #[arg(long = "config", short = 'c', value_name = "PATH", global = true)]
    pub config_path: Option<Utf8PathBuf>,
    /// Selected workflow.
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands of the binary.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Merge every service of the lock file and write the deployment stream.
    Merge(MergeArgs),
    /// List the documents of a merged stream with their annotations.
    Inspect(InspectArgs),
}

/// Flags of `upmerge merge`; each one overrides the matching setting.
#[derive(Debug, Default, Clone, PartialEq, Eq, Args, Serialize)]
pub struct MergeArgs {
    /// Lock file pinning service versions.
    #[arg(long, value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_file: Option<Utf8PathBuf>,
    /// Directory holding cached base manifests, one `<service>.yaml` each.
    #[arg(long, value_name = "DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services_dir: Option<Utf8PathBuf>,
    /// Directory holding override manifests, one `<service>.yaml` each.
    #[arg(long, value_name = "DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides_dir: Option<Utf8PathBuf>,
    /// Destination of the merged stream; `-` writes to standard output.
    #[arg(long, short = 'o', value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Utf8PathBuf>,
    /// What to do when a service has no override documents.
    #[arg(long, value_enum, value_name = "POLICY")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_override: Option<EmptyOverride>,
    /// Whether documents without kind and name match each other.
    #[arg(long, value_name = "BOOL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_anonymous: Option<bool>,
}

/// Command-line spelling of [`EmptyOverridePolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyOverride {
    /// Deploy the base documents unchanged.
    PassThrough,
    /// Deploy nothing for the service.
    DropBase,
}

impl From<EmptyOverride> for EmptyOverridePolicy {
    fn from(value: EmptyOverride) -> Self {
        match value {
            EmptyOverride::PassThrough => Self::PassThrough,
            EmptyOverride::DropBase => Self::DropBase,
        }
    }
}

/// Flags of `upmerge inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct InspectArgs {
    /// Merged stream to read, usually `deploy-lock.yaml`.
    #[arg(value_name = "FILE")]
    pub file: Utf8PathBuf,
    /// Only report the document with this kind; requires `--name`.
    #[arg(long, requires = "name")]
    pub kind: Option<String>,
    /// Only report the document with this name; requires `--kind`.
    #[arg(long, requires = "kind")]
    pub name: Option<String>,
    /// Emit JSON instead of tab-separated lines.
    #[arg(long)]
    pub json: bool,
}
