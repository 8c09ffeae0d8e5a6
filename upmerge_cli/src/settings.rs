//! Layered settings for `upmerge merge`.
//!
//! Layers, lowest precedence first:
//!
//! 1. built-in defaults;
//! 2. a TOML settings file: `--config`, else `UPMERGE_CONFIG_PATH`, else the
//!    first of `./.upmerge.toml` and `<config dir>/upmerge/config.toml` that
//!    exists;
//! 3. `UPMERGE_*` environment variables;
//! 4. command-line flags.

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tracing::debug;
use upmerge::{EmptyOverridePolicy, MergeOptions};

use crate::cli::MergeArgs;
use crate::error::{CliError, Result};

/// Prefix of the environment variables read as settings.
pub const ENV_PREFIX: &str = "UPMERGE_";
/// Environment variable naming an explicit settings file.
pub const CONFIG_PATH_ENV: &str = "UPMERGE_CONFIG_PATH";
/// Settings file looked up in the working directory.
pub const LOCAL_CONFIG: &str = ".upmerge.toml";
/// `output` value that selects standard output.
pub const STDOUT: &str = "-";

/// Resolved settings for a merge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Lock file pinning service versions.
    pub lock_file: Utf8PathBuf,
    /// Directory of cached base manifests.
    pub services_dir: Utf8PathBuf,
    /// Directory of override manifests.
    pub overrides_dir: Utf8PathBuf,
    /// Destination of the merged stream, or [`STDOUT`].
    pub output: Utf8PathBuf,
    /// Behaviour for services without override documents.
    pub empty_override: EmptyOverridePolicy,
    /// Whether anonymous documents match each other.
    pub match_anonymous: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let options = MergeOptions::default();
        Self {
            lock_file: Utf8PathBuf::from("up-lock.yaml"),
            services_dir: Utf8PathBuf::from("services"),
            overrides_dir: Utf8PathBuf::from("."),
            output: Utf8PathBuf::from("deploy-lock.yaml"),
            empty_override: options.empty_override,
            match_anonymous: options.match_anonymous,
        }
    }
}

impl Settings {
    /// Assemble settings from every layer.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingConfig`] when an explicitly named settings
    /// file does not exist, or [`CliError::Configuration`] when a layer holds
    /// invalid values.
    pub fn load(explicit: Option<&Utf8Path>, cli: &MergeArgs) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = settings_file(explicit)? {
            debug!(path = %path, "loading settings file");
            figment = figment.merge(Toml::file(path));
        }
        Ok(figment
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config_path"]))
            .merge(Serialized::defaults(cli))
            .extract()?)
    }

    /// Merge options for the engine.
    #[must_use]
    pub const fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            empty_override: self.empty_override,
            match_anonymous: self.match_anonymous,
        }
    }

    /// Whether the merged stream goes to standard output.
    #[must_use]
    pub fn writes_to_stdout(&self) -> bool {
        self.output == STDOUT
    }
}

/// Locate the settings file, if any.
///
/// An explicit path (flag or [`CONFIG_PATH_ENV`]) must exist; discovered
/// candidates are skipped when absent.
///
/// # Errors
///
/// Returns [`CliError::MissingConfig`] when an explicit path does not exist.
pub fn settings_file(explicit: Option<&Utf8Path>) -> Result<Option<Utf8PathBuf>> {
    let requested = explicit
        .map(Utf8Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(Utf8PathBuf::from));
    if let Some(path) = requested {
        return if path.exists() {
            Ok(Some(path))
        } else {
            Err(CliError::MissingConfig { path })
        };
    }
    Ok(candidates().into_iter().find(|path| path.exists()))
}

fn candidates() -> Vec<Utf8PathBuf> {
    let mut paths = vec![Utf8PathBuf::from(LOCAL_CONFIG)];
    if let Some(dir) = dirs::config_dir().and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok()) {
        paths.push(dir.join("upmerge").join("config.toml"));
    }
    paths
}
