//! Error types for the `upmerge` binary.
//!
//! `CliError` wraps engine failures alongside settings and I/O problems so
//! `main` can hand a single error type to `color-eyre` for reporting.
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use upmerge::UpmergeError;

/// Errors raised by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// The merge engine failed.
    #[error(transparent)]
    Merge(#[from] Arc<UpmergeError>),

    /// Settings could not be assembled from their layers.
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Box<figment::Error>),

    /// An explicitly requested settings file does not exist.
    #[error("configuration file '{path}' does not exist")]
    MissingConfig {
        /// Requested path.
        path: Utf8PathBuf,
    },

    /// An input file could not be read.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// File being read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The merged stream could not be written.
    #[error("failed to write '{path}': {source}")]
    Write {
        /// Destination file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing to standard output failed.
    #[error("failed to write to standard output: {0}")]
    Stdout(#[source] std::io::Error),

    /// Summaries could not be encoded as JSON.
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `inspect --kind --name` matched no document.
    #[error("no document with kind '{kind}' and name '{name}'")]
    DocumentNotFound {
        /// Requested kind.
        kind: String,
        /// Requested name.
        name: String,
    },

    /// The tracing subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Configuration(Box::new(err))
    }
}

/// Result alias for the CLI.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
