//! Error types produced by the merge engine and its collaborators.
//!
//! Parse failures are fatal for the service they occur in and carry enough
//! context (service, stream, document position) for an operator to locate the
//! offending fragment. Shape mismatches during merging are never errors.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Shared result alias used across the crate.
///
/// Errors are reference counted so that batch results can be fanned back in
/// from worker threads and reported more than once without cloning sources.
pub type UpmergeResult<T> = Result<T, Arc<UpmergeError>>;

/// Why a single manifest fragment could not be turned into a document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseFailure {
    /// The fragment is not valid YAML.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// The fragment parsed, but its root is a scalar or sequence.
    #[error("document root must be a mapping, found {0}")]
    NotAMapping(&'static str),
}

/// Errors that can occur while merging manifests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UpmergeError {
    /// A manifest fragment could not be parsed.
    #[error("failed to parse document #{document} of {origin}: {source}")]
    Parse {
        /// Human-readable description of the stream, e.g. the service name
        /// and whether the text came from the base or the override file.
        origin: String,
        /// One-based position of the fragment among non-blank fragments.
        document: usize,
        /// Underlying parse failure.
        #[source]
        source: ParseFailure,
    },

    /// A merged document could not be serialised back to YAML.
    #[error("failed to render {identity}: {source}")]
    Render {
        /// Identity of the document being rendered.
        identity: String,
        /// Underlying serialiser error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A manifest source failed to supply text for a service.
    #[error("failed to read manifest for service '{service}' from '{path}': {source}")]
    Source {
        /// Service whose manifest was requested.
        service: String,
        /// Location the source attempted to read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The lock file could not be read or decoded.
    #[error("lock file error in '{path}': {source}")]
    Lock {
        /// Path of the lock file.
        path: Utf8PathBuf,
        /// Underlying error reported while loading the lock file.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A worker thread merging a service panicked.
    #[error("merge worker for service '{service}' panicked")]
    Worker {
        /// Service the worker was merging.
        service: String,
    },
}

impl UpmergeError {
    /// Construct a [`UpmergeError::Parse`] for the fragment at `index`
    /// (zero-based) of the stream described by `origin`.
    #[must_use]
    pub fn parse(origin: impl Into<String>, index: usize, source: ParseFailure) -> Self {
        Self::Parse {
            origin: origin.into(),
            document: index.saturating_add(1),
            source,
        }
    }

    /// Construct a [`UpmergeError::Lock`] from any error type.
    #[must_use]
    pub fn lock(
        path: impl Into<Utf8PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Lock {
            path: path.into(),
            source: source.into(),
        }
    }
}
