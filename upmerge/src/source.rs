//! Where base and override manifests come from.
//!
//! The merge engine only consumes text. A [`ManifestSource`] supplies that
//! text per service: the base manifest (fetched from the service's
//! repository and cached locally) and the operator's optional override.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{UpmergeError, UpmergeResult};

/// Supplies manifest text for services.
///
/// Implementations must be shareable between the worker threads of a batch.
pub trait ManifestSource: Sync {
    /// Base manifest text for `service`.
    ///
    /// # Errors
    ///
    /// Returns an error when the base manifest is unavailable. An available
    /// but empty manifest is `Ok("")`.
    fn base(&self, service: &str) -> UpmergeResult<String>;

    /// Override manifest text for `service`, or `None` when the operator has
    /// not written one.
    ///
    /// # Errors
    ///
    /// Returns an error when an override exists but cannot be read.
    fn overrides(&self, service: &str) -> UpmergeResult<Option<String>>;
}

/// Reads `<services_dir>/<service>.yaml` as the base manifest and
/// `<overrides_dir>/<service>.yaml` as the override.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectorySource {
    services_dir: Utf8PathBuf,
    overrides_dir: Utf8PathBuf,
}

impl DirectorySource {
    /// Creates a source over the two directories.
    #[must_use]
    pub fn new(services_dir: impl Into<Utf8PathBuf>, overrides_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            services_dir: services_dir.into(),
            overrides_dir: overrides_dir.into(),
        }
    }

    /// Path of the cached base manifest for `service`.
    #[must_use]
    pub fn base_path(&self, service: &str) -> Utf8PathBuf {
        manifest_path(&self.services_dir, service)
    }

    /// Path of the override manifest for `service`.
    #[must_use]
    pub fn override_path(&self, service: &str) -> Utf8PathBuf {
        manifest_path(&self.overrides_dir, service)
    }
}

fn manifest_path(dir: &Utf8Path, service: &str) -> Utf8PathBuf {
    dir.join(format!("{service}.yaml"))
}

fn source_error(service: &str, path: Utf8PathBuf, source: std::io::Error) -> Arc<UpmergeError> {
    Arc::new(UpmergeError::Source {
        service: service.to_owned(),
        path,
        source,
    })
}

impl ManifestSource for DirectorySource {
    fn base(&self, service: &str) -> UpmergeResult<String> {
        let path = self.base_path(service);
        std::fs::read_to_string(&path).map_err(|err| source_error(service, path, err))
    }

    fn overrides(&self, service: &str) -> UpmergeResult<Option<String>> {
        let path = self.override_path(service);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(service, path = %path, "no override manifest");
                Ok(None)
            }
            Err(err) => Err(source_error(service, path, err)),
        }
    }
}

/// In-memory source, for embedding callers and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemorySource {
    base: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base manifest of `service`.
    #[must_use]
    pub fn with_base(mut self, service: impl Into<String>, text: impl Into<String>) -> Self {
        self.base.insert(service.into(), text.into());
        self
    }

    /// Sets the override manifest of `service`.
    #[must_use]
    pub fn with_override(mut self, service: impl Into<String>, text: impl Into<String>) -> Self {
        self.overrides.insert(service.into(), text.into());
        self
    }
}

impl ManifestSource for MemorySource {
    fn base(&self, service: &str) -> UpmergeResult<String> {
        self.base.get(service).cloned().ok_or_else(|| {
            source_error(
                service,
                Utf8PathBuf::from(format!("memory://{service}")),
                std::io::Error::new(ErrorKind::NotFound, "no base manifest registered"),
            )
        })
    }

    fn overrides(&self, service: &str) -> UpmergeResult<Option<String>> {
        Ok(self.overrides.get(service).cloned())
    }
}
