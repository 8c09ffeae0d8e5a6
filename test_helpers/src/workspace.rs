//! A temporary deployment directory laid out the way the CLI expects.
//!
//! ```text
//! <root>/up-lock.yaml
//! <root>/services/<service>.yaml   base manifests
//! <root>/<service>.yaml            overrides
//! ```

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use crate::manifests::lock_entry;

/// Temporary deployment directory, removed on drop.
#[derive(Debug)]
pub struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    /// Creates an empty workspace with a `services/` directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created or its
    /// path is not UTF-8.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temporary workspace")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("non UTF-8 temp dir: {}", path.display()))?;
        std::fs::create_dir(root.join("services")).context("create services dir")?;
        Ok(Self { _dir: dir, root })
    }

    /// Root directory of the workspace.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Writes `contents` to `relative` under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, relative: &str, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.root.join(relative);
        std::fs::write(&path, contents).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Reads `relative` under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.root.join(relative);
        std::fs::read_to_string(&path).with_context(|| format!("read {path}"))
    }

    /// Writes `up-lock.yaml` pinning each `(service, version, commit)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn lock(&self, services: &[(&str, &str, &str)]) -> Result<Utf8PathBuf> {
        let text: String = services
            .iter()
            .map(|(service, version, commit)| lock_entry(service, version, commit))
            .collect();
        self.write("up-lock.yaml", &text)
    }

    /// Writes the cached base manifest of `service`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn base(&self, service: &str, text: &str) -> Result<Utf8PathBuf> {
        self.write(&format!("services/{service}.yaml"), text)
    }

    /// Writes the operator override of `service`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn override_manifest(&self, service: &str, text: &str) -> Result<Utf8PathBuf> {
        self.write(&format!("{service}.yaml"), text)
    }
}
