//! The `up-lock.yaml` model.
//!
//! A lock file pins every service to a repository commit and a deployment
//! version. It is a YAML mapping keyed by service name:
//!
//! ```yaml
//! billing:
//!   repo: acme/billing
//!   branch: master
//!   commit: 0a1b2c3d4e5f
//!   version: "12"
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use camino::Utf8Path;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::{UpmergeError, UpmergeResult};

/// Number of characters kept by [`LockEntry::short_commit`].
pub const SHORT_COMMIT_LEN: usize = 7;

/// Pinned state of one service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LockEntry {
    /// Source repository, e.g. `acme/billing`.
    #[serde(deserialize_with = "scalar_text")]
    pub repo: String,
    /// Branch the commit was resolved from.
    #[serde(deserialize_with = "scalar_text")]
    pub branch: String,
    /// Full commit hash.
    #[serde(deserialize_with = "scalar_text")]
    pub commit: String,
    /// Deployment version; written as a string even when it looks numeric.
    #[serde(deserialize_with = "scalar_text")]
    pub version: String,
}

impl LockEntry {
    /// First seven characters of the commit hash.
    #[must_use]
    pub fn short_commit(&self) -> &str {
        self.commit
            .char_indices()
            .nth(SHORT_COMMIT_LEN)
            .and_then(|(end, _)| self.commit.get(..end))
            .unwrap_or(&self.commit)
    }
}

/// Accept any scalar for a string field, keeping its source text.
///
/// YAML authors often write `version: 12` or `version: 1.10`. The scalar is
/// requested as a string so `1.10` stays `1.10` rather than being resolved to
/// a float and printed back as `1.1`.
fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_str(ScalarText)
}

struct ScalarText;

impl Visitor<'_> for ScalarText {
    type Value = String;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a scalar")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(value.to_owned())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(value)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Err(E::custom(format!(
            "float {value} cannot be kept verbatim; quote the value"
        )))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(String::new())
    }
}

/// All services pinned by a lock file, ordered by service name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct LockFile {
    services: BTreeMap<String, LockEntry>,
}

impl LockFile {
    /// Decode lock file text. `path` is only used in error messages.
    ///
    /// An empty document yields an empty lock file.
    ///
    /// # Errors
    ///
    /// Returns [`UpmergeError::Lock`] if the text is not a valid lock file.
    pub fn parse(text: &str, path: &Utf8Path) -> UpmergeResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|err| Arc::new(UpmergeError::lock(path, err)))
    }

    /// Read and decode the lock file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`UpmergeError::Lock`] if the file cannot be read or decoded.
    pub fn load(path: &Utf8Path) -> UpmergeResult<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|err| Arc::new(UpmergeError::lock(path, err)))?;
        Self::parse(&text, path)
    }

    /// Add or replace the entry for `service`.
    pub fn insert(&mut self, service: impl Into<String>, entry: LockEntry) {
        self.services.insert(service.into(), entry);
    }

    /// Entry for `service`, if pinned.
    #[must_use]
    pub fn get(&self, service: &str) -> Option<&LockEntry> {
        self.services.get(service)
    }

    /// Iterate services in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LockEntry)> {
        self.services.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of pinned services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no service is pinned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{LockEntry, LockFile};
    use crate::error::UpmergeError;
    use anyhow::Result;
    use camino::Utf8Path;
    use rstest::rstest;

    const LOCK: &str = "\
web:
  repo: acme/web
  branch: master
  commit: 0123456789abcdef
  version: \"3\"
billing:
  repo: acme/billing
  commit: fedcba9876543210
  version: 12
";

    #[rstest]
    fn parses_services_in_name_order() -> Result<()> {
        let lock = LockFile::parse(LOCK, Utf8Path::new("up-lock.yaml"))?;
        let names: Vec<&str> = lock.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["billing", "web"]);
        let billing = lock.get("billing").expect("billing entry");
        assert_eq!(billing.version, "12");
        assert_eq!(billing.branch, "");
        assert_eq!(billing.short_commit(), "fedcba9");
        Ok(())
    }

    #[rstest]
    #[case("version: 1.10", "version", "1.10")]
    #[case("version: 2.0", "version", "2.0")]
    #[case("version: 1e3", "version", "1e3")]
    #[case("commit: 0123456", "commit", "0123456")]
    #[case("version: \"1.10\"", "version", "1.10")]
    fn numeric_looking_values_keep_their_text(
        #[case] line: &str,
        #[case] field: &str,
        #[case] expected: &str,
    ) -> Result<()> {
        let text = format!("api:\n  {line}\n");
        let lock = LockFile::parse(&text, Utf8Path::new("up-lock.yaml"))?;
        let api = lock.get("api").expect("api entry");
        let value = if field == "commit" { &api.commit } else { &api.version };
        assert_eq!(value, expected);
        Ok(())
    }

    #[rstest]
    #[case("0123456789", "0123456")]
    #[case("abc", "abc")]
    #[case("", "")]
    fn shortens_commits(#[case] commit: &str, #[case] expected: &str) {
        let entry = LockEntry {
            commit: commit.to_owned(),
            ..LockEntry::default()
        };
        assert_eq!(entry.short_commit(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   \n")]
    fn blank_lock_files_are_empty(#[case] text: &str) -> Result<()> {
        assert!(LockFile::parse(text, Utf8Path::new("up-lock.yaml"))?.is_empty());
        Ok(())
    }

    #[rstest]
    #[case("- not\n- a map\n")]
    #[case("web: [unterminated\n")]
    #[case("web:\n  version: [1, 2]\n")]
    fn rejects_malformed_lock_files(#[case] text: &str) {
        let err = LockFile::parse(text, Utf8Path::new("up-lock.yaml")).expect_err("expected failure");
        assert!(matches!(&*err, UpmergeError::Lock { path, .. } if path == "up-lock.yaml"));
    }

    #[rstest]
    fn missing_files_are_lock_errors() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("up-lock.yaml"))
            .map_err(|path| anyhow::anyhow!("non UTF-8 path: {}", path.display()))?;
        let err = LockFile::load(&path).expect_err("expected failure");
        assert!(matches!(&*err, UpmergeError::Lock { .. }));
        Ok(())
    }
}
