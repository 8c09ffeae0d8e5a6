//! Builders for manifest text.
//!
//! # Examples
//!
//! ```
//! use test_helpers::manifests::{manifest, stream};
//!
//! let text = stream(&[
//!     manifest("Service", "api", "spec:\n  port: 80\n"),
//!     manifest("ConfigMap", "api", ""),
//! ]);
//! assert!(text.starts_with("kind: Service\n"));
//! assert_eq!(text.matches("---\n").count(), 1);
//! ```

/// A single document with `kind`, `metadata.name` and the given top-level
/// `body` appended verbatim.
#[must_use]
pub fn manifest(kind: &str, name: &str, body: &str) -> String {
    format!("kind: {kind}\nmetadata:\n  name: {name}\n{body}")
}

/// Joins documents into a stream separated by `---` fence lines.
#[must_use]
pub fn stream<S: AsRef<str>>(documents: &[S]) -> String {
    documents
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("---\n")
}

/// A lock file entry in `up-lock.yaml` form.
#[must_use]
pub fn lock_entry(service: &str, version: &str, commit: &str) -> String {
    format!(
        "{service}:\n  repo: acme/{service}\n  branch: master\n  commit: {commit}\n  version: \"{version}\"\n"
    )
}
