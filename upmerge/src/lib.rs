//! Deployment manifest merge engine.
//!
//! `upmerge` combines each service's canonical base manifests with the
//! operator's local overrides and produces one deterministic, annotated
//! multi-document YAML stream for the whole deployment.
//!
//! The pipeline for one service is:
//!
//! 1. [`template::render_template`] substitutes `{version}`, `{name}` and
//!    `{commit}` in the raw text.
//! 2. [`split::fragments`] cuts a stream at fence lines and
//!    [`Document::parse`] turns each fragment holding a value into a
//!    [`Document`]; comment-only fragments are skipped.
//! 3. [`reconcile()`] pairs override documents with base documents by
//!    [`Identity`] and deep merges each pair with [`merge::merge`].
//! 4. [`annotate::annotate`] stamps the deployment version and service name.
//!
//! [`run_batch`] runs that pipeline for every service of a [`LockFile`] on
//! its own thread and renders the sorted result with
//! [`sort::render_stream`].
//!
//! ```rust
//! use upmerge::{LockEntry, LockFile, MemorySource, MergeOptions, run_batch};
//!
//! let mut lock = LockFile::default();
//! lock.insert("api", LockEntry { version: "7".into(), ..LockEntry::default() });
//! let source = MemorySource::new()
//!     .with_base("api", "kind: Service\nmetadata: {name: api}\nspec: {port: 80}\n")
//!     .with_override("api", "kind: Service\nmetadata: {name: api}\nspec: {port: 8080}\n");
//!
//! let batch = run_batch(&source, &lock, &MergeOptions::default())?;
//! assert!(batch.manifest.contains("port: 8080"));
//! assert!(batch.manifest.contains("version: '7'"));
//! # Ok::<(), std::sync::Arc<upmerge::UpmergeError>>(())
//! ```

pub mod annotate;
pub mod document;
mod error;
pub mod inspect;
pub mod lock;
pub mod merge;
pub mod node;
pub mod pipeline;
pub mod reconcile;
pub mod sort;
pub mod source;
pub mod split;
pub mod template;

pub use document::{Document, Identity, parse_documents};
pub use error::{ParseFailure, UpmergeError, UpmergeResult};
pub use inspect::{DocumentSummary, find_version, inspect};
pub use lock::{LockEntry, LockFile};
pub use node::{Key, Mapping, Node, Scalar};
pub use pipeline::{
    BatchOutput, ServiceInput, ServiceOutput, ServiceReport, merge_service, run_batch,
};
pub use reconcile::{EmptyOverridePolicy, MergeOptions, Reconciliation, reconcile};
pub use source::{DirectorySource, ManifestSource, MemorySource};
