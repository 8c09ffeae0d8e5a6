//! Manifest documents and their identities.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::{ParseFailure, UpmergeError, UpmergeResult};
use crate::merge::merge_mapping;
use crate::node::{Mapping, Node, get};
use crate::split::fragments;

/// Identity of a manifest: the resource `kind` and `metadata.name`.
///
/// Two documents describe the same resource iff both fields are equal.
/// Comparison is exact and case-sensitive. Documents without extractable
/// metadata have the anonymous identity `("", "")`.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity {
    kind: String,
    name: String,
}

impl Identity {
    /// Creates an identity from its parts.
    #[must_use]
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Reads `kind` and `metadata.name` from a document root.
    ///
    /// Missing or non-string fields resolve to empty strings.
    #[must_use]
    pub fn extract(root: &Mapping) -> Self {
        let kind = get(root, "kind").and_then(Node::as_str).unwrap_or_default();
        let name = get(root, "metadata")
            .and_then(|metadata| metadata.get("name"))
            .and_then(Node::as_str)
            .unwrap_or_default();
        Self::new(kind, name)
    }

    /// Resource kind, e.g. `Deployment`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Resource name from `metadata.name`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether neither a kind nor a name could be extracted.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.kind.is_empty() && self.name.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kind '{}', name '{}'", self.kind, self.name)
    }
}

/// One manifest: a mapping tree plus the identity extracted when it was
/// parsed.
///
/// The identity is computed once; merging and annotation mutate the tree
/// but never the identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    identity: Identity,
    root: Mapping,
}

impl Document {
    /// Wraps an already parsed root mapping.
    #[must_use]
    pub fn from_root(root: Mapping) -> Self {
        Self {
            identity: Identity::extract(&root),
            root,
        }
    }

    /// Parses one fragment of a manifest stream.
    ///
    /// Fragments holding no value, such as blank text or a lone
    /// `# Source: ...` comment, yield `None`. An explicit `{}` is still a
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure::Yaml`] when the fragment is not valid YAML and
    /// [`ParseFailure::NotAMapping`] when its root is not a mapping.
    pub fn parse(fragment: &str) -> Result<Option<Self>, ParseFailure> {
        if fragment.trim().is_empty() {
            return Ok(None);
        }
        let value: serde_yaml::Value = serde_yaml::from_str(fragment)?;
        match Node::from(value) {
            Node::Null => Ok(None),
            Node::Mapping(root) => Ok(Some(Self::from_root(root))),
            other => Err(ParseFailure::NotAMapping(other.shape())),
        }
    }

    /// Identity captured at parse time.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The document tree.
    #[must_use]
    pub const fn root(&self) -> &Mapping {
        &self.root
    }

    /// The document tree, mutably.
    pub const fn root_mut(&mut self) -> &mut Mapping {
        &mut self.root
    }

    /// Deep-merges `base` underneath this document; values already present
    /// here win.
    pub fn merge_base(&mut self, base: Self) {
        merge_mapping(&mut self.root, base.root);
    }

    /// Serialises the tree as a single YAML document without a fence.
    ///
    /// # Errors
    ///
    /// Returns [`UpmergeError::Render`] if the serialiser rejects the tree.
    pub fn to_yaml(&self) -> UpmergeResult<String> {
        serde_yaml::to_string(&self.root).map_err(|source| {
            Arc::new(UpmergeError::Render {
                identity: self.identity.to_string(),
                source,
            })
        })
    }
}

/// Parses every fragment of `text` that holds a value into a document set.
///
/// Comment-only fragments are skipped but still count towards the document
/// positions reported in errors. `origin` names the stream in error
/// messages, e.g. `"service 'api' base manifest"`.
///
/// # Errors
///
/// Returns [`UpmergeError::Parse`] for the first fragment that fails to
/// parse; a manifest that cannot be parsed cannot be merged safely.
pub fn parse_documents(text: &str, origin: &str) -> UpmergeResult<Vec<Document>> {
    let mut documents = Vec::new();
    for (index, fragment) in fragments(text).enumerate() {
        let parsed = Document::parse(fragment)
            .map_err(|source| Arc::new(UpmergeError::parse(origin, index, source)))?;
        match parsed {
            Some(document) => {
                trace!(origin, identity = %document.identity(), "parsed document");
                documents.push(document);
            }
            None => trace!(origin, document = index + 1, "skipped empty document"),
        }
    }
    Ok(documents)
}
