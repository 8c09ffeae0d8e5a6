//! Reading deployment metadata back out of a merged stream.

use serde::Serialize;

use crate::annotate::{SERVICE_ANNOTATION, VERSION_ANNOTATION};
use crate::document::{Document, parse_documents};
use crate::error::UpmergeResult;
use crate::node::{Node, get};

/// Identity and deployment annotations of one document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    /// Resource kind.
    pub kind: String,
    /// Resource name.
    pub name: String,
    /// `metadata.annotations.version`, when present.
    pub version: Option<String>,
    /// `metadata.annotations.service`, when present.
    pub service: Option<String>,
}

impl DocumentSummary {
    fn of(document: &Document) -> Self {
        let annotation = |key: &str| {
            get(document.root(), "metadata")
                .and_then(|metadata| metadata.get("annotations"))
                .and_then(|annotations| annotations.get(key))
                .and_then(Node::as_str)
                .map(str::to_owned)
        };
        let identity = document.identity();
        Self {
            kind: identity.kind().to_owned(),
            name: identity.name().to_owned(),
            version: annotation(VERSION_ANNOTATION),
            service: annotation(SERVICE_ANNOTATION),
        }
    }
}

/// Summarise every document of a rendered stream, in stream order.
///
/// # Errors
///
/// Returns [`crate::UpmergeError::Parse`] if a fragment cannot be parsed.
pub fn inspect(text: &str) -> UpmergeResult<Vec<DocumentSummary>> {
    Ok(parse_documents(text, "merged manifest")?
        .iter()
        .map(DocumentSummary::of)
        .collect())
}

/// Summary of the first document with the given identity.
///
/// # Errors
///
/// Returns [`crate::UpmergeError::Parse`] if a fragment cannot be parsed.
pub fn find_version(text: &str, kind: &str, name: &str) -> UpmergeResult<Option<DocumentSummary>> {
    Ok(inspect(text)?
        .into_iter()
        .find(|summary| summary.kind == kind && summary.name == name))
}
