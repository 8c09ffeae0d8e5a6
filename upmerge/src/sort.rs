//! Deterministic ordering and rendering of document sets.
//!
//! Documents are ordered by name, then kind, then by their rendered text, so
//! the output depends only on the documents themselves and never on the order
//! in which they arrived. Repeated merges of unchanged inputs are therefore
//! byte-identical.

use crate::document::Document;
use crate::error::UpmergeResult;

/// Fence line emitted before every document.
pub const FENCE: &str = "---\n";

/// Render documents as one multi-document stream in total order.
///
/// Each document is preceded by a fence line. Ties on `(name, kind)` are
/// broken by the rendered text so any permutation of the same documents
/// renders identically.
///
/// # Errors
///
/// Returns [`crate::UpmergeError::Render`] if a document cannot be
/// serialised.
pub fn render_stream(documents: &[Document]) -> UpmergeResult<String> {
    let mut rendered = documents
        .iter()
        .map(|document| {
            let identity = document.identity();
            Ok((identity.name(), identity.kind(), document.to_yaml()?))
        })
        .collect::<UpmergeResult<Vec<_>>>()?;
    rendered.sort();

    let mut stream = String::new();
    for (_, _, text) in rendered {
        stream.push_str(FENCE);
        stream.push_str(&text);
    }
    Ok(stream)
}
