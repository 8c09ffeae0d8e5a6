//! Deployment metadata stamped onto merged documents.

use crate::document::Document;
use crate::node::{Key, Node, child_mapping};

/// Annotation key carrying the deployed version.
pub const VERSION_ANNOTATION: &str = "version";
/// Annotation key carrying the owning service.
pub const SERVICE_ANNOTATION: &str = "service";

/// Write `version` and `service` into `metadata.annotations` of every
/// document, creating or replacing missing and non-mapping levels and
/// overwriting existing values.
pub fn annotate(documents: &mut [Document], version: &str, service: &str) {
    for document in documents {
        let metadata = child_mapping(document.root_mut(), "metadata");
        let annotations = child_mapping(metadata, "annotations");
        annotations.insert(Key::from(VERSION_ANNOTATION), Node::string(version));
        annotations.insert(Key::from(SERVICE_ANNOTATION), Node::string(service));
    }
}
