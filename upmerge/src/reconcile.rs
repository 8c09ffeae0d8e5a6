//! Pairing of override documents with base documents.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::{Document, Identity};

/// What to do for a service whose override set is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyOverridePolicy {
    /// Deploy the base manifest unchanged: every base document is emitted and
    /// none is reported as unused.
    #[default]
    PassThrough,
    /// Apply the regular rule: every base document is unused and dropped,
    /// leaving the service with no documents.
    DropBase,
}

/// Knobs controlling how document sets are reconciled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOptions {
    /// Behaviour when a service has no override documents.
    pub empty_override: EmptyOverridePolicy,
    /// Whether two documents with the anonymous identity `("", "")` are
    /// considered the same manifest.
    pub match_anonymous: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            empty_override: EmptyOverridePolicy::PassThrough,
            match_anonymous: true,
        }
    }
}

impl MergeOptions {
    fn matches(&self, wanted: &Identity, candidate: &Identity) -> bool {
        wanted == candidate && (self.match_anonymous || !wanted.is_anonymous())
    }
}

/// Outcome of reconciling an override set against a base set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconciliation {
    /// Merged output, one entry per override document in override order.
    pub merged: Vec<Document>,
    /// Base documents no override document claimed, in base order. These are
    /// reported but not deployed.
    pub unused: Vec<Document>,
}

impl Reconciliation {
    /// Identities of the unused base documents.
    #[must_use]
    pub fn unused_identities(&self) -> Vec<Identity> {
        self.unused.iter().map(|doc| doc.identity().clone()).collect()
    }
}

/// Reconcile `overrides` against `base`.
///
/// Each override document claims the first remaining base document with an
/// equal identity, is deep-merged over it and emitted; override documents
/// without a counterpart are emitted unchanged. Base documents left over
/// are returned as unused and logged as warnings.
///
/// When `overrides` is empty the outcome depends on
/// [`MergeOptions::empty_override`].
#[must_use]
pub fn reconcile(
    overrides: Vec<Document>,
    base: Vec<Document>,
    options: &MergeOptions,
) -> Reconciliation {
    if overrides.is_empty() && options.empty_override == EmptyOverridePolicy::PassThrough {
        debug!(documents = base.len(), "no override documents; passing base through");
        return Reconciliation {
            merged: base,
            unused: Vec::new(),
        };
    }

    let mut pool: Vec<Option<Document>> = base.into_iter().map(Some).collect();
    let mut merged = Vec::with_capacity(overrides.len());

    for mut document in overrides {
        let position = pool.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|candidate| options.matches(document.identity(), candidate.identity()))
        });
        let claimed = position
            .and_then(|index| pool.get_mut(index))
            .and_then(Option::take);
        match claimed {
            Some(base_document) => {
                debug!(identity = %document.identity(), "merging override over base");
                document.merge_base(base_document);
            }
            None => debug!(identity = %document.identity(), "override has no base counterpart"),
        }
        merged.push(document);
    }

    let unused: Vec<Document> = pool.into_iter().flatten().collect();
    for document in &unused {
        let identity = document.identity();
        warn!(kind = identity.kind(), name = identity.name(), "unused base manifest");
    }
    Reconciliation { merged, unused }
}
