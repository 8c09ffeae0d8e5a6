//! Structural merging of manifest trees.
//!
//! Merging is total: every pair of node shapes has a defined outcome, and the
//! override side wins wherever the two trees cannot be combined.

use crate::node::{Mapping, Node, get};

/// Merge `base` underneath `overlay`, updating `overlay` in place.
///
/// Behaviour, dispatched on the overlay's shape:
/// - Mapping over mapping: keys from both sides are kept and shared keys
///   merge recursively.
/// - Null overlay: the base value fills the gap.
/// - Sequence over sequence, where every element on both sides is a mapping
///   carrying a `name`: elements are matched by name (see
///   [`merge_named_sequences`]).
/// - Anything else: the overlay wins and the base value is discarded.
///
/// # Examples
///
/// ```rust
/// use upmerge::merge::merge;
/// use upmerge::node::Node;
///
/// let parse = |text: &str| Node::from(serde_yaml::from_str::<serde_yaml::Value>(text).unwrap());
/// let mut overlay = parse("spec: {replicas: 3}");
/// merge(&mut overlay, parse("spec: {replicas: 1, image: v1}"));
/// assert_eq!(overlay, parse("spec: {replicas: 3, image: v1}"));
/// ```
pub fn merge(overlay: &mut Node, base: Node) {
    match overlay {
        Node::Null => *overlay = base,
        Node::Mapping(map) => {
            if let Node::Mapping(base_map) = base {
                merge_mapping(map, base_map);
            }
        }
        Node::Sequence(items) => {
            if let Node::Sequence(base_items) = base
                && is_named_sequence(items)
                && is_named_sequence(&base_items)
            {
                let overlay_items = std::mem::take(items);
                *items = merge_named_sequences(overlay_items, base_items);
            }
        }
        Node::Scalar(_) => {}
    }
}

/// Merge the entries of `base` into `target`; entries already in `target`
/// win, recursively.
pub fn merge_mapping(target: &mut Mapping, base: Mapping) {
    for (key, base_value) in base {
        match target.get_mut(&key) {
            Some(existing) => merge(existing, base_value),
            None => {
                target.insert(key, base_value);
            }
        }
    }
}

/// Reconcile two sequences of named mappings by their `name` field.
///
/// Overlay elements keep their order. Each one is deep-merged with the first
/// still-unmatched base element carrying an equal name; overlay elements
/// without a counterpart pass through unchanged. Base elements that were
/// never matched are appended afterwards, in their original order.
///
/// Callers are expected to have checked both sides with
/// [`is_named_sequence`]; unnamed elements never match anything.
#[must_use]
pub fn merge_named_sequences(overlay: Vec<Node>, base: Vec<Node>) -> Vec<Node> {
    let mut remaining: Vec<Option<Node>> = base.into_iter().map(Some).collect();
    let mut merged = Vec::with_capacity(overlay.len() + remaining.len());

    for mut element in overlay {
        let matched = element_name(&element).and_then(|name| {
            remaining
                .iter()
                .position(|slot| slot.as_ref().and_then(element_name) == Some(name))
        });
        if let Some(base_element) = matched
            .and_then(|index| remaining.get_mut(index))
            .and_then(Option::take)
        {
            merge(&mut element, base_element);
        }
        merged.push(element);
    }

    merged.extend(remaining.into_iter().flatten());
    merged
}

/// Whether every element of `items` is a mapping with a `name` key.
///
/// An empty sequence qualifies.
#[must_use]
pub fn is_named_sequence(items: &[Node]) -> bool {
    items.iter().all(|item| element_name(item).is_some())
}

fn element_name(node: &Node) -> Option<&Node> {
    node.as_mapping().and_then(|map| get(map, "name"))
}
