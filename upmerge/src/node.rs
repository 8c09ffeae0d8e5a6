//! Loosely typed manifest trees.
//!
//! Manifests are merged without a schema, so every document is held as a
//! [`Node`]: a tagged union of mappings, sequences, scalars and null. Mapping
//! keys are restricted to scalars and kept in a [`BTreeMap`], which makes the
//! serialised form independent of the key order found in the source text.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_yaml::{Number, Value};

/// Key of a YAML mapping.
///
/// Integer and boolean keys keep their type so they round-trip unquoted.
/// Any other key shape is stored in its rendered string form.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// A boolean key.
    Bool(bool),
    /// An integer key.
    Int(i64),
    /// A string key.
    Str(String),
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Value> for Key {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => number
                .as_i64()
                .map_or_else(|| Self::Str(number.to_string()), Self::Int),
            Value::String(text) => Self::Str(text),
            Value::Null => Self::Str("null".to_owned()),
            Value::Tagged(tagged) => Self::from(tagged.value),
            other @ (Value::Sequence(_) | Value::Mapping(_)) => Self::Str(
                serde_yaml::to_string(&other)
                    .map(|text| text.trim_end().to_owned())
                    .unwrap_or_default(),
            ),
        }
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(flag) => serializer.serialize_bool(*flag),
            Self::Int(number) => serializer.serialize_i64(*number),
            Self::Str(text) => serializer.serialize_str(text),
        }
    }
}

/// Ordered mapping node.
pub type Mapping = BTreeMap<Key, Node>;

/// Leaf value of a manifest tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    /// `true` or `false`.
    Bool(bool),
    /// Integer or floating point number.
    Number(Number),
    /// Any string, quoted or plain.
    String(String),
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(flag) => serializer.serialize_bool(*flag),
            Self::Number(number) => number.serialize(serializer),
            Self::String(text) => serializer.serialize_str(text),
        }
    }
}

/// A node of a manifest tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Node {
    /// Explicit or implied null.
    #[default]
    Null,
    /// Leaf value.
    Scalar(Scalar),
    /// Ordered list of nodes.
    Sequence(Vec<Node>),
    /// Mapping of scalar keys to nodes.
    Mapping(Mapping),
}

impl Node {
    /// Build a string scalar node.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(value.into()))
    }

    /// Returns the string value when the node is a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(text)) => Some(text),
            _ => None,
        }
    }

    /// Returns the mapping when the node is a mapping.
    #[must_use]
    pub const fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }


    /// Looks up `key` when the node is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_mapping().and_then(|map| get(map, key))
    }

    /// Short description of the node's shape, used in diagnostics.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Scalar(_) => "a scalar",
            Self::Sequence(_) => "a sequence",
            Self::Mapping(_) => "a mapping",
        }
    }
}

/// Looks up a string key in `map`.
#[must_use]
pub fn get<'a>(map: &'a Mapping, key: &str) -> Option<&'a Node> {
    map.get(&Key::from(key))
}

/// Returns the mapping stored under `key`, replacing a missing or
/// non-mapping entry with an empty mapping first.
pub fn child_mapping<'a>(parent: &'a mut Mapping, key: &str) -> &'a mut Mapping {
    ensure_mapping(parent.entry(Key::from(key)).or_default())
}

fn ensure_mapping(slot: &mut Node) -> &mut Mapping {
    match slot {
        Node::Mapping(map) => map,
        other => {
            *other = Node::Mapping(Mapping::new());
            ensure_mapping(other)
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Scalar(Scalar::Bool(flag)),
            Value::Number(number) => Self::Scalar(Scalar::Number(number)),
            Value::String(text) => Self::Scalar(Scalar::String(text)),
            Value::Sequence(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Mapping(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, item)| (Key::from(key), Self::from(item)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Scalar(scalar) => scalar.serialize(serializer),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(map) => map.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Key, Mapping, Node, Scalar, child_mapping, get};
    use anyhow::Result;
    use rstest::rstest;

    fn parse(text: &str) -> Result<Node> {
        Ok(Node::from(serde_yaml::from_str::<serde_yaml::Value>(text)?))
    }

    #[rstest]
    fn converts_nested_values() -> Result<()> {
        let node = parse("kind: Service\nports:\n  - 80\n  - name: http\nenabled: true\n")?;
        assert_eq!(node.get("kind").and_then(Node::as_str), Some("Service"));
        assert!(matches!(node.get("ports"), Some(Node::Sequence(items)) if items.len() == 2));
        assert_eq!(node.get("enabled"), Some(&Node::Scalar(Scalar::Bool(true))));
        Ok(())
    }

    #[rstest]
    fn integer_keys_survive_a_round_trip() -> Result<()> {
        let node = parse("4: 11\nb: 2\n")?;
        let map = node.as_mapping().expect("mapping");
        assert!(map.contains_key(&Key::Int(4)));
        let rendered = serde_yaml::to_string(&node)?;
        assert_eq!(rendered, "4: 11\nb: 2\n");
        Ok(())
    }

    #[rstest]
    fn serialises_keys_in_sorted_order() -> Result<()> {
        let node = parse("zeta: 1\nalpha: 2\nmid: [a, b]\n")?;
        let rendered = serde_yaml::to_string(&node)?;
        assert_eq!(rendered, "alpha: 2\nmid:\n- a\n- b\nzeta: 1\n");
        Ok(())
    }

    #[rstest]
    fn tags_are_dropped() -> Result<()> {
        let node = parse("value: !custom hello\n")?;
        assert_eq!(node.get("value").and_then(Node::as_str), Some("hello"));
        Ok(())
    }

    #[rstest]
    #[case(Node::Null)]
    #[case(Node::string("scalar"))]
    #[case(Node::Sequence(Vec::new()))]
    fn child_mapping_replaces_non_mappings(#[case] existing: Node) {
        let mut root = Mapping::new();
        root.insert(Key::from("metadata"), existing);
        child_mapping(&mut root, "metadata").insert(Key::from("name"), Node::string("api"));
        let name = get(&root, "metadata")
            .and_then(|metadata| metadata.get("name"))
            .and_then(Node::as_str);
        assert_eq!(name, Some("api"));
    }

    #[rstest]
    fn child_mapping_keeps_existing_entries() -> Result<()> {
        let mut root = parse("metadata:\n  name: api\n")?
            .as_mapping()
            .cloned()
            .unwrap_or_default();
        child_mapping(&mut root, "metadata").insert(Key::from("namespace"), Node::string("prod"));
        let metadata = get(&root, "metadata").expect("metadata");
        assert_eq!(metadata.get("name").and_then(Node::as_str), Some("api"));
        assert_eq!(metadata.get("namespace").and_then(Node::as_str), Some("prod"));
        Ok(())
    }
}
