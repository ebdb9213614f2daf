//! The ordered value tree produced by the parser.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A leaf constant of the configuration literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A node of the configuration tree.
///
/// Mapping order is insertion order; the walker emits in that order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Scalar(Scalar),
    Sequence(Vec<ConfigValue>),
    Mapping(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn str(s: impl Into<String>) -> Self {
        ConfigValue::Scalar(Scalar::Str(s.into()))
    }

    pub fn int(n: i64) -> Self {
        ConfigValue::Scalar(Scalar::Int(n))
    }

    pub fn bool(b: bool) -> Self {
        ConfigValue::Scalar(Scalar::Bool(b))
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, ConfigValue>> {
        match self {
            ConfigValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut IndexMap<String, ConfigValue>> {
        match self {
            ConfigValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<ConfigValue>> {
        match self {
            ConfigValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a direct child of a mapping.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// True for string and numeric scalars, the leaves a dialect may leave
    /// without a writer.
    pub fn is_plain_scalar(&self) -> bool {
        matches!(self, ConfigValue::Scalar(Scalar::Str(_) | Scalar::Int(_)))
    }
}

impl From<Scalar> for ConfigValue {
    fn from(scalar: Scalar) -> Self {
        ConfigValue::Scalar(scalar)
    }
}

/// Appends a mapping key to a KeyPath.
pub fn child_path(parent: &str, key: &str) -> String {
    format!("{parent}.{key}")
}

/// Appends a sequence index to a KeyPath.
pub fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}.{index}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_untagged_in_insertion_order() {
        let mut map = IndexMap::new();
        map.insert("zeta".to_string(), ConfigValue::int(-3));
        map.insert("alpha".to_string(), ConfigValue::bool(true));
        map.insert(
            "list".to_string(),
            ConfigValue::Sequence(vec![ConfigValue::str("a")]),
        );
        let value = ConfigValue::Mapping(map);

        let rendered = serde_json::to_string(&value).unwrap();
        assert_eq!(rendered, r#"{"zeta":-3,"alpha":true,"list":["a"]}"#);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"zeta": -3, "alpha": true, "list": ["a"]})
        );
    }

    #[test]
    fn plain_scalars_exclude_booleans() {
        assert!(ConfigValue::str("x").is_plain_scalar());
        assert!(ConfigValue::int(1).is_plain_scalar());
        assert!(!ConfigValue::bool(false).is_plain_scalar());
        assert!(!ConfigValue::Sequence(vec![]).is_plain_scalar());
    }

    #[test]
    fn key_paths_are_dotted() {
        let servers = child_path("", "servers");
        assert_eq!(servers, ".servers");
        assert_eq!(index_path(&servers, 2), ".servers.2");
    }
}
