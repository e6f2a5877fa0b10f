//! Document values
//!
//! Every field that ends up in a playbook is one of a closed set of shapes:
//! strings, integers, floats, booleans, mappings and sequences of these.
//! Mappings are ordered by key so rendered playbooks are stable between runs.

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered mapping of field names to values
pub type Fields = BTreeMap<String, Value>;

/// A value that can be placed in a playbook document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag
    Bool(bool),
    /// Whole number (also used for numeric file modes)
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Text
    String(String),
    /// Ordered list
    Sequence(Vec<Value>),
    /// Nested mapping
    Mapping(Fields),
}

impl Value {
    /// Build a mapping from key/value pairs
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Look up a key if this value is a mapping
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Fields> {
        match self {
            Value::Mapping(fields) => Some(fields),
            _ => None,
        }
    }

    /// Check the value is well formed for the document
    ///
    /// Mapping keys must be non-empty and floats must be finite. `path` names
    /// the location of this value in error messages.
    pub fn validate(&self, path: &str) -> Result<(), BuildError> {
        match self {
            Value::Float(f) if !f.is_finite() => Err(BuildError::InvalidValue {
                path: path.to_string(),
                reason: format!("{} is not a finite number", f),
            }),
            Value::Sequence(items) => items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| item.validate(&format!("{}[{}]", path, i))),
            Value::Mapping(fields) => fields.iter().try_for_each(|(key, value)| {
                if key.is_empty() {
                    return Err(BuildError::InvalidValue {
                        path: path.to_string(),
                        reason: "mapping key cannot be empty".to_string(),
                    });
                }
                value.validate(&format!("{}.{}", path, key))
            }),
            _ => Ok(()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Value::Mapping(fields)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::mapping(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_keys_are_sorted() {
        let value = Value::mapping([("state", "link"), ("path", "/srv"), ("force", "yes")]);
        let keys: Vec<&str> = value
            .as_mapping()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["force", "path", "state"]);
    }

    #[test]
    fn test_serializes_untagged() {
        let value = Value::mapping([
            ("name", Value::from(vec!["git", "curl"])),
            ("update_cache", Value::from(true)),
            ("mode", Value::from(0o644u32)),
        ]);
        let yaml = serde_yaml::to_string(&value).unwrap();
        assert_eq!(
            yaml,
            "mode: 420\nname:\n- git\n- curl\nupdate_cache: true\n"
        );
    }

    #[test]
    fn test_validate_rejects_empty_nested_key() {
        let value = Value::mapping([("rules", Value::mapping([("", "allow")]))]);
        let err = value.validate("ufw").unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidValue {
                path: "ufw.rules".to_string(),
                reason: "mapping key cannot be empty".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_rejects_non_finite_float() {
        let value = Value::from(vec![Value::from(1.5), Value::from(f64::NAN)]);
        let err = value.validate("weights").unwrap_err();
        assert!(matches!(err, BuildError::InvalidValue { ref path, .. } if path == "weights[1]"));
    }

    #[test]
    fn test_accessors() {
        let value: Value = [("port", Value::from(22)), ("proto", Value::from("tcp"))]
            .into_iter()
            .collect();
        assert_eq!(value.get("port").and_then(Value::as_i64), Some(22));
        assert_eq!(value.get("proto").and_then(Value::as_str), Some("tcp"));
        assert!(value.get("missing").is_none());
        assert!(Value::from("x").get("port").is_none());
    }
}
