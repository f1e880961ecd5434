//! Property values stored on nodes

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Scalar property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

/// Property map for nodes
pub type PropertyMap = HashMap<String, PropertyValue>;

impl PropertyValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Float value; integers widen
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "\"{}\"", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(x) => write!(f, "{}", x),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Null => f.write_str("null"),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

/// Dataset files carry JSON scalars; arrays and objects have no counterpart.
impl From<&serde_json::Value> for PropertyValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => PropertyValue::String(s.clone()),
            serde_json::Value::Bool(b) => PropertyValue::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => PropertyValue::Integer(i),
                None => n.as_f64().map_or(PropertyValue::Null, PropertyValue::Float),
            },
            _ => PropertyValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        assert_eq!(PropertyValue::from("Tom").as_string(), Some("Tom"));
        assert_eq!(PropertyValue::from(3i64).as_float(), Some(3.0));
        assert_eq!(PropertyValue::from(0.5).as_float(), Some(0.5));
        assert_eq!(PropertyValue::from(true).as_float(), None);
        assert_eq!(PropertyValue::from(1.0).as_string(), None);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(PropertyValue::from(&json!("a")), PropertyValue::String("a".into()));
        assert_eq!(PropertyValue::from(&json!(1956)), PropertyValue::Integer(1956));
        assert_eq!(PropertyValue::from(&json!(1.5)), PropertyValue::Float(1.5));
        assert_eq!(PropertyValue::from(&json!([1, 2])), PropertyValue::Null);
    }
}
