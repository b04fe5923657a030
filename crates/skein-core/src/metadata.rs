use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Named metadata attached to a narrative graph node.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A flexible metadata value that supports common types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// A boolean value.
    Boolean(bool),
    /// A 64-bit signed integer value.
    Integer(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A text value.
    String(String),
    /// An ordered list of metadata values.
    List(Vec<MetadataValue>),
    /// A string-keyed map of metadata values (a property sub-object).
    Map(BTreeMap<String, MetadataValue>),
}

impl MetadataValue {
    /// The integer payload, accepting integral floats and numeric strings.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Float(n) if n.fract() == 0.0 => Some(*n as i64),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// The text payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Map(_) => write!(f, "{{...}}"),
        }
    }
}

/// Look up a key on a node's metadata.
///
/// Top-level keys win. Otherwise every property sub-object (a `Map` value)
/// is searched one level deep, in key order.
pub fn lookup<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a MetadataValue> {
    if let Some(value) = metadata.get(key) {
        return Some(value);
    }
    metadata.values().find_map(|value| match value {
        MetadataValue::Map(inner) => inner.get(key),
        _ => None,
    })
}
