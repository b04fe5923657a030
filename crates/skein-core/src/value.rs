use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar value held by a variable in the narrative engine's bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A boolean value.
    Boolean(bool),
    /// A 64-bit signed integer value. Enum variables are stored this way too.
    Integer(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A text value.
    Text(String),
}

impl Value {
    /// The natural type of this value.
    pub fn var_type(&self) -> VarType {
        match self {
            Self::Boolean(_) => VarType::Boolean,
            Self::Integer(_) => VarType::Integer,
            Self::Float(_) => VarType::Float,
            Self::Text(_) => VarType::Text,
        }
    }

    /// The integer payload, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The numeric payload widened to a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// The text payload, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// The declared type of a variable in the bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarType {
    /// Boolean variable.
    Boolean,
    /// Integer variable.
    Integer,
    /// Floating-point variable.
    Float,
    /// Text variable.
    Text,
    /// Integer-backed enumeration with its declared values, in declaration order.
    Enum(Vec<i64>),
}

impl VarType {
    /// The type-appropriate "zero" used when a namespace is reset.
    ///
    /// Enumerations reset to their first declared value, or `0` when the
    /// declaration lists none.
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Boolean => Value::Boolean(false),
            Self::Integer => Value::Integer(0),
            Self::Float => Value::Float(0.0),
            Self::Text => Value::Text(String::new()),
            Self::Enum(values) => Value::Integer(values.first().copied().unwrap_or(0)),
        }
    }

    /// Whether a value may be stored in a variable of this type.
    ///
    /// Integers are accepted by float variables; enum variables accept
    /// any integer.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Boolean, Value::Boolean(_))
                | (Self::Integer, Value::Integer(_))
                | (Self::Float, Value::Float(_) | Value::Integer(_))
                | (Self::Text, Value::Text(_))
                | (Self::Enum(_), Value::Integer(_))
        )
    }

    /// Whether reads of this type yield an integer.
    pub fn is_integral(&self) -> bool {
        matches!(self, Self::Integer | Self::Enum(_))
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "bool"),
            Self::Integer => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Text => write!(f, "string"),
            Self::Enum(_) => write!(f, "enum"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_are_type_appropriate() {
        assert_eq!(VarType::Integer.zero_value(), Value::Integer(0));
        assert_eq!(VarType::Boolean.zero_value(), Value::Boolean(false));
        assert_eq!(VarType::Text.zero_value(), Value::Text(String::new()));
        assert_eq!(VarType::Float.zero_value(), Value::Float(0.0));
    }

    #[test]
    fn enum_zero_is_first_declared_value() {
        assert_eq!(VarType::Enum(vec![3, 1, 2]).zero_value(), Value::Integer(3));
        assert_eq!(VarType::Enum(Vec::new()).zero_value(), Value::Integer(0));
    }

    #[test]
    fn float_accepts_integer() {
        assert!(VarType::Float.accepts(&Value::Integer(2)));
        assert!(!VarType::Integer.accepts(&Value::Float(2.0)));
        assert!(!VarType::Boolean.accepts(&Value::Integer(1)));
    }

    #[test]
    fn untagged_deserialize_picks_natural_type() {
        let v: Value = serde_json::from_str("3").unwrap();
        assert_eq!(v, Value::Integer(3));
        let v: Value = serde_json::from_str("true").unwrap();
        assert_eq!(v, Value::Boolean(true));
        let v: Value = serde_json::from_str("1.5").unwrap();
        assert_eq!(v, Value::Float(1.5));
        let v: Value = serde_json::from_str("\"lamp\"").unwrap();
        assert_eq!(v, Value::Text("lamp".into()));
    }

    #[test]
    fn display_quotes_text() {
        assert_eq!(Value::from("x").to_string(), "\"x\"");
        assert_eq!(Value::from(7_i64).to_string(), "7");
        assert_eq!(VarType::Enum(vec![0]).to_string(), "enum");
    }
}
