//! Value types interpolated into statements as quoted literals

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util;

/// A scalar written into a statement as a literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render as a SQL literal: single-quoted text, or bare `NULL`
    ///
    /// The contents are not escaped. Callers are responsible for only passing
    /// trusted or pre-sanitized input.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            other => util::escape(&other.to_string(), util::QUOTE),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(true) => f.write_str("1"),
            Value::Bool(false) => f.write_str("0"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
        }
    }
}

// Implement From for common types
impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::Int(val as i64)
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::Int(val)
    }
}

impl From<u32> for Value {
    fn from(val: u32) -> Self {
        Value::Int(val as i64)
    }
}

impl From<f32> for Value {
    fn from(val: f32) -> Self {
        Value::Float(val as f64)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::Float(val)
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::String(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_string())
    }
}

impl From<&String> for Value {
    fn from(val: &String) -> Self {
        Value::String(val.clone())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_creation() {
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("hello"), Value::String("hello".to_string()));
        assert_eq!(Value::from(()), Value::Null);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(Some(42i32)), Value::Int(42));
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn test_literals() {
        assert_eq!(Value::from("Tadhg Boyle").to_literal(), "'Tadhg Boyle'");
        assert_eq!(Value::from(5).to_literal(), "'5'");
        assert_eq!(Value::from(2.5).to_literal(), "'2.5'");
        assert_eq!(Value::from(false).to_literal(), "'0'");
        assert_eq!(Value::Null.to_literal(), "NULL");
    }

    #[test]
    fn test_literal_is_not_escaped() {
        assert_eq!(Value::from("O'Brien").to_literal(), "'O'Brien'");
    }
}
