use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar value of one dimension attribute.
///
/// Uses derive for bincode compatibility: the change log's binary codec
/// needs a non-self-describing representation, which rules out raw
/// `serde_json::Value` payloads. JSON serialization is externally tagged
/// (`{"Integer":25}`), the same shape for storage and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(v) => Some(*v),
            AttributeValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => write!(f, "null"),
            AttributeValue::Boolean(v) => write!(f, "{}", v),
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Boolean(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Integer(v as i64)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Integer(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => AttributeValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(AttributeValue::from(25).as_i64(), Some(25));
        assert_eq!(AttributeValue::from(25).as_f64(), Some(25.0));
        assert_eq!(AttributeValue::from(2.5).as_f64(), Some(2.5));
        assert_eq!(AttributeValue::from("Lisboa").as_str(), Some("Lisboa"));
        assert_eq!(AttributeValue::from(true).as_bool(), Some(true));
        assert!(AttributeValue::Null.is_null());

        assert_eq!(AttributeValue::from("x").as_i64(), None);
        assert_eq!(AttributeValue::from(1).as_str(), None);
    }

    #[test]
    fn test_from_option() {
        let some: AttributeValue = Some(25).into();
        assert_eq!(some, AttributeValue::Integer(25));
        let none: AttributeValue = Option::<i64>::None.into();
        assert!(none.is_null());
    }

    #[test]
    fn test_json_shape_is_tagged() {
        let v = AttributeValue::Integer(25);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"Integer":25}"#);
        let back: AttributeValue = serde_json::from_str(r#"{"Integer":25}"#).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_bincode_roundtrip() {
        let values = vec![
            AttributeValue::Null,
            AttributeValue::Boolean(true),
            AttributeValue::Integer(-7),
            AttributeValue::Float(2.5),
            AttributeValue::Text("Sandra".to_string()),
        ];
        let bytes = bincode::serialize(&values).unwrap();
        let back: Vec<AttributeValue> = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_display() {
        assert_eq!(AttributeValue::from(25).to_string(), "25");
        assert_eq!(AttributeValue::Null.to_string(), "null");
    }
}
