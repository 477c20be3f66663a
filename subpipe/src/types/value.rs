//! Setting values and typed access to values read out of records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A setting value carried by an operation descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Whole number
    Int(i64),
    /// Floating point
    Float(f64),
    /// String value
    String(String),
    /// Ordered list of values
    Array(Vec<Value>),
    /// String-keyed mapping
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Borrow the text of a string setting
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "(null)"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(_) | Value::Object(_) => write!(f, "{}", self.to_json()),
        }
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

/// A value read from a record by path
///
/// Every coercion is best effort: when the underlying value cannot be
/// represented as the requested type, the type's zero value comes back.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldValue {
    value: serde_json::Value,
    exists: bool,
}

impl FieldValue {
    /// Wrap a value that was found
    pub fn found(value: serde_json::Value) -> Self {
        Self { value, exists: true }
    }

    /// The result of a lookup that found nothing
    pub fn missing() -> Self {
        Self::default()
    }

    /// True when the lookup found a non-null value.
    ///
    /// An explicit null is reported the same as a missing path.
    pub fn exists(&self) -> bool {
        self.exists && !self.value.is_null()
    }

    /// The underlying JSON value (null when missing)
    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    pub fn into_value(self) -> serde_json::Value {
        self.value
    }

    /// Strings come back verbatim, other values as compact JSON text
    pub fn as_string(&self) -> String {
        match &self.value {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        bytes_from_json(&self.value)
    }

    pub fn as_i64(&self) -> i64 {
        match &self.value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn as_u64(&self) -> u64 {
        match &self.value {
            serde_json::Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .unwrap_or(0),
            serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match &self.value {
            serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
            serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn as_bool(&self) -> bool {
        match &self.value {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::String(s) => s == "true" || s == "1",
            serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            _ => false,
        }
    }

    pub fn is_array(&self) -> bool {
        self.value.is_array()
    }

    /// Array elements as values; empty when this is not an array
    pub fn as_array(&self) -> Vec<FieldValue> {
        match &self.value {
            serde_json::Value::Array(items) => {
                items.iter().cloned().map(FieldValue::found).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Object entries as values; empty when this is not an object
    pub fn as_map(&self) -> BTreeMap<String, FieldValue> {
        match &self.value {
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), FieldValue::found(v.clone())))
                .collect(),
            _ => BTreeMap::new(),
        }
    }
}

/// Raw bytes held by a JSON value.
///
/// Binary data lives in a tree as an array of integers in `0..=255`.
/// Strings yield their UTF-8 bytes; anything else yields its JSON text.
pub fn bytes_from_json(value: &serde_json::Value) -> Vec<u8> {
    match value {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::String(s) => s.as_bytes().to_vec(),
        serde_json::Value::Array(items) => {
            let bytes: Option<Vec<u8>> = items
                .iter()
                .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect();
            bytes.unwrap_or_else(|| value.to_string().into_bytes())
        }
        other => other.to_string().into_bytes(),
    }
}

/// Store bytes in a tree: a string when they are valid UTF-8, else a byte array
pub fn json_from_bytes(bytes: Vec<u8>) -> serde_json::Value {
    match String::from_utf8(bytes) {
        Ok(text) => serde_json::Value::String(text),
        Err(err) => serde_json::Value::Array(
            err.into_bytes().into_iter().map(serde_json::Value::from).collect(),
        ),
    }
}
