//! Typed configuration values and the immutable value set.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A configuration value after coercion from the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    /// Microseconds since the unix epoch.
    Timestamp(i64),
}

impl TypedValue {
    /// Name of the variant, used in logs and the admin API.
    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Boolean(_) => "boolean",
            TypedValue::Integer(_) => "integer",
            TypedValue::Double(_) => "double",
            TypedValue::String(_) => "string",
            TypedValue::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Boolean(v) => write!(f, "{}", v),
            TypedValue::Integer(v) => write!(f, "{}", v),
            TypedValue::Double(v) => write!(f, "{}", v),
            TypedValue::String(v) => f.write_str(v),
            TypedValue::Timestamp(v) => write!(f, "{}us", v),
        }
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        TypedValue::Boolean(v)
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        TypedValue::Integer(v)
    }
}

impl From<f64> for TypedValue {
    fn from(v: f64) -> Self {
        TypedValue::Double(v)
    }
}

impl From<String> for TypedValue {
    fn from(v: String) -> Self {
        TypedValue::String(v)
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        TypedValue::String(v.to_string())
    }
}

impl From<Timestamp> for TypedValue {
    fn from(v: Timestamp) -> Self {
        TypedValue::Timestamp(v.0)
    }
}

/// Timestamp expressed in microseconds since the unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl From<i64> for Timestamp {
    fn from(micros: i64) -> Self {
        Self(micros)
    }
}

/// Rust types that accessor handles can be declared with.
///
/// `from_typed` returns `None` when the stored variant does not match; no
/// cross-type conversion is attempted, so an integer is never read as a double.
pub trait PropertyValue: Clone + Send + Sync + 'static {
    fn from_typed(value: &TypedValue) -> Option<Self>;
}

impl PropertyValue for bool {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl PropertyValue for i64 {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl PropertyValue for f64 {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl PropertyValue for String {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl PropertyValue for Timestamp {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Timestamp(v) => Some(Timestamp(*v)),
            _ => None,
        }
    }
}

impl<T: PropertyValue> PropertyValue for Option<T> {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        T::from_typed(value).map(Some)
    }
}

/// Immutable mapping from property name to value, published as one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValueSet {
    values: HashMap<String, TypedValue>,
}

impl ValueSet {
    /// Create an empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlay `newer` on top of this set. Keys present in `newer` win;
    /// keys only present here are kept.
    pub fn merged_with(&self, newer: &ValueSet) -> ValueSet {
        let mut values = self.values.clone();
        for (name, value) in &newer.values {
            values.insert(name.clone(), value.clone());
        }
        ValueSet { values }
    }
}

impl<K: Into<String>> FromIterator<(K, TypedValue)> for ValueSet {
    /// Later entries win over earlier ones with the same name.
    fn from_iter<I: IntoIterator<Item = (K, TypedValue)>>(iter: I) -> Self {
        let mut values = HashMap::new();
        for (name, value) in iter {
            values.insert(name.into(), value);
        }
        ValueSet { values }
    }
}
