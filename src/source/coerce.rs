//! Mapping between store values and typed configuration values.
//!
//! Slots are checked in a fixed order: boolean, integer, double, string,
//! timestamp. The first populated slot wins. References to other entities and
//! values with no usable slot coerce to `None` and are dropped by the caller.

use crate::registry::TypedValue;
use crate::source::types::{RawProperty, RawValue};

/// Coerce one store property into a typed value.
pub fn coerce(property: &RawProperty) -> Option<TypedValue> {
    property.value.as_ref().and_then(coerce_value)
}

/// Coerce a store value into a typed value.
pub fn coerce_value(raw: &RawValue) -> Option<TypedValue> {
    if raw.key_value.is_some() {
        return None;
    }

    raw.boolean_value
        .map(TypedValue::Boolean)
        .or_else(|| raw.integer_value.map(TypedValue::Integer))
        .or_else(|| raw.double_value.map(TypedValue::Double))
        .or_else(|| raw.string_value.clone().map(TypedValue::String))
        .or_else(|| raw.timestamp_microseconds_value.map(TypedValue::Timestamp))
}

/// The store form of a typed value, with exactly one slot populated.
pub fn to_raw(value: &TypedValue) -> RawValue {
    let mut raw = RawValue::default();
    match value {
        TypedValue::Boolean(v) => raw.boolean_value = Some(*v),
        TypedValue::Integer(v) => raw.integer_value = Some(*v),
        TypedValue::Double(v) => raw.double_value = Some(*v),
        TypedValue::String(v) => raw.string_value = Some(v.clone()),
        TypedValue::Timestamp(v) => raw.timestamp_microseconds_value = Some(*v),
    }
    raw
}

/// Build a store property from a name and typed value.
pub fn to_raw_property(name: &str, value: &TypedValue) -> RawProperty {
    RawProperty::new(name, to_raw(value))
}
