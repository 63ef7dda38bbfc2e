//! Value semantics shared by the condition evaluator and the resolver.
//!
//! Field values are `serde_json::Value`s straight off the transport format.
//! Everything rule evaluation needs from them lives here: the emptiness
//! rules, typed equality/ordering, and the trigger-key rendering used for
//! dynamic option lookup.

use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A field value is empty when it is `null`, the empty string, or an
/// empty array. Absent entries are handled by [`is_empty_entry`].
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Emptiness of a value-set entry: absent counts as empty.
pub fn is_empty_entry(values: &HashMap<String, Value>, name: &str) -> bool {
    values.get(name).map_or(true, is_empty_value)
}

/// Structural equality with cross-representation numeric equality, so a
/// schema comparison value of `18` matches a current value of `18.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Ordering for the relational operators. Numbers compare as f64, strings
/// lexicographically. Any other pairing has no ordering and the operator
/// evaluates to a non-match.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Render a parent value as a dynamic-options trigger key. JSON object keys
/// are strings, so scalars are looked up by their canonical rendering
/// (`"A"` → `A`, `2` → `"2"`, `true` → `"true"`). Empty and composite
/// values never match a key.
pub fn trigger_key(value: &Value) -> Option<String> {
    if is_empty_value(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
