//! Condition Evaluator: per-field visibility as a pure function of the
//! schema rule and the current value-set.
//!
//! Two gates, in fixed order, both of which must pass:
//! 1. dependency gate — `dependsOn` parent must hold a non-empty value;
//! 2. condition gate — the declared comparison against another field.
//! A field declaring neither is always visible.

use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::schema::{Condition, ConditionOperator, FieldSpec};
use crate::domain::value::{compare_values, is_empty_entry, values_equal};

/// Whether a field is visible under the given value-set. Pure; never errors.
/// Type-mismatched comparisons degrade to a non-match rather than raising.
pub fn is_visible(field: &FieldSpec, values: &HashMap<String, Value>) -> bool {
    if let Some(parent) = &field.depends_on {
        if is_empty_entry(values, parent) {
            return false;
        }
    }

    match &field.condition {
        Some(condition) => condition_matches(condition, values),
        None => true,
    }
}

fn condition_matches(condition: &Condition, values: &HashMap<String, Value>) -> bool {
    let current = values
        .get(condition.referenced_field())
        .unwrap_or(&Value::Null);
    let expected = &condition.value;

    match condition.operator {
        ConditionOperator::Equal => values_equal(current, expected),
        ConditionOperator::NotEqual => !values_equal(current, expected),
        ConditionOperator::Greater => {
            compare_values(current, expected) == Some(Ordering::Greater)
        }
        ConditionOperator::Less => compare_values(current, expected) == Some(Ordering::Less),
        ConditionOperator::GreaterOrEqual => matches!(
            compare_values(current, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        ConditionOperator::LessOrEqual => matches!(
            compare_values(current, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        // Set membership requires an array operand. A non-array evaluates
        // to false for BOTH variants (preserved behavior).
        ConditionOperator::Includes => set_includes(current, expected),
        ConditionOperator::NotIncludes => match current {
            Value::Array(_) => !set_includes(current, expected),
            _ => false,
        },
    }
}

fn set_includes(current: &Value, expected: &Value) -> bool {
    match current {
        Value::Array(items) => items.iter().any(|item| values_equal(item, expected)),
        _ => false,
    }
}
