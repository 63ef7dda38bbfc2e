//! Typed representation of a form schema.
//!
//! The shapes here mirror the transport JSON one-to-one (`type`,
//! `defaultValue`, `dependsOn`, `dynamicOptions`, operator tokens like
//! `"==="`), so a fetched document deserializes straight into the model.
//! The model carries no behavior beyond structural access; evaluation
//! lives in the `engine` modules.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Field Kind
// ============================================================================

/// Widget kind for a field. Closed set: an unknown kind is rejected at
/// deserialization, before the engine ever sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Number,
    Select,
    Radio,
    Checkbox,
    Textarea,
}

// ============================================================================
// Options
// ============================================================================

/// One selectable option: display label plus the value it submits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub label: String,
    pub value: Value,
}

// ============================================================================
// Validation
// ============================================================================

/// Validation rule vocabulary. Declarative only: the engine passes these
/// through to the render adapter untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationRule {
    Required,
    MinLength,
    MaxLength,
    Pattern,
    Email,
}

/// A single validation declaration on a field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationSpec {
    pub rule: ValidationRule,
    pub message: String,
    /// Constraint value where the rule takes one (length bound, pattern).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

// ============================================================================
// Conditions
// ============================================================================

/// Comparison operator for visibility conditions. Closed set with the
/// transport spellings as serde renames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOperator {
    #[serde(rename = "===")]
    Equal,
    #[serde(rename = "!==")]
    NotEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "includes")]
    Includes,
    #[serde(rename = "!includes")]
    NotIncludes,
}

/// A declarative comparison against another field's current value.
///
/// `field` holds a delimiter-wrapped reference token (`"{{age}}"`); bare
/// names are accepted too.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    pub value: Value,
}

impl Condition {
    /// The referenced field name with the `{{ }}` delimiters stripped.
    pub fn referenced_field(&self) -> &str {
        self.field
            .trim()
            .trim_start_matches("{{")
            .trim_end_matches("}}")
            .trim()
    }
}

// ============================================================================
// Fields
// ============================================================================

/// One schema-declared input field. Immutable once the schema is loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Key in the value-set. Unique within a schema.
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(
        rename = "defaultValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<Value>,
    /// Static option list for select/radio kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionItem>,
    /// Option lists keyed by the parent field's value; overrides `options`
    /// while the trigger value holds.
    #[serde(
        rename = "dynamicOptions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dynamic_options: Option<HashMap<String, Vec<OptionItem>>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<ValidationSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Name of the parent field this one is gated on.
    #[serde(rename = "dependsOn", default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
}

// ============================================================================
// Schema
// ============================================================================

/// A complete form schema: identity plus the ordered field list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(rename = "formId")]
    pub form_id: String,
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

impl FormSchema {
    /// Deserialize a schema from its transport JSON. Convenience for the
    /// external load step; the engine itself accepts the typed value.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a field by its value-set name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_deserializes_transport_shape() {
        let raw = json!({
            "formId": "signup",
            "title": "Sign Up",
            "fields": [
                {
                    "id": "f1",
                    "type": "select",
                    "name": "country",
                    "label": "Country",
                    "placeholder": "Pick one",
                    "options": [
                        { "label": "Austria", "value": "A" },
                        { "label": "Belgium", "value": "B" }
                    ],
                    "validations": [
                        { "rule": "required", "message": "Country is required" }
                    ]
                },
                {
                    "id": "f2",
                    "type": "select",
                    "name": "state",
                    "label": "State",
                    "dependsOn": "country",
                    "dynamicOptions": {
                        "A": [ { "label": "X", "value": "x" } ]
                    }
                },
                {
                    "id": "f3",
                    "type": "text",
                    "name": "guardian",
                    "label": "Guardian",
                    "condition": { "field": "{{age}}", "operator": "<", "value": 18 }
                }
            ]
        });

        let schema: FormSchema = serde_json::from_value(raw).unwrap();
        assert_eq!(schema.form_id, "signup");
        assert_eq!(schema.fields.len(), 3);

        let country = schema.field("country").unwrap();
        assert_eq!(country.kind, FieldKind::Select);
        assert_eq!(country.options.len(), 2);
        assert_eq!(country.validations[0].rule, ValidationRule::Required);

        let state = schema.field("state").unwrap();
        assert_eq!(state.depends_on.as_deref(), Some("country"));
        assert!(state.dynamic_options.as_ref().unwrap().contains_key("A"));

        let guardian = schema.field("guardian").unwrap();
        let condition = guardian.condition.as_ref().unwrap();
        assert_eq!(condition.operator, ConditionOperator::Less);
        assert_eq!(condition.referenced_field(), "age");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let raw = json!({
            "formId": "f",
            "title": "t",
            "fields": [
                { "id": "f1", "type": "slider", "name": "a", "label": "A" }
            ]
        });
        assert!(serde_json::from_value::<FormSchema>(raw).is_err());
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let raw = json!({
            "field": "{{x}}", "operator": "~=", "value": 1
        });
        assert!(serde_json::from_value::<Condition>(raw).is_err());
    }

    #[test]
    fn test_reference_token_stripping() {
        let condition = Condition {
            field: "{{ age }}".to_string(),
            operator: ConditionOperator::Equal,
            value: json!(1),
        };
        assert_eq!(condition.referenced_field(), "age");

        let bare = Condition {
            field: "age".to_string(),
            operator: ConditionOperator::Equal,
            value: json!(1),
        };
        assert_eq!(bare.referenced_field(), "age");
    }

    #[test]
    fn test_operator_round_trips_transport_tokens() {
        for (token, op) in [
            ("===", ConditionOperator::Equal),
            ("!==", ConditionOperator::NotEqual),
            (">", ConditionOperator::Greater),
            ("<", ConditionOperator::Less),
            (">=", ConditionOperator::GreaterOrEqual),
            ("<=", ConditionOperator::LessOrEqual),
            ("includes", ConditionOperator::Includes),
            ("!includes", ConditionOperator::NotIncludes),
        ] {
            let parsed: ConditionOperator =
                serde_json::from_value(json!(token)).unwrap();
            assert_eq!(parsed, op);
            assert_eq!(serde_json::to_value(op).unwrap(), json!(token));
        }
    }
}
