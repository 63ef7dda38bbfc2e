//! Construction-time schema validation.
//!
//! The engine refuses to evaluate a malformed schema: every structural
//! problem is collected and reported up front rather than surfacing as
//! undefined visibility (or unbounded recursion) mid-session.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::domain::schema::FormSchema;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate field name: {0}")]
    DuplicateName(String),

    #[error("Duplicate field id: {0}")]
    DuplicateId(String),

    #[error("Field '{field}' has an empty {attribute}")]
    MissingAttribute { field: String, attribute: String },

    #[error("Field '{field}' depends on unknown field '{target}'")]
    UnknownDependency { field: String, target: String },

    #[error("Field '{field}' condition references unknown field '{target}'")]
    UnknownConditionReference { field: String, target: String },

    #[error("Field '{0}' references itself")]
    SelfReference(String),

    #[error("Dependency cycle through field '{0}'")]
    DependencyCycle(String),

    #[error("Field '{0}' declares dynamic options without a dependsOn parent")]
    DynamicOptionsWithoutParent(String),
}

pub struct SchemaValidator;

impl SchemaValidator {
    /// Validate a schema, collecting every problem found.
    pub fn validate(schema: &FormSchema) -> Result<(), Vec<SchemaError>> {
        let mut errors = Vec::new();

        Self::validate_identities(schema, &mut errors);
        Self::validate_references(schema, &mut errors);
        Self::validate_cycles(schema, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_identities(schema: &FormSchema, errors: &mut Vec<SchemaError>) {
        let mut seen_names = HashSet::new();
        let mut seen_ids = HashSet::new();

        for field in &schema.fields {
            if field.name.is_empty() {
                errors.push(SchemaError::MissingAttribute {
                    field: field.id.clone(),
                    attribute: "name".to_string(),
                });
            } else if !seen_names.insert(&field.name) {
                errors.push(SchemaError::DuplicateName(field.name.clone()));
            }

            if field.id.is_empty() {
                errors.push(SchemaError::MissingAttribute {
                    field: field.name.clone(),
                    attribute: "id".to_string(),
                });
            } else if !seen_ids.insert(&field.id) {
                errors.push(SchemaError::DuplicateId(field.id.clone()));
            }
        }
    }

    fn validate_references(schema: &FormSchema, errors: &mut Vec<SchemaError>) {
        let names: HashSet<&str> = schema.field_names().collect();

        for field in &schema.fields {
            if let Some(parent) = &field.depends_on {
                if parent == &field.name {
                    errors.push(SchemaError::SelfReference(field.name.clone()));
                } else if !names.contains(parent.as_str()) {
                    errors.push(SchemaError::UnknownDependency {
                        field: field.name.clone(),
                        target: parent.clone(),
                    });
                }
            }

            if let Some(condition) = &field.condition {
                let target = condition.referenced_field();
                if target == field.name {
                    errors.push(SchemaError::SelfReference(field.name.clone()));
                } else if !names.contains(target) {
                    errors.push(SchemaError::UnknownConditionReference {
                        field: field.name.clone(),
                        target: target.to_string(),
                    });
                }
            }

            if field.dynamic_options.is_some() && field.depends_on.is_none() {
                errors.push(SchemaError::DynamicOptionsWithoutParent(
                    field.name.clone(),
                ));
            }
        }
    }

    /// Reject cyclic `dependsOn` chains so the cascade traversal runs over
    /// a DAG. Walks each field's parent chain with a visited set; reported
    /// once per cycle entry point.
    fn validate_cycles(schema: &FormSchema, errors: &mut Vec<SchemaError>) {
        let parents: HashMap<&str, &str> = schema
            .fields
            .iter()
            .filter_map(|f| f.depends_on.as_deref().map(|p| (f.name.as_str(), p)))
            .collect();

        let mut flagged = HashSet::new();
        for start in parents.keys() {
            let mut visited = HashSet::new();
            let mut current = *start;
            while let Some(&parent) = parents.get(current) {
                if !visited.insert(current) {
                    if flagged.insert(current.to_string()) {
                        errors.push(SchemaError::DependencyCycle(current.to_string()));
                    }
                    break;
                }
                current = parent;
            }
        }
    }
}
