//! # Proteus - Dynamic Form Rule Engine
//!
//! Proteus evaluates a declarative form schema on every value change:
//! which fields are visible, which dependent values must be cleared, and
//! which dynamic option lists apply. Rendering, schema fetching, and
//! submission transport are external adapters; the crate owns only the
//! rule-evaluation core.
//!
//! ## Features
//!
//! - **Schema Model**: typed, serde-deserializable form schema (fields,
//!   validations, conditions, dependency and dynamic-option metadata)
//! - **Condition Evaluator**: pure per-field visibility from dependency
//!   gates and closed-operator comparisons
//! - **Dependency Resolver**: cascade clearing over a derived acyclic
//!   dependency graph, dynamic option resolution, fixed-point visibility
//! - **Form Engine**: one explicit instance per session; synchronous
//!   change turns, snapshots, submit-and-reset lifecycle
//! - **Validation**: malformed schemas (duplicates, dangling references,
//!   cycles) rejected at construction with every problem reported
//!
//! ## Quick Start
//!
//! ```rust
//! use proteus::{FormEngine, FormSchema};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schema = FormSchema::from_json(r#"{
//!         "formId": "demo",
//!         "title": "Demo",
//!         "fields": [
//!             { "id": "f1", "type": "select", "name": "country", "label": "Country",
//!               "options": [ { "label": "Austria", "value": "A" } ] },
//!             { "id": "f2", "type": "select", "name": "state", "label": "State",
//!               "dependsOn": "country",
//!               "dynamicOptions": { "A": [ { "label": "Vienna", "value": "vie" } ] } }
//!         ]
//!     }"#)?;
//!
//!     let mut engine = FormEngine::new(schema).expect("schema is well-formed");
//!     engine.apply_change("country", json!("A"));
//!     assert!(engine.is_field_visible("state"));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: schema model, value semantics, construction-time validation
//! - **Engine**: condition evaluator, dependency graph/resolver, form engine

pub mod domain;
pub mod engine;

pub use domain::{
    Condition, ConditionOperator, FieldKind, FieldSpec, FormSchema, OptionItem, SchemaError,
    ValidationRule, ValidationSpec,
};
pub use engine::{FieldView, FormEngine, Snapshot};
