//! Core domain types: the schema model, value semantics, and
//! construction-time validation.

pub mod schema;
pub mod validator;
pub mod value;

pub use schema::{
    Condition, ConditionOperator, FieldKind, FieldSpec, FormSchema, OptionItem,
    ValidationRule, ValidationSpec,
};
pub use validator::{SchemaError, SchemaValidator};
