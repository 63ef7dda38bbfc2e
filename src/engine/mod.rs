//! Rule-evaluation engine: condition evaluation, dependency resolution,
//! and the per-session form orchestrator.

pub mod condition;
pub mod form;
pub mod graph;
pub mod resolver;

pub use condition::is_visible;
pub use form::{FieldView, FormEngine, Snapshot};
pub use graph::DependencyGraph;
pub use resolver::{DependencyResolver, TurnOutcome};
