//! Form Engine: owns one session's live state and runs the rule engine on
//! every value change.
//!
//! One engine instance per form session, constructed explicitly and passed
//! to whatever render layer consumes it. Construction validates the schema
//! (duplicate names, dangling references, cycles) and computes initial
//! visibility; each `apply_change` turn then runs to completion before the
//! next is accepted. The engine enforces no field-level validation — the
//! declared rules travel out through [`FieldView`] for the render adapter.

use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::domain::schema::{FieldKind, FieldSpec, FormSchema, OptionItem, ValidationSpec};
use crate::domain::validator::{SchemaError, SchemaValidator};
use crate::domain::value::is_empty_value;
use crate::engine::condition::is_visible;
use crate::engine::graph::DependencyGraph;
use crate::engine::resolver::DependencyResolver;

/// Session lifecycle. `Initializing` is consumed inside `new`; `Submitting`
/// spans the synchronous hand-off inside `submit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EngineState {
    Ready,
    Submitting,
}

/// Point-in-time view of the session for the render adapter.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub values: HashMap<String, Value>,
    /// Visible field names in schema order.
    pub visibility: Vec<String>,
    /// Dynamic option overrides currently in effect.
    pub options: HashMap<String, Vec<OptionItem>>,
}

/// Everything the render adapter needs to draw one visible field.
#[derive(Clone, Debug)]
pub struct FieldView<'a> {
    pub name: &'a str,
    pub kind: FieldKind,
    pub label: &'a str,
    pub placeholder: Option<&'a str>,
    /// Current value if set, else the declared default.
    pub value: Option<&'a Value>,
    /// Override if one is in effect, else the static list.
    pub options: &'a [OptionItem],
    pub validations: &'a [ValidationSpec],
}

#[derive(Debug)]
pub struct FormEngine {
    schema: FormSchema,
    graph: DependencyGraph,
    values: HashMap<String, Value>,
    visibility: Vec<String>,
    visible_lookup: HashSet<String>,
    options: HashMap<String, Vec<OptionItem>>,
    state: EngineState,
}

impl FormEngine {
    /// Build an engine for one session. Rejects malformed schemas with the
    /// full list of problems found.
    pub fn new(schema: FormSchema) -> Result<Self, Vec<SchemaError>> {
        SchemaValidator::validate(&schema)?;
        let graph = DependencyGraph::from_schema(&schema);

        let mut engine = Self {
            graph,
            values: HashMap::new(),
            visibility: Vec::new(),
            visible_lookup: HashSet::new(),
            options: HashMap::new(),
            state: EngineState::Ready,
            schema,
        };
        engine.reset();
        debug!(
            form_id = %engine.schema.form_id,
            fields = engine.schema.fields.len(),
            "form session ready"
        );
        Ok(engine)
    }

    /// Seed defaults and compute initial visibility. Initial visibility is
    /// evaluated against an empty value-set, so a field gated on a
    /// defaulted parent starts hidden until the first change turn.
    fn reset(&mut self) {
        self.values = self
            .schema
            .fields
            .iter()
            .filter_map(|f| {
                f.default_value
                    .as_ref()
                    .filter(|v| !is_empty_value(v))
                    .map(|v| (f.name.clone(), v.clone()))
            })
            .collect();
        self.options.clear();

        let empty = HashMap::new();
        self.visibility = self
            .schema
            .fields
            .iter()
            .filter(|f| is_visible(f, &empty))
            .map(|f| f.name.clone())
            .collect();
        self.visible_lookup = self.visibility.iter().cloned().collect();
    }

    /// Apply one field change and reconcile. Unknown field names are
    /// ignored with a warning.
    pub fn apply_change(&mut self, name: &str, value: Value) {
        self.apply_changes([(name.to_string(), value)]);
    }

    /// Apply a batch of field changes as a single turn.
    pub fn apply_changes<I>(&mut self, changes: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        debug_assert_eq!(self.state, EngineState::Ready);

        let mut changed = HashSet::new();
        for (name, value) in changes {
            if self.schema.field(&name).is_none() {
                warn!(field = %name, "change targets unknown field; ignored");
                continue;
            }
            self.values.insert(name.clone(), value);
            changed.insert(name);
        }
        if changed.is_empty() {
            return;
        }

        let resolver = DependencyResolver::new(&self.schema, &self.graph);
        let outcome = resolver.on_change(
            &changed,
            std::mem::take(&mut self.values),
            std::mem::take(&mut self.options),
        );

        debug!(
            changed = changed.len(),
            visible = outcome.visibility.len(),
            "change turn reconciled"
        );
        self.values = outcome.values;
        self.visible_lookup = outcome.visibility.iter().cloned().collect();
        self.visibility = outcome.visibility;
        self.options = outcome.options;
    }

    /// Hand the full current value-set to the submit transport and reset
    /// the session to its initial state (defaults seeded, overrides gone,
    /// initial visibility). Values are passed through as-is; validation is
    /// the render adapter's concern.
    pub fn submit(&mut self) -> HashMap<String, Value> {
        self.state = EngineState::Submitting;
        let submitted = std::mem::take(&mut self.values);
        self.reset();
        self.state = EngineState::Ready;
        debug!(
            form_id = %self.schema.form_id,
            fields = submitted.len(),
            "submitted; session reset"
        );
        submitted
    }

    /// Current values/visibility/options snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            values: self.values.clone(),
            visibility: self.visibility.clone(),
            options: self.options.clone(),
        }
    }

    /// Current value of a field, if set.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether a field is currently visible.
    pub fn is_field_visible(&self, name: &str) -> bool {
        self.visible_lookup.contains(name)
    }

    /// Render-boundary views for the currently visible fields, in schema
    /// order.
    pub fn visible_fields(&self) -> Vec<FieldView<'_>> {
        self.schema
            .fields
            .iter()
            .filter(|f| self.visible_lookup.contains(&f.name))
            .map(|f| self.view_of(f))
            .collect()
    }

    fn view_of<'a>(&'a self, field: &'a FieldSpec) -> FieldView<'a> {
        FieldView {
            name: &field.name,
            kind: field.kind,
            label: &field.label,
            placeholder: field.placeholder.as_deref(),
            value: self
                .values
                .get(&field.name)
                .or(field.default_value.as_ref()),
            options: self
                .options
                .get(&field.name)
                .map_or(field.options.as_slice(), Vec::as_slice),
            validations: &field.validations,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }
}
