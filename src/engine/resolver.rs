//! Dependency Resolver: reconciles one change turn.
//!
//! A turn takes the post-change value-set plus the current option overrides
//! and produces the authoritative values/visibility/options for the turn:
//! direct dependents of the changed fields get their dynamic options
//! re-resolved and their values cleared (conservative always-clear policy),
//! the clear cascades depth-first to the leaves of the dependency graph,
//! and a bounded fixed-point loop then strips values from hidden fields
//! until visibility is stable under the final value-set.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::domain::schema::{FieldSpec, FormSchema, OptionItem};
use crate::domain::value::{is_empty_entry, trigger_key};
use crate::engine::condition::is_visible;
use crate::engine::graph::DependencyGraph;

/// Result of one reconciled change turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnOutcome {
    pub values: HashMap<String, Value>,
    /// Visible field names in schema order; a fixed point under `values`.
    pub visibility: Vec<String>,
    pub options: HashMap<String, Vec<OptionItem>>,
}

pub struct DependencyResolver<'a> {
    schema: &'a FormSchema,
    graph: &'a DependencyGraph,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(schema: &'a FormSchema, graph: &'a DependencyGraph) -> Self {
        Self { schema, graph }
    }

    /// Reconcile a turn in which the named fields changed. `values` is the
    /// full value-set after the change was applied.
    pub fn on_change(
        &self,
        changed: &HashSet<String>,
        mut values: HashMap<String, Value>,
        mut options: HashMap<String, Vec<OptionItem>>,
    ) -> TurnOutcome {
        // Direct dependents of this turn's changes: re-resolve dynamic
        // options and invalidate the stored selection. Any parent mutation
        // clears the dependent, even when the parent stays non-empty.
        let mut cleared: HashSet<String> = HashSet::new();
        for field in &self.schema.fields {
            let Some(parent) = &field.depends_on else {
                continue;
            };
            if !changed.contains(parent) {
                continue;
            }
            self.refresh_options(field, parent, &values, &mut options);
            cleared.insert(field.name.clone());
        }

        // Cascade to the leaves before the batch clear.
        let descendants = self.graph.descendants(cleared.iter().map(String::as_str));
        cleared.extend(descendants);
        self.clear_batch(&cleared, &mut values, &mut options);

        // Hidden fields never hold a live value, and clearing one can flip
        // another field's gate. Iterate to a fixed point; each pass removes
        // at least one value entry, so the cap is only a backstop.
        let cap = self.schema.fields.len() + 1;
        let mut visible = self.visible_set(&values);
        for pass in 0..cap {
            let stale: HashSet<String> = self
                .schema
                .fields
                .iter()
                .filter(|f| !visible.contains(&f.name) && values.contains_key(&f.name))
                .map(|f| f.name.clone())
                .collect();
            if stale.is_empty() {
                debug!(passes = pass + 1, cleared = cleared.len(), "turn converged");
                break;
            }
            let mut batch = stale.clone();
            batch.extend(self.graph.descendants(stale.iter().map(String::as_str)));
            self.clear_batch(&batch, &mut values, &mut options);
            cleared.extend(batch);
            visible = self.visible_set(&values);
        }

        TurnOutcome {
            visibility: self.in_schema_order(&visible),
            values,
            options,
        }
    }

    /// Recompute the option override for a field whose parent changed.
    /// Empty parent removes the override; a non-empty parent resolves it,
    /// with an absent trigger key yielding an empty list.
    fn refresh_options(
        &self,
        field: &FieldSpec,
        parent: &str,
        values: &HashMap<String, Value>,
        options: &mut HashMap<String, Vec<OptionItem>>,
    ) {
        let Some(dynamic) = &field.dynamic_options else {
            return;
        };
        if is_empty_entry(values, parent) {
            options.remove(&field.name);
            return;
        }
        let resolved = values
            .get(parent)
            .and_then(trigger_key)
            .and_then(|key| dynamic.get(&key).cloned())
            .unwrap_or_default();
        options.insert(field.name.clone(), resolved);
    }

    /// Clear a batch of fields: drop their values, and drop the option
    /// overrides of their dependents (whose trigger parent just emptied).
    fn clear_batch(
        &self,
        batch: &HashSet<String>,
        values: &mut HashMap<String, Value>,
        options: &mut HashMap<String, Vec<OptionItem>>,
    ) {
        for name in batch {
            values.remove(name);
            for dependent in self.graph.dependents(name) {
                options.remove(dependent);
            }
        }
    }

    fn visible_set(&self, values: &HashMap<String, Value>) -> HashSet<String> {
        self.schema
            .fields
            .iter()
            .filter(|f| is_visible(f, values))
            .map(|f| f.name.clone())
            .collect()
    }

    fn in_schema_order(&self, visible: &HashSet<String>) -> Vec<String> {
        self.schema
            .field_names()
            .filter(|name| visible.contains(*name))
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{Condition, ConditionOperator, FieldKind, FormSchema};
    use serde_json::json;

    fn schema_from(json: serde_json::Value) -> FormSchema {
        serde_json::from_value(json).unwrap()
    }

    fn field(id: &str, kind: &str, name: &str) -> serde_json::Value {
        json!({ "id": id, "type": kind, "name": name, "label": name })
    }

    fn run_turn(
        schema: &FormSchema,
        changed: &[&str],
        values: &[(&str, serde_json::Value)],
        options: HashMap<String, Vec<OptionItem>>,
    ) -> TurnOutcome {
        let graph = DependencyGraph::from_schema(schema);
        let resolver = DependencyResolver::new(schema, &graph);
        let changed: HashSet<String> = changed.iter().map(|s| s.to_string()).collect();
        let values: HashMap<String, Value> = values
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        resolver.on_change(&changed, values, options)
    }

    fn country_state_schema() -> FormSchema {
        schema_from(json!({
            "formId": "loc",
            "title": "Location",
            "fields": [
                {
                    "id": "f1", "type": "select", "name": "country", "label": "Country",
                    "options": [
                        { "label": "Austria", "value": "A" },
                        { "label": "Belgium", "value": "B" }
                    ]
                },
                {
                    "id": "f2", "type": "select", "name": "state", "label": "State",
                    "dependsOn": "country",
                    "dynamicOptions": {
                        "A": [ { "label": "X", "value": "x" }, { "label": "Y", "value": "y" } ],
                        "B": [ { "label": "Z", "value": "z" } ]
                    }
                },
                {
                    "id": "f3", "type": "select", "name": "city", "label": "City",
                    "dependsOn": "state"
                }
            ]
        }))
    }

    #[test]
    fn test_parent_change_resolves_options_and_clears_child() {
        let schema = country_state_schema();
        let outcome = run_turn(
            &schema,
            &["country"],
            &[("country", json!("A")), ("state", json!("stale"))],
            HashMap::new(),
        );

        assert_eq!(outcome.visibility, ["country", "state"]);
        assert!(!outcome.values.contains_key("state"));
        let opts = &outcome.options["state"];
        assert_eq!(opts.len(), 2);
        assert_eq!(opts[0].value, json!("x"));
    }

    #[test]
    fn test_absent_trigger_key_yields_empty_list() {
        let schema = country_state_schema();
        let outcome = run_turn(
            &schema,
            &["country"],
            &[("country", json!("C")), ("state", json!("x"))],
            HashMap::new(),
        );
        assert!(outcome.options["state"].is_empty());
        assert!(!outcome.values.contains_key("state"));
    }

    #[test]
    fn test_emptied_parent_removes_override_and_hides_child() {
        let schema = country_state_schema();
        let mut options = HashMap::new();
        options.insert(
            "state".to_string(),
            vec![OptionItem { label: "X".to_string(), value: json!("x") }],
        );

        let outcome = run_turn(&schema, &["country"], &[("country", json!(""))], options);
        assert_eq!(outcome.visibility, ["country"]);
        assert!(!outcome.options.contains_key("state"));
        assert!(!outcome.values.contains_key("state"));
    }

    #[test]
    fn test_cascade_reaches_leaves_in_one_turn() {
        let schema = country_state_schema();
        let outcome = run_turn(
            &schema,
            &["country"],
            &[
                ("country", json!("B")),
                ("state", json!("z")),
                ("city", json!("old town")),
            ],
            HashMap::new(),
        );
        // Both descendants cleared by the same turn, city hidden because
        // its parent emptied.
        assert!(!outcome.values.contains_key("state"));
        assert!(!outcome.values.contains_key("city"));
        assert_eq!(outcome.visibility, ["country", "state"]);
    }

    #[test]
    fn test_parent_change_clears_child_even_when_child_stays_visible() {
        let schema = country_state_schema();
        let outcome = run_turn(
            &schema,
            &["country"],
            &[("country", json!("B")), ("state", json!("x"))],
            HashMap::new(),
        );
        assert!(outcome.visibility.contains(&"state".to_string()));
        assert!(!outcome.values.contains_key("state"));
    }

    #[test]
    fn test_hidden_field_loses_value_without_dependency() {
        let mut schema = schema_from(json!({
            "formId": "g",
            "title": "Guardian",
            "fields": [
                field("f1", "number", "age"),
                field("f2", "text", "guardian")
            ]
        }));
        schema.fields[1].condition = Some(Condition {
            field: "{{age}}".to_string(),
            operator: ConditionOperator::Less,
            value: json!(18),
        });
        assert_eq!(schema.fields[1].kind, FieldKind::Text);

        let outcome = run_turn(
            &schema,
            &["age"],
            &[("age", json!(20)), ("guardian", json!("Jo"))],
            HashMap::new(),
        );
        assert_eq!(outcome.visibility, ["age"]);
        assert!(!outcome.values.contains_key("guardian"));
    }

    #[test]
    fn test_chained_condition_clears_converge() {
        // p flips q hidden; clearing q's value then flips r hidden. The
        // fixed-point loop chases the third-order effect in one turn.
        let mut schema = schema_from(json!({
            "formId": "chain",
            "title": "Chain",
            "fields": [
                field("f1", "text", "p"),
                field("f2", "text", "q"),
                field("f3", "text", "r")
            ]
        }));
        schema.fields[1].condition = Some(Condition {
            field: "{{p}}".to_string(),
            operator: ConditionOperator::Equal,
            value: json!("on"),
        });
        schema.fields[2].condition = Some(Condition {
            field: "{{q}}".to_string(),
            operator: ConditionOperator::Equal,
            value: json!("Q"),
        });

        let outcome = run_turn(
            &schema,
            &["p"],
            &[("p", json!("off")), ("q", json!("Q")), ("r", json!("R"))],
            HashMap::new(),
        );
        assert_eq!(outcome.visibility, ["p"]);
        assert!(!outcome.values.contains_key("q"));
        assert!(!outcome.values.contains_key("r"));
        assert_eq!(outcome.values.len(), 1);
    }

    #[test]
    fn test_identical_turns_are_idempotent() {
        let schema = country_state_schema();
        let first = run_turn(
            &schema,
            &["country"],
            &[("country", json!("A"))],
            HashMap::new(),
        );
        let second = run_turn(
            &schema,
            &["country"],
            &[("country", json!("A"))],
            first.options.clone(),
        );
        assert_eq!(first.values, second.values);
        assert_eq!(first.visibility, second.visibility);
        assert_eq!(first.options, second.options);
    }
}
