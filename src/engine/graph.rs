//! Dependency graph derived from `dependsOn` declarations.
//!
//! Built once per session from a validated (acyclic) schema; the resolver
//! walks it depth-first to compute cascade-clear closures.

use std::collections::{HashMap, HashSet};

use crate::domain::schema::FormSchema;

/// Adjacency from a parent field to its direct dependents, in schema order.
#[derive(Debug)]
pub struct DependencyGraph {
    dependents: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Derive the graph from a schema. The schema must already have passed
    /// validation; cycles would make [`descendants`](Self::descendants)
    /// traversal meaningless (though the visited set keeps it bounded).
    pub fn from_schema(schema: &FormSchema) -> Self {
        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
        for field in &schema.fields {
            if let Some(parent) = &field.depends_on {
                dependents
                    .entry(parent.clone())
                    .or_default()
                    .push(field.name.clone());
            }
        }
        Self { dependents }
    }

    /// Direct dependents of a field.
    pub fn dependents(&self, name: &str) -> &[String] {
        self.dependents.get(name).map_or(&[], Vec::as_slice)
    }

    /// Every transitive dependent of the given roots, depth-first to the
    /// leaves. The roots themselves are not included.
    pub fn descendants<'a, I>(&self, roots: I) -> HashSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut closure = HashSet::new();
        let mut stack: Vec<&str> = roots.into_iter().collect();
        while let Some(current) = stack.pop() {
            for child in self.dependents(current) {
                if closure.insert(child.clone()) {
                    stack.push(child);
                }
            }
        }
        closure
    }
}
