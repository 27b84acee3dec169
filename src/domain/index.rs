use std::collections::HashMap;

use crate::domain::model::{ExtractedClass, ExtractedMethod};
use crate::domain::ordered::OrderedSet;

/// Identity of a project method in the method call graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodNode {
    /// Binding key if present, else `Owner#name(T1,T2)`.
    pub key: String,
    /// `Owner.name(T1,T2)`
    pub label: String,
}

impl MethodNode {
    pub fn new(owner: &str, method: &ExtractedMethod) -> Self {
        let signature = method.simple_signature();
        let key = match method.bound_key() {
            Some(key) => key.to_string(),
            None => format!("{}#{}", owner, signature),
        };
        Self {
            key,
            label: format!("{}.{}", owner, signature),
        }
    }
}

/// Symbol index over the extracted project.
///
/// Maps method keys to display labels and records every project class in
/// input order, together with its simple name.
#[derive(Debug, Default)]
pub struct ProjectIndex {
    classes: OrderedSet<String>,
    // (simple name, qualified name) in registration order
    simple_names: Vec<(String, String)>,
    method_keys: OrderedSet<String>,
    labels: HashMap<String, String>,
}

impl ProjectIndex {
    pub fn build(classes: &[ExtractedClass]) -> Self {
        let mut index = ProjectIndex::default();
        for class in classes {
            let owner = class.resolved_name();
            index.simple_names.push((class.lookup_name(), owner.clone()));
            for method in &class.methods {
                let node = MethodNode::new(&owner, method);
                index.method_keys.insert(node.key.clone());
                // A later method with the same key takes over the label but
                // keeps the key's original position.
                index.labels.insert(node.key, node.label);
            }
            index.classes.insert(owner);
        }
        index
    }

    /// Project class names, first occurrence order.
    pub fn classes(&self) -> &OrderedSet<String> {
        &self.classes
    }

    pub fn contains_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    /// `(simple name, qualified name)` pairs in registration order.
    pub fn simple_names(&self) -> &[(String, String)] {
        &self.simple_names
    }

    /// Display label of the project method registered under `key`.
    pub fn label_for_key(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Labels of all project methods, in key registration order.
    pub fn method_labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.method_keys
            .iter()
            .filter_map(move |key| self.label_for_key(key))
    }

    pub fn method_count(&self) -> usize {
        self.method_keys.len()
    }
}
