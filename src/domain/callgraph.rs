// Call graph structures for archmap.
// Method-level and class-level call relationships.

use std::hash::Hash;

use tracing::debug;

use crate::domain::index::{MethodNode, ProjectIndex};
use crate::domain::model::ExtractedClass;
use crate::domain::ordered::OrderedSet;
use crate::ports::CallGraphBuilder;

/// Prefix of synthesized nodes standing for code outside the project.
pub const EXTERNAL_PREFIX: &str = "[EXT] ";

/// Directed graph with insertion-ordered nodes and successor sets.
///
/// Parallel edges collapse into one; self-loops are kept.
#[derive(Debug, Clone)]
pub struct DiGraph<N> {
    nodes: OrderedSet<N>,
    successors: Vec<OrderedSet<N>>,
}

impl<N> Default for DiGraph<N> {
    fn default() -> Self {
        Self {
            nodes: OrderedSet::default(),
            successors: Vec::new(),
        }
    }
}

impl<N: Eq + Hash + Clone> DiGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `node` if absent and return its position.
    pub fn add_node(&mut self, node: N) -> usize {
        let (pos, added) = self.nodes.insert_full(node);
        if added {
            self.successors.push(OrderedSet::new());
        }
        pos
    }

    /// Add the edge `from -> to`, creating either node as needed.
    pub fn add_edge(&mut self, from: N, to: N) {
        let from = self.add_node(from);
        self.add_node(to.clone());
        self.successors[from].insert(to);
    }

    pub fn nodes(&self) -> &OrderedSet<N> {
        &self.nodes
    }

    pub fn successors(&self, node: &N) -> Option<&OrderedSet<N>> {
        self.nodes.position(node).map(|pos| &self.successors[pos])
    }

    pub fn contains_edge(&self, from: &N, to: &N) -> bool {
        self.successors(from).is_some_and(|s| s.contains(to))
    }

    /// All edges, grouped by source in node order.
    pub fn edges(&self) -> impl Iterator<Item = (&N, &N)> + '_ {
        self.nodes
            .iter()
            .zip(&self.successors)
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(OrderedSet::len).sum()
    }
}

/// Builds the method-to-method call graph; nodes are method display labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodGraphBuilder {
    pub include_external: bool,
}

impl CallGraphBuilder for MethodGraphBuilder {
    fn build_call_graph(&self, classes: &[ExtractedClass]) -> DiGraph<String> {
        build_method_graph(classes, self.include_external)
    }
}

/// Builds the class-to-class call graph; nodes are class names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassGraphBuilder {
    pub include_external: bool,
}

impl CallGraphBuilder for ClassGraphBuilder {
    fn build_call_graph(&self, classes: &[ExtractedClass]) -> DiGraph<String> {
        build_class_graph(classes, self.include_external)
    }
}

fn external_node(target: &str) -> String {
    format!("{}{}", EXTERNAL_PREFIX, target)
}

/// Method call graph: one node per project method, an edge per resolved call.
///
/// Calls whose callee key matches a project method point at that method's
/// label. Other calls are dropped unless `include_external` is set, in which
/// case they land on a synthesized `[EXT] ` node. Inert calls are dropped.
pub fn build_method_graph(classes: &[ExtractedClass], include_external: bool) -> DiGraph<String> {
    let index = ProjectIndex::build(classes);
    let mut graph = DiGraph::new();

    for label in index.method_labels() {
        graph.add_node(label.to_string());
    }

    let mut dropped = 0usize;
    for class in classes {
        let owner = class.resolved_name();
        for method in &class.methods {
            let source = MethodNode::new(&owner, method);
            let Some(source_label) = index.label_for_key(&source.key) else {
                continue;
            };

            for call in &method.calls {
                let Some(callee_key) = call.callee_key() else {
                    dropped += 1;
                    continue;
                };
                let target = match index.label_for_key(&callee_key) {
                    Some(label) => label.to_string(),
                    None if include_external => external_node(&call.external_signature()),
                    None => {
                        dropped += 1;
                        continue;
                    }
                };
                graph.add_edge(source_label.to_string(), target);
            }
        }
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        dropped,
        "built method call graph"
    );
    graph
}

/// Class call graph: one node per project class, an edge per inter-class call.
///
/// The callee class is the call's target type; calls without one are dropped,
/// as are self-calls. Targets outside the project follow the same external
/// policy as [`build_method_graph`].
pub fn build_class_graph(classes: &[ExtractedClass], include_external: bool) -> DiGraph<String> {
    let index = ProjectIndex::build(classes);
    let mut graph = DiGraph::new();

    for class in index.classes() {
        graph.add_node(class.clone());
    }

    for class in classes {
        let from = class.resolved_name();
        for call in class.methods.iter().flat_map(|m| &m.calls) {
            let Some(target) = call.target_type() else {
                continue;
            };
            let target = if index.contains_class(target) {
                target.to_string()
            } else if include_external {
                external_node(target)
            } else {
                continue;
            };
            if target != from {
                graph.add_edge(from.clone(), target);
            }
        }
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built class call graph"
    );
    graph
}
