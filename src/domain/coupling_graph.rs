use std::collections::HashMap;
use std::hash::Hash;

use rayon::prelude::*;
use tracing::debug;

use crate::domain::callgraph::DiGraph;
use crate::domain::coupling::CouplingIndex;
use crate::domain::model::ExtractedClass;
use crate::domain::ordered::OrderedSet;

/// Undirected weighted graph with insertion-ordered nodes.
///
/// Weights are symmetric and strictly positive; adding an edge that already
/// exists sums into its weight. Self-edges and non-positive weights are
/// ignored.
#[derive(Debug, Clone)]
pub struct WeightedGraph<N> {
    nodes: OrderedSet<N>,
    // keyed by (lower position, higher position)
    weights: HashMap<(usize, usize), f64>,
    edge_order: Vec<(usize, usize)>,
}

impl<N> Default for WeightedGraph<N> {
    fn default() -> Self {
        Self {
            nodes: OrderedSet::default(),
            weights: HashMap::new(),
            edge_order: Vec::new(),
        }
    }
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl<N: Eq + Hash + Clone> WeightedGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: N) -> usize {
        self.nodes.insert_full(node).0
    }

    pub fn add_edge_undirected(&mut self, a: N, b: N, weight: f64) {
        if a == b || weight.is_nan() || weight <= 0.0 {
            return;
        }
        let a = self.add_node(a);
        let b = self.add_node(b);
        let key = edge_key(a, b);
        match self.weights.get_mut(&key) {
            Some(existing) => *existing += weight,
            None => {
                self.weights.insert(key, weight);
                self.edge_order.push(key);
            }
        }
    }

    pub fn nodes(&self) -> &OrderedSet<N> {
        &self.nodes
    }

    /// Weight between `a` and `b`; `None` when they are not connected.
    pub fn weight(&self, a: &N, b: &N) -> Option<f64> {
        let a = self.nodes.position(a)?;
        let b = self.nodes.position(b)?;
        self.weights.get(&edge_key(a, b)).copied()
    }

    /// Edges in first-insertion order, endpoints in node order.
    pub fn edges(&self) -> impl Iterator<Item = (&N, &N, f64)> + '_ {
        self.edge_order.iter().filter_map(move |key| {
            let a = self.nodes.get(key.0)?;
            let b = self.nodes.get(key.1)?;
            Some((a, b, self.weights[key]))
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }
}

/// Weighted class coupling graph: one node per class and, for every pair of
/// distinct classes, an edge weighted by their coupling when it is positive.
pub fn build_from_calculator(
    graph: &DiGraph<String>,
    classes: &[ExtractedClass],
) -> WeightedGraph<String> {
    build_from_index(&CouplingIndex::build(graph, classes), classes)
}

/// Same as [`build_from_calculator`] with an already built coupling index.
pub fn build_from_index(
    index: &CouplingIndex,
    classes: &[ExtractedClass],
) -> WeightedGraph<String> {
    let names: OrderedSet<String> = classes.iter().map(ExtractedClass::resolved_name).collect();
    let names = names.as_slice();

    let weights: Vec<(usize, usize, f64)> = (0..names.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            (i + 1..names.len()).map(move |j| (i, j, index.coupling(&names[i], &names[j])))
        })
        .collect();

    let mut coupling_graph = WeightedGraph::new();
    for name in names {
        coupling_graph.add_node(name.clone());
    }
    for (i, j, weight) in weights {
        coupling_graph.add_edge_undirected(names[i].clone(), names[j].clone(), weight);
    }

    debug!(
        nodes = coupling_graph.node_count(),
        edges = coupling_graph.edge_count(),
        "built class coupling graph"
    );
    coupling_graph
}
