//! Class coupling metric.
//!
//! `coupling(A, B)` is the share of all owner-resolved method-call edges that
//! connect A and B (either direction). The denominator is graph-wide: every
//! edge whose endpoints both resolve to *some* project class counts, so the
//! values over all pairs sum to at most 1. Edges with an unresolved endpoint
//! are excluded from numerator and denominator alike.
//!
//! [`coupling`] is the reference O(E) scan. [`CouplingIndex`] does the same
//! accounting in one pass so that later queries are O(1) lookups.

use std::collections::HashMap;

use dashmap::DashMap;
use rayon::prelude::*;
use tracing::debug;

use crate::domain::callgraph::DiGraph;
use crate::domain::model::ExtractedClass;
use crate::domain::resolver::{resolve_owner, OwnerResolver, ProjectOwnerResolver};

/// Unordered pair of class names, stored in lexical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClassPair(String, String);

impl ClassPair {
    fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Coupling between `a` and `b` by a full scan of `graph`.
pub fn coupling(
    graph: &DiGraph<String>,
    classes: &[ExtractedClass],
    a: &ExtractedClass,
    b: &ExtractedClass,
) -> f64 {
    let resolver = ProjectOwnerResolver::new(classes);
    coupling_by_scan(graph, &resolver, &a.resolved_name(), &b.resolved_name())
}

/// Scan every edge, resolving both endpoints' owners through `resolver`.
pub fn coupling_by_scan(
    graph: &DiGraph<String>,
    resolver: &dyn OwnerResolver,
    a: &str,
    b: &str,
) -> f64 {
    if a == b {
        return 0.0;
    }
    let mut numerator = 0u64;
    let mut denominator = 0u64;
    for (from, to) in graph.edges() {
        let Some(from_owner) = resolve_owner(resolver, from) else {
            continue;
        };
        let Some(to_owner) = resolve_owner(resolver, to) else {
            continue;
        };
        denominator += 1;
        if (from_owner == a && to_owner == b) || (from_owner == b && to_owner == a) {
            numerator += 1;
        }
    }
    ratio(numerator, denominator)
}

/// Edge counts of one method graph, precomputed for repeated coupling queries.
#[derive(Debug, Clone, Default)]
pub struct CouplingIndex {
    resolved_edges: u64,
    pair_edges: HashMap<ClassPair, u64>,
}

impl CouplingIndex {
    /// Index `graph` with the project's default owner resolution.
    pub fn build(graph: &DiGraph<String>, classes: &[ExtractedClass]) -> Self {
        Self::with_resolver(graph, &ProjectOwnerResolver::new(classes))
    }

    /// Index `graph`, resolving edge endpoints in parallel.
    pub fn with_resolver(graph: &DiGraph<String>, resolver: &dyn OwnerResolver) -> Self {
        let edges: Vec<(&String, &String)> = graph.edges().collect();
        let pair_edges: DashMap<ClassPair, u64> = DashMap::new();

        let resolved_edges: u64 = edges
            .par_iter()
            .filter_map(|(from, to)| {
                let from_owner = resolve_owner(resolver, from)?;
                let to_owner = resolve_owner(resolver, to)?;
                Some((from_owner, to_owner))
            })
            .map(|(from_owner, to_owner)| {
                if from_owner != to_owner {
                    *pair_edges.entry(ClassPair::new(from_owner, to_owner)).or_insert(0) += 1;
                }
                1u64
            })
            .sum();

        let pair_edges: HashMap<ClassPair, u64> = pair_edges.into_iter().collect();
        debug!(
            edges = edges.len(),
            resolved_edges,
            class_pairs = pair_edges.len(),
            "indexed method graph for coupling"
        );

        Self {
            resolved_edges,
            pair_edges,
        }
    }

    /// Number of edges whose endpoints both resolve to project classes.
    pub fn resolved_edges(&self) -> u64 {
        self.resolved_edges
    }

    /// Number of edges between `a` and `b`, either direction.
    pub fn edges_between(&self, a: &str, b: &str) -> u64 {
        if a == b {
            return 0;
        }
        self.pair_edges.get(&ClassPair::new(a, b)).copied().unwrap_or(0)
    }

    /// Coupling of the classes named `a` and `b`, in [0, 1].
    pub fn coupling(&self, a: &str, b: &str) -> f64 {
        ratio(self.edges_between(a, b), self.resolved_edges)
    }
}
