//! Agglomerative hierarchical clustering.
//!
//! Classes start as singleton clusters; the most similar pair of current
//! clusters is merged until one cluster remains. The merge history is a
//! binary dendrogram whose internal nodes record `height = 1 - similarity`.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ordered::OrderedSet;
use crate::error::AnalysisError;

/// Clamp into [0, 1]; NaN counts as no similarity.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Rule deriving inter-cluster similarity from leaf-pair similarities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Maximum over leaf pairs.
    #[default]
    Single,
    /// Minimum over leaf pairs.
    Complete,
    /// Arithmetic mean over leaf pairs.
    Average,
}

impl Linkage {
    pub fn name(&self) -> &'static str {
        match self {
            Linkage::Single => "single",
            Linkage::Complete => "complete",
            Linkage::Average => "average",
        }
    }

    fn between(&self, a: &[usize], b: &[usize], sims: &SimilarityMatrix) -> f64 {
        let pairs = a.iter().flat_map(|&i| b.iter().map(move |&j| sims.get(i, j)));
        let value = match self {
            Linkage::Single => pairs.fold(f64::NEG_INFINITY, f64::max),
            Linkage::Complete => pairs.fold(f64::INFINITY, f64::min),
            Linkage::Average => {
                let count = a.len() * b.len();
                if count == 0 {
                    0.0
                } else {
                    pairs.sum::<f64>() / count as f64
                }
            }
        };
        clamp01(value)
    }
}

impl FromStr for Linkage {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(Linkage::Single),
            "complete" => Ok(Linkage::Complete),
            "average" => Ok(Linkage::Average),
            _ => Err(AnalysisError::UnknownLinkage(s.to_string())),
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A dendrogram node: a single class, or the merge of two sub-clusters.
#[derive(Debug, Clone, PartialEq)]
pub enum DendrogramNode<T> {
    Leaf(T),
    Internal {
        left: Box<DendrogramNode<T>>,
        right: Box<DendrogramNode<T>>,
        /// `1 - similarity` at the merge, in [0, 1].
        height: f64,
        /// Left members followed by right members.
        members: Vec<T>,
    },
}

impl<T: Clone> DendrogramNode<T> {
    pub fn merge(left: DendrogramNode<T>, right: DendrogramNode<T>, height: f64) -> Self {
        let members = left
            .members()
            .iter()
            .chain(right.members())
            .cloned()
            .collect();
        DendrogramNode::Internal {
            left: Box::new(left),
            right: Box::new(right),
            height,
            members,
        }
    }
}

impl<T> DendrogramNode<T> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, DendrogramNode::Leaf(_))
    }

    /// Merge height; 0 for leaves.
    pub fn height(&self) -> f64 {
        match self {
            DendrogramNode::Leaf(_) => 0.0,
            DendrogramNode::Internal { height, .. } => *height,
        }
    }

    /// Every class under this node.
    pub fn members(&self) -> &[T] {
        match self {
            DendrogramNode::Leaf(item) => std::slice::from_ref(item),
            DendrogramNode::Internal { members, .. } => members,
        }
    }

    pub fn children(&self) -> Option<(&DendrogramNode<T>, &DendrogramNode<T>)> {
        match self {
            DendrogramNode::Leaf(_) => None,
            DendrogramNode::Internal { left, right, .. } => Some((left, right)),
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.members().len()
    }

    /// Number of internal (merge) nodes in the subtree.
    pub fn merge_count(&self) -> usize {
        match self.children() {
            None => 0,
            Some((left, right)) => 1 + left.merge_count() + right.merge_count(),
        }
    }

    /// Merge heights, pre-order.
    pub fn heights(&self) -> Vec<f64> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Some((left, right)) = node.children() {
                out.push(node.height());
                stack.push(right);
                stack.push(left);
            }
        }
        out
    }
}

/// Symmetric leaf-pair similarities, clamped, computed once up front.
struct SimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    fn compute<T, F>(items: &[T], coupling_fn: &F) -> Self
    where
        T: Sync,
        F: Fn(&T, &T) -> f64 + Sync,
    {
        let n = items.len();
        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (i + 1..n)
                    .map(|j| clamp01(coupling_fn(&items[i], &items[j])))
                    .collect()
            })
            .collect();

        let mut values = vec![0.0; n * n];
        for (i, row) in rows.into_iter().enumerate() {
            for (offset, sim) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                values[i * n + j] = sim;
                values[j * n + i] = sim;
            }
        }
        Self { n, values }
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }
}

struct Cluster<T> {
    node: DendrogramNode<T>,
    leaves: Vec<usize>,
}

/// Cluster `items` into a dendrogram using `coupling_fn` as similarity.
///
/// Items sharing an identity are clustered once, at their first position.
/// Each round merges the pair of current clusters with the strictly greatest
/// linkage similarity; ties go to the first pair in list order. The merged
/// cluster takes the lower-index cluster as its left child and is appended
/// to the end of the list. Returns `None` for empty input.
pub fn cluster<T, F>(items: &[T], coupling_fn: F, linkage: Linkage) -> Option<DendrogramNode<T>>
where
    T: Clone + Eq + Hash + Send + Sync,
    F: Fn(&T, &T) -> f64 + Sync,
{
    let items: OrderedSet<T> = items.iter().cloned().collect();
    let items = items.as_slice();
    match items.len() {
        0 => return None,
        1 => return Some(DendrogramNode::Leaf(items[0].clone())),
        _ => {}
    }

    let sims = SimilarityMatrix::compute(items, &coupling_fn);
    let mut clusters: Vec<Cluster<T>> = items
        .iter()
        .enumerate()
        .map(|(i, item)| Cluster {
            node: DendrogramNode::Leaf(item.clone()),
            leaves: vec![i],
        })
        .collect();

    while clusters.len() > 1 {
        let mut best = f64::NEG_INFINITY;
        let (mut bi, mut bj) = (0, 1);
        for i in 0..clusters.len() {
            for j in i + 1..clusters.len() {
                let sim = linkage.between(&clusters[i].leaves, &clusters[j].leaves, &sims);
                if sim > best {
                    best = sim;
                    bi = i;
                    bj = j;
                }
            }
        }

        // higher index first so `bi` stays valid
        let right = clusters.remove(bj);
        let left = clusters.remove(bi);
        let mut leaves = left.leaves;
        leaves.extend(right.leaves);
        clusters.push(Cluster {
            node: DendrogramNode::merge(left.node, right.node, 1.0 - clamp01(best)),
            leaves,
        });
    }

    let root = clusters.pop().map(|c| c.node);
    debug!(classes = items.len(), %linkage, "clustered classes");
    root
}
