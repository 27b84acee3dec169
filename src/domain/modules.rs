//! Module identification on a dendrogram.
//!
//! Starting from the root, the least cohesive splittable cluster is replaced
//! by its two children until every splittable cluster reaches the cohesion
//! threshold, or until splitting would exceed `max(1, M / 2)` modules.
//! Modules are always whole dendrogram subtrees, so the result is a frontier
//! cut covering every class exactly once.

use tracing::{debug, warn};

use crate::domain::dendrogram::{clamp01, DendrogramNode};
use crate::error::{AnalysisError, Result};

/// One module: the member set of a dendrogram node and its cohesion.
#[derive(Debug, Clone, PartialEq)]
pub struct Module<T> {
    pub members: Vec<T>,
    /// Average pairwise coupling among members; 1.0 for a singleton.
    pub average_coupling: f64,
}

/// Outcome of [`identify`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModulePartition<T> {
    pub modules: Vec<Module<T>>,
    /// `false` when a split was still wanted but the module bound was reached.
    pub feasible: bool,
}

impl<T: PartialEq> ModulePartition<T> {
    pub fn average_couplings(&self) -> Vec<f64> {
        self.modules.iter().map(|m| m.average_coupling).collect()
    }

    /// Index of the module containing `item`.
    pub fn module_of(&self, item: &T) -> Option<usize> {
        self.modules.iter().position(|m| m.members.contains(item))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Average coupling over all unordered member pairs, each clamped to [0, 1].
pub fn average_pairwise<T, F>(members: &[T], coupling_fn: &F) -> f64
where
    F: Fn(&T, &T) -> f64,
{
    if members.len() <= 1 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut pairs = 0usize;
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            sum += clamp01(coupling_fn(a, b));
            pairs += 1;
        }
    }
    sum / pairs as f64
}

struct Candidate<'a, T> {
    node: &'a DendrogramNode<T>,
    average: f64,
}

impl<'a, T> Candidate<'a, T> {
    fn new<F: Fn(&T, &T) -> f64>(node: &'a DendrogramNode<T>, coupling_fn: &F) -> Self {
        Self {
            node,
            average: average_pairwise(node.members(), coupling_fn),
        }
    }
}

fn into_partition<T: Clone>(
    candidates: Vec<Candidate<'_, T>>,
    feasible: bool,
) -> ModulePartition<T> {
    let modules = candidates
        .into_iter()
        .map(|c| Module {
            members: c.node.members().to_vec(),
            average_coupling: c.average,
        })
        .collect();
    ModulePartition { modules, feasible }
}

/// Partition the classes under `root` into modules.
///
/// Leaves below `cohesion_threshold` are kept as they are; the threshold is
/// a target for splittable clusters only. Fails only on a non-finite
/// threshold.
pub fn identify<T, F>(
    root: &DendrogramNode<T>,
    coupling_fn: F,
    cohesion_threshold: f64,
) -> Result<ModulePartition<T>>
where
    T: Clone,
    F: Fn(&T, &T) -> f64,
{
    if !cohesion_threshold.is_finite() {
        return Err(AnalysisError::invalid(
            "cohesion_threshold",
            format!("must be finite, got {}", cohesion_threshold),
        ));
    }

    let total = root.leaf_count();
    let max_modules = std::cmp::max(1, total / 2);
    let mut candidates = vec![Candidate::new(root, &coupling_fn)];

    loop {
        let mut worst: Option<usize> = None;
        for (i, candidate) in candidates.iter().enumerate() {
            if candidate.average >= cohesion_threshold || candidate.node.is_leaf() {
                continue;
            }
            if worst.map_or(true, |w| candidate.average < candidates[w].average) {
                worst = Some(i);
            }
        }

        let Some(worst) = worst else {
            break;
        };

        if candidates.len() >= max_modules {
            warn!(
                modules = candidates.len(),
                max_modules,
                cohesion_threshold,
                "module bound reached before every cluster met the cohesion threshold"
            );
            return Ok(into_partition(candidates, false));
        }

        let split = candidates.remove(worst);
        if let Some((left, right)) = split.node.children() {
            candidates.push(Candidate::new(left, &coupling_fn));
            candidates.push(Candidate::new(right, &coupling_fn));
        }
    }

    debug!(modules = candidates.len(), max_modules, "identified modules");
    Ok(into_partition(candidates, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dendrogram::{cluster, Linkage};

    fn sim(a: &&str, b: &&str) -> f64 {
        match (*a, *b) {
            ("A", "B") | ("B", "A") | ("C", "D") | ("D", "C") => 0.5,
            _ => 0.0,
        }
    }

    fn root() -> DendrogramNode<&'static str> {
        cluster(&["A", "B", "C", "D"], sim, Linkage::Single).unwrap()
    }

    #[test]
    fn test_average_pairwise() {
        assert_eq!(average_pairwise(&["A"], &sim), 1.0);
        assert_eq!(average_pairwise(&["A", "B"], &sim), 0.5);
        let all = average_pairwise(&["A", "B", "C", "D"], &sim);
        assert!((all - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_splits_into_two_feasible_modules() {
        let partition = identify(&root(), sim, 0.4).unwrap();
        assert!(partition.feasible);
        assert_eq!(partition.len(), 2);
        assert_eq!(partition.modules[0].members, vec!["A", "B"]);
        assert_eq!(partition.modules[1].members, vec!["C", "D"]);
        assert_eq!(partition.average_couplings(), vec![0.5, 0.5]);
        assert_eq!(partition.module_of(&"D"), Some(1));
    }

    #[test]
    fn test_bound_reached_is_infeasible() {
        let partition = identify(&root(), sim, 0.6).unwrap();
        assert!(!partition.feasible);
        assert_eq!(partition.len(), 2);
    }

    #[test]
    fn test_cohesive_root_is_single_module() {
        let partition = identify(&root(), sim, 0.1).unwrap();
        assert!(partition.feasible);
        assert_eq!(partition.len(), 1);
        assert_eq!(partition.modules[0].members.len(), 4);
    }

    #[test]
    fn test_single_leaf() {
        let leaf = DendrogramNode::Leaf("A");
        let partition = identify(&leaf, sim, 0.9).unwrap();
        assert!(partition.feasible);
        assert_eq!(partition.modules, vec![Module { members: vec!["A"], average_coupling: 1.0 }]);
    }

    #[test]
    fn test_two_classes_never_split() {
        // max_modules = 1, so an incohesive pair is reported infeasible
        let root = cluster(&["A", "C"], sim, Linkage::Single).unwrap();
        let partition = identify(&root, sim, 0.5).unwrap();
        assert!(!partition.feasible);
        assert_eq!(partition.len(), 1);
        assert_eq!(partition.modules[0].average_coupling, 0.0);
    }

    fn leaf(name: &'static str) -> DendrogramNode<&'static str> {
        DendrogramNode::Leaf(name)
    }

    fn pair(a: &'static str, b: &'static str) -> DendrogramNode<&'static str> {
        DendrogramNode::merge(leaf(a), leaf(b), 0.5)
    }

    #[test]
    fn test_equal_averages_split_first_in_list_order() {
        let tree = DendrogramNode::merge(
            DendrogramNode::merge(pair("A", "B"), pair("C", "D"), 1.0),
            DendrogramNode::merge(pair("E", "F"), pair("G", "H"), 1.0),
            1.0,
        );
        let sim = |a: &&str, b: &&str| match (*a, *b) {
            ("A", "B") | ("C", "D") | ("E", "F") | ("G", "H") => 0.5,
            _ => 0.0,
        };

        // both root children average 1/6; the left one goes first
        let partition = identify(&tree, sim, 0.4).unwrap();
        assert!(partition.feasible);
        let members: Vec<Vec<&str>> = partition.modules.iter().map(|m| m.members.clone()).collect();
        assert_eq!(
            members,
            vec![vec!["A", "B"], vec!["C", "D"], vec!["E", "F"], vec!["G", "H"]]
        );
    }

    #[test]
    fn test_least_cohesive_candidate_is_split() {
        // left averages 0.2, right 0.1; six leaves allow three modules
        let tree = DendrogramNode::merge(
            DendrogramNode::merge(pair("A", "B"), leaf("C"), 1.0),
            DendrogramNode::merge(pair("D", "E"), leaf("F"), 1.0),
            1.0,
        );
        let sim = |a: &&str, b: &&str| match (*a, *b) {
            ("A", "B") => 0.6,
            ("D", "E") => 0.3,
            _ => 0.0,
        };

        let partition = identify(&tree, sim, 0.5).unwrap();
        assert!(!partition.feasible);
        let members: Vec<Vec<&str>> = partition.modules.iter().map(|m| m.members.clone()).collect();
        assert_eq!(members, vec![vec!["A", "B", "C"], vec!["D", "E"], vec!["F"]]);
        assert_eq!(partition.module_of(&"E"), Some(1));
    }

    #[test]
    fn test_rejects_non_finite_threshold() {
        let err = identify(&root(), sim, f64::NAN).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidArgument { name: "cohesion_threshold", .. }));
    }
}
