//! Owner resolution for method-graph labels.
//!
//! A label such as `shop.Cart.total(int)` names its owning class only as
//! text. Resolution extracts the candidate owner and maps it to a project
//! class through a pluggable [`OwnerResolver`].

use std::collections::{HashMap, HashSet};

use crate::domain::index::ProjectIndex;
use crate::domain::model::ExtractedClass;

/// Candidate owner of a method label: the text before the first `(`, cut at
/// its last `.`, with nested-class `$` separators normalized to `.`.
///
/// Returns `None` for labels without a parameter list or without an owner.
pub fn owner_candidate(label: &str) -> Option<String> {
    let label = label.trim();
    let paren = label.find('(').filter(|&p| p > 0)?;
    let head = &label[..paren];
    let dot = head.rfind('.').filter(|&d| d > 0)?;
    let owner = head[..dot].replace('$', ".");
    let owner = owner.trim();
    (!owner.is_empty()).then(|| owner.to_string())
}

/// Strategy mapping a candidate owner name to a project class name.
///
/// Implementations must be thread-safe (Send + Sync); the coupling index
/// resolves edges in parallel.
pub trait OwnerResolver: Send + Sync {
    fn resolve(&self, candidate: &str) -> Option<&str>;
}

/// Accepts only exact qualified-name matches.
#[derive(Debug, Default)]
pub struct ExactQualifiedResolver {
    names: HashSet<String>,
}

impl ExactQualifiedResolver {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl OwnerResolver for ExactQualifiedResolver {
    fn resolve(&self, candidate: &str) -> Option<&str> {
        self.names.get(candidate).map(String::as_str)
    }
}

/// What a simple-name lookup does when several classes share a simple name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// The class registered last wins; earlier ones become unreachable by
    /// simple name. This is the documented resolution limitation.
    #[default]
    LastRegistered,
    /// Ambiguous simple names resolve to nothing.
    Reject,
}

/// Resolves unqualified (dot-free) names through a simple-name table.
#[derive(Debug, Default)]
pub struct SimpleNameResolver {
    by_simple: HashMap<String, Option<String>>,
}

impl SimpleNameResolver {
    /// Register `(simple, qualified)` pairs in order under `policy`.
    pub fn new<I>(entries: I, policy: CollisionPolicy) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut by_simple: HashMap<String, Option<String>> = HashMap::new();
        for (simple, qualified) in entries {
            let existing = by_simple.get(&simple).cloned();
            match (policy, existing) {
                (CollisionPolicy::Reject, Some(Some(existing))) if existing != qualified => {
                    by_simple.insert(simple, None);
                }
                (CollisionPolicy::Reject, Some(None)) => {}
                _ => {
                    by_simple.insert(simple, Some(qualified));
                }
            }
        }
        Self { by_simple }
    }
}

impl OwnerResolver for SimpleNameResolver {
    fn resolve(&self, candidate: &str) -> Option<&str> {
        if candidate.contains('.') {
            return None;
        }
        self.by_simple.get(candidate)?.as_deref()
    }
}

/// Resolves nothing; every owner is treated as external.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnresolvedResolver;

impl OwnerResolver for UnresolvedResolver {
    fn resolve(&self, _candidate: &str) -> Option<&str> {
        None
    }
}

/// Project policy: exact qualified match, else simple-name lookup for
/// dot-free candidates, else unresolved.
#[derive(Debug, Default)]
pub struct ProjectOwnerResolver {
    exact: ExactQualifiedResolver,
    simple: SimpleNameResolver,
}

impl ProjectOwnerResolver {
    pub fn new(classes: &[ExtractedClass]) -> Self {
        Self::with_policy(classes, CollisionPolicy::default())
    }

    pub fn with_policy(classes: &[ExtractedClass], policy: CollisionPolicy) -> Self {
        Self::from_index(&ProjectIndex::build(classes), policy)
    }

    pub fn from_index(index: &ProjectIndex, policy: CollisionPolicy) -> Self {
        Self {
            exact: ExactQualifiedResolver::new(index.classes().iter().cloned()),
            simple: SimpleNameResolver::new(index.simple_names().iter().cloned(), policy),
        }
    }
}

impl OwnerResolver for ProjectOwnerResolver {
    fn resolve(&self, candidate: &str) -> Option<&str> {
        self.exact
            .resolve(candidate)
            .or_else(|| self.simple.resolve(candidate))
    }
}

/// Owning project class of a method label, if any.
pub fn resolve_owner<'r>(resolver: &'r dyn OwnerResolver, label: &str) -> Option<&'r str> {
    let candidate = owner_candidate(label)?;
    resolver.resolve(&candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(simple: &str, qualified: &str) -> (String, String) {
        (simple.to_string(), qualified.to_string())
    }

    #[test]
    fn test_owner_candidate() {
        assert_eq!(owner_candidate("a.b.C.run(int)").as_deref(), Some("a.b.C"));
        assert_eq!(owner_candidate("a.Outer$Inner.run()").as_deref(), Some("a.Outer.Inner"));
        assert_eq!(owner_candidate("  C.run()  ").as_deref(), Some("C"));
        assert_eq!(owner_candidate("run()"), None);
        assert_eq!(owner_candidate("a.b.C"), None);
        assert_eq!(owner_candidate("(x).y"), None);
        assert_eq!(owner_candidate(".run()"), None);
        assert_eq!(owner_candidate("[EXT] println"), None);
    }

    #[test]
    fn test_project_resolver_exact_then_simple() {
        let classes = vec![ExtractedClass::new("shop.Cart"), ExtractedClass::new("shop.Item")];
        let resolver = ProjectOwnerResolver::new(&classes);
        assert_eq!(resolver.resolve("shop.Cart"), Some("shop.Cart"));
        assert_eq!(resolver.resolve("Item"), Some("shop.Item"));
        assert_eq!(resolver.resolve("other.Item"), None);
        assert_eq!(resolve_owner(&resolver, "Cart.total()"), Some("shop.Cart"));
        assert_eq!(resolve_owner(&resolver, "[EXT] java.util.List.size(...)"), None);
    }

    #[test]
    fn test_simple_name_collision_last_registered_wins() {
        let resolver = SimpleNameResolver::new(
            vec![pair("Node", "ast.Node"), pair("Node", "graph.Node")],
            CollisionPolicy::LastRegistered,
        );
        assert_eq!(resolver.resolve("Node"), Some("graph.Node"));
    }

    #[test]
    fn test_simple_name_collision_rejected() {
        let resolver = SimpleNameResolver::new(
            vec![
                pair("Node", "ast.Node"),
                pair("Node", "graph.Node"),
                pair("Node", "ast.Node"),
                pair("Edge", "graph.Edge"),
            ],
            CollisionPolicy::Reject,
        );
        assert_eq!(resolver.resolve("Node"), None);
        assert_eq!(resolver.resolve("Edge"), Some("graph.Edge"));
    }

    #[test]
    fn test_unresolved_resolver() {
        assert_eq!(UnresolvedResolver.resolve("anything"), None);
    }
}
