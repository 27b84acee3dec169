//! Insertion-ordered set.
//!
//! Node and edge order drives tie-breaking in clustering and partitioning,
//! so nothing downstream may depend on hash-map iteration order.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// A set that remembers insertion order: a sequence plus a membership index.
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    items: Vec<T>,
    index: HashMap<T, usize>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> OrderedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `item`, returning its position and whether it was newly added.
    pub fn insert_full(&mut self, item: T) -> (usize, bool) {
        if let Some(&pos) = self.index.get(&item) {
            return (pos, false);
        }
        let pos = self.items.len();
        self.index.insert(item.clone(), pos);
        self.items.push(item);
        (pos, true)
    }

    /// Insert `item`; returns `false` if it was already present.
    pub fn insert(&mut self, item: T) -> bool {
        self.insert_full(item).1
    }

    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(item)
    }

    pub fn position<Q>(&self, item: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(item).copied()
    }

    pub fn get(&self, pos: usize) -> Option<&T> {
        self.items.get(pos)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl<'a, T> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
