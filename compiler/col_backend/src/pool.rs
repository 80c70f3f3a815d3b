//! Deduplicating pools.
//!
//! Constants and labels are referenced from the object by index. A pool
//! hands out the index of the first insertion of an equal value, so every
//! distinct value appears exactly once.

use std::borrow::Borrow;
use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Insertion-ordered set with stable indices.
#[derive(Clone, Debug)]
pub struct Pool<T> {
    values: Vec<T>,
    index: FxHashMap<T, usize>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Pool {
            values: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T: Clone + Eq + Hash> Pool<T> {
    pub fn new() -> Self {
        Pool::default()
    }

    /// Index of `value`, inserting it if not yet present.
    pub fn intern(&mut self, value: T) -> usize {
        if let Some(&idx) = self.index.get(&value) {
            return idx;
        }
        let idx = self.values.len();
        self.values.push(value.clone());
        self.index.insert(value, idx);
        idx
    }

    /// Index of an already interned value.
    pub fn find<Q>(&self, value: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedups() {
        let mut pool = Pool::new();
        assert_eq!(pool.intern("a".to_string()), 0);
        assert_eq!(pool.intern("b".to_string()), 1);
        assert_eq!(pool.intern("a".to_string()), 0);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.find("b"), Some(1));
        assert_eq!(pool.find("c"), None);
        assert_eq!(pool.into_vec(), vec!["a".to_string(), "b".to_string()]);
    }
}
