//! Map-mode facade: a sorted key-to-value map.
//!
//! Entries are ordered by key only; values never take part in a comparison.

use crate::block::MapEntry;
use crate::btree::{BTree, Cursor, Traverse};
use crate::compare::{Comparer, NaturalOrder};
use crate::error::{Result, TreeError};
use crate::sync::Synchronized;
use crate::types::{Degree, Direction, TraverseMethod, TreeConfig};

/// A sorted map backed by a B-tree
#[derive(Debug, Clone)]
pub struct BTreeMap<K, V, C = NaturalOrder> {
    tree: BTree<MapEntry<K, V>, C>,
}

impl<K: Ord, V> BTreeMap<K, V, NaturalOrder> {
    /// Create an empty map with natural key order
    pub fn new(degree: usize) -> Result<Self> {
        Ok(Self {
            tree: BTree::new(degree)?,
        })
    }
}

impl<K, V, C: Comparer<K>> BTreeMap<K, V, C> {
    /// Create an empty map with a custom key comparer
    pub fn with_comparer(degree: usize, comparer: C) -> Result<Self> {
        Ok(Self {
            tree: BTree::with_comparer(degree, comparer)?,
        })
    }

    /// Create an empty map from a configuration
    pub fn with_config(config: &TreeConfig, comparer: C) -> Result<Self> {
        Ok(Self {
            tree: BTree::with_config(config, comparer)?,
        })
    }

    /// Insert a pair.
    ///
    /// An existing equal key is kept and the new pair lands after it, unless
    /// the tree was configured to reject duplicates.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        self.tree.add(MapEntry::new(key, value))
    }

    /// Insert a pair only if the key is not present yet
    pub fn try_insert(&mut self, key: K, value: V) -> Result<()> {
        if self.tree.contains(&key) {
            return Err(TreeError::DuplicateKey);
        }
        self.tree.add(MapEntry::new(key, value))
    }

    /// Value stored under `key`
    ///
    /// If duplicates were inserted, any one of the equal keys may answer; see
    /// [`BTree::find`].
    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.find(key).map(MapEntry::value)
    }

    /// Mutable value stored under `key`
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree.find_mut(key).map(MapEntry::value_mut)
    }

    /// Stored key and value for `key`
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.tree.find(key).map(MapEntry::pair)
    }

    /// Check if `key` is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Remove one pair with `key`, returning its value
    pub fn remove(&mut self, key: &K) -> Result<Option<V>> {
        Ok(self.tree.remove(key)?.map(|entry| entry.into_pair().1))
    }

    /// Pair with the smallest key
    pub fn first(&self) -> Option<(&K, &V)> {
        self.tree.first().map(MapEntry::pair)
    }

    /// Pair with the largest key
    pub fn last(&self) -> Option<(&K, &V)> {
        self.tree.last().map(MapEntry::pair)
    }

    /// Visit pairs until the visitor returns `false`
    pub fn iterate_while<F>(&self, method: TraverseMethod, direction: Direction, mut visitor: F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.tree.iterate_while(method, direction, |e| {
            let (k, v) = e.pair();
            visitor(k, v)
        })
    }

    /// Wrap in a shared, lock-guarded handle
    pub fn into_synchronized(self) -> Synchronized<MapEntry<K, V>, C> {
        Synchronized::new(self.tree)
    }
}

impl<K, V, C> BTreeMap<K, V, C> {
    /// Number of stored pairs
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Check if no pairs are stored
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Height of the underlying tree
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Minimum degree of the underlying tree
    pub fn degree(&self) -> Degree {
        self.tree.degree()
    }

    /// Modification counter
    pub fn version(&self) -> u64 {
        self.tree.version()
    }

    /// Remove every pair
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Pairs in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.tree.iter().map(MapEntry::pair)
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Values in ascending key order
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Stored entries (nodes) in the given order and direction
    pub fn traverse(&self, method: TraverseMethod, direction: Direction) -> Traverse<'_, MapEntry<K, V>> {
        self.tree.traverse(method, direction)
    }

    /// Visit every pair
    pub fn iterate<F>(&self, method: TraverseMethod, direction: Direction, mut visitor: F)
    where
        F: FnMut(&K, &V),
    {
        self.tree.iterate(method, direction, |e| {
            let (k, v) = e.pair();
            visitor(k, v);
        });
    }

    /// Detached cursor over the stored entries
    pub fn cursor(&self, method: TraverseMethod, direction: Direction) -> Cursor {
        self.tree.cursor(method, direction)
    }

    /// Copy the pairs out in ascending key order
    pub fn to_vec(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Borrow the underlying tree
    pub fn as_tree(&self) -> &BTree<MapEntry<K, V>, C> {
        &self.tree
    }

    /// Unwrap the underlying tree
    pub fn into_tree(self) -> BTree<MapEntry<K, V>, C> {
        self.tree
    }
}
