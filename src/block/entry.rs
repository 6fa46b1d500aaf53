//! Entries: the sortable units stored in block slots.
//!
//! A tree never looks inside an entry except through [`TreeEntry::key`], so
//! the same split/merge code serves bare values and key/value pairs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key projection for a stored entry
pub trait TreeEntry {
    /// The part of the entry the tree orders by
    type Key: ?Sized;

    /// Borrow the ordering key
    fn key(&self) -> &Self::Key;
}

/// Set-mode entry: the value is its own key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetEntry<T> {
    value: T,
}

impl<T> SetEntry<T> {
    /// Wrap a value
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Borrow the value
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Unwrap the value
    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T> TreeEntry for SetEntry<T> {
    type Key = T;

    fn key(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Display> fmt::Display for SetEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Map-mode entry: ordered by `key` only, never by `value`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapEntry<K, V> {
    key: K,
    value: V,
}

impl<K, V> MapEntry<K, V> {
    /// Create an entry
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Borrow the value
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Mutably borrow the value; the key stays fixed
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Borrow key and value together
    pub fn pair(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    /// Split into key and value
    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> TreeEntry for MapEntry<K, V> {
    type Key = K;

    fn key(&self) -> &K {
        &self.key
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for MapEntry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}
