//! Block layer: bounded, ordered containers of entries.
//!
//! A block holds up to `2t - 1` sorted entries. An internal block also owns
//! exactly `entries + 1` child blocks, so child `i` sits between entry `i - 1`
//! and entry `i`. Every mutation below keeps the two vectors aligned.
//!
//! Blocks are passive: the tree decides when to split, borrow or merge and
//! keeps the running count and version itself.

mod entry;
mod rebalance;

pub use entry::{MapEntry, SetEntry, TreeEntry};

use std::cmp::Ordering;

use crate::compare::Comparer;
use crate::error::{Result, TreeError};
use crate::types::Degree;

/// A B-tree block
#[derive(Debug, Clone)]
pub struct Block<E> {
    entries: Vec<E>,
    children: Vec<Block<E>>,
    degree: Degree,
}

impl<E> Block<E> {
    /// Create an empty leaf block; storage grows as entries arrive
    pub(crate) fn new(degree: Degree) -> Self {
        Self {
            entries: Vec::new(),
            children: Vec::new(),
            degree,
        }
    }

    /// Minimum degree of the owning tree
    pub fn degree(&self) -> Degree {
        self.degree
    }

    /// Number of entries in this block
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the block holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if this block has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Check if no further entry fits without a split
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.degree.max_entries()
    }

    /// Check if the block meets the non-root minimum of `t - 1` entries
    pub fn has_minimum_entries(&self) -> bool {
        self.entries.len() >= self.degree.min_entries()
    }

    /// Check if one entry can be taken away without dropping below the minimum
    pub fn can_lend(&self) -> bool {
        self.entries.len() > self.degree.min_entries()
    }

    /// The entries, in ascending order
    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    /// Entry at `index`
    pub fn entry(&self, index: usize) -> Option<&E> {
        self.entries.get(index)
    }

    /// The child blocks (empty for a leaf)
    pub fn children(&self) -> &[Block<E>] {
        &self.children
    }

    /// Child at `index`
    pub fn child(&self, index: usize) -> Option<&Block<E>> {
        self.children.get(index)
    }

    /// Shallow iteration over this block's entries
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.entries.iter()
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> Option<&mut E> {
        self.entries.get_mut(index)
    }

    pub(crate) fn child_mut(&mut self, index: usize) -> Option<&mut Block<E>> {
        self.children.get_mut(index)
    }

    /// Insert an entry at `index`
    ///
    /// Fails with `CapacityExceeded` on a full block: callers split first.
    pub(crate) fn insert(&mut self, index: usize, entry: E) -> Result<()> {
        if self.is_full() {
            return Err(TreeError::CapacityExceeded {
                capacity: self.degree.max_entries(),
            });
        }
        if index > self.entries.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.entries.insert(index, entry);
        Ok(())
    }

    /// Append an entry
    #[cfg(test)]
    pub(crate) fn push(&mut self, entry: E) -> Result<()> {
        self.insert(self.entries.len(), entry)
    }

    /// Remove and return the entry at `index`
    pub(crate) fn remove_at(&mut self, index: usize) -> Result<E> {
        if index >= self.entries.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    /// Replace the entry at `index`, returning the old one
    pub(crate) fn replace(&mut self, index: usize, entry: E) -> Result<E> {
        let len = self.entries.len();
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(TreeError::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, entry))
    }

    /// Insert a child block at `index`
    pub(crate) fn insert_child(&mut self, index: usize, child: Block<E>) -> Result<()> {
        if self.children.len() >= self.degree.max_children() {
            return Err(TreeError::CapacityExceeded {
                capacity: self.degree.max_children(),
            });
        }
        if index > self.children.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: self.children.len(),
            });
        }
        self.children.insert(index, child);
        Ok(())
    }

    /// Remove and return the child at `index`
    pub(crate) fn remove_child(&mut self, index: usize) -> Result<Block<E>> {
        if index >= self.children.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: self.children.len(),
            });
        }
        Ok(self.children.remove(index))
    }

    /// Detach the only child of an empty internal block
    pub(crate) fn take_only_child(&mut self) -> Option<Block<E>> {
        if self.entries.is_empty() && self.children.len() == 1 {
            self.children.pop()
        } else {
            None
        }
    }
}

impl<E: TreeEntry> Block<E> {
    /// Number of entries strictly less than `key`
    pub fn lower_bound<C>(&self, key: &E::Key, comparer: &C) -> usize
    where
        C: Comparer<E::Key>,
    {
        self.entries
            .partition_point(|e| comparer.compare(e.key(), key) == Ordering::Less)
    }

    /// Number of entries less than or equal to `key`
    ///
    /// This is the insertion point that keeps duplicates in arrival order.
    pub fn upper_bound<C>(&self, key: &E::Key, comparer: &C) -> usize
    where
        C: Comparer<E::Key>,
    {
        self.entries
            .partition_point(|e| comparer.compare(e.key(), key) != Ordering::Greater)
    }

    /// Index of an entry equal to `key` at the bisection point, if any
    pub fn find_index<C>(&self, key: &E::Key, comparer: &C) -> std::result::Result<usize, usize>
    where
        C: Comparer<E::Key>,
    {
        let position = self.lower_bound(key, comparer);
        match self.entries.get(position) {
            Some(e) if comparer.equals(e.key(), key) => Ok(position),
            _ => Err(position),
        }
    }
}

impl<'a, E> IntoIterator for &'a Block<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
