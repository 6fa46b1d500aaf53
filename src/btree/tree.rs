//! B-tree core implementation.
//!
//! This module provides the main BTree struct with operations for:
//! - add: top-down insertion with preemptive splits
//! - find/contains: bisection lookups
//! - remove: top-down deletion with borrow/merge rebalancing
//!
//! The tree owns every block by value. Running count and version live here
//! and are updated once per operation, so blocks never need a way back to
//! their tree.

use std::cmp::Ordering;

use tracing::debug;

use crate::block::{Block, TreeEntry};
use crate::compare::{Comparer, NaturalOrder};
use crate::error::{Result, TreeError};
use crate::types::{Degree, DuplicatePolicy, TreeConfig};

/// An in-memory B-tree of entries ordered by their key projection
#[derive(Debug, Clone)]
pub struct BTree<E, C = NaturalOrder> {
    /// Root block (None until the first add)
    pub(super) root: Option<Block<E>>,
    degree: Degree,
    /// Blocks on any root-to-leaf path
    height: usize,
    /// Entries across all blocks
    pub(super) count: usize,
    /// Bumped by every successful mutation
    version: u64,
    comparer: C,
    duplicates: DuplicatePolicy,
}

impl<E> BTree<E, NaturalOrder>
where
    E: TreeEntry,
    E::Key: Ord,
{
    /// Create an empty tree with natural key order
    pub fn new(degree: usize) -> Result<Self> {
        Self::with_comparer(degree, NaturalOrder)
    }
}

impl<E, C> BTree<E, C> {
    /// Root block, if any entry was ever added since the last clear
    pub fn root(&self) -> Option<&Block<E>> {
        self.root.as_ref()
    }

    /// Minimum degree
    pub fn degree(&self) -> Degree {
        self.degree
    }

    /// Number of blocks on any root-to-leaf path
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the tree holds no entries
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Modification counter checked by cursors
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The injected comparer
    pub fn comparer(&self) -> &C {
        &self.comparer
    }

    /// Duplicate key handling
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicates
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.root = None;
        self.count = 0;
        self.height = 1;
        self.version += 1;
        debug!("tree cleared");
    }
}

impl<E, C> BTree<E, C>
where
    E: TreeEntry,
    C: Comparer<E::Key>,
{
    /// Create an empty tree with a custom comparer
    pub fn with_comparer(degree: usize, comparer: C) -> Result<Self> {
        Self::with_config(&TreeConfig::new(degree), comparer)
    }

    /// Create an empty tree from a configuration
    pub fn with_config(config: &TreeConfig, comparer: C) -> Result<Self> {
        Ok(Self {
            root: None,
            degree: config.validated_degree()?,
            height: 1,
            count: 0,
            version: 0,
            comparer,
            duplicates: config.duplicates,
        })
    }

    /// Insert an entry after any entries with an equal key.
    ///
    /// Full blocks are split on the way down, so the descent never has to
    /// back up. Under [`DuplicatePolicy::Reject`] an equal key fails with
    /// `DuplicateKey` and leaves the tree untouched.
    pub fn add(&mut self, entry: E) -> Result<()> {
        if self.duplicates == DuplicatePolicy::Reject && self.contains(entry.key()) {
            return Err(TreeError::DuplicateKey);
        }

        let degree = self.degree;
        let root = self.root.get_or_insert_with(|| Block::new(degree));
        if root.is_full() {
            let old_root = std::mem::replace(root, Block::new(degree));
            root.insert_child(0, old_root)?;
            root.split_child(0)?;
            self.height += 1;
            debug!(height = self.height, "root split");
        }

        insert_non_full(root, entry, &self.comparer)?;
        self.count += 1;
        self.version += 1;
        Ok(())
    }

    /// Find an entry whose key equals `key`
    ///
    /// With duplicate keys this returns the first equal entry met on the
    /// root-to-leaf search path. Which of the equal entries that is depends
    /// on the tree's shape, not on insertion order.
    pub fn find(&self, key: &E::Key) -> Option<&E> {
        let mut block = self.root.as_ref()?;
        loop {
            match block.find_index(key, &self.comparer) {
                Ok(index) => return block.entry(index),
                Err(_) if block.is_leaf() => return None,
                Err(index) => block = block.child(index)?,
            }
        }
    }

    /// Mutable access to a stored entry; callers must not change its key.
    pub(crate) fn find_mut(&mut self, key: &E::Key) -> Option<&mut E> {
        let root = self.root.as_mut()?;
        find_in(root, key, &self.comparer)
    }

    /// Check if an entry with an equal key is stored
    pub fn contains(&self, key: &E::Key) -> bool {
        self.find(key).is_some()
    }

    /// Smallest entry
    pub fn first(&self) -> Option<&E> {
        let mut block = self.root.as_ref()?;
        while let Some(child) = block.children().first() {
            block = child;
        }
        block.entries().first()
    }

    /// Largest entry
    pub fn last(&self) -> Option<&E> {
        let mut block = self.root.as_ref()?;
        while let Some(child) = block.children().last() {
            block = child;
        }
        block.entries().last()
    }

    /// Remove one entry whose key equals `key` and return it.
    ///
    /// Returns `Ok(None)` for an absent key without touching the structure
    /// or the version.
    pub fn remove(&mut self, key: &E::Key) -> Result<Option<E>> {
        if !self.contains(key) {
            return Ok(None);
        }
        let Some(root) = self.root.as_mut() else {
            return Ok(None);
        };

        let removed = remove_from(root, key, &self.comparer)?;
        if let Some(child) = root.take_only_child() {
            *root = child;
            self.height -= 1;
            debug!(height = self.height, "root collapsed");
        }

        if removed.is_some() {
            self.count -= 1;
            self.version += 1;
            if self.count == 0 {
                self.root = None;
            }
        }
        Ok(removed)
    }
}

/// Descend from a block known not to be full and insert at a leaf.
fn insert_non_full<E, C>(mut block: &mut Block<E>, entry: E, comparer: &C) -> Result<()>
where
    E: TreeEntry,
    C: Comparer<E::Key>,
{
    loop {
        let mut position = block.upper_bound(entry.key(), comparer);
        if block.is_leaf() {
            return block.insert(position, entry);
        }

        if block.child(position).is_some_and(Block::is_full) {
            block.split_child(position)?;
            let goes_right = block
                .entry(position)
                .is_some_and(|median| comparer.compare(entry.key(), median.key()) != Ordering::Less);
            if goes_right {
                position += 1;
            }
        }

        let len = block.children().len();
        block = block
            .child_mut(position)
            .ok_or(TreeError::IndexOutOfRange {
                index: position,
                len,
            })?;
    }
}

fn find_in<'a, E, C>(block: &'a mut Block<E>, key: &E::Key, comparer: &C) -> Option<&'a mut E>
where
    E: TreeEntry,
    C: Comparer<E::Key>,
{
    match block.find_index(key, comparer) {
        Ok(index) => block.entry_mut(index),
        Err(_) if block.is_leaf() => None,
        Err(index) => find_in(block.child_mut(index)?, key, comparer),
    }
}

/// Remove `key` from the subtree rooted at `block`.
///
/// Unless `block` is the root it holds at least `t` entries on entry, so it
/// can give one up without dropping below the minimum.
fn remove_from<E, C>(block: &mut Block<E>, key: &E::Key, comparer: &C) -> Result<Option<E>>
where
    E: TreeEntry,
    C: Comparer<E::Key>,
{
    match block.find_index(key, comparer) {
        Ok(position) if block.is_leaf() => block.remove_at(position).map(Some),
        Ok(position) => remove_separator(block, position, key, comparer),
        Err(_) if block.is_leaf() => Ok(None),
        Err(position) => {
            let index = block.fill_child(position)?;
            let child = child_at(block, index)?;
            remove_from(child, key, comparer)
        }
    }
}

/// Remove the separator at `position` of an internal block.
fn remove_separator<E, C>(
    block: &mut Block<E>,
    position: usize,
    key: &E::Key,
    comparer: &C,
) -> Result<Option<E>>
where
    E: TreeEntry,
    C: Comparer<E::Key>,
{
    if block.child(position).is_some_and(Block::can_lend) {
        let predecessor = remove_last(child_at(block, position)?)?;
        return block.replace(position, predecessor).map(Some);
    }
    if block.child(position + 1).is_some_and(Block::can_lend) {
        let successor = remove_first(child_at(block, position + 1)?)?;
        return block.replace(position, successor).map(Some);
    }

    block.merge_children(position)?;
    remove_from(child_at(block, position)?, key, comparer)
}

/// Remove the largest entry of a subtree, refilling along the right spine.
fn remove_last<E>(block: &mut Block<E>) -> Result<E> {
    if block.is_leaf() {
        let last = block
            .len()
            .checked_sub(1)
            .ok_or_else(|| TreeError::corruption("predecessor search reached an empty leaf"))?;
        return block.remove_at(last);
    }
    let rightmost = block.children().len() - 1;
    let index = block.fill_child(rightmost)?;
    remove_last(child_at(block, index)?)
}

/// Remove the smallest entry of a subtree, refilling along the left spine.
fn remove_first<E>(block: &mut Block<E>) -> Result<E> {
    if block.is_leaf() {
        if block.is_empty() {
            return Err(TreeError::corruption("successor search reached an empty leaf"));
        }
        return block.remove_at(0);
    }
    let index = block.fill_child(0)?;
    remove_first(child_at(block, index)?)
}

fn child_at<E>(block: &mut Block<E>, index: usize) -> Result<&mut Block<E>> {
    let len = block.children().len();
    block
        .child_mut(index)
        .ok_or(TreeError::IndexOutOfRange { index, len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{MapEntry, SetEntry};
    use crate::compare::ReverseOrder;

    fn values(tree: &BTree<SetEntry<i32>>) -> Vec<i32> {
        tree.iter().map(|e| *e.value()).collect()
    }

    fn build(degree: usize, values: &[i32]) -> Result<BTree<SetEntry<i32>>> {
        let mut tree = BTree::new(degree)?;
        for &v in values {
            tree.add(SetEntry::new(v))?;
        }
        Ok(tree)
    }

    #[test]
    fn test_new_rejects_small_degree() {
        assert!(matches!(
            BTree::<SetEntry<i32>>::new(1),
            Err(TreeError::InvalidDegree { degree: 1, minimum: 2 })
        ));
    }

    #[test]
    fn test_huge_degree_adds_without_reserving() -> Result<()> {
        assert!(BTree::<SetEntry<i32>>::new(usize::MAX).is_err());

        let mut tree = BTree::new(usize::MAX / 2)?;
        for v in [3, 1, 2] {
            tree.add(SetEntry::new(v))?;
        }
        assert_eq!(values(&tree), vec![1, 2, 3]);
        assert_eq!(tree.height(), 1);
        tree.validate()
    }

    #[test]
    fn test_empty_tree() -> Result<()> {
        let tree = build(3, &[])?;
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.height(), 1);
        assert!(tree.find(&1).is_none());
        assert!(tree.first().is_none());
        Ok(())
    }

    #[test]
    fn test_add_and_find() -> Result<()> {
        let tree = build(2, &[10, 20, 5, 6, 12, 30, 7, 17])?;
        assert_eq!(tree.len(), 8);
        assert_eq!(values(&tree), vec![5, 6, 7, 10, 12, 17, 20, 30]);
        for v in [5, 6, 7, 10, 12, 17, 20, 30] {
            assert!(tree.contains(&v), "missing {}", v);
        }
        assert!(!tree.contains(&11));
        assert_eq!(tree.first().map(|e| *e.value()), Some(5));
        assert_eq!(tree.last().map(|e| *e.value()), Some(30));
        tree.validate()
    }

    #[test]
    fn test_root_split_grows_height() -> Result<()> {
        let mut tree = build(2, &[1, 2, 3])?;
        assert_eq!(tree.height(), 1);
        tree.add(SetEntry::new(4))?;
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.root().map(Block::len), Some(1));
        tree.validate()
    }

    #[test]
    fn test_duplicates_allowed_by_default() -> Result<()> {
        let tree = build(2, &[3, 1, 3, 2, 3, 3, 1])?;
        assert_eq!(values(&tree), vec![1, 1, 2, 3, 3, 3, 3]);
        tree.validate()
    }

    #[test]
    fn test_duplicates_keep_arrival_order() -> Result<()> {
        let mut tree = BTree::new(2)?;
        for (i, key) in [5, 5, 1, 5, 9, 5, 5].into_iter().enumerate() {
            tree.add(MapEntry::new(key, i))?;
        }
        let fives: Vec<usize> = tree
            .iter()
            .filter(|e| *e.key() == 5)
            .map(|e| *e.value())
            .collect();
        assert_eq!(fives, vec![0, 1, 3, 5, 6]);
        tree.validate()
    }

    #[test]
    fn test_duplicates_rejected_by_policy() -> Result<()> {
        let config = TreeConfig::new(2).duplicates(DuplicatePolicy::Reject);
        let mut tree = BTree::with_config(&config, NaturalOrder)?;
        tree.add(SetEntry::new(1))?;
        let version = tree.version();
        assert_eq!(tree.add(SetEntry::new(1)), Err(TreeError::DuplicateKey));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.version(), version);
        Ok(())
    }

    #[test]
    fn test_custom_comparer() -> Result<()> {
        let mut tree = BTree::with_comparer(2, ReverseOrder)?;
        for v in [1, 4, 2, 8, 5, 7] {
            tree.add(SetEntry::new(v))?;
        }
        let out: Vec<i32> = tree.iter().map(|e| *e.value()).collect();
        assert_eq!(out, vec![8, 7, 5, 4, 2, 1]);
        assert!(tree.contains(&5));
        tree.validate()
    }

    #[test]
    fn test_remove_leaf_and_internal() -> Result<()> {
        let mut tree = build(2, &[10, 20, 5, 6, 12, 30, 7, 17])?;

        // 10 is a separator in the root after these inserts.
        assert_eq!(tree.remove(&10)?.map(SetEntry::into_value), Some(10));
        tree.validate()?;
        assert_eq!(tree.remove(&30)?.map(SetEntry::into_value), Some(30));
        tree.validate()?;
        assert_eq!(values(&tree), vec![5, 6, 7, 12, 17, 20]);
        assert_eq!(tree.len(), 6);
        Ok(())
    }

    #[test]
    fn test_remove_absent_is_noop() -> Result<()> {
        let mut tree = build(2, &[1, 2, 3, 4, 5, 6, 7])?;
        let before = format!("{:?}", tree.root());
        let (len, height, version) = (tree.len(), tree.height(), tree.version());

        assert!(tree.remove(&42)?.is_none());
        assert_eq!(format!("{:?}", tree.root()), before);
        assert_eq!((tree.len(), tree.height(), tree.version()), (len, height, version));
        Ok(())
    }

    #[test]
    fn test_remove_all_collapses_root() -> Result<()> {
        let mut tree = build(2, &(1..=20).collect::<Vec<_>>())?;
        assert!(tree.height() > 2);
        for v in 1..=20 {
            assert!(tree.remove(&v)?.is_some());
            tree.validate()?;
        }
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.height(), 1);
        Ok(())
    }

    #[test]
    fn test_remove_duplicate_keeps_others() -> Result<()> {
        let mut tree = build(2, &[4, 4, 4, 1, 9, 4])?;
        assert!(tree.remove(&4)?.is_some());
        assert_eq!(values(&tree), vec![1, 4, 4, 4, 9]);
        tree.validate()
    }

    #[test]
    fn test_find_mut_updates_value() -> Result<()> {
        let mut tree = BTree::new(2)?;
        for (k, v) in [("b", 1), ("a", 2), ("c", 3), ("d", 4)] {
            tree.add(MapEntry::new(k, v))?;
        }
        if let Some(entry) = tree.find_mut(&"c") {
            *entry.value_mut() = 30;
        }
        assert_eq!(tree.find(&"c").map(|e| *e.value()), Some(30));
        Ok(())
    }

    #[test]
    fn test_clear_resets() -> Result<()> {
        let mut tree = build(2, &[1, 2, 3, 4, 5])?;
        let version = tree.version();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert!(tree.version() > version);
        tree.add(SetEntry::new(9))?;
        assert_eq!(values(&tree), vec![9]);
        Ok(())
    }
}
