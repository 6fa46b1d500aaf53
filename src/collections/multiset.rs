//! Set-mode facade: a sorted multiset of values.

use crate::block::SetEntry;
use crate::btree::{BTree, Cursor, Traverse};
use crate::compare::{Comparer, NaturalOrder};
use crate::error::Result;
use crate::sync::Synchronized;
use crate::types::{Degree, Direction, TraverseMethod, TreeConfig};

/// A sorted multiset backed by a B-tree
#[derive(Debug, Clone)]
pub struct BTreeMultiset<T, C = NaturalOrder> {
    tree: BTree<SetEntry<T>, C>,
}

impl<T: Ord> BTreeMultiset<T, NaturalOrder> {
    /// Create an empty multiset with natural order
    pub fn new(degree: usize) -> Result<Self> {
        Ok(Self {
            tree: BTree::new(degree)?,
        })
    }
}

impl<T, C: Comparer<T>> BTreeMultiset<T, C> {
    /// Create an empty multiset with a custom comparer
    pub fn with_comparer(degree: usize, comparer: C) -> Result<Self> {
        Ok(Self {
            tree: BTree::with_comparer(degree, comparer)?,
        })
    }

    /// Create an empty multiset from a configuration
    pub fn with_config(config: &TreeConfig, comparer: C) -> Result<Self> {
        Ok(Self {
            tree: BTree::with_config(config, comparer)?,
        })
    }

    /// Add a value after any equal values
    pub fn add(&mut self, value: T) -> Result<()> {
        self.tree.add(SetEntry::new(value))
    }

    /// Add every value in order
    pub fn add_all<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        values.into_iter().try_for_each(|v| self.add(v))
    }

    /// Remove one occurrence of `value`
    ///
    /// Returns `true` if a value was removed.
    pub fn remove(&mut self, value: &T) -> Result<bool> {
        Ok(self.tree.remove(value)?.is_some())
    }

    /// Check if an equal value is stored
    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value)
    }

    /// Find the stored value equal to `value`
    pub fn find(&self, value: &T) -> Option<&T> {
        self.tree.find(value).map(SetEntry::value)
    }

    /// Count the stored values equal to `value`
    pub fn count_of(&self, value: &T) -> usize {
        let comparer = self.tree.comparer();
        self.iter()
            .skip_while(|v| comparer.compare(*v, value).is_lt())
            .take_while(|v| comparer.equals(*v, value))
            .count()
    }

    /// Smallest value
    pub fn first(&self) -> Option<&T> {
        self.tree.first().map(SetEntry::value)
    }

    /// Largest value
    pub fn last(&self) -> Option<&T> {
        self.tree.last().map(SetEntry::value)
    }

    /// Visit values until the visitor returns `false`
    pub fn iterate_while<F>(&self, method: TraverseMethod, direction: Direction, mut visitor: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.tree
            .iterate_while(method, direction, |e| visitor(e.value()))
    }

    /// Wrap in a shared, lock-guarded handle
    pub fn into_synchronized(self) -> Synchronized<SetEntry<T>, C> {
        Synchronized::new(self.tree)
    }
}

impl<T, C> BTreeMultiset<T, C> {
    /// Number of stored values, counting duplicates
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Check if no values are stored
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

    /// Remove every value
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Values in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.tree.iter().map(SetEntry::value)
    }

    /// Stored entries (nodes) in the given order and direction
    pub fn traverse(&self, method: TraverseMethod, direction: Direction) -> Traverse<'_, SetEntry<T>> {
        self.tree.traverse(method, direction)
    }

    /// Values in the given order and direction
    pub fn values(
        &self,
        method: TraverseMethod,
        direction: Direction,
    ) -> impl Iterator<Item = &T> + '_ {
        self.tree.traverse(method, direction).map(SetEntry::value)
    }

    /// Visit every value
    pub fn iterate<F>(&self, method: TraverseMethod, direction: Direction, mut visitor: F)
    where
        F: FnMut(&T),
    {
        self.tree.iterate(method, direction, |e| visitor(e.value()));
    }

    /// Detached cursor over the stored entries
    pub fn cursor(&self, method: TraverseMethod, direction: Direction) -> Cursor {
        self.tree.cursor(method, direction)
    }

    /// Copy the values out in ascending order
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Borrow the underlying tree
    pub fn as_tree(&self) -> &BTree<SetEntry<T>, C> {
        &self.tree
    }

    /// Unwrap the underlying tree
    pub fn into_tree(self) -> BTree<SetEntry<T>, C> {
        self.tree
    }
}

impl<'a, T, C> IntoIterator for &'a BTreeMultiset<T, C> {
    type Item = &'a T;
    type IntoIter = std::iter::Map<Traverse<'a, SetEntry<T>>, fn(&'a SetEntry<T>) -> &'a T>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.iter().map(SetEntry::value as fn(&'a SetEntry<T>) -> &'a T)
    }
}
