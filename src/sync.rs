//! Coarse-grained lock adapter.
//!
//! [`Synchronized`] puts a whole tree behind one reader/writer lock shared by
//! every clone of the handle. Mutations and the start of each cursor step take
//! the lock; an in-progress traversal is not covered between steps and relies
//! on version checks instead.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::block::TreeEntry;
use crate::btree::{BTree, Cursor};
use crate::compare::Comparer;
use crate::error::Result;
use crate::types::{Direction, TraverseMethod};

/// Shared, lock-guarded tree handle
///
/// Clones share the same tree.
pub struct Synchronized<E, C> {
    inner: Arc<RwLock<BTree<E, C>>>,
}

impl<E, C> Clone for Synchronized<E, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E, C> Synchronized<E, C> {
    /// Wrap a tree
    pub fn new(tree: BTree<E, C>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if no entries are stored
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Height of the tree
    pub fn height(&self) -> usize {
        self.inner.read().height()
    }

    /// Current version
    pub fn version(&self) -> u64 {
        self.inner.read().version()
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Run `f` under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&BTree<E, C>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` under the write lock
    pub fn write<R>(&self, f: impl FnOnce(&mut BTree<E, C>) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Copy the entries out in ascending order
    pub fn to_vec(&self) -> Vec<E>
    where
        E: Clone,
    {
        self.inner.read().iter().cloned().collect()
    }

    /// Cursor that takes the read lock for each step
    pub fn cursor(&self, method: TraverseMethod, direction: Direction) -> SyncCursor<E, C> {
        let cursor = self.inner.read().cursor(method, direction);
        SyncCursor {
            tree: self.clone(),
            cursor,
        }
    }
}

impl<E, C> Synchronized<E, C>
where
    E: TreeEntry,
    C: Comparer<E::Key>,
{
    /// Add an entry
    pub fn add(&self, entry: E) -> Result<()> {
        self.inner.write().add(entry)
    }

    /// Remove one entry with `key`
    pub fn remove(&self, key: &E::Key) -> Result<Option<E>> {
        self.inner.write().remove(key)
    }

    /// Check if `key` is present
    pub fn contains(&self, key: &E::Key) -> bool {
        self.inner.read().contains(key)
    }

    /// Clone of the entry stored under `key`
    pub fn get_cloned(&self, key: &E::Key) -> Option<E>
    where
        E: Clone,
    {
        self.inner.read().find(key).cloned()
    }
}

/// Cursor over a [`Synchronized`] tree
pub struct SyncCursor<E, C> {
    tree: Synchronized<E, C>,
    cursor: Cursor,
}

impl<E, C> SyncCursor<E, C> {
    /// Advance; fails with `VersionChanged` once the tree was modified
    pub fn move_next(&mut self) -> Result<bool> {
        let guard = self.tree.inner.read();
        self.cursor.move_next(&*guard)
    }

    /// Clone of the current entry
    pub fn current(&self) -> Result<Option<E>>
    where
        E: Clone,
    {
        let guard = self.tree.inner.read();
        Ok(self.cursor.entry(&*guard)?.cloned())
    }

    /// Rewind to before the first entry
    pub fn reset(&mut self) -> Result<()> {
        let guard = self.tree.inner.read();
        self.cursor.reset(&*guard)
    }
}
