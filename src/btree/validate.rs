//! Structural self-check.

use std::cmp::Ordering;

use crate::block::{Block, TreeEntry};
use crate::btree::BTree;
use crate::compare::Comparer;
use crate::error::{Result, TreeError};

/// Key range a subtree must stay within (inclusive, duplicates allowed)
struct Bounds<'a, K: ?Sized> {
    lower: Option<&'a K>,
    upper: Option<&'a K>,
}

impl<E, C> BTree<E, C>
where
    E: TreeEntry,
    C: Comparer<E::Key>,
{
    /// Check every structural invariant, returning `Corruption` on the first
    /// breach found.
    ///
    /// Walks the whole tree; meant for tests and diagnostics.
    pub fn validate(&self) -> Result<()> {
        let Some(root) = self.root() else {
            if self.len() != 0 {
                return Err(TreeError::corruption(format!(
                    "empty tree reports {} entries",
                    self.len()
                )));
            }
            return Ok(());
        };

        if !root.is_leaf() && root.is_empty() {
            return Err(TreeError::corruption("internal root holds no entries"));
        }

        let mut counted = 0;
        let bounds = Bounds {
            lower: None,
            upper: None,
        };
        self.check_block(root, 1, bounds, &mut counted)?;

        if counted != self.len() {
            return Err(TreeError::corruption(format!(
                "tree reports {} entries but holds {}",
                self.len(),
                counted
            )));
        }
        Ok(())
    }

    fn check_block(
        &self,
        block: &Block<E>,
        depth: usize,
        bounds: Bounds<'_, E::Key>,
        counted: &mut usize,
    ) -> Result<()> {
        let degree = block.degree();
        if block.len() > degree.max_entries() {
            return Err(TreeError::corruption(format!(
                "block at depth {} holds {} entries, maximum is {}",
                depth,
                block.len(),
                degree.max_entries()
            )));
        }
        if depth > 1 && !block.has_minimum_entries() {
            return Err(TreeError::corruption(format!(
                "block at depth {} holds {} entries, minimum is {}",
                depth,
                block.len(),
                degree.min_entries()
            )));
        }

        let comparer = self.comparer();
        for pair in block.entries().windows(2) {
            if comparer.compare(pair[0].key(), pair[1].key()) == Ordering::Greater {
                return Err(TreeError::corruption(format!(
                    "entries out of order at depth {}",
                    depth
                )));
            }
        }
        for entry in block {
            let below = bounds
                .lower
                .is_some_and(|lower| comparer.compare(entry.key(), lower) == Ordering::Less);
            let above = bounds
                .upper
                .is_some_and(|upper| comparer.compare(entry.key(), upper) == Ordering::Greater);
            if below || above {
                return Err(TreeError::corruption(format!(
                    "entry at depth {} escapes its separator range",
                    depth
                )));
            }
        }
        *counted += block.len();

        if block.is_leaf() {
            if depth != self.height() {
                return Err(TreeError::corruption(format!(
                    "leaf at depth {} in a tree of height {}",
                    depth,
                    self.height()
                )));
            }
            return Ok(());
        }

        if block.children().len() != block.len() + 1 {
            return Err(TreeError::corruption(format!(
                "block at depth {} has {} entries but {} children",
                depth,
                block.len(),
                block.children().len()
            )));
        }
        for (i, child) in block.children().iter().enumerate() {
            let lower = match i {
                0 => bounds.lower,
                _ => block.entry(i - 1).map(TreeEntry::key),
            };
            let upper = match block.entry(i) {
                Some(entry) => Some(entry.key()),
                None => bounds.upper,
            };
            self.check_block(child, depth + 1, Bounds { lower, upper }, counted)?;
        }
        Ok(())
    }
}
