//! Traversal entry points.
//!
//! Borrowing iterators drive the same [`Cursor`] state machine as the
//! detached cursor, but skip the version check: the shared borrow they hold
//! already rules out mutation.

use std::iter::FusedIterator;

use crate::block::Block;
use crate::btree::{BTree, Cursor, Granularity};
use crate::types::{Direction, TraverseMethod};

/// Lazy traversal over the entries of a tree
#[derive(Debug, Clone)]
pub struct Traverse<'a, E> {
    root: Option<&'a Block<E>>,
    cursor: Cursor,
}

impl<'a, E> Traverse<'a, E> {
    /// Start over from the first entry
    pub fn restart(&mut self) {
        self.cursor.rewind();
    }

    /// Depth of the block holding the last yielded entry
    pub fn depth(&self) -> Option<usize> {
        self.cursor.depth()
    }
}

impl<'a, E> Iterator for Traverse<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        let root = self.root?;
        if !self.cursor.advance(Some(root)) {
            return None;
        }
        self.cursor.resolve_entry(root)
    }
}

impl<E> FusedIterator for Traverse<'_, E> {}

/// Lazy traversal over the blocks of a tree
#[derive(Debug, Clone)]
pub struct Blocks<'a, E> {
    root: Option<&'a Block<E>>,
    cursor: Cursor,
}

impl<'a, E> Blocks<'a, E> {
    /// Start over from the first block
    pub fn restart(&mut self) {
        self.cursor.rewind();
    }

    /// Depth of the last yielded block (the root is depth 0)
    pub fn depth(&self) -> Option<usize> {
        self.cursor.depth()
    }
}

impl<'a, E> Iterator for Blocks<'a, E> {
    type Item = &'a Block<E>;

    fn next(&mut self) -> Option<Self::Item> {
        let root = self.root?;
        if !self.cursor.advance(Some(root)) {
            return None;
        }
        self.cursor.resolve_block(root)
    }
}

impl<E> FusedIterator for Blocks<'_, E> {}

impl<E, C> BTree<E, C> {
    /// Detached entry cursor bound to the current version
    pub fn cursor(&self, method: TraverseMethod, direction: Direction) -> Cursor {
        Cursor::new(self.version(), method, direction, Granularity::Entries)
    }

    /// Detached block cursor bound to the current version
    pub fn block_cursor(&self, method: TraverseMethod, direction: Direction) -> Cursor {
        Cursor::new(self.version(), method, direction, Granularity::Blocks)
    }

    /// Entries in the given order and direction
    pub fn traverse(&self, method: TraverseMethod, direction: Direction) -> Traverse<'_, E> {
        Traverse {
            root: self.root(),
            cursor: self.cursor(method, direction),
        }
    }

    /// Blocks in the given order and direction
    pub fn blocks(&self, method: TraverseMethod, direction: Direction) -> Blocks<'_, E> {
        Blocks {
            root: self.root(),
            cursor: self.block_cursor(method, direction),
        }
    }

    /// Entries in ascending order
    pub fn iter(&self) -> Traverse<'_, E> {
        self.traverse(TraverseMethod::InOrder, Direction::Forward)
    }

    /// Visit every entry
    pub fn iterate<F>(&self, method: TraverseMethod, direction: Direction, mut visitor: F)
    where
        F: FnMut(&E),
    {
        self.traverse(method, direction).for_each(|e| visitor(e));
    }

    /// Visit entries until the visitor returns `false`
    ///
    /// Returns `true` when every entry was visited.
    pub fn iterate_while<F>(&self, method: TraverseMethod, direction: Direction, mut visitor: F) -> bool
    where
        F: FnMut(&E) -> bool,
    {
        self.traverse(method, direction).all(|e| visitor(e))
    }

    /// Visit blocks until the visitor returns `false`
    pub fn iterate_blocks_while<F>(
        &self,
        method: TraverseMethod,
        direction: Direction,
        mut visitor: F,
    ) -> bool
    where
        F: FnMut(&Block<E>) -> bool,
    {
        self.blocks(method, direction).all(|b| visitor(b))
    }

    /// Visit the tree one level at a time.
    ///
    /// The visitor receives the level number (root is 0) and every entry
    /// stored on that level, in direction order.
    pub fn iterate_levels<F>(&self, direction: Direction, mut visitor: F)
    where
        F: FnMut(usize, &[&E]),
    {
        let mut level: Vec<&Block<E>> = self.root().into_iter().collect();
        let mut depth = 0;
        while !level.is_empty() {
            let mut entries = Vec::new();
            let mut next = Vec::new();
            for block in &level {
                if direction.is_backward() {
                    entries.extend(block.entries().iter().rev());
                    next.extend(block.children().iter().rev());
                } else {
                    entries.extend(block.entries());
                    next.extend(block.children());
                }
            }
            visitor(depth, &entries);
            level = next;
            depth += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::SetEntry;
    use crate::error::Result;

    fn tree(degree: usize, values: impl IntoIterator<Item = i32>) -> Result<BTree<SetEntry<i32>>> {
        let mut tree = BTree::new(degree)?;
        for v in values {
            tree.add(SetEntry::new(v))?;
        }
        Ok(tree)
    }

    fn collect(tree: &BTree<SetEntry<i32>>, method: TraverseMethod, direction: Direction) -> Vec<i32> {
        tree.traverse(method, direction).map(|e| *e.value()).collect()
    }

    /// Root [10, 20] over leaves [5, 6, 7], [12, 17], [30]
    fn small() -> Result<BTree<SetEntry<i32>>> {
        tree(2, [10, 20, 5, 6, 12, 30, 7, 17])
    }

    #[test]
    fn test_in_order_both_ways() -> Result<()> {
        let tree = small()?;
        assert_eq!(
            collect(&tree, TraverseMethod::InOrder, Direction::Forward),
            vec![5, 6, 7, 10, 12, 17, 20, 30]
        );
        assert_eq!(
            collect(&tree, TraverseMethod::InOrder, Direction::Backward),
            vec![30, 20, 17, 12, 10, 7, 6, 5]
        );
        Ok(())
    }

    #[test]
    fn test_pre_and_post_order() -> Result<()> {
        let tree = small()?;
        assert_eq!(
            collect(&tree, TraverseMethod::PreOrder, Direction::Forward),
            vec![10, 20, 5, 6, 7, 12, 17, 30]
        );
        assert_eq!(
            collect(&tree, TraverseMethod::PostOrder, Direction::Forward),
            vec![5, 6, 7, 12, 17, 30, 10, 20]
        );
        assert_eq!(
            collect(&tree, TraverseMethod::PreOrder, Direction::Backward),
            vec![20, 10, 30, 17, 12, 7, 6, 5]
        );
        Ok(())
    }

    #[test]
    fn test_level_order() -> Result<()> {
        let tree = small()?;
        assert_eq!(
            collect(&tree, TraverseMethod::LevelOrder, Direction::Forward),
            vec![10, 20, 5, 6, 7, 12, 17, 30]
        );
        assert_eq!(
            collect(&tree, TraverseMethod::LevelOrder, Direction::Backward),
            vec![20, 10, 30, 17, 12, 7, 6, 5]
        );
        Ok(())
    }

    #[test]
    fn test_block_orders() -> Result<()> {
        let tree = small()?;
        let firsts = |method: TraverseMethod, direction: Direction| -> Vec<i32> {
            tree.blocks(method, direction)
                .filter_map(|b| b.entry(0).map(|e| *e.value()))
                .collect()
        };
        assert_eq!(firsts(TraverseMethod::PreOrder, Direction::Forward), vec![10, 5, 12, 30]);
        assert_eq!(firsts(TraverseMethod::PostOrder, Direction::Forward), vec![5, 12, 30, 10]);
        assert_eq!(firsts(TraverseMethod::InOrder, Direction::Forward), vec![5, 10, 12, 30]);
        // Backward, a block follows its last child instead of its first.
        assert_eq!(firsts(TraverseMethod::InOrder, Direction::Backward), vec![30, 10, 12, 5]);
        assert_eq!(firsts(TraverseMethod::LevelOrder, Direction::Backward), vec![10, 30, 12, 5]);
        Ok(())
    }

    #[test]
    fn test_every_order_visits_everything() -> Result<()> {
        let tree = tree(3, (0..200).map(|i| (i * 37) % 101))?;
        for method in [
            TraverseMethod::LevelOrder,
            TraverseMethod::PreOrder,
            TraverseMethod::InOrder,
            TraverseMethod::PostOrder,
        ] {
            for direction in [Direction::Forward, Direction::Backward] {
                let mut forward = collect(&tree, method, direction);
                forward.sort_unstable();
                let mut expected: Vec<i32> = tree.iter().map(|e| *e.value()).collect();
                expected.sort_unstable();
                assert_eq!(forward, expected, "{:?} {:?}", method, direction);
            }
            let block_count = tree.blocks(method, Direction::Forward).count();
            assert_eq!(block_count, tree.stats().blocks);
        }
        Ok(())
    }

    #[test]
    fn test_restart_and_depth() -> Result<()> {
        let tree = small()?;
        let mut walk = tree.traverse(TraverseMethod::PreOrder, Direction::Forward);
        assert_eq!(walk.next().map(|e| *e.value()), Some(10));
        assert_eq!(walk.depth(), Some(0));
        assert_eq!(walk.nth(1).map(|e| *e.value()), Some(5));
        assert_eq!(walk.depth(), Some(1));

        walk.restart();
        assert_eq!(walk.count(), 8);
        Ok(())
    }

    #[test]
    fn test_iterate_while_stops_early() -> Result<()> {
        let tree = small()?;
        let mut seen = Vec::new();
        let finished = tree.iterate_while(TraverseMethod::InOrder, Direction::Forward, |e| {
            seen.push(*e.value());
            *e.value() < 10
        });
        assert!(!finished);
        assert_eq!(seen, vec![5, 6, 7, 10]);

        let mut total = 0;
        tree.iterate(TraverseMethod::PostOrder, Direction::Backward, |e| total += e.value());
        assert_eq!(total, 107);
        Ok(())
    }

    #[test]
    fn test_iterate_levels() -> Result<()> {
        let tree = small()?;
        let mut levels = Vec::new();
        tree.iterate_levels(Direction::Forward, |depth, entries| {
            levels.push((depth, entries.iter().map(|e| *e.value()).collect::<Vec<_>>()));
        });
        assert_eq!(
            levels,
            vec![(0, vec![10, 20]), (1, vec![5, 6, 7, 12, 17, 30])]
        );

        let mut reversed = Vec::new();
        tree.iterate_levels(Direction::Backward, |_, entries| {
            reversed.extend(entries.iter().map(|e| *e.value()));
        });
        assert_eq!(reversed, vec![20, 10, 30, 17, 12, 7, 6, 5]);
        Ok(())
    }

    #[test]
    fn test_empty_tree_yields_nothing() -> Result<()> {
        let tree = tree(2, [])?;
        assert_eq!(tree.iter().count(), 0);
        assert_eq!(tree.blocks(TraverseMethod::LevelOrder, Direction::Forward).count(), 0);
        let mut called = false;
        tree.iterate_levels(Direction::Forward, |_, _| called = true);
        assert!(!called);
        Ok(())
    }
}
