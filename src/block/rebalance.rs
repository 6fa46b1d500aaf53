//! Overflow and underflow resolution between a parent block and its children.
//!
//! All operations run on the parent and touch at most two adjacent children,
//! so each is O(t) with no recursion.

use tracing::trace;

use super::Block;
use crate::error::{Result, TreeError};

impl<E> Block<E> {
    /// Split the full child at `index` around its median.
    ///
    /// The median moves up into this block at `index`, the upper half moves
    /// into a new block inserted as child `index + 1`. Both halves end up
    /// with exactly `t - 1` entries.
    pub(crate) fn split_child(&mut self, index: usize) -> Result<()> {
        if self.is_full() {
            return Err(TreeError::CapacityExceeded {
                capacity: self.degree.max_entries(),
            });
        }
        let degree = self.degree;
        let len = self.children.len();
        let child = self
            .children
            .get_mut(index)
            .ok_or(TreeError::IndexOutOfRange { index, len })?;
        if !child.is_full() {
            return Err(TreeError::corruption(format!(
                "split requested for a block holding {} of {} entries",
                child.len(),
                degree.max_entries()
            )));
        }

        let upper_entries = child.entries.split_off(degree.median() + 1);
        let upper_children = if child.is_leaf() {
            Vec::new()
        } else {
            child.children.split_off(degree.median() + 1)
        };
        let median = child
            .entries
            .pop()
            .ok_or_else(|| TreeError::corruption("full block without a median"))?;

        let mut sibling = Block::new(degree);
        sibling.entries.extend(upper_entries);
        sibling.children = upper_children;

        self.entries.insert(index, median);
        self.children.insert(index + 1, sibling);
        trace!(degree = degree.value(), index, "split block");
        Ok(())
    }

    /// Merge child `index + 1` and the separator at `index` into child `index`.
    pub(crate) fn merge_children(&mut self, index: usize) -> Result<()> {
        let len = self.children.len();
        if index + 1 >= len {
            return Err(TreeError::IndexOutOfRange {
                index: index + 1,
                len,
            });
        }
        let merged = self.children[index].len() + self.children[index + 1].len() + 1;
        if merged > self.degree.max_entries() {
            return Err(TreeError::CapacityExceeded {
                capacity: self.degree.max_entries(),
            });
        }

        let separator = self.remove_at(index)?;
        let right = self.remove_child(index + 1)?;
        let left = &mut self.children[index];
        left.entries.push(separator);
        left.entries.extend(right.entries);
        left.children.extend(right.children);
        trace!(degree = self.degree.value(), index, merged, "merged blocks");
        Ok(())
    }

    /// Rotate one entry from the left sibling of child `index` through the
    /// separator into the front of child `index`.
    pub(crate) fn borrow_from_left(&mut self, index: usize) -> Result<()> {
        let len = self.children.len();
        if index == 0 || index >= len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        let (before, after) = self.children.split_at_mut(index);
        let left = &mut before[index - 1];
        let child = &mut after[0];
        if child.is_full() {
            return Err(TreeError::CapacityExceeded {
                capacity: self.degree.max_entries(),
            });
        }

        let moved = left
            .entries
            .pop()
            .ok_or_else(|| TreeError::corruption("left sibling has no entry to lend"))?;
        let separator = std::mem::replace(&mut self.entries[index - 1], moved);
        child.entries.insert(0, separator);
        if let Some(grandchild) = left.children.pop() {
            child.children.insert(0, grandchild);
        }
        trace!(index, "borrowed from left sibling");
        Ok(())
    }

    /// Rotate one entry from the right sibling of child `index` through the
    /// separator onto the back of child `index`.
    pub(crate) fn borrow_from_right(&mut self, index: usize) -> Result<()> {
        let len = self.children.len();
        if index + 1 >= len {
            return Err(TreeError::IndexOutOfRange {
                index: index + 1,
                len,
            });
        }
        let (before, after) = self.children.split_at_mut(index + 1);
        let child = &mut before[index];
        let right = &mut after[0];
        if child.is_full() {
            return Err(TreeError::CapacityExceeded {
                capacity: self.degree.max_entries(),
            });
        }
        if right.entries.is_empty() {
            return Err(TreeError::corruption("right sibling has no entry to lend"));
        }

        let moved = right.entries.remove(0);
        let separator = std::mem::replace(&mut self.entries[index], moved);
        child.entries.push(separator);
        if !right.children.is_empty() {
            child.children.push(right.children.remove(0));
        }
        trace!(index, "borrowed from right sibling");
        Ok(())
    }

    /// Make sure child `index` holds at least `t` entries before a descent
    /// that may remove one from it.
    ///
    /// Tries the left sibling, then the right sibling, then merges. Returns
    /// the index of the child that now covers the original key range, which
    /// moves one slot left when the child merged into its left sibling.
    pub(crate) fn fill_child(&mut self, index: usize) -> Result<usize> {
        let len = self.children.len();
        let child = self
            .children
            .get(index)
            .ok_or(TreeError::IndexOutOfRange { index, len })?;
        if child.can_lend() {
            return Ok(index);
        }

        if index > 0 && self.children[index - 1].can_lend() {
            self.borrow_from_left(index)?;
            Ok(index)
        } else if index + 1 < len && self.children[index + 1].can_lend() {
            self.borrow_from_right(index)?;
            Ok(index)
        } else if index > 0 {
            self.merge_children(index - 1)?;
            Ok(index - 1)
        } else {
            self.merge_children(index)?;
            Ok(index)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::block::{Block, SetEntry};
    use crate::error::Result;
    use crate::types::Degree;

    type B = Block<SetEntry<i32>>;

    fn leaf(degree: Degree, values: &[i32]) -> Result<B> {
        let mut block = Block::new(degree);
        for &v in values {
            block.push(SetEntry::new(v))?;
        }
        Ok(block)
    }

    fn values(block: &B) -> Vec<i32> {
        block.iter().map(|e| *e.value()).collect()
    }

    fn parent(degree: Degree, separators: &[i32], children: Vec<B>) -> Result<B> {
        let mut block = leaf(degree, separators)?;
        for (i, child) in children.into_iter().enumerate() {
            block.insert_child(i, child)?;
        }
        Ok(block)
    }

    #[test]
    fn test_split_leaf() -> Result<()> {
        let t = Degree::new(2)?;
        let mut root = parent(t, &[], vec![leaf(t, &[1, 2, 3])?])?;
        root.split_child(0)?;

        assert_eq!(values(&root), vec![2]);
        assert_eq!(root.children().len(), 2);
        assert_eq!(values(&root.children()[0]), vec![1]);
        assert_eq!(values(&root.children()[1]), vec![3]);
        Ok(())
    }

    #[test]
    fn test_split_internal_moves_children() -> Result<()> {
        let t = Degree::new(2)?;
        let full = parent(
            t,
            &[10, 20, 30],
            vec![
                leaf(t, &[5])?,
                leaf(t, &[15])?,
                leaf(t, &[25])?,
                leaf(t, &[35])?,
            ],
        )?;
        let mut root = parent(t, &[], vec![full])?;
        root.split_child(0)?;

        let left = &root.children()[0];
        let right = &root.children()[1];
        assert_eq!(values(&root), vec![20]);
        assert_eq!(values(left), vec![10]);
        assert_eq!(values(right), vec![30]);
        assert_eq!(left.children().len(), 2);
        assert_eq!(right.children().len(), 2);
        assert_eq!(values(&right.children()[0]), vec![25]);
        Ok(())
    }

    #[test]
    fn test_split_wider_degree() -> Result<()> {
        let t = Degree::new(3)?;
        let mut root = parent(t, &[], vec![leaf(t, &[1, 2, 3, 4, 5])?])?;
        root.split_child(0)?;

        assert_eq!(values(&root), vec![3]);
        assert_eq!(values(&root.children()[0]), vec![1, 2]);
        assert_eq!(values(&root.children()[1]), vec![4, 5]);
        Ok(())
    }

    #[test]
    fn test_split_rejects_non_full_child() -> Result<()> {
        let t = Degree::new(2)?;
        let mut root = parent(t, &[], vec![leaf(t, &[1])?])?;
        assert!(root.split_child(0).is_err());
        assert!(root.split_child(4).is_err());
        Ok(())
    }

    #[test]
    fn test_merge_children() -> Result<()> {
        let t = Degree::new(2)?;
        let mut root = parent(t, &[5], vec![leaf(t, &[1])?, leaf(t, &[9])?])?;
        root.merge_children(0)?;

        assert!(root.is_empty());
        assert_eq!(root.children().len(), 1);
        assert_eq!(values(&root.children()[0]), vec![1, 5, 9]);
        Ok(())
    }

    #[test]
    fn test_merge_rejects_overflow() -> Result<()> {
        let t = Degree::new(2)?;
        let mut root = parent(t, &[5], vec![leaf(t, &[1, 2])?, leaf(t, &[9])?])?;
        assert!(root.merge_children(0).is_err());
        assert_eq!(values(&root), vec![5]);
        Ok(())
    }

    #[test]
    fn test_borrow_rotations() -> Result<()> {
        let t = Degree::new(2)?;
        let mut root = parent(t, &[5], vec![leaf(t, &[1, 2, 3])?, leaf(t, &[9])?])?;

        root.borrow_from_left(1)?;
        assert_eq!(values(&root), vec![3]);
        assert_eq!(values(&root.children()[0]), vec![1, 2]);
        assert_eq!(values(&root.children()[1]), vec![5, 9]);

        root.borrow_from_right(0)?;
        assert_eq!(values(&root), vec![5]);
        assert_eq!(values(&root.children()[0]), vec![1, 2, 3]);
        assert_eq!(values(&root.children()[1]), vec![9]);
        Ok(())
    }

    #[test]
    fn test_fill_child_prefers_left_then_merges() -> Result<()> {
        let t = Degree::new(2)?;
        let mut root = parent(
            t,
            &[10, 20],
            vec![leaf(t, &[1, 2])?, leaf(t, &[15])?, leaf(t, &[25])?],
        )?;

        assert_eq!(root.fill_child(1)?, 1);
        assert_eq!(values(&root), vec![2, 20]);
        assert_eq!(values(&root.children()[1]), vec![10, 15]);

        // Child 1 has a spare entry again and lends it to child 2.
        assert_eq!(root.fill_child(2)?, 2);
        assert_eq!(values(&root), vec![2, 15]);
        assert_eq!(values(&root.children()[2]), vec![20, 25]);
        Ok(())
    }

    #[test]
    fn test_fill_child_merges_when_siblings_are_minimal() -> Result<()> {
        let t = Degree::new(2)?;
        let mut root = parent(
            t,
            &[10, 20],
            vec![leaf(t, &[5])?, leaf(t, &[15])?, leaf(t, &[25])?],
        )?;

        assert_eq!(root.fill_child(2)?, 1);
        assert_eq!(values(&root), vec![10]);
        assert_eq!(values(&root.children()[1]), vec![15, 20, 25]);

        // No left sibling: the merged right sibling lends instead.
        assert_eq!(root.fill_child(0)?, 0);
        assert_eq!(values(&root), vec![15]);
        assert_eq!(values(&root.children()[0]), vec![5, 10]);
        assert_eq!(values(&root.children()[1]), vec![20, 25]);
        Ok(())
    }
}
