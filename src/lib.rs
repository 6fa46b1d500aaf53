//! # BTree Engine
//!
//! A generic, in-memory B-tree engine with set-mode and map-mode facades.
//!
//! ## Architecture
//!
//! The engine is composed of small layers, leaves first:
//!
//! - **Comparers** (`compare`): injected total orders over keys
//! - **Block Layer** (`block`): bounded sorted blocks plus split/borrow/merge
//! - **B-Tree Layer** (`btree`): insertion, lookup, deletion, traversal and
//!   version-checked cursors
//! - **Facades** (`collections`): `BTreeMultiset` and `BTreeMap`
//! - **Lock Adapter** (`sync`): one coarse reader/writer lock shared by clones
//!
//! ## Usage
//!
//! ```rust
//! use btree_engine::{BTreeMap, Direction, TraverseMethod};
//!
//! let mut map = BTreeMap::new(2)?;
//! map.insert("b", 1)?;
//! map.insert("a", 2)?;
//! map.insert("c", 3)?;
//! assert_eq!(map.get(&"a"), Some(&2));
//!
//! // Walk the stored pairs from the largest key down
//! let mut keys = Vec::new();
//! map.iterate(TraverseMethod::InOrder, Direction::Backward, |k, _| keys.push(*k));
//! assert_eq!(keys, ["c", "b", "a"]);
//!
//! assert_eq!(map.remove(&"a")?, Some(2));
//! # Ok::<(), btree_engine::TreeError>(())
//! ```

pub mod block;
pub mod btree;
pub mod collections;
pub mod compare;
pub mod error;
pub mod sync;
pub mod types;

pub use error::{Result, TreeError};
pub use types::{
    Degree, Direction, DuplicatePolicy, TraverseMethod, TreeConfig, DEFAULT_DEGREE, MINIMUM_DEGREE,
};

// Re-export main public API
pub use block::{Block, MapEntry, SetEntry, TreeEntry};
pub use btree::{BTree, BlockSnapshot, Blocks, Cursor, Granularity, Traverse, TreeStats};
pub use collections::{BTreeMap, BTreeMultiset};
pub use compare::{Comparer, FnComparer, NaturalOrder, ReverseOrder};
pub use sync::{SyncCursor, Synchronized};

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn values(tree: &BTree<SetEntry<i32>>) -> Vec<i32> {
        tree.iter().map(|e| *e.value()).collect()
    }

    #[test]
    fn test_first_proactive_split() -> Result<()> {
        let mut tree = BTree::new(2)?;
        for (i, v) in [10, 20, 5, 6, 12, 30, 7, 17].into_iter().enumerate() {
            tree.add(SetEntry::new(v))?;
            if i == 4 {
                assert_eq!(tree.root().map(Block::len), Some(1));
            }
        }
        assert_eq!(values(&tree), vec![5, 6, 7, 10, 12, 17, 20, 30]);
        Ok(())
    }

    #[test]
    fn test_remove_ascending_prefix() -> Result<()> {
        let mut tree = BTree::new(2)?;
        for v in 1..=7 {
            tree.add(SetEntry::new(v))?;
        }
        for v in 1..=4 {
            assert!(tree.remove(&v)?.is_some());
            tree.validate()?;
            assert_eq!(values(&tree), ((v + 1)..=7).collect::<Vec<_>>());
        }
        Ok(())
    }

    #[test]
    fn test_level_order_depths_on_height_three() -> Result<()> {
        let mut tree = BTree::new(2)?;
        let mut v = 0;
        while tree.height() < 3 {
            tree.add(SetEntry::new(v))?;
            v += 1;
        }
        let mut blocks = tree.blocks(TraverseMethod::LevelOrder, Direction::Forward);
        let mut depths = Vec::new();
        while blocks.next().is_some() {
            depths.extend(blocks.depth());
        }
        assert_eq!(depths.last(), Some(&2));
        assert!(depths.windows(2).all(|w| w[0] <= w[1]));
        Ok(())
    }

    #[test]
    fn test_height_changes_only_at_root() -> Result<()> {
        let mut tree = BTree::new(2)?;
        let mut height = tree.height();
        for v in 0..64 {
            let root_full = tree.root().is_some_and(Block::is_full);
            tree.add(SetEntry::new(v))?;
            assert_eq!(tree.height(), height + usize::from(root_full));
            height = tree.height();
        }
        for v in 0..64 {
            tree.remove(&v)?;
            assert!(tree.height() <= height);
            height = tree.height();
        }
        assert_eq!(height, 1);
        Ok(())
    }

    #[test]
    fn test_randomized_workload_stays_valid() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for degree in [2, 3, 5] {
            let mut tree = BTree::new(degree)?;
            let mut model: Vec<i32> = Vec::new();

            for _ in 0..2000 {
                let v = rng.gen_range(0..300);
                if rng.gen_bool(0.6) {
                    tree.add(SetEntry::new(v))?;
                    let at = model.partition_point(|&m| m <= v);
                    model.insert(at, v);
                } else {
                    let removed = tree.remove(&v)?.is_some();
                    let found = model.iter().position(|&m| m == v);
                    assert_eq!(removed, found.is_some());
                    if let Some(at) = found {
                        model.remove(at);
                    }
                }
            }

            tree.validate()?;
            assert_eq!(tree.len(), model.len());
            assert_eq!(values(&tree), model);
            let mut backward: Vec<i32> = tree
                .traverse(TraverseMethod::InOrder, Direction::Backward)
                .map(|e| *e.value())
                .collect();
            backward.reverse();
            assert_eq!(backward, model);
        }
        Ok(())
    }

    #[test]
    fn test_config_from_json() -> Result<()> {
        let config = TreeConfig::from_json(r#"{"degree": 4, "duplicates": "reject"}"#)?;
        let mut set = BTreeMultiset::with_config(&config, NaturalOrder)?;
        set.add(1)?;
        assert_eq!(set.add(1), Err(TreeError::DuplicateKey));
        assert_eq!(set.degree().value(), 4);
        Ok(())
    }
}
