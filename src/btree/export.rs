//! Structure export for visualization and statistics.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::btree::BTree;
use crate::types::{Direction, TraverseMethod};

/// Block snapshot for visualization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSnapshot {
    /// Distance from the root
    pub depth: usize,
    /// Whether this is a leaf block
    pub is_leaf: bool,
    /// Entries in this block, rendered with `Display`
    pub entries: Vec<String>,
    /// Child blocks (only for internal blocks)
    pub children: Vec<BlockSnapshot>,
}

/// Tree statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    /// Number of stored entries
    pub count: usize,
    /// Height of the tree
    pub height: usize,
    /// Minimum degree
    pub degree: usize,
    /// Number of allocated blocks
    pub blocks: usize,
}

impl<E, C> BTree<E, C> {
    /// Export the tree structure for visualization
    pub fn export(&self) -> Option<BlockSnapshot>
    where
        E: Display,
    {
        self.root().map(|root| snapshot(root, 0))
    }

    /// Get statistics about the tree
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            count: self.len(),
            height: self.height(),
            degree: self.degree().value(),
            blocks: self
                .blocks(TraverseMethod::PreOrder, Direction::Forward)
                .count(),
        }
    }
}

fn snapshot<E: Display>(block: &Block<E>, depth: usize) -> BlockSnapshot {
    BlockSnapshot {
        depth,
        is_leaf: block.is_leaf(),
        entries: block.iter().map(ToString::to_string).collect(),
        children: block
            .children()
            .iter()
            .map(|child| snapshot(child, depth + 1))
            .collect(),
    }
}
