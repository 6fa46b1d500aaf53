//! B-tree implementation.
//!
//! This module provides the generic in-memory B-tree that supports:
//! - Insertions with preemptive splits (add)
//! - Point lookups (find, contains)
//! - Deletions with borrow/merge rebalancing (remove)
//! - Traversal in level, pre, in and post order, both directions
//! - Structural validation and export

mod cursor;
mod export;
mod iter;
mod tree;
mod validate;

pub use cursor::{Cursor, Granularity};
pub use export::{BlockSnapshot, TreeStats};
pub use iter::{Blocks, Traverse};
pub use tree::BTree;
