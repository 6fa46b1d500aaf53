//! Typed facades over the generic tree.
//!
//! - **Multiset** (`BTreeMultiset`): sorted values, duplicates kept in
//!   arrival order
//! - **Map** (`BTreeMap`): sorted key-to-value pairs ordered by key

mod map;
mod multiset;

pub use map::BTreeMap;
pub use multiset::BTreeMultiset;
