//! Minimum degree type.

use std::fmt;

use crate::error::{Result, TreeError};
use crate::types::MINIMUM_DEGREE;

/// Validated minimum degree `t` of a B-tree.
///
/// Every non-root block holds between `t - 1` and `2t - 1` entries, and an
/// internal block has one more child than it has entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Degree(usize);

impl Degree {
    /// Create a degree, rejecting values below [`MINIMUM_DEGREE`] and values
    /// whose child count `2t` does not fit in a `usize`
    pub fn new(t: usize) -> Result<Self> {
        if t < MINIMUM_DEGREE || t.checked_mul(2).is_none() {
            return Err(TreeError::InvalidDegree {
                degree: t,
                minimum: MINIMUM_DEGREE,
            });
        }
        Ok(Self(t))
    }

    /// Get the raw degree value
    pub const fn value(self) -> usize {
        self.0
    }

    /// Fewest entries a non-root block may hold
    pub const fn min_entries(self) -> usize {
        self.0 - 1
    }

    /// Most entries any block may hold
    pub const fn max_entries(self) -> usize {
        2 * self.0 - 1
    }

    /// Most children an internal block may hold
    pub const fn max_children(self) -> usize {
        2 * self.0
    }

    /// Index of the entry promoted when a full block splits
    pub const fn median(self) -> usize {
        self.0 - 1
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for Degree {
    type Error = TreeError;

    fn try_from(t: usize) -> Result<Self> {
        Self::new(t)
    }
}

impl From<Degree> for usize {
    fn from(degree: Degree) -> Self {
        degree.0
    }
}
