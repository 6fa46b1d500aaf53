//! Common types used throughout the engine.

mod degree;

pub use degree::Degree;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Smallest minimum degree a tree can be built with (a 2-3-4 tree)
pub const MINIMUM_DEGREE: usize = 2;

/// Minimum degree used when none is configured
pub const DEFAULT_DEGREE: usize = 3;

/// What `add` does when an equal key is already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DuplicatePolicy {
    /// Insert after the existing equal entries
    #[default]
    Allow,
    /// Fail with [`crate::TreeError::DuplicateKey`]
    Reject,
}

/// Tree configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeConfig {
    /// Minimum degree `t`
    pub degree: usize,
    /// Duplicate key handling
    pub duplicates: DuplicatePolicy,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            degree: DEFAULT_DEGREE,
            duplicates: DuplicatePolicy::Allow,
        }
    }
}

impl TreeConfig {
    /// Create a config with the given degree and default policy
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            ..Self::default()
        }
    }

    /// Set the duplicate policy
    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Parse a config from camelCase JSON, e.g. `{"degree": 4, "duplicates": "reject"}`
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validated_degree()?;
        Ok(config)
    }

    /// Validate and return the configured degree
    pub fn validated_degree(&self) -> Result<Degree> {
        Degree::new(self.degree)
    }
}

/// Traversal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TraverseMethod {
    /// Breadth first, one level at a time
    LevelOrder,
    /// Block before its children
    PreOrder,
    /// Children interleaved with entries, yielding sorted order
    #[default]
    InOrder,
    /// Children before their block
    PostOrder,
}

/// Direction of traversal inside each block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Left to right (ascending for in-order)
    #[default]
    Forward,
    /// Right to left (descending for in-order)
    Backward,
}

impl Direction {
    /// Check if this direction is right to left
    pub fn is_backward(self) -> bool {
        matches!(self, Self::Backward)
    }
}
