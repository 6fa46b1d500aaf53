//! Error types for the B-tree engine.

use thiserror::Error;

/// Result type alias for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors that can occur in the B-tree engine
///
/// Every variant is a usage or contract error. Nothing here is transient, so
/// callers should never retry an operation that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Minimum degree below the supported minimum
    #[error("Invalid degree {degree}: must be at least {minimum}")]
    InvalidDegree { degree: usize, minimum: usize },

    /// Insert attempted on a block that is already full
    #[error("Block capacity exceeded: a block holds at most {capacity} entries")]
    CapacityExceeded { capacity: usize },

    /// Index outside the valid range of a block
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The tree was modified after a cursor was created
    #[error("Tree was modified during iteration (expected version {expected}, found {actual})")]
    VersionChanged { expected: u64, actual: u64 },

    /// An equal key is already stored and duplicates are rejected
    #[error("Duplicate key")]
    DuplicateKey,

    /// Malformed configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A structural invariant does not hold
    #[error("Corruption detected: {0}")]
    Corruption(String),
}

impl TreeError {
    /// Create a corruption error with a message
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<serde_json::Error> for TreeError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}
