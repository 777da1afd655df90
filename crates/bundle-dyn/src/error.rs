//! Error types for value access, merging and path parsing.

use crate::{Kind, Path};
use thiserror::Error;

/// Result type alias for bundle-dyn operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when addressing or combining values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A mapping key along the path does not exist.
    ///
    /// Callers usually treat this as "field absent, use a default" rather
    /// than propagating it.
    #[error("key not found at {path}")]
    NoSuchKey {
        /// Path of the missing node
        path: Path,
    },

    /// A sequence index along the path is out of range.
    #[error("index {index} out of bounds at {path} (length {len})")]
    IndexOutOfBounds {
        /// Path of the sequence
        path: Path,
        /// Requested index
        index: usize,
        /// Actual sequence length
        len: usize,
    },

    /// The node at `path` has the wrong kind for the requested operation.
    #[error("expected {expected} at {path}, found {found}")]
    KindMismatch {
        /// Path of the offending node
        path: Path,
        /// Kind the operation needed
        expected: Kind,
        /// Kind actually found
        found: Kind,
    },

    /// Two values of incompatible kinds were merged.
    #[error("cannot merge {left} with {right} at {path}")]
    CannotMerge {
        /// Path where the merge failed
        path: Path,
        /// Kind of the earlier value
        left: Kind,
        /// Kind of the later value
        right: Kind,
    },

    /// An identity key field holds something other than a string.
    #[error("identity key at {path} must be a string, found {found}")]
    InvalidIdentityKey {
        /// Path of the key field
        path: Path,
        /// Kind actually found
        found: Kind,
    },

    /// A path or pattern string could not be parsed.
    #[error("invalid path {input:?}: {message}")]
    InvalidPath {
        /// The input that failed to parse
        input: String,
        /// What was wrong with it
        message: String,
    },
}

impl Error {
    /// Whether this error means "something along the path is absent".
    pub fn is_no_such_key(&self) -> bool {
        matches!(self, Error::NoSuchKey { .. })
    }
}
