//! Source locations for configuration values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a value in the document it was declared in.
///
/// Lines and columns are 1-based, matching what editors display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File or source identifier
    pub file: String,

    /// Line number (1-based)
    pub line: usize,

    /// Column number (1-based, in characters not bytes)
    pub column: usize,
}

impl Location {
    /// Create a new location.
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
