//! Error types for the spatial index
//!
//! Indexed access is the only runtime failure. Configuration errors are
//! reported once, at construction.

use std::fmt;

/// Result type for index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Spatial index errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Insertion-order position is not less than the item count
    IndexOutOfRange {
        /// Requested position
        index: usize,
        /// Item count at the time of the request
        count: usize,
    },

    /// Invalid index configuration (smoothing factor, etc.)
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IndexOutOfRange { index, count } => {
                write!(f, "Index out of range: {} (count is {})", index, count)
            }
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
