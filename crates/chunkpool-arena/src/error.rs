//! Pool-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur while building or using an arena set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// No arena could satisfy the request, or a backing buffer could not
    /// be reserved at construction.
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
        /// Free bytes in the arena that was considered (or the largest free
        /// count across all arenas when none qualified).
        available: usize,
    },
    /// A pointer handed to `deallocate` does not denote a chunk run issued
    /// by this arena set.
    InvalidPointer {
        /// The offending address.
        address: usize,
    },
    /// The arena layout was rejected before any memory was reserved.
    InvalidLayout {
        /// Description of which constraint was violated.
        reason: String,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                available,
            } => {
                write!(
                    f,
                    "out of memory: requested {requested} bytes, {available} bytes available"
                )
            }
            Self::InvalidPointer { address } => {
                write!(f, "pointer {address:#x} was not issued by this pool")
            }
            Self::InvalidLayout { reason } => {
                write!(f, "invalid arena layout: {reason}")
            }
        }
    }
}

impl Error for PoolError {}
