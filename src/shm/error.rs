//! Error types for the shared-memory channel set.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while creating, opening or removing shared-memory
/// regions.
#[derive(Debug)]
#[non_exhaustive]
pub enum ShmError {
    /// An I/O error occurred while creating, sizing or mapping a region.
    Io {
        /// The underlying I/O error message.
        message: String,
        /// The backing file path involved, if known.
        path: Option<PathBuf>,
    },

    /// The region name is not a valid POSIX shared-memory name (it must be
    /// a leading slash followed by a non-empty, slash-free identifier).
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// An existing region is smaller than the mapped type requires.
    SizeMismatch {
        /// The region name.
        name: String,
        /// Bytes the mapped type requires.
        expected: usize,
        /// Bytes the backing file actually has.
        actual: usize,
    },
}

impl fmt::Display for ShmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShmError::Io { message, path } => {
                if let Some(p) = path {
                    write!(f, "shared memory I/O error at {}: {message}", p.display())
                } else {
                    write!(f, "shared memory I/O error: {message}")
                }
            }
            ShmError::InvalidName { name } => {
                write!(f, "invalid shared memory name: {name:?}")
            }
            ShmError::SizeMismatch {
                name,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "shared memory region {name} too small: need {expected} bytes, found {actual}"
                )
            }
        }
    }
}

impl std::error::Error for ShmError {}
