//! Error types for the engine harness.

use std::fmt;

use crate::shm::ShmError;

/// Fatal conditions while bootstrapping or running the harness. The engine
/// refuses to start on any of these.
#[derive(Debug)]
#[non_exhaustive]
pub enum HarnessError {
    /// A shared-memory region could not be created or removed.
    Shm(ShmError),

    /// A publisher thread could not be spawned.
    ThreadSpawn {
        /// The thread's intended name.
        name: String,
        /// The underlying OS error message.
        message: String,
    },
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::Shm(err) => write!(f, "shared memory setup failed: {err}"),
            HarnessError::ThreadSpawn { name, message } => {
                write!(f, "failed to spawn {name} thread: {message}")
            }
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HarnessError::Shm(err) => Some(err),
            HarnessError::ThreadSpawn { .. } => None,
        }
    }
}

impl From<ShmError> for HarnessError {
    fn from(err: ShmError) -> Self {
        HarnessError::Shm(err)
    }
}
