//! Error types for the background runtime

use core::fmt;

/// The supervisor could not be started.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SpawnError {
    /// The platform refused to create the worker (out of memory, invalid
    /// stack size, no such execution unit).
    Rejected,
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::Rejected => f.write_str("failed to spawn supervisor task"),
        }
    }
}

impl std::error::Error for SpawnError {}

#[cfg(feature = "defmt")]
impl defmt::Format for SpawnError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            SpawnError::Rejected => defmt::write!(f, "Rejected"),
        }
    }
}
