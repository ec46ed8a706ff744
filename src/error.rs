use thiserror::Error;

use crate::object::Generation;

/// Errors reported by the collector. Collection itself never fails; only
/// allocation, handle validation and construction do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GcError {
    /// A generation is still at capacity after the allowed collection cycles ran.
    /// The allocation did not happen.
    #[error("{generation:?} space is out of memory ({capacity} objects)")]
    OutOfMemory {
        generation: Generation,
        capacity: usize,
    },
    /// A missing, reclaimed or foreign object handle was passed in.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GcError {
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, GcError::OutOfMemory { .. })
    }
}

pub type Result<T> = std::result::Result<T, GcError>;
