//! Error types for writer operations

use crate::registry::TypeTag;
use thiserror::Error;

/// Error type for writer operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("capacity exceeded: {0} > {1}")]
    CapacityExceeded(usize, usize), // requested, max
    #[error("cursor out of range: {0} > {1}")]
    CursorOutOfRange(usize, usize), // position, size
    #[error("unsupported type: {0}")]
    UnsupportedType(TypeTag),
}
