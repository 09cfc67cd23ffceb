//! Defines [`HeapError`], the error type for heap construction and
//! access operations.

use crate::cell::{ConstRef, HeapRef};
use thiserror::Error;

/// Errors returned by heap operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    /// A structure was requested for a functor whose interned arity
    /// is zero; zero-arity symbols are plain constants, not headers.
    #[error("cannot build a structure from a zero-arity functor: {0:?}")]
    ZeroArityStructure(ConstRef),

    /// The number of supplied arguments does not match the functor's
    /// interned arity.
    #[error("functor declares arity {declared} but {supplied} arguments were supplied")]
    ArityMismatch { declared: usize, supplied: usize },

    /// A handle does not address an allocated heap cell.
    #[error("heap reference out of bounds: {0:?}")]
    InvalidRef(HeapRef),

    /// A traversal-only marker cell was supplied where a storable
    /// cell is required.
    #[error("marker cells cannot be stored in the heap")]
    MarkerCell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            HeapError::ArityMismatch {
                declared: 2,
                supplied: 3
            }
            .to_string(),
            "functor declares arity 2 but 3 arguments were supplied"
        );
        assert_eq!(
            HeapError::InvalidRef(HeapRef::new(7)).to_string(),
            "heap reference out of bounds: HeapRef(7)"
        );
    }
}
