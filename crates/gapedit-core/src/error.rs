//! Error kinds surfaced by the editing core.
//!
//! Two families live here. Boundary errors (`OutOfRange`, `InvalidMerge`,
//! `InvalidDescend`) are rejected locally and never leave the document in a
//! different state; the cursor layer turns them into no-ops. Allocation
//! failures propagate to the caller, which can retry or drop the edit.

use std::collections::TryReserveError;

use thiserror::Error;

/// Result alias used across the core crate.
pub type Result<T> = std::result::Result<T, EditError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// An offset fell outside the valid range for the operation. For
    /// inserts the range is `0..=len`, for deletes `0..len`.
    #[error("offset {offset} out of range for line of length {len}")]
    OutOfRange { offset: usize, len: usize },

    /// Storage growth failed. The buffer that attempted the growth is left
    /// exactly as it was before the call.
    #[error("failed to grow line storage to {requested} bytes")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    /// Backspace at column 0 of the first line.
    #[error("no previous line to merge into")]
    InvalidMerge,

    /// Move down from the last line.
    #[error("no next line to descend into")]
    InvalidDescend,
}

impl EditError {
    /// True for errors raised at a structural boundary. These are absorbed
    /// as no-ops by navigation and editing commands.
    #[inline]
    #[must_use]
    pub const fn is_boundary(&self) -> bool {
        !matches!(self, Self::Allocation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocation_error() -> EditError {
        let source = Vec::<u8>::new().try_reserve_exact(usize::MAX).unwrap_err();
        EditError::Allocation {
            requested: usize::MAX,
            source,
        }
    }

    #[test]
    fn boundary_classification() {
        assert!(EditError::OutOfRange { offset: 3, len: 2 }.is_boundary());
        assert!(EditError::InvalidMerge.is_boundary());
        assert!(EditError::InvalidDescend.is_boundary());
        assert!(!allocation_error().is_boundary());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            EditError::OutOfRange { offset: 5, len: 5 }.to_string(),
            "offset 5 out of range for line of length 5"
        );
        assert_eq!(
            EditError::InvalidMerge.to_string(),
            "no previous line to merge into"
        );
    }

    #[test]
    fn allocation_keeps_source() {
        use std::error::Error as _;
        assert!(allocation_error().source().is_some());
    }
}
