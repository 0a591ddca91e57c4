//! Collection error types.

use thiserror::Error;
use warden_constraint::ConstraintViolation;
use warden_core::PropertyAccessError;

/// Result type for collection operations.
pub type CollectionResult<R, T> = Result<R, CollectionError<T>>;

/// Errors returned by collection construction and mutation.
#[derive(Debug, Error)]
pub enum CollectionError<T> {
    /// The tracked property could not be bound.
    #[error("Property access error: {0}")]
    PropertyAccess(#[from] PropertyAccessError),

    /// The mutation would break the collection's constraint.
    #[error(transparent)]
    Violation(#[from] ConstraintViolation<T>),

    #[error("Index out of bounds: {index} (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The same item instance is already contained.
    #[error("Item is already contained at index {index}")]
    DuplicateItem { index: usize },
}

impl<T> CollectionError<T> {
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    pub fn duplicate_item(index: usize) -> Self {
        Self::DuplicateItem { index }
    }

    /// The violation, if this error is a constraint rejection.
    pub fn violation(&self) -> Option<&ConstraintViolation<T>> {
        match self {
            CollectionError::Violation(v) => Some(v),
            _ => None,
        }
    }

    /// True when the mutation was refused by the constraint.
    pub fn is_violation(&self) -> bool {
        matches!(self, CollectionError::Violation(_))
    }
}
