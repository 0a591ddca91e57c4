//! Constraint violation types.

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// Which invariant a conflict breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// At most one member may hold the protected value.
    SingleValue,
    /// No two members may share a value.
    UniqueValue,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::SingleValue => write!(f, "single-value"),
            ConstraintKind::UniqueValue => write!(f, "unique-value"),
        }
    }
}

/// A conflict found by a policy, before it is attached to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    /// The invariant that would be broken.
    pub kind: ConstraintKind,
    /// Position of the member the candidate conflicts with.
    pub index: usize,
}

impl Conflict {
    pub fn single_value(index: usize) -> Self {
        Self {
            kind: ConstraintKind::SingleValue,
            index,
        }
    }

    pub fn unique_value(index: usize) -> Self {
        Self {
            kind: ConstraintKind::UniqueValue,
            index,
        }
    }

    /// Attach the offending item and the property name.
    pub fn into_violation<T>(self, item: Rc<T>, property: impl Into<String>) -> ConstraintViolation<T> {
        let property = property.into();
        match self.kind {
            ConstraintKind::SingleValue => ConstraintViolation::SingleValueConflict {
                item,
                property,
                conflicting_index: self.index,
            },
            ConstraintKind::UniqueValue => ConstraintViolation::UniqueValueConflict {
                item,
                property,
                conflicting_index: self.index,
            },
        }
    }
}

/// A rejected mutation.
///
/// Carries the item that was refused (or, for an in-place edit, the item
/// whose edit broke the invariant) so callers can inspect or revert it.
#[derive(Debug, Error)]
pub enum ConstraintViolation<T> {
    /// A second item would hold the protected single value.
    #[error("Another item in the collection has the same `{property}` value.")]
    SingleValueConflict {
        item: Rc<T>,
        property: String,
        conflicting_index: usize,
    },

    /// Two items would share the same tracked value.
    #[error("More than one items in the collection has the same `{property}` value.")]
    UniqueValueConflict {
        item: Rc<T>,
        property: String,
        conflicting_index: usize,
    },
}

impl<T> ConstraintViolation<T> {
    /// The invariant that was broken.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            ConstraintViolation::SingleValueConflict { .. } => ConstraintKind::SingleValue,
            ConstraintViolation::UniqueValueConflict { .. } => ConstraintKind::UniqueValue,
        }
    }

    /// The offending item.
    pub fn item(&self) -> &Rc<T> {
        match self {
            ConstraintViolation::SingleValueConflict { item, .. }
            | ConstraintViolation::UniqueValueConflict { item, .. } => item,
        }
    }

    /// Name of the tracked property.
    pub fn property(&self) -> &str {
        match self {
            ConstraintViolation::SingleValueConflict { property, .. }
            | ConstraintViolation::UniqueValueConflict { property, .. } => property,
        }
    }

    /// Position of the member the offending item conflicts with.
    pub fn conflicting_index(&self) -> usize {
        match self {
            ConstraintViolation::SingleValueConflict {
                conflicting_index, ..
            }
            | ConstraintViolation::UniqueValueConflict {
                conflicting_index, ..
            } => *conflicting_index,
        }
    }
}

// Manual Clone: `Rc<T>` is cloneable for any `T`.
impl<T> Clone for ConstraintViolation<T> {
    fn clone(&self) -> Self {
        Conflict {
            kind: self.kind(),
            index: self.conflicting_index(),
        }
        .into_violation(Rc::clone(self.item()), self.property())
    }
}
