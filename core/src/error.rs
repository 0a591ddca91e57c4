//! Property accessor resolution errors.

use thiserror::Error;

/// Errors raised while binding a property by name.
///
/// These are construction-time failures: a collection whose binding does not
/// resolve is never created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyAccessError {
    /// The name is not a valid property identifier.
    #[error("Invalid property name: '{name}'")]
    InvalidName { name: String },

    /// The item type has no tracked property with this name.
    #[error("Unknown property '{property}' on type {type_name}")]
    UnknownProperty { type_name: String, property: String },

    /// The property exists but its value type is not the requested one.
    #[error("Type mismatch for property '{property}' on type {type_name}: expected {expected}")]
    TypeMismatch {
        type_name: String,
        property: String,
        expected: String,
    },

    /// The identifier pattern failed to compile.
    #[error("Pattern error: {message}")]
    Pattern { message: String },
}

impl PropertyAccessError {
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }

    pub fn unknown_property(type_name: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            type_name: type_name.into(),
            property: property.into(),
        }
    }

    pub fn type_mismatch(
        type_name: impl Into<String>,
        property: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            type_name: type_name.into(),
            property: property.into(),
            expected: expected.into(),
        }
    }

    pub fn pattern(message: impl Into<String>) -> Self {
        Self::Pattern {
            message: message.into(),
        }
    }
}

/// Result type for accessor resolution.
pub type AccessResult<T> = Result<T, PropertyAccessError>;
