//! The policy a collection enforces on its tracked property.

use warden_core::PropertyBinding;

use crate::single::SingleValuePolicy;
use crate::unique::UniqueValuePolicy;
use crate::violation::{Conflict, ConstraintKind};

/// Outcome of a successful check.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict<P> {
    /// The candidate is accepted as is.
    Accept,
    /// The candidate is accepted once the member at `index` is set to `value`.
    Reset { index: usize, value: P },
}

/// A constraint enforced on one tracked property.
///
/// Policies only decide; the collection commits the structural change and
/// any reset a [`Verdict::Reset`] asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintPolicy<P> {
    /// At most one member holds a protected value.
    SingleValue(SingleValuePolicy<P>),
    /// Values are pairwise distinct.
    UniqueValue(UniqueValuePolicy),
}

impl<P> ConstraintPolicy<P> {
    /// The invariant this policy enforces.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            ConstraintPolicy::SingleValue(_) => ConstraintKind::SingleValue,
            ConstraintPolicy::UniqueValue(_) => ConstraintKind::UniqueValue,
        }
    }
}

impl<P: PartialEq + Clone> ConstraintPolicy<P> {
    /// Single-value policy with the default conflict handler.
    pub fn single_value(single_value: P, default_value: P) -> Self {
        Self::SingleValue(SingleValuePolicy::new(single_value, default_value))
    }

    /// Unique-value policy.
    pub fn unique() -> Self {
        Self::UniqueValue(UniqueValuePolicy::new())
    }

    /// Check `candidate` against `members` (in collection order).
    pub fn check<'a, T: 'a>(
        &self,
        binding: &PropertyBinding<T, P>,
        candidate: &T,
        members: impl IntoIterator<Item = (usize, &'a T)>,
    ) -> Result<Verdict<P>, Conflict> {
        match self {
            ConstraintPolicy::SingleValue(policy) => policy.check(binding, candidate, members),
            ConstraintPolicy::UniqueValue(policy) => policy.check(binding, candidate, members),
        }
    }

    /// Report every member currently breaking the invariant as
    /// `(offender index, conflict)`.
    pub fn audit<'a, T: 'a>(
        &self,
        binding: &PropertyBinding<T, P>,
        members: impl IntoIterator<Item = (usize, &'a T)>,
    ) -> Vec<(usize, Conflict)> {
        match self {
            ConstraintPolicy::SingleValue(policy) => policy.audit(binding, members),
            ConstraintPolicy::UniqueValue(policy) => policy.audit(binding, members),
        }
    }
}

impl<P> From<SingleValuePolicy<P>> for ConstraintPolicy<P> {
    fn from(policy: SingleValuePolicy<P>) -> Self {
        Self::SingleValue(policy)
    }
}

impl<P> From<UniqueValuePolicy> for ConstraintPolicy<P> {
    fn from(policy: UniqueValuePolicy) -> Self {
        Self::UniqueValue(policy)
    }
}
