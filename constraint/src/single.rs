//! Single-value constraint: at most one member holds a protected value.

use std::ptr;

use warden_core::PropertyBinding;

use crate::policy::Verdict;
use crate::violation::Conflict;

/// What to do when a second item would hold the protected value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConflictHandler {
    /// Reset the existing holder to the default value and accept the candidate.
    #[default]
    ResetOthersToDefault,
    /// Reject the candidate.
    ThrowOnConflict,
}

/// Permits at most one member whose tracked value equals `single_value`.
///
/// Under [`ConflictHandler::ResetOthersToDefault`] only the first other
/// holder found in collection order is reset. If the collection already held
/// two holders before the check (an edit that bypassed the collection), the
/// second one is left as is; [`SingleValuePolicy::audit`] reports it.
///
/// Choosing `default_value == single_value` makes resets ineffective.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleValuePolicy<P> {
    single_value: P,
    default_value: P,
    handler: ConflictHandler,
}

impl<P: PartialEq + Clone> SingleValuePolicy<P> {
    /// Create a policy with the default handler.
    pub fn new(single_value: P, default_value: P) -> Self {
        Self {
            single_value,
            default_value,
            handler: ConflictHandler::default(),
        }
    }

    /// Set the conflict handler.
    pub fn with_handler(mut self, handler: ConflictHandler) -> Self {
        self.handler = handler;
        self
    }

    pub fn single_value(&self) -> &P {
        &self.single_value
    }

    pub fn default_value(&self) -> &P {
        &self.default_value
    }

    pub fn handler(&self) -> ConflictHandler {
        self.handler
    }

    /// Check `candidate` against `members`.
    ///
    /// `members` yields `(index, item)` in collection order; the candidate
    /// itself is skipped by identity.
    pub fn check<'a, T: 'a>(
        &self,
        binding: &PropertyBinding<T, P>,
        candidate: &T,
        members: impl IntoIterator<Item = (usize, &'a T)>,
    ) -> Result<Verdict<P>, Conflict> {
        if binding.get(candidate) != self.single_value {
            return Ok(Verdict::Accept);
        }

        let holder = members
            .into_iter()
            .filter(|(_, member)| !ptr::eq(*member, candidate))
            .find(|(_, member)| binding.get(member) == self.single_value);

        match (holder, self.handler) {
            (None, _) => Ok(Verdict::Accept),
            (Some((index, _)), ConflictHandler::ResetOthersToDefault) => Ok(Verdict::Reset {
                index,
                value: self.default_value.clone(),
            }),
            (Some((index, _)), ConflictHandler::ThrowOnConflict) => Err(Conflict::single_value(index)),
        }
    }

    /// Every holder of the protected value after the first, paired with the
    /// conflict against that first holder.
    pub fn audit<'a, T: 'a>(
        &self,
        binding: &PropertyBinding<T, P>,
        members: impl IntoIterator<Item = (usize, &'a T)>,
    ) -> Vec<(usize, Conflict)> {
        let mut holders = members
            .into_iter()
            .filter(|(_, member)| binding.get(member) == self.single_value)
            .map(|(index, _)| index);

        match holders.next() {
            Some(first) => holders
                .map(|index| (index, Conflict::single_value(first)))
                .collect(),
            None => Vec::new(),
        }
    }
}
