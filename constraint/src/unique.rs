//! Unique-value constraint: no two members share a tracked value.

use std::ptr;

use warden_core::PropertyBinding;

use crate::policy::Verdict;
use crate::violation::Conflict;

/// Requires tracked values to be pairwise distinct. Never auto-corrects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniqueValuePolicy;

impl UniqueValuePolicy {
    pub fn new() -> Self {
        Self
    }

    /// Check `candidate` against `members`; the first equal member rejects.
    ///
    /// The candidate itself is skipped by identity, so a member re-validated
    /// after an in-place edit never conflicts with itself.
    pub fn check<'a, T: 'a, P: PartialEq>(
        &self,
        binding: &PropertyBinding<T, P>,
        candidate: &T,
        members: impl IntoIterator<Item = (usize, &'a T)>,
    ) -> Result<Verdict<P>, Conflict> {
        let value = binding.get(candidate);

        for (index, member) in members {
            if ptr::eq(member, candidate) {
                continue;
            }
            if binding.get(member) == value {
                return Err(Conflict::unique_value(index));
            }
        }

        Ok(Verdict::Accept)
    }

    /// Every member whose value equals the value of an earlier member, paired
    /// with the conflict against the first member holding that value.
    pub fn audit<'a, T: 'a, P: PartialEq>(
        &self,
        binding: &PropertyBinding<T, P>,
        members: impl IntoIterator<Item = (usize, &'a T)>,
    ) -> Vec<(usize, Conflict)> {
        let mut seen: Vec<(usize, P)> = Vec::new();
        let mut conflicts = Vec::new();

        for (index, member) in members {
            let value = binding.get(member);
            match seen.iter().find(|(_, earlier)| *earlier == value) {
                Some((first, _)) => conflicts.push((index, Conflict::unique_value(*first))),
                None => seen.push((index, value)),
            }
        }

        conflicts
    }
}
