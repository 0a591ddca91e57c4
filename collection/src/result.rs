//! Mutation result types.

/// Outcome of a mutation the collection accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Committed without touching any other member.
    Accepted,
    /// Committed after resetting the tracked property of the member now at
    /// `index` to the policy's default value.
    AutoCorrected { index: usize },
}

impl MutationOutcome {
    /// Whether another member was reset.
    pub fn is_auto_corrected(&self) -> bool {
        matches!(self, MutationOutcome::AutoCorrected { .. })
    }

    /// Position of the reset member, if any.
    pub fn corrected_index(&self) -> Option<usize> {
        match self {
            MutationOutcome::AutoCorrected { index } => Some(*index),
            MutationOutcome::Accepted => None,
        }
    }
}
