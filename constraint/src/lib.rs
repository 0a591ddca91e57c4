//! Warden Constraint
//!
//! Decide whether a proposed item may join (or stay in) a collection.
//!
//! Responsibilities:
//! - Check a candidate's tracked value against the current members
//! - Decide accept, auto-correct (reset another member), or reject
//! - Audit a whole collection for members breaking the invariant
//! - Produce violations carrying the offending item

mod policy;
mod single;
mod unique;
mod violation;

pub use policy::{ConstraintPolicy, Verdict};
pub use single::{ConflictHandler, SingleValuePolicy};
pub use unique::UniqueValuePolicy;
pub use violation::{Conflict, ConstraintKind, ConstraintViolation};
