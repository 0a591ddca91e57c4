//! Warden Collection
//!
//! An ordered, observable collection that enforces one constraint on one
//! property of its items.
//!
//! Every structural mutation (insert, set, remove, clear) is checked by the
//! configured policy before it is committed. Every contained item is watched,
//! so an in-place edit of the tracked property is checked after the fact and
//! either accepted, auto-corrected, or reported as a violation.

mod builder;
mod collection;
mod error;
mod event;
mod result;

pub use builder::CollectionBuilder;
pub use collection::ConstrainedCollection;
pub use error::{CollectionError, CollectionResult};
pub use event::ItemPropertyChanged;
pub use result::MutationOutcome;
