//! CollectionBuilder for constructing a seeded collection.

use std::rc::Rc;

use tracing::debug;
use warden_constraint::ConstraintPolicy;
use warden_core::{AccessResult, NotifyPropertyChanged, PropertyBinding};

use crate::collection::ConstrainedCollection;
use crate::error::CollectionResult;

/// Builder for a [`ConstrainedCollection`].
///
/// The property binding is resolved when the builder is created, but a
/// resolution failure is only reported by [`CollectionBuilder::build`].
/// Seed items are added in order through the normal insert path, so seeding
/// is subject to the same checks and auto-corrections as later inserts.
#[derive(Debug)]
pub struct CollectionBuilder<T, P> {
    /// Resolved binding, or why it failed.
    binding: AccessResult<PropertyBinding<T, P>>,
    /// Constraint to enforce.
    policy: ConstraintPolicy<P>,
    /// Items to add after construction.
    seed: Vec<Rc<T>>,
}

impl<T, P> CollectionBuilder<T, P>
where
    T: NotifyPropertyChanged + 'static,
    P: PartialEq + Clone + 'static,
{
    /// Create a builder from a binding result and a policy.
    pub fn new(
        binding: AccessResult<PropertyBinding<T, P>>,
        policy: impl Into<ConstraintPolicy<P>>,
    ) -> Self {
        Self {
            binding,
            policy: policy.into(),
            seed: Vec::new(),
        }
    }

    /// Append one seed item.
    pub fn item(mut self, item: Rc<T>) -> Self {
        self.seed.push(item);
        self
    }

    /// Append seed items.
    pub fn items(mut self, items: impl IntoIterator<Item = Rc<T>>) -> Self {
        self.seed.extend(items);
        self
    }

    /// Build the collection and add the seed items.
    ///
    /// The first seed item the constraint rejects aborts the build.
    pub fn build(self) -> CollectionResult<ConstrainedCollection<T, P>, T> {
        let binding = self.binding?;
        let collection = ConstrainedCollection::from_parts(binding, self.policy);

        for item in self.seed {
            collection.push(item)?;
        }

        debug!(
            property = %collection.property_name(),
            policy = %collection.policy().kind(),
            len = collection.len(),
            "built constrained collection"
        );

        Ok(collection)
    }
}
