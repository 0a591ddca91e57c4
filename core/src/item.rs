//! The capability an item needs to live in a constrained collection.

use crate::{Notifier, PropertyChanged};

/// An item that reports in-place changes of its properties.
///
/// Implementors own a `Notifier<PropertyChanged>` and call
/// [`Notifier::notify`] from each setter after the stored value actually
/// changed. Setting a value equal to the current one should not notify.
pub trait NotifyPropertyChanged {
    /// The notifier collections subscribe to.
    fn property_changed(&self) -> &Notifier<PropertyChanged>;
}
