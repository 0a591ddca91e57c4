//! Events forwarded by the collection.

use std::fmt;
use std::rc::Rc;

/// A contained item changed one of its properties and the collection kept
/// its invariant.
pub struct ItemPropertyChanged<T> {
    item: Rc<T>,
    property: &'static str,
}

impl<T> ItemPropertyChanged<T> {
    pub(crate) fn new(item: Rc<T>, property: &'static str) -> Self {
        Self { item, property }
    }

    /// The item that changed.
    pub fn item(&self) -> &Rc<T> {
        &self.item
    }

    /// Name of the property that changed.
    pub fn property(&self) -> &'static str {
        self.property
    }
}

impl<T> Clone for ItemPropertyChanged<T> {
    fn clone(&self) -> Self {
        Self {
            item: Rc::clone(&self.item),
            property: self.property,
        }
    }
}

impl<T> fmt::Debug for ItemPropertyChanged<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemPropertyChanged")
            .field("item", &Rc::as_ptr(&self.item))
            .field("property", &self.property)
            .finish()
    }
}
