#![forbid(unsafe_code)]

//! Change notification with RAII subscriptions.
//!
//! # Design
//!
//! A [`Notifier<E>`] keeps its subscribers as `Weak` callbacks. The strong
//! reference lives in the [`Subscription`] guard handed back by
//! [`Notifier::subscribe`], so whoever holds the guard owns the lifetime of
//! the registration. Dropping the guard is the only way to unsubscribe.
//!
//! Items embed a `Notifier<PropertyChanged>` and call [`Notifier::notify`]
//! from their setters; the collection holds one guard per contained item.
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: guards stored indefinitely keep their callbacks
//!   alive. Dead weak references are pruned lazily during `notify()`.
//! - **Re-entrant notify**: the subscriber list is snapshotted before any
//!   callback runs, so a callback may subscribe, drop guards, or notify other
//!   notifiers. Callbacks registered during a cycle first run on the next one.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type CallbackRc<E> = Rc<dyn Fn(&E)>;
type CallbackWeak<E> = Weak<dyn Fn(&E)>;

/// Event emitted by an item when one of its properties changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyChanged {
    property: &'static str,
}

impl PropertyChanged {
    /// Create an event for the named property.
    pub fn new(property: &'static str) -> Self {
        Self { property }
    }

    /// Name of the property that changed.
    pub fn property(&self) -> &'static str {
        self.property
    }
}

/// Registration list for callbacks of type `Fn(&E)`.
///
/// # Invariants
///
/// 1. Subscribers are notified in registration order.
/// 2. A callback whose [`Subscription`] was dropped is never invoked again,
///    even when the drop happens in the middle of a notification cycle.
pub struct Notifier<E> {
    subscribers: RefCell<Vec<CallbackWeak<E>>>,
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
        }
    }
}

impl<E> fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscriber_count", &self.subscribers.borrow().len())
            .finish()
    }
}

impl<E: 'static> Notifier<E> {
    /// Create a notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    ///
    /// The callback stays registered for as long as the returned
    /// [`Subscription`] is alive.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        let strong: CallbackRc<E> = Rc::new(callback);
        self.subscribers.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Invoke every live callback with `event` and prune dead ones.
    pub fn notify(&self, event: &E) {
        // Snapshot first so callbacks can touch this notifier.
        let snapshot: Vec<CallbackWeak<E>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|w| w.strong_count() > 0);
            subscribers.clone()
        };

        for weak in &snapshot {
            if let Some(cb) = weak.upgrade() {
                cb(event);
            }
        }
    }

    /// Number of registered callbacks, including dead ones not yet pruned.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Number of callbacks whose guard is still alive.
    pub fn live_subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

/// RAII guard for a registered callback.
///
/// Holds the only strong reference to the callback; dropping it makes the
/// notifier's weak entry dead.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
