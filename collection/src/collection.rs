//! The constrained collection.
//!
//! # Design
//!
//! The collection is a handle over `Rc<Shared>`. `Shared` owns the ordered
//! entries, the binding and the policy behind one `RefCell`, plus two
//! notifiers for outside listeners. Each entry keeps the [`Subscription`] to
//! its item's change notifier; the subscribed callback only holds `Weak`
//! references to the collection and to the item, so neither keeps the other
//! alive.
//!
//! # Mutation Protocol
//!
//! 1. Validate indices and identity.
//! 2. Ask the policy for a [`Verdict`] against the current members.
//! 3. On rejection, return the violation; nothing has changed.
//! 4. On reset, drop the target's subscription and release the borrow.
//!    Write the default value through the binding, then borrow again and
//!    subscribe to the target once more. The collection therefore never
//!    observes its own corrections.
//! 5. Commit the structural change and subscribe to the new item.
//!
//! No borrow is held while item setters or listeners run, so observers of a
//! reset member and outside listeners may read or mutate the collection.
//! Structural changes they make land before step 5: a pending insertion
//! index is clamped to the new length, and a replacement follows the
//! outgoing member to wherever it now sits.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};
use warden_constraint::{Conflict, ConstraintPolicy, ConstraintViolation, Verdict};
use warden_core::{
    NotifyPropertyChanged, Notifier, PropertyBinding, PropertyChanged, PropertyLookup, Subscription,
};

use crate::builder::CollectionBuilder;
use crate::error::{CollectionError, CollectionResult};
use crate::event::ItemPropertyChanged;
use crate::result::MutationOutcome;

struct Entry<T> {
    item: Rc<T>,
    /// `None` only while the item is being reset.
    subscription: Option<Subscription>,
}

/// A reset decided under the borrow and applied after it is released.
struct Correction<T, P> {
    target: Rc<T>,
    value: P,
}

struct State<T, P> {
    entries: Vec<Entry<T>>,
    binding: PropertyBinding<T, P>,
    policy: ConstraintPolicy<P>,
    last_violation: Option<ConstraintViolation<T>>,
}

impl<T, P: PartialEq + Clone> State<T, P> {
    fn position(&self, item: &Rc<T>) -> Option<usize> {
        self.entries.iter().position(|e| Rc::ptr_eq(&e.item, item))
    }

    /// Check `candidate` against every member except the one at `skip`.
    fn check(&self, candidate: &T, skip: Option<usize>) -> Result<Verdict<P>, Conflict> {
        let members = self
            .entries
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != skip)
            .map(|(index, entry)| (index, entry.item.as_ref()));
        self.policy.check(&self.binding, candidate, members)
    }

    /// Detach the reset target, if the verdict names one.
    fn prepare(&mut self, verdict: Verdict<P>) -> Option<Correction<T, P>> {
        match verdict {
            Verdict::Accept => None,
            Verdict::Reset { index, value } => {
                let entry = &mut self.entries[index];
                drop(entry.subscription.take());
                Some(Correction {
                    target: Rc::clone(&entry.item),
                    value,
                })
            }
        }
    }

    /// The outcome as seen from the committed entries. A reset member that
    /// left the collection meanwhile is not reported.
    fn outcome(&self, corrected: Option<&Rc<T>>) -> MutationOutcome {
        match corrected.and_then(|target| self.position(target)) {
            Some(index) => MutationOutcome::AutoCorrected { index },
            None => MutationOutcome::Accepted,
        }
    }

    fn violation(&self, conflict: Conflict, item: Rc<T>) -> ConstraintViolation<T> {
        conflict.into_violation(item, self.binding.name())
    }
}

struct Shared<T, P> {
    state: RefCell<State<T, P>>,
    item_changed: Notifier<ItemPropertyChanged<T>>,
    violations: Notifier<ConstraintViolation<T>>,
}

impl<T, P> Shared<T, P>
where
    T: NotifyPropertyChanged + 'static,
    P: PartialEq + Clone + 'static,
{
    /// Subscribe the collection to `item`'s change notifications.
    fn watch(shared: &Rc<Self>, item: &Rc<T>) -> Subscription {
        let owner: Weak<Self> = Rc::downgrade(shared);
        let source: Weak<T> = Rc::downgrade(item);
        trace!("subscribing to item");
        item.property_changed().subscribe(move |event: &PropertyChanged| {
            if let (Some(owner), Some(item)) = (owner.upgrade(), source.upgrade()) {
                Self::on_item_changed(&owner, &item, *event);
            }
        })
    }

    /// Write the reset value with no borrow held, then watch the target
    /// again if it is still a member. Returns the target.
    ///
    /// Must be called without a borrow of `shared.state`.
    fn correct(shared: &Rc<Self>, correction: Correction<T, P>) -> Rc<T> {
        let Correction { target, value } = correction;
        let binding = shared.state.borrow().binding.clone();
        binding.set(&target, value);

        let mut state = shared.state.borrow_mut();
        if let Some(index) = state.position(&target) {
            let entry = &mut state.entries[index];
            if entry.subscription.is_none() {
                entry.subscription = Some(Self::watch(shared, &entry.item));
            }
            debug!(
                property = state.binding.name(),
                index, "reset conflicting member to default"
            );
        }
        target
    }

    fn on_item_changed(shared: &Rc<Self>, item: &Rc<T>, event: PropertyChanged) {
        let decided = {
            let mut state = shared.state.borrow_mut();
            if state.position(item).is_none() {
                // Stale callback for an item that has left the collection.
                return;
            }
            if event.property() != state.binding.name() {
                Ok(None)
            } else {
                match state.check(item, None) {
                    Ok(verdict) => Ok(state.prepare(verdict)),
                    Err(conflict) => Err(state.violation(conflict, Rc::clone(item))),
                }
            }
        };

        match decided {
            Ok(correction) => {
                let corrected = correction.map(|correction| Self::correct(shared, correction));
                let outcome = shared.state.borrow().outcome(corrected.as_ref());
                trace!(property = event.property(), ?outcome, "forwarding item change");
                shared
                    .item_changed
                    .notify(&ItemPropertyChanged::new(Rc::clone(item), event.property()));
            }
            Err(violation) => {
                warn!(
                    property = violation.property(),
                    kind = %violation.kind(),
                    conflicting_index = violation.conflicting_index(),
                    "in-place edit breaks the collection constraint"
                );
                shared.state.borrow_mut().last_violation = Some(violation.clone());
                shared.violations.notify(&violation);
            }
        }
    }
}

/// An ordered collection of shared items that keeps one property of its
/// items consistent with a [`ConstraintPolicy`].
///
/// Items are `Rc<T>` with interior mutability; membership is by identity.
/// Every structural mutation is checked before it is committed. In-place
/// edits of the tracked property are checked when the item reports them.
///
/// Edits accepted after the fact are forwarded to
/// [`ConstrainedCollection::on_item_property_changed`] listeners once any
/// reset they caused has been applied. Rejected ones are not rolled back:
/// the item keeps its new value, the violation is stored in
/// [`ConstrainedCollection::last_violation`] and sent to
/// [`ConstrainedCollection::on_violation`] listeners.
pub struct ConstrainedCollection<T, P> {
    shared: Rc<Shared<T, P>>,
}

impl<T, P> ConstrainedCollection<T, P>
where
    T: NotifyPropertyChanged + 'static,
    P: PartialEq + Clone + 'static,
{
    /// Start building a collection tracking the property `name` of `T`.
    pub fn builder(name: &str, policy: impl Into<ConstraintPolicy<P>>) -> CollectionBuilder<T, P>
    where
        T: PropertyLookup<P>,
    {
        CollectionBuilder::new(PropertyBinding::resolve(name), policy)
    }

    /// Start building a collection over an explicit binding.
    pub fn builder_with_binding(
        binding: PropertyBinding<T, P>,
        policy: impl Into<ConstraintPolicy<P>>,
    ) -> CollectionBuilder<T, P> {
        CollectionBuilder::new(Ok(binding), policy)
    }

    /// Create an empty collection tracking the property `name` of `T`.
    pub fn new(name: &str, policy: impl Into<ConstraintPolicy<P>>) -> CollectionResult<Self, T>
    where
        T: PropertyLookup<P>,
    {
        Self::builder(name, policy).build()
    }

    /// Create an empty collection over an explicit binding.
    pub fn with_binding(binding: PropertyBinding<T, P>, policy: impl Into<ConstraintPolicy<P>>) -> Self {
        Self::from_parts(binding, policy.into())
    }

    pub(crate) fn from_parts(binding: PropertyBinding<T, P>, policy: ConstraintPolicy<P>) -> Self {
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(State {
                    entries: Vec::new(),
                    binding,
                    policy,
                    last_violation: None,
                }),
                item_changed: Notifier::new(),
                violations: Notifier::new(),
            }),
        }
    }

    // ==================== Mutation ====================

    /// Append `item`.
    pub fn push(&self, item: Rc<T>) -> CollectionResult<MutationOutcome, T> {
        let index = self.len();
        self.insert(index, item)
    }

    /// Insert `item` at `index`, shifting later members right.
    ///
    /// A reported auto-correction index refers to the position after the
    /// insertion. If observers of the reset member shrink the collection,
    /// `index` is clamped to the new length.
    pub fn insert(&self, index: usize, item: Rc<T>) -> CollectionResult<MutationOutcome, T> {
        let shared = &self.shared;
        let correction = {
            let mut state = shared.state.borrow_mut();

            let len = state.entries.len();
            if index > len {
                return Err(CollectionError::index_out_of_bounds(index, len));
            }
            if let Some(existing) = state.position(&item) {
                return Err(CollectionError::duplicate_item(existing));
            }

            match state.check(&item, None) {
                Ok(verdict) => state.prepare(verdict),
                Err(conflict) => {
                    debug!(property = state.binding.name(), kind = %conflict.kind, index, "insert rejected");
                    return Err(state.violation(conflict, item).into());
                }
            }
        };
        let corrected = correction.map(|correction| Shared::correct(shared, correction));

        let mut state = shared.state.borrow_mut();
        if let Some(existing) = state.position(&item) {
            return Err(CollectionError::duplicate_item(existing));
        }
        let len = state.entries.len();
        let index = index.min(len);
        let subscription = Shared::watch(shared, &item);
        state.entries.insert(
            index,
            Entry {
                item,
                subscription: Some(subscription),
            },
        );
        debug!(property = state.binding.name(), index, len = len + 1, "inserted item");

        Ok(state.outcome(corrected.as_ref()))
    }

    /// Replace the member at `index` with `item`, returning the outcome and
    /// the replaced member.
    ///
    /// The outgoing member is excluded from the check. Replacing a member
    /// with itself is allowed and re-validates it.
    pub fn set(&self, index: usize, item: Rc<T>) -> CollectionResult<(MutationOutcome, Rc<T>), T> {
        let shared = &self.shared;
        let (outgoing, correction) = {
            let mut state = shared.state.borrow_mut();

            let len = state.entries.len();
            if index >= len {
                return Err(CollectionError::index_out_of_bounds(index, len));
            }
            match state.position(&item) {
                Some(existing) if existing != index => {
                    return Err(CollectionError::duplicate_item(existing));
                }
                _ => {}
            }

            let verdict = match state.check(&item, Some(index)) {
                Ok(verdict) => verdict,
                Err(conflict) => {
                    debug!(property = state.binding.name(), kind = %conflict.kind, index, "set rejected");
                    return Err(state.violation(conflict, item).into());
                }
            };
            (Rc::clone(&state.entries[index].item), state.prepare(verdict))
        };
        let corrected = correction.map(|correction| Shared::correct(shared, correction));

        let mut state = shared.state.borrow_mut();
        let slot = state.position(&outgoing);
        match state.position(&item) {
            Some(existing) if Some(existing) != slot => {
                return Err(CollectionError::duplicate_item(existing));
            }
            _ => {}
        }
        let subscription = Shared::watch(shared, &item);
        let entry = Entry {
            item,
            subscription: Some(subscription),
        };
        match slot {
            Some(slot) => {
                let replaced = std::mem::replace(&mut state.entries[slot], entry);
                drop(replaced.subscription);
                debug!(property = state.binding.name(), index = slot, "replaced item");
            }
            None => {
                // The outgoing member already left the collection.
                let at = index.min(state.entries.len());
                state.entries.insert(at, entry);
                debug!(property = state.binding.name(), index = at, "inserted replacement");
            }
        }

        Ok((state.outcome(corrected.as_ref()), outgoing))
    }

    /// Remove and return the member at `index`.
    pub fn remove_at(&self, index: usize) -> CollectionResult<Rc<T>, T> {
        let mut state = self.shared.state.borrow_mut();

        let len = state.entries.len();
        if index >= len {
            return Err(CollectionError::index_out_of_bounds(index, len));
        }

        // Unsubscribe before the entry leaves the list.
        drop(state.entries[index].subscription.take());
        let entry = state.entries.remove(index);
        debug!(property = state.binding.name(), index, len = len - 1, "removed item");

        Ok(entry.item)
    }

    /// Remove `item` if it is a member. Returns whether it was.
    pub fn remove(&self, item: &Rc<T>) -> bool {
        match self.index_of(item) {
            Some(index) => self.remove_at(index).is_ok(),
            None => false,
        }
    }

    /// Remove every member.
    pub fn clear(&self) {
        let mut state = self.shared.state.borrow_mut();

        for entry in state.entries.iter_mut() {
            drop(entry.subscription.take());
        }
        let removed = state.entries.len();
        state.entries.clear();
        debug!(property = state.binding.name(), removed, "cleared collection");
    }

    // ==================== Queries ====================

    pub fn len(&self) -> usize {
        self.shared.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The member at `index`.
    pub fn get(&self, index: usize) -> Option<Rc<T>> {
        self.shared
            .state
            .borrow()
            .entries
            .get(index)
            .map(|e| Rc::clone(&e.item))
    }

    pub fn first(&self) -> Option<Rc<T>> {
        self.get(0)
    }

    /// Snapshot of the members in order.
    pub fn items(&self) -> Vec<Rc<T>> {
        self.shared
            .state
            .borrow()
            .entries
            .iter()
            .map(|e| Rc::clone(&e.item))
            .collect()
    }

    /// Whether this exact item instance is a member.
    pub fn contains(&self, item: &Rc<T>) -> bool {
        self.index_of(item).is_some()
    }

    /// Position of this exact item instance.
    pub fn index_of(&self, item: &Rc<T>) -> Option<usize> {
        self.shared.state.borrow().position(item)
    }

    pub fn binding(&self) -> PropertyBinding<T, P> {
        self.shared.state.borrow().binding.clone()
    }

    pub fn policy(&self) -> ConstraintPolicy<P> {
        self.shared.state.borrow().policy.clone()
    }

    /// Name of the tracked property.
    pub fn property_name(&self) -> String {
        self.shared.state.borrow().binding.name().to_string()
    }

    /// Number of members the collection is currently subscribed to.
    ///
    /// Equals [`ConstrainedCollection::len`] outside of a reset.
    pub fn subscription_count(&self) -> usize {
        self.shared
            .state
            .borrow()
            .entries
            .iter()
            .filter(|e| e.subscription.is_some())
            .count()
    }

    /// Every member currently breaking the constraint.
    ///
    /// Only in-place edits the collection could not prevent (rejected
    /// after the fact, or a reset that fixed only the first holder) leave
    /// the collection in such a state.
    pub fn audit(&self) -> Vec<ConstraintViolation<T>> {
        let state = self.shared.state.borrow();
        let members = state
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (index, entry.item.as_ref()));

        let violations = state
            .policy
            .audit(&state.binding, members)
            .into_iter()
            .map(|(offender, conflict)| state.violation(conflict, Rc::clone(&state.entries[offender].item)))
            .collect();
        violations
    }

    // ==================== Notifications ====================

    /// Listen for accepted in-place edits of contained items.
    ///
    /// Every property change is forwarded, not only changes of the tracked
    /// property.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on_item_property_changed(
        &self,
        callback: impl Fn(&ItemPropertyChanged<T>) + 'static,
    ) -> Subscription {
        self.shared.item_changed.subscribe(callback)
    }

    /// Listen for in-place edits that break the constraint.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on_violation(&self, callback: impl Fn(&ConstraintViolation<T>) + 'static) -> Subscription {
        self.shared.violations.subscribe(callback)
    }

    /// The most recent violation caused by an in-place edit.
    pub fn last_violation(&self) -> Option<ConstraintViolation<T>> {
        self.shared.state.borrow().last_violation.clone()
    }

    /// Take and clear the most recent in-place violation.
    pub fn take_violation(&self) -> Option<ConstraintViolation<T>> {
        self.shared.state.borrow_mut().last_violation.take()
    }
}

impl<T, P> fmt::Debug for ConstrainedCollection<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shared.state.try_borrow() {
            Ok(state) => f
                .debug_struct("ConstrainedCollection")
                .field("property", &state.binding.name())
                .field("policy", &state.policy.kind())
                .field("len", &state.entries.len())
                .finish(),
            Err(_) => f
                .debug_struct("ConstrainedCollection")
                .finish_non_exhaustive(),
        }
    }
}
