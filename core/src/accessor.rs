//! Typed property access.
//!
//! A collection tracks exactly one property of its items. Instead of looking
//! that property up by name on every access, the name is resolved once, when
//! the collection is built, into a [`PropertyBinding`]: a getter and a setter
//! over the property's value type `P`. A name that does not resolve fails
//! construction.

use std::any::type_name;
use std::fmt;
use std::rc::Rc;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::error::{AccessResult, PropertyAccessError};

/// Property names must be plain identifiers.
const PROPERTY_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

/// A statically typed getter/setter pair for one property of `T`.
///
/// The getter must be free of side effects. The setter is the only way the
/// engine mutates a tracked property.
pub struct PropertyAccessor<T, P> {
    get: fn(&T) -> P,
    set: fn(&T, P),
}

impl<T, P> PropertyAccessor<T, P> {
    pub const fn new(get: fn(&T) -> P, set: fn(&T, P)) -> Self {
        Self { get, set }
    }
}

impl<T, P> Clone for PropertyAccessor<T, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, P> Copy for PropertyAccessor<T, P> {}

/// Name-based resolution of tracked properties, implemented by item types.
///
/// # Example
///
/// ```ignore
/// impl PropertyLookup<bool> for EmailAddress {
///     fn property_names() -> &'static [&'static str] {
///         &["address", "is_default"]
///     }
///
///     fn lookup(name: &str) -> Option<PropertyAccessor<Self, bool>> {
///         match name {
///             "is_default" => Some(PropertyAccessor::new(Self::is_default, Self::set_default)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait PropertyLookup<P>: Sized {
    /// Every property the type exposes, whatever its value type.
    fn property_names() -> &'static [&'static str];

    /// Resolve `name` for value type `P`.
    fn lookup(name: &str) -> Option<PropertyAccessor<Self, P>>;
}

type Getter<T, P> = Rc<dyn Fn(&T) -> P>;
type Setter<T, P> = Rc<dyn Fn(&T, P)>;

/// An immutable, resolved `(name, getter, setter)` triple.
///
/// Cloning shares the underlying closures.
pub struct PropertyBinding<T, P> {
    name: Rc<str>,
    get: Getter<T, P>,
    set: Setter<T, P>,
}

impl<T, P> Clone for PropertyBinding<T, P> {
    fn clone(&self) -> Self {
        Self {
            name: Rc::clone(&self.name),
            get: Rc::clone(&self.get),
            set: Rc::clone(&self.set),
        }
    }
}

impl<T, P> fmt::Debug for PropertyBinding<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBinding")
            .field("name", &self.name)
            .field("item", &type_name::<T>())
            .field("value", &type_name::<P>())
            .finish()
    }
}

impl<T: 'static, P: 'static> PropertyBinding<T, P> {
    /// Bind a property from arbitrary closures.
    pub fn new(
        name: impl Into<String>,
        get: impl Fn(&T) -> P + 'static,
        set: impl Fn(&T, P) + 'static,
    ) -> AccessResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name: name.into(),
            get: Rc::new(get),
            set: Rc::new(set),
        })
    }

    /// Resolve a property of `T` by name.
    ///
    /// Fails with [`PropertyAccessError::TypeMismatch`] when `T` exposes the
    /// property with a value type other than `P`, and with
    /// [`PropertyAccessError::UnknownProperty`] when it does not expose it.
    pub fn resolve(name: &str) -> AccessResult<Self>
    where
        T: PropertyLookup<P>,
    {
        validate_name(name)?;
        match T::lookup(name) {
            Some(accessor) => Ok(Self {
                name: name.into(),
                get: Rc::new(accessor.get),
                set: Rc::new(accessor.set),
            }),
            None if T::property_names().contains(&name) => Err(PropertyAccessError::type_mismatch(
                type_name::<T>(),
                name,
                type_name::<P>(),
            )),
            None => Err(PropertyAccessError::unknown_property(type_name::<T>(), name)),
        }
    }
}

impl<T, P> PropertyBinding<T, P> {
    /// Name of the bound property.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the property value of `item`.
    pub fn get(&self, item: &T) -> P {
        (self.get)(item)
    }

    /// Write the property value of `item`.
    pub fn set(&self, item: &T, value: P) {
        (self.set)(item, value)
    }
}

/// The compiled name pattern, built on first use.
fn property_name_pattern() -> AccessResult<&'static Regex> {
    static PATTERN: OnceLock<Result<Regex, String>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(PROPERTY_NAME_PATTERN).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|message| PropertyAccessError::pattern(message.as_str()))
}

fn validate_name(name: &str) -> AccessResult<()> {
    if property_name_pattern()?.is_match(name) {
        Ok(())
    } else {
        Err(PropertyAccessError::invalid_name(name))
    }
}
