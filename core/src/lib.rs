//! Warden Core Types
//!
//! This crate provides the foundational types shared by the constraint
//! engine and the collection:
//! - Change notification (`Notifier`, `Subscription`, `PropertyChanged`)
//! - The item capability (`NotifyPropertyChanged`)
//! - Typed property access (`PropertyAccessor`, `PropertyBinding`, `PropertyLookup`)
//! - Accessor resolution errors

mod accessor;
mod error;
mod item;
mod notify;

pub use accessor::*;
pub use error::*;
pub use item::*;
pub use notify::*;
