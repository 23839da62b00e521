//! Compile-time declaration synthesis for structs and enums.
//!
//! The macros live in the companion `declkit_macros` crate and are
//! re-exported here together with the runtime traits their output
//! implements:
//!
//! - [`CaseDetection`] adds `is_<case>` predicates to an enum.
//! - [`MetaMirror`] adds a payload-free `<Name>Meta` companion enum.
//! - [`AssociatedValues`] adds `Option<&T>` payload accessors.
//! - [`Persistence`] implements keyed serde and [`RawRepresentable`] with a
//!   JSON string raw value, marking the type [`Persistable`].
//! - [`option_set!`] declares an [`OptionSet`] from a nested `Options` enum.
//!
//! ```rust
//! use declkit::{CaseDetection, OptionSet, option_set};
//!
//! #[derive(CaseDetection)]
//! enum Animal {
//!     Dog,
//!     Cat(i32),
//! }
//!
//! option_set! {
//!     #[derive(Debug)]
//!     pub struct Shipping: u8 {
//!         #[repr(u8)]
//!         enum Options { NextDay, SecondDay, Priority }
//!     }
//! }
//!
//! assert!(Animal::Cat(3).is_cat());
//! let express = Shipping::NEXT_DAY | Shipping::PRIORITY;
//! assert!(express.contains(Shipping::PRIORITY));
//! assert_eq!(express.raw_value(), 0b101);
//! ```

pub use declkit_macros::{AssociatedValues, CaseDetection, MetaMirror, Persistence, option_set};

mod error;
mod option_set;
pub mod persistence;

pub use error::{PersistenceError, PersistenceResult};
pub use option_set::{OptionSet, RawBits};
pub use persistence::{Persistable, RawRepresentable};

/// Paths used by generated code. Not part of the public API.
#[doc(hidden)]
pub mod __private {
    pub use serde;
    pub use serde_json;
}
