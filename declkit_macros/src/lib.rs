//! Procedural macros for `declkit`.
//!
//! Five expansion strategies share one pipeline: the annotated item is
//! reduced to a declaration model, the requested strategy validates its
//! preconditions and synthesises fragments, and the dispatcher renders
//! either every fragment or only the diagnostics. An invocation never emits
//! half a type.
//!
//! - [`CaseDetection`](derive@CaseDetection) adds an `is_<case>` predicate
//!   per enum case.
//! - [`MetaMirror`](derive@MetaMirror) adds a payload-free companion enum.
//! - [`AssociatedValues`](derive@AssociatedValues) adds optional payload
//!   accessors.
//! - [`Persistence`](derive@Persistence) adds keyed serde impls and a JSON
//!   string raw value.
//! - [`option_set!`] builds a bit set from a nested `Options` enum.
//!
//! Use these through the `declkit` crate, which provides the runtime traits
//! the generated code implements.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod config;
mod diagnostics;
mod dispatch;
mod expansion;
mod model;
mod names;
mod strategy;

use dispatch::{MacroRequest, expand_to_tokens};
use model::OptionSetInput;
use strategy::StrategyKind;

fn derive_with(kind: StrategyKind, input: DeriveInput) -> TokenStream {
    expand_to_tokens(&MacroRequest::derive(kind, input)).into()
}

/// Derive an `is_<case>` predicate for every case of an enum.
///
/// ```rust,ignore
/// #[derive(declkit::CaseDetection)]
/// enum Animal { Dog, Cat(i32) }
///
/// assert!(Animal::Dog.is_dog());
/// assert!(!Animal::Cat(3).is_dog());
/// ```
#[proc_macro_derive(CaseDetection, attributes(declkit))]
pub fn derive_case_detection(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_with(StrategyKind::CaseDetection, input)
}

/// Derive a payload-free `<Name>Meta` companion enum.
///
/// The companion name can be changed with `#[declkit(meta = "Name")]`.
#[proc_macro_derive(MetaMirror, attributes(declkit))]
pub fn derive_meta_mirror(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_with(StrategyKind::MetaMirror, input)
}

/// Derive `Option<&T>` accessors for enum payloads.
#[proc_macro_derive(AssociatedValues, attributes(declkit))]
pub fn derive_associated_values(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_with(StrategyKind::AssociatedValues, input)
}

/// Derive keyed serde impls, a `<Name>CodingKeys` enum and a JSON string
/// raw value for a struct with named fields.
///
/// Fields accept `#[coding_key("name")]` to rename the persisted key and
/// `#[coding_default(expr)]` to fill a missing key.
#[proc_macro_derive(Persistence, attributes(declkit, coding_key, coding_default))]
pub fn derive_persistence(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_with(StrategyKind::Persistence, input)
}

/// Declare a bit set whose options are the cases of a nested `Options` enum.
///
/// ```rust,ignore
/// declkit::option_set! {
///     #[derive(Debug)]
///     pub struct Shipping: u8 {
///         #[repr(u8)]
///         enum Options { NextDay, SecondDay, Priority }
///     }
/// }
///
/// let express = Shipping::NEXT_DAY | Shipping::PRIORITY;
/// assert_eq!(express.raw_value(), 0b101);
/// ```
///
/// Items following the declaration are emitted unchanged beside it.
#[proc_macro]
pub fn option_set(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as OptionSetInput);
    expand_to_tokens(&MacroRequest::option_set(input)).into()
}
