//! Host syntax accepted by the macro entry points.
//!
//! Derive macros receive a `syn::DeriveInput`. `option_set!` is
//! function-like because Rust has no nested type declarations: its input is
//! a struct whose body lists nested enums, followed by any sibling items the
//! author wants in the same scope.
//!
//! ```text
//! option_set! {
//!     #[derive(Debug)]
//!     pub struct Shipping: u8 {
//!         #[repr(u8)]
//!         enum Options { NextDay, SecondDay, Priority }
//!     }
//!
//!     impl Shipping { /* hand-written members */ }
//! }
//! ```

use syn::parse::discouraged::Speculative;
use syn::parse::{Parse, ParseStream};
use syn::{Attribute, DeriveInput, Ident, Item, Token, Type, Visibility, braced};

/// Raw syntax handed to the dispatcher.
pub(crate) enum HostSyntax {
    Derive(DeriveInput),
    OptionSet(OptionSetInput),
}

impl HostSyntax {
    /// Items that sit beside the declaration and are re-emitted unchanged.
    pub(crate) fn scope(&self) -> &[Item] {
        match self {
            Self::Derive(_) => &[],
            Self::OptionSet(input) => &input.scope,
        }
    }
}

pub(crate) struct OptionSetInput {
    pub declaration: OptionSetDeclaration,
    pub scope: Vec<Item>,
}

pub(crate) enum OptionSetDeclaration {
    /// `struct Name[: Raw] { nested items }`
    Container(OptionSetContainer),
    /// Any other item, kept so the strategy can explain why it is unsuitable.
    Other(Box<Item>),
}

pub(crate) struct OptionSetContainer {
    pub attrs: Vec<Attribute>,
    pub vis: Visibility,
    pub ident: Ident,
    /// Storage type requested after the colon.
    pub raw_type: Option<Type>,
    pub items: Vec<Item>,
}

impl Parse for OptionSetContainer {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;
        input.parse::<Token![struct]>()?;
        let ident: Ident = input.parse()?;
        let raw_type = if input.peek(Token![:]) {
            input.parse::<Token![:]>()?;
            Some(input.parse::<Type>()?)
        } else {
            None
        };
        let content;
        braced!(content in input);
        let mut items = Vec::new();
        while !content.is_empty() {
            items.push(content.parse::<Item>()?);
        }
        Ok(Self {
            attrs,
            vis,
            ident,
            raw_type,
            items,
        })
    }
}

impl Parse for OptionSetDeclaration {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        // A struct with ordinary fields is not a container; it falls through
        // to `Item` so the strategy can report the missing `Options` enum.
        let fork = input.fork();
        if let Ok(container) = fork.parse::<OptionSetContainer>() {
            input.advance_to(&fork);
            return Ok(Self::Container(container));
        }
        Ok(Self::Other(Box::new(input.parse()?)))
    }
}

impl Parse for OptionSetInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let declaration = input.parse()?;
        let mut scope = Vec::new();
        while !input.is_empty() {
            scope.push(input.parse::<Item>()?);
        }
        Ok(Self { declaration, scope })
    }
}
