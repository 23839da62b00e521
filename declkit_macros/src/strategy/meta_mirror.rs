//! `MetaMirror`: a payload-free companion enum.
//!
//! For `enum Animal { Dog, Bird(i32) }` the strategy emits
//!
//! ```text
//! enum AnimalMeta { Dog, Bird }
//! impl AnimalMeta { fn new(original: &Animal) -> Self }
//! impl From<&Animal> for AnimalMeta
//! impl From<Animal> for AnimalMeta
//! impl Animal { fn meta(&self) -> AnimalMeta }
//! ```
//!
//! The companion name defaults to `<Name>Meta` and can be overridden with
//! `#[declkit(meta = "..")]`.

use quote::quote;

use super::{ExpansionContext, StrategyKind, require_kind, wildcard_pattern};
use crate::expansion::{DeclarationFragment, ExpansionResult};
use crate::model::{DeclarationKind, DeclarationNode};
use crate::names::{NameScope, companion_type_ident};

pub(super) fn expand(node: &DeclarationNode, context: &ExpansionContext<'_>) -> ExpansionResult {
    if let Err(failed) = require_kind(node, DeclarationKind::Enum, StrategyKind::MetaMirror) {
        return failed;
    }

    let name = &node.name;
    let vis = &node.access_level;
    let meta = context
        .configuration
        .meta_name
        .clone()
        .unwrap_or_else(|| companion_type_ident(name, "Meta"));
    let original = NameScope::for_declaration(node).unique("original");
    let (impl_generics, ty_generics, where_clause) = node.generics.split_for_impl();

    let cases: Vec<_> = node.enum_cases().map(|case| &case.name).collect();
    let owner = quote! { #name };
    let arms = node.enum_cases().map(|case| {
        let pattern = wildcard_pattern(&owner, case);
        let case_name = &case.name;
        quote! { #pattern => Self::#case_name, }
    });

    let type_doc = format!("The cases of `{name}` without their associated values.");
    let new_doc = format!("The case of `{name}` that the given value holds.");
    let peer = DeclarationFragment::peer(quote! {
        #[doc = #type_doc]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #vis enum #meta {
            #(#cases,)*
        }

        impl #meta {
            #[doc = #new_doc]
            #[must_use]
            #vis fn new #impl_generics (#original: &#name #ty_generics) -> Self #where_clause {
                match *#original {
                    #(#arms)*
                }
            }
        }
    });

    let by_ref = DeclarationFragment::extension(
        [format!("From<&{name}>")],
        quote! {
            impl #impl_generics ::core::convert::From<&#name #ty_generics> for #meta #where_clause {
                fn from(#original: &#name #ty_generics) -> Self {
                    Self::new(#original)
                }
            }
        },
    );
    let by_value = DeclarationFragment::extension(
        [format!("From<{name}>")],
        quote! {
            impl #impl_generics ::core::convert::From<#name #ty_generics> for #meta #where_clause {
                fn from(#original: #name #ty_generics) -> Self {
                    Self::new(&#original)
                }
            }
        },
    );

    let accessor_doc = format!("The payload-free `{meta}` case of this value.");
    let accessor = DeclarationFragment::member(quote! {
        #[doc = #accessor_doc]
        #[must_use]
        #vis fn meta(&self) -> #meta {
            #meta::new(self)
        }
    });

    ExpansionResult::Emitted {
        fragments: vec![peer, by_ref, by_value, accessor],
        warnings: Vec::new(),
    }
}
