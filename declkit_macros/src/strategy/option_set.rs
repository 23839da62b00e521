//! `option_set!`: a bit set backed by a nested `Options` enum.
//!
//! ```text
//! option_set! {
//!     pub struct Shipping: u8 {
//!         #[repr(u8)]
//!         enum Options { NextDay, SecondDay, Priority }
//!     }
//! }
//! ```
//!
//! becomes a `Shipping { raw_value: u8 }` struct with one associated
//! constant per case (`NEXT_DAY = 1 << 0`, `SECOND_DAY = 1 << 1`, ...), the
//! enum re-emitted as `ShippingOptions`, and conformance to
//! `declkit::OptionSet` plus the bitwise operators.
//!
//! Bit positions follow declaration order. Explicit discriminants on the
//! `Options` cases are allowed but play no part in the layout.

use proc_macro2::{Literal, TokenStream};
use quote::{ToTokens, quote};
use syn::Token;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;

use super::{ExpansionContext, StrategyKind, require_kind};
use crate::diagnostics::{
    Anchor, Diagnostic, DiagnosticId, Diagnostics, Severity, error, make_diagnostic,
};
use crate::expansion::{DeclarationFragment, ExpansionResult};
use crate::model::{
    DeclarationKind, DeclarationNode, NestedEnum, bare_type_ident, integer_bit_width,
};
use crate::names::{associated_const_ident, companion_type_ident, ensure_unique};

const OPTIONS: &str = "Options";

pub(super) fn expand(node: &DeclarationNode, context: &ExpansionContext<'_>) -> ExpansionResult {
    try_expand(node, context).unwrap_or_else(|failed| failed)
}

/// The integer the set stores its bits in.
struct Storage {
    tokens: TokenStream,
    bits: u32,
}

fn try_expand(
    node: &DeclarationNode,
    context: &ExpansionContext<'_>,
) -> Result<ExpansionResult, ExpansionResult> {
    require_kind(node, DeclarationKind::Struct, StrategyKind::OptionSet)?;
    let options = options_enum(node)?;

    let mut diagnostics = Diagnostics::new();
    let storage = match storage(node, options, context) {
        Ok(storage) => Some(storage),
        Err(failure) => {
            diagnostics.push(failure);
            None
        }
    };
    if let Some(overflow) = storage
        .as_ref()
        .and_then(|storage| overflow(options, storage.bits))
    {
        diagnostics.push(overflow);
    }
    diagnostics.extend(ensure_unique(
        options
            .cases
            .iter()
            .map(|case| (associated_const_ident(&case.name), Anchor::of(&case.name))),
        "associated constant",
    ));
    diagnostics.extend(ignored_discriminants(options));
    diagnostics.extend(unexpected_nested_enums(node));
    let warnings = diagnostics.check()?;
    let Some(storage) = storage else {
        return Err(ExpansionResult::failed(warnings));
    };

    let krate = context.krate();
    let mut fragments = vec![
        DeclarationFragment::peer(set_struct(node, &storage)),
        DeclarationFragment::peer(options_peer(node, options)),
        DeclarationFragment::member(members(node, options, &storage)),
        option_set_conformance(node, &storage, &krate),
        DeclarationFragment::extension(
            [format!("From<{}>", options_ident(node))],
            from_options(node, options),
        ),
    ];
    fragments.extend(operators(node, &krate));
    fragments.extend(collection(node));
    fragments.push(DeclarationFragment::extension(
        ["Send", "Sync"],
        thread_safety(node),
    ));

    Ok(ExpansionResult::Emitted {
        fragments,
        warnings,
    })
}

fn options_enum(node: &DeclarationNode) -> Result<&NestedEnum, ExpansionResult> {
    let Some(first) = node.first_nested_enum(OPTIONS) else {
        return Err(ExpansionResult::failed(vec![error(
            DiagnosticId::MissingRequiredNestedDeclaration,
            format!(
                "option set `{}` must declare a nested `enum {OPTIONS}` listing its options",
                node.name
            ),
            node.anchor(),
        )]));
    };
    let duplicates: Vec<_> = node
        .nested_enums_named(OPTIONS)
        .skip(1)
        .map(|duplicate| {
            error(
                DiagnosticId::DuplicateNestedDeclaration,
                format!(
                    "option set `{}` declares `enum {OPTIONS}` more than once",
                    node.name
                ),
                Anchor::of(&duplicate.name),
            )
        })
        .collect();
    if duplicates.is_empty() {
        Ok(first)
    } else {
        Err(ExpansionResult::failed(duplicates))
    }
}

/// The body may only hold `Options`; anything else would vanish from the
/// expansion.
fn unexpected_nested_enums(node: &DeclarationNode) -> Vec<Diagnostic> {
    node.nested_enums()
        .filter(|nested| nested.name != OPTIONS)
        .map(|nested| {
            error(
                DiagnosticId::StructuralPrecondition,
                format!(
                    "option set `{}` may only nest `enum {OPTIONS}`; declare `{}` outside the set",
                    node.name, nested.name
                ),
                Anchor::of(&nested.name),
            )
        })
        .collect()
}

/// Resolve the storage integer: the type after the colon when given,
/// otherwise the `Options` representation. Both must be integers.
fn storage(
    node: &DeclarationNode,
    options: &NestedEnum,
    context: &ExpansionContext<'_>,
) -> Result<Storage, Diagnostic> {
    let Some(repr) = options.raw_type.as_ref() else {
        return Err(error(
            DiagnosticId::UnsupportedRawType,
            format!("`{OPTIONS}` must declare an integer representation such as `#[repr(u8)]`"),
            Anchor::of(&options.name),
        ));
    };
    let Some(repr_bits) = integer_bit_width(repr) else {
        return Err(error(
            DiagnosticId::UnsupportedRawType,
            format!("`#[repr({repr})]` is not an integer, so `{OPTIONS}` cannot back a bit set"),
            Anchor::of(repr),
        ));
    };
    let Some(requested) = context.parameters.raw_type.as_ref() else {
        return Ok(Storage {
            tokens: repr.to_token_stream(),
            bits: repr_bits,
        });
    };
    let requested_bits = bare_type_ident(requested)
        .and_then(|ident| integer_bit_width(ident).map(|bits| (ident, bits)));
    match requested_bits {
        Some((ident, bits)) => Ok(Storage {
            tokens: ident.to_token_stream(),
            bits,
        }),
        None => Err(error(
            DiagnosticId::UnsupportedRawType,
            format!(
                "option set `{}` must be stored in a primitive integer, found `{}`",
                node.name,
                requested.to_token_stream()
            ),
            Anchor::new("storage type", requested.span()),
        )),
    }
}

fn overflow(options: &NestedEnum, bits: u32) -> Option<Diagnostic> {
    let capacity = usize::try_from(bits).unwrap_or(usize::MAX);
    let first_excess = options.cases.get(capacity)?;
    Some(error(
        DiagnosticId::OptionSetOverflow,
        format!(
            "`{OPTIONS}` declares {} cases but the storage type only has {bits} bits; `{}` has no bit left",
            options.cases.len(),
            first_excess.name,
        ),
        Anchor::of(&first_excess.name),
    ))
}

fn ignored_discriminants(options: &NestedEnum) -> Vec<Diagnostic> {
    options
        .cases
        .iter()
        .filter(|case| case.explicit_raw_value.is_some())
        .map(|case| {
            make_diagnostic(
                Severity::Warning,
                DiagnosticId::IgnoredDiscriminant,
                format!(
                    "the discriminant of `{}` is ignored; option bits follow declaration order",
                    case.name
                ),
                Anchor::of(&case.name),
            )
        })
        .collect()
}

fn options_ident(node: &DeclarationNode) -> syn::Ident {
    companion_type_ident(&node.name, OPTIONS)
}

/// Traits every option set derives unless the author already lists them.
const DERIVES: [&str; 6] = ["Clone", "Copy", "PartialEq", "Eq", "Hash", "Default"];

/// Last path segment of every trait named in the author's `#[derive]` lists.
///
/// Lists that do not parse as paths are left for rustc to report.
fn authored_derives(attributes: &[syn::Attribute]) -> Vec<String> {
    attributes
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .filter_map(|path| path.segments.last().map(|segment| segment.ident.to_string()))
        .collect()
}

fn set_struct(node: &DeclarationNode, storage: &Storage) -> TokenStream {
    let attributes = &node.attributes;
    let vis = &node.access_level;
    let name = &node.name;
    let raw = &storage.tokens;
    let authored = authored_derives(attributes);
    let missing: Vec<_> = DERIVES
        .iter()
        .filter(|derive| !authored.iter().any(|written| written == *derive))
        .map(|derive| syn::Ident::new(derive, name.span()))
        .collect();
    let derive = (!missing.is_empty()).then(|| quote! { #[derive(#(#missing),*)] });
    quote! {
        #(#attributes)*
        #derive
        #vis struct #name {
            raw_value: #raw,
        }
    }
}

/// The author's `Options` enum, lifted beside the set under a name that
/// cannot clash with other option sets in the same module.
fn options_peer(node: &DeclarationNode, options: &NestedEnum) -> TokenStream {
    let attributes = &options.attributes;
    let vis = &node.access_level;
    let ident = options_ident(node);
    let doc = format!("The individual options of `{}`.", node.name);
    let cases = options.cases.iter().map(|case| {
        let case_name = &case.name;
        match &case.explicit_raw_value {
            Some(value) => quote! { #case_name = #value },
            None => quote! { #case_name },
        }
    });
    quote! {
        #[doc = #doc]
        #(#attributes)*
        #vis enum #ident {
            #(#cases,)*
        }
    }
}

fn bit(index: usize) -> TokenStream {
    let shift = Literal::usize_unsuffixed(index);
    quote! { 1 << #shift }
}

fn members(node: &DeclarationNode, options: &NestedEnum, storage: &Storage) -> TokenStream {
    let vis = &node.access_level;
    let raw = &storage.tokens;
    let constants = options.cases.iter().enumerate().map(|(index, case)| {
        let constant = associated_const_ident(&case.name);
        let value = bit(index);
        let doc = format!("The `{}` option.", case.name);
        quote! {
            #[doc = #doc]
            #vis const #constant: Self = Self { raw_value: #value };
        }
    });
    let every_bit: Vec<_> = (0..options.cases.len())
        .map(|index| {
            let value = bit(index);
            quote! { (#value) }
        })
        .collect();
    let all = if every_bit.is_empty() {
        quote! { 0 }
    } else {
        quote! { #(#every_bit)|* }
    };
    quote! {
        #(#constants)*

        /// The set with no options.
        #[must_use]
        #vis const fn empty() -> Self {
            Self { raw_value: 0 }
        }

        /// The set with every declared option.
        #[must_use]
        #vis const fn all() -> Self {
            Self { raw_value: #all }
        }

        /// The underlying bits.
        #[must_use]
        #vis const fn raw_value(&self) -> #raw {
            self.raw_value
        }

        /// Reinterpret raw bits as a set. Undeclared bits are kept.
        #[must_use]
        #vis const fn from_raw_value(raw_value: #raw) -> Self {
            Self { raw_value }
        }
    }
}

fn option_set_conformance(
    node: &DeclarationNode,
    storage: &Storage,
    krate: &TokenStream,
) -> DeclarationFragment {
    let name = &node.name;
    let raw = &storage.tokens;
    DeclarationFragment::extension(
        ["OptionSet"],
        quote! {
            impl #krate::OptionSet for #name {
                type RawValue = #raw;

                fn raw_value(&self) -> #raw {
                    self.raw_value
                }

                fn from_raw_value(raw_value: #raw) -> Self {
                    Self { raw_value }
                }
            }
        },
    )
}

fn from_options(node: &DeclarationNode, options: &NestedEnum) -> TokenStream {
    let name = &node.name;
    let ident = options_ident(node);
    let arms = options.cases.iter().map(|case| {
        let case_name = &case.name;
        let constant = associated_const_ident(&case.name);
        quote! { #ident::#case_name => Self::#constant, }
    });
    quote! {
        impl ::core::convert::From<#ident> for #name {
            fn from(option: #ident) -> Self {
                match option {
                    #(#arms)*
                }
            }
        }
    }
}

/// One extension per operator trait, so a hand-written impl of any one of
/// them replaces only that impl.
fn operators(node: &DeclarationNode, krate: &TokenStream) -> Vec<DeclarationFragment> {
    let name = &node.name;
    let binary = [
        ("BitOr", quote! { bitor }, quote! { union }),
        ("BitAnd", quote! { bitand }, quote! { intersection }),
        ("BitXor", quote! { bitxor }, quote! { symmetric_difference }),
        ("Sub", quote! { sub }, quote! { difference }),
    ]
    .into_iter()
    .map(|(op, method, set_op)| {
        let trait_ident = syn::Ident::new(op, name.span());
        DeclarationFragment::extension(
            [op],
            quote! {
                impl ::core::ops::#trait_ident for #name {
                    type Output = Self;

                    fn #method(self, rhs: Self) -> Self {
                        <Self as #krate::OptionSet>::#set_op(self, rhs)
                    }
                }
            },
        )
    });
    let assigning = [
        ("BitOrAssign", quote! { bitor_assign }, quote! { | }),
        ("BitAndAssign", quote! { bitand_assign }, quote! { & }),
        ("BitXorAssign", quote! { bitxor_assign }, quote! { ^ }),
        ("SubAssign", quote! { sub_assign }, quote! { - }),
    ]
    .into_iter()
    .map(|(op, method, symbol)| {
        let trait_ident = syn::Ident::new(op, name.span());
        DeclarationFragment::extension(
            [op],
            quote! {
                impl ::core::ops::#trait_ident for #name {
                    fn #method(&mut self, rhs: Self) {
                        *self = *self #symbol rhs;
                    }
                }
            },
        )
    });
    binary.chain(assigning).collect()
}

/// `FromIterator` and `Extend`, named with the set spelled out so they match
/// hand-written `impl FromIterator<Shipping>` and `impl FromIterator<Self>`.
fn collection(node: &DeclarationNode) -> [DeclarationFragment; 2] {
    let name = &node.name;
    [
        DeclarationFragment::extension(
            [format!("FromIterator<{name}>")],
            quote! {
                impl ::core::iter::FromIterator<Self> for #name {
                    fn from_iter<__I: ::core::iter::IntoIterator<Item = Self>>(iter: __I) -> Self {
                        iter.into_iter().fold(Self::empty(), |set, option| set | option)
                    }
                }
            },
        ),
        DeclarationFragment::extension(
            [format!("Extend<{name}>")],
            quote! {
                impl ::core::iter::Extend<Self> for #name {
                    fn extend<__I: ::core::iter::IntoIterator<Item = Self>>(&mut self, iter: __I) {
                        for option in iter {
                            *self |= option;
                        }
                    }
                }
            },
        ),
    ]
}

/// A plain integer wrapper is always `Send + Sync`; the assertion keeps that
/// true if an author adds fields through the derive list.
fn thread_safety(node: &DeclarationNode) -> TokenStream {
    let name = &node.name;
    quote! {
        const _: fn() = || {
            fn assert_send_sync<__T: ::core::marker::Send + ::core::marker::Sync>() {}
            assert_send_sync::<#name>();
        };
    }
}
