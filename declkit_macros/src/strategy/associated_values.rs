//! `AssociatedValues`: optional accessors for enum payloads.
//!
//! A case with a single payload gets one accessor named after the case. A
//! case with several gets one accessor per position, suffixed with the
//! field label or, for tuple cases, the index:
//!
//! ```text
//! enum Shape { Circle(f64), Rect { w: f64, h: f64 }, Pair(u8, u8) }
//!
//! fn circle(&self) -> Option<&f64>
//! fn rect_w(&self) -> Option<&f64>
//! fn rect_h(&self) -> Option<&f64>
//! fn pair_0(&self) -> Option<&u8>
//! fn pair_1(&self) -> Option<&u8>
//! ```

use proc_macro2::TokenStream;
use quote::quote;
use syn::Ident;

use super::{StrategyKind, other_cases_arm, require_kind};
use crate::diagnostics::Diagnostics;
use crate::expansion::{DeclarationFragment, ExpansionResult};
use crate::model::{AssociatedValue, CaseShape, DeclarationKind, DeclarationNode, EnumCase};
use crate::names::{accessor_ident, ensure_unique};

pub(super) fn expand(node: &DeclarationNode) -> ExpansionResult {
    try_expand(node).unwrap_or_else(|failed| failed)
}

struct Accessor<'a> {
    case: &'a EnumCase,
    position: usize,
    value: &'a AssociatedValue,
    ident: Ident,
}

fn accessors(node: &DeclarationNode) -> Vec<Accessor<'_>> {
    node.enum_cases()
        .flat_map(|case| {
            let single = case.associated_values.len() == 1;
            case.associated_values
                .iter()
                .enumerate()
                .map(move |(position, value)| {
                    let suffix = if single {
                        None
                    } else {
                        Some(
                            value
                                .label
                                .as_ref()
                                .map_or_else(|| position.to_string(), ToString::to_string),
                        )
                    };
                    Accessor {
                        case,
                        position,
                        value,
                        ident: accessor_ident(&case.name, suffix.as_deref()),
                    }
                })
        })
        .collect()
}

/// `Self::Case(_, __value, ..)` or `Self::Case { label: __value, .. }`.
fn binding_pattern(accessor: &Accessor<'_>) -> TokenStream {
    let case = &accessor.case.name;
    match (accessor.case.shape, &accessor.value.label) {
        (CaseShape::Named, Some(label)) => quote! { Self::#case { #label: __value, .. } },
        _ => {
            let skipped = (0..accessor.position).map(|_| quote! { _ });
            quote! { Self::#case(#(#skipped,)* __value, ..) }
        }
    }
}

fn try_expand(node: &DeclarationNode) -> Result<ExpansionResult, ExpansionResult> {
    require_kind(node, DeclarationKind::Enum, StrategyKind::AssociatedValues)?;

    let accessors = accessors(node);
    let diagnostics = Diagnostics::from(ensure_unique(
        accessors
            .iter()
            .map(|accessor| (accessor.ident.clone(), accessor.case.anchor())),
        "accessor",
    ));
    let warnings = diagnostics.check()?;

    let owner = quote! { Self };
    let none = quote! { ::core::option::Option::None };
    let vis = &node.access_level;
    let fragments = accessors
        .iter()
        .map(|accessor| {
            let ident = &accessor.ident;
            let ty = &accessor.value.ty;
            let pattern = binding_pattern(accessor);
            let others = other_cases_arm(&owner, node, accessor.case, &none);
            let doc = format!(
                "The payload of `{}::{}`, or `None` for any other case.",
                node.name, accessor.case.name
            );
            DeclarationFragment::member(quote! {
                #[doc = #doc]
                #[must_use]
                #vis fn #ident(&self) -> ::core::option::Option<&#ty> {
                    match self {
                        #pattern => ::core::option::Option::Some(__value),
                        #others
                    }
                }
            })
        })
        .collect();

    Ok(ExpansionResult::Emitted {
        fragments,
        warnings,
    })
}
