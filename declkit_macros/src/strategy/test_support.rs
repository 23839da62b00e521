//! Helpers shared by the strategy unit tests.
#![allow(
    unfulfilled_lint_expectations,
    reason = "panicking lints are denied globally; tests may not hit those branches"
)]
#![expect(
    clippy::expect_used,
    reason = "tests panic to report unexpected expansions"
)]

use anyhow::{Context, Result};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, File, ImplItem, Item, Type};

use super::StrategyKind;
use crate::dispatch::{MacroRequest, expand};
use crate::expansion::{ExpansionResult, Placement};
use crate::model::OptionSetInput;

pub(super) fn run(kind: StrategyKind, input: DeriveInput) -> ExpansionResult {
    expand(&MacroRequest::derive(kind, input))
}

pub(super) fn run_option_set(tokens: TokenStream) -> ExpansionResult {
    let input: OptionSetInput = syn::parse2(tokens).expect("option set input should parse");
    expand(&MacroRequest::option_set(input))
}

/// Parse the fragments of a non-generic expansion as a file, wrapping
/// members in an inherent impl for `name`.
pub(super) fn parse_expansion(result: &ExpansionResult, name: &str) -> Result<File> {
    let owner = format_ident!("{name}");
    let mut items = TokenStream::new();
    let mut members = TokenStream::new();
    for fragment in result.fragments() {
        match fragment.placement {
            Placement::Member => members.extend(fragment.body.clone()),
            Placement::Peer | Placement::Extension => items.extend(fragment.body.clone()),
        }
    }
    syn::parse2(quote! {
        #items
        impl #owner { #members }
    })
    .context("expansion should parse as items")
}

fn self_named(ty: &Type, name: &str) -> bool {
    matches!(ty, Type::Path(path) if path.path.is_ident(name))
}

fn inherent_items<'f>(file: &'f File, name: &'f str) -> impl Iterator<Item = &'f ImplItem> {
    file.items
        .iter()
        .filter_map(move |item| match item {
            Item::Impl(item_impl)
                if item_impl.trait_.is_none() && self_named(&item_impl.self_ty, name) =>
            {
                Some(item_impl.items.iter())
            }
            _ => None,
        })
        .flatten()
}

pub(super) fn inherent_fn_names(file: &File, name: &str) -> Vec<String> {
    inherent_items(file, name)
        .filter_map(|item| match item {
            ImplItem::Fn(f) => Some(f.sig.ident.to_string()),
            _ => None,
        })
        .collect()
}

pub(super) fn inherent_const_names(file: &File, name: &str) -> Vec<String> {
    inherent_items(file, name)
        .filter_map(|item| match item {
            ImplItem::Const(c) => Some(c.ident.to_string()),
            _ => None,
        })
        .collect()
}

/// The last path segment of every trait implemented in `file`, in order.
pub(super) fn trait_impls(file: &File) -> Vec<String> {
    file.items
        .iter()
        .filter_map(|item| match item {
            Item::Impl(item_impl) => item_impl
                .trait_
                .as_ref()
                .and_then(|(_, path, _)| path.segments.last())
                .map(|segment| segment.ident.to_string()),
            _ => None,
        })
        .collect()
}

pub(super) fn enum_variants(file: &File, name: &str) -> Vec<String> {
    file.items
        .iter()
        .find_map(|item| match item {
            Item::Enum(item_enum) if item_enum.ident == name => Some(
                item_enum
                    .variants
                    .iter()
                    .map(|variant| variant.ident.to_string())
                    .collect(),
            ),
            _ => None,
        })
        .unwrap_or_default()
}
