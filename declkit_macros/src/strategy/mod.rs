//! The five expansion strategies.
//!
//! Each strategy is a pure function from a [`DeclarationNode`] plus its
//! [`ExpansionContext`] to an [`ExpansionResult`]. Strategies validate every
//! precondition before synthesising anything, so a failure never leaves
//! half-built fragments behind.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Item, ItemImpl, Type};

use crate::config::Configuration;
use crate::diagnostics::{DiagnosticId, error};
use crate::expansion::ExpansionResult;
use crate::model::{DeclarationKind, DeclarationNode, EnumCase, sibling_impls};

mod associated_values;
mod case_detection;
mod meta_mirror;
mod option_set;
mod persistence;
#[cfg(test)]
mod test_support;

/// The closed set of strategies a host can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StrategyKind {
    CaseDetection,
    MetaMirror,
    OptionSet,
    Persistence,
    AssociatedValues,
}

impl StrategyKind {
    /// The macro identifier the host registers this strategy under.
    pub(crate) const fn macro_name(self) -> &'static str {
        match self {
            Self::CaseDetection => "CaseDetection",
            Self::MetaMirror => "MetaMirror",
            Self::OptionSet => "option_set",
            Self::Persistence => "Persistence",
            Self::AssociatedValues => "AssociatedValues",
        }
    }

    pub(crate) fn expand(
        self,
        node: &DeclarationNode,
        context: &ExpansionContext<'_>,
    ) -> ExpansionResult {
        match self {
            Self::CaseDetection => case_detection::expand(node),
            Self::MetaMirror => meta_mirror::expand(node, context),
            Self::OptionSet => option_set::expand(node, context),
            Self::Persistence => persistence::expand(node, context),
            Self::AssociatedValues => associated_values::expand(node),
        }
    }
}

/// Kind-specific arguments supplied with the invocation itself.
#[derive(Default, Clone)]
pub(crate) struct Parameters {
    /// Storage integer requested for an option set (`struct Name: u16`).
    pub raw_type: Option<Type>,
}

/// Everything a strategy may consult besides the declaration.
pub(crate) struct ExpansionContext<'a> {
    pub parameters: &'a Parameters,
    pub configuration: &'a Configuration,
    /// Sibling items visible to the macro, for strategies that want to
    /// inspect what the author already wrote.
    pub scope: &'a [Item],
}

impl<'a> ExpansionContext<'a> {
    pub(crate) fn krate(&self) -> TokenStream {
        self.configuration.krate()
    }

    /// Hand-written `impl` blocks for `node` among the visible siblings.
    pub(crate) fn sibling_impls(&self, node: &DeclarationNode) -> Vec<&'a ItemImpl> {
        sibling_impls(node, self.scope)
    }
}

/// Fail unless `node` is of the `expected` kind.
pub(crate) fn require_kind(
    node: &DeclarationNode,
    expected: DeclarationKind,
    strategy: StrategyKind,
) -> Result<(), ExpansionResult> {
    if node.kind == expected {
        return Ok(());
    }
    Err(ExpansionResult::failed(vec![error(
        DiagnosticId::StructuralPrecondition,
        format!(
            "{} can only be applied to {}, but `{}` is {}",
            strategy.macro_name(),
            expected.with_article(),
            node.name,
            node.kind.with_article(),
        ),
        node.anchor(),
    )]))
}

/// A pattern matching `case` while ignoring any payload.
///
/// `Self::Case { .. }` is valid for unit, tuple and struct-like variants.
pub(crate) fn wildcard_pattern(owner: &TokenStream, case: &EnumCase) -> TokenStream {
    let name = &case.name;
    quote! { #owner::#name { .. } }
}

/// The remaining cases as one or-pattern arm, or nothing when `case` is the
/// only one. Listing them keeps every generated match exhaustive without a
/// wildcard.
pub(crate) fn other_cases_arm(
    owner: &TokenStream,
    node: &DeclarationNode,
    case: &EnumCase,
    value: &TokenStream,
) -> TokenStream {
    let others: Vec<_> = node
        .enum_cases()
        .filter(|other| other.name != case.name)
        .map(|other| wildcard_pattern(owner, other))
        .collect();
    if others.is_empty() {
        TokenStream::new()
    } else {
        quote! { #(#others)|* => #value, }
    }
}
