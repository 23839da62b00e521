//! Routes a macro invocation to its strategy and renders the outcome.
//!
//! Every invocation follows the same path: reduce the host syntax to a
//! [`DeclarationNode`], parse the container configuration, run exactly one
//! strategy, then either render all fragments or render only diagnostics.
//! Nothing here panics; every failure becomes an [`ExpansionResult::Failed`].

use std::collections::HashSet;

use proc_macro2::{Group, TokenStream, TokenTree};
use quote::quote;
use syn::{DeriveInput, Ident, ItemImpl, PathSegment};

use crate::config::{Configuration, parse_configuration};
use crate::diagnostics::{DiagnosticId, from_syn_error, render_errors, render_warnings};
use crate::expansion::{DeclarationFragment, ExpansionResult, Placement};
use crate::model::{DeclarationNode, HostSyntax, OptionSetDeclaration, OptionSetInput};
use crate::strategy::{ExpansionContext, Parameters, StrategyKind};

/// A single invocation: which strategy, on what syntax, with which
/// invocation arguments.
pub(crate) struct MacroRequest {
    pub kind: StrategyKind,
    pub target: HostSyntax,
    pub parameters: Parameters,
}

impl MacroRequest {
    pub(crate) fn derive(kind: StrategyKind, input: DeriveInput) -> Self {
        Self {
            kind,
            target: HostSyntax::Derive(input),
            parameters: Parameters::default(),
        }
    }

    pub(crate) fn option_set(input: OptionSetInput) -> Self {
        let raw_type = match &input.declaration {
            OptionSetDeclaration::Container(container) => container.raw_type.clone(),
            OptionSetDeclaration::Other(_) => None,
        };
        Self {
            kind: StrategyKind::OptionSet,
            target: HostSyntax::OptionSet(input),
            parameters: Parameters { raw_type },
        }
    }
}

fn prepare(request: &MacroRequest) -> Result<(DeclarationNode, Configuration), ExpansionResult> {
    let node = DeclarationNode::build(&request.target).map_err(ExpansionResult::failed)?;
    let configuration = parse_configuration(&node.config_attributes).map_err(|err| {
        ExpansionResult::failed(from_syn_error(
            DiagnosticId::InvalidConfiguration,
            err,
            "declkit",
        ))
    })?;
    Ok((node, configuration))
}

fn run(
    request: &MacroRequest,
    node: &DeclarationNode,
    configuration: &Configuration,
) -> ExpansionResult {
    let context = ExpansionContext {
        parameters: &request.parameters,
        configuration,
        scope: request.target.scope(),
    };
    let result = request.kind.expand(node, &context);
    skip_hand_written(result, &node.name, &context.sibling_impls(node))
}

/// `From<ShippingOptions>` for `impl ::core::convert::From<ShippingOptions>`.
///
/// `Self` in the generic arguments is spelled as `owner`, so
/// `FromIterator<Self>` and `FromIterator<Shipping>` name the same trait.
fn conformance_name(segment: &PathSegment, owner: &Ident) -> String {
    spell_out_self(quote!(#segment), owner)
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn spell_out_self(tokens: TokenStream, owner: &Ident) -> TokenStream {
    tokens
        .into_iter()
        .map(|tree| match tree {
            TokenTree::Ident(ident) if ident == "Self" => TokenTree::Ident(owner.clone()),
            TokenTree::Group(group) => {
                let mut spelled =
                    Group::new(group.delimiter(), spell_out_self(group.stream(), owner));
                spelled.set_span(group.span());
                TokenTree::Group(spelled)
            }
            other => other,
        })
        .collect()
}

/// Drop every extension whose conformances the author already implemented
/// in a sibling `impl`.
fn skip_hand_written(
    result: ExpansionResult,
    owner: &Ident,
    siblings: &[&ItemImpl],
) -> ExpansionResult {
    let written: HashSet<String> = siblings
        .iter()
        .filter_map(|sibling| sibling.trait_.as_ref())
        .filter_map(|(_, path, _)| path.segments.last())
        .map(|segment| conformance_name(segment, owner))
        .collect();
    match result {
        ExpansionResult::Emitted {
            fragments,
            warnings,
        } if !written.is_empty() => ExpansionResult::Emitted {
            fragments: fragments
                .into_iter()
                .filter(|fragment| {
                    fragment.placement != Placement::Extension
                        || fragment.added_conformances.is_empty()
                        || !fragment
                            .added_conformances
                            .iter()
                            .all(|conformance| written.contains(conformance))
                })
                .collect(),
            warnings,
        },
        other => other,
    }
}

/// Expand `request` into a result without rendering it.
#[cfg_attr(
    not(test),
    expect(dead_code, reason = "entry points render through expand_to_tokens")
)]
pub(crate) fn expand(request: &MacroRequest) -> ExpansionResult {
    match prepare(request) {
        Ok((node, configuration)) => run(request, &node, &configuration),
        Err(failed) => failed,
    }
}

/// Expand `request` and render the tokens handed back to the compiler.
///
/// On success the output is, in order: synthesised peers, one inherent
/// `impl` holding every member, the extension impls, any sibling items the
/// invocation carried, and warning shims. On failure it is only the errors.
pub(crate) fn expand_to_tokens(request: &MacroRequest) -> TokenStream {
    let (node, configuration) = match prepare(request) {
        Ok(prepared) => prepared,
        Err(failed) => return render_errors(failed.diagnostics()),
    };
    let result = run(request, &node, &configuration);
    if result.is_failed() {
        return render_errors(result.diagnostics());
    }
    let rendered = render_fragments(&node, result.fragments());
    let scope = request.target.scope();
    let warnings = render_warnings(result.diagnostics());
    quote! {
        #rendered
        #(#scope)*
        #warnings
    }
}

fn render_fragments(node: &DeclarationNode, fragments: &[DeclarationFragment]) -> TokenStream {
    let mut peers = TokenStream::new();
    let mut members = TokenStream::new();
    let mut extensions = TokenStream::new();
    for fragment in fragments {
        let body = fragment.body.clone();
        match fragment.placement {
            Placement::Peer => peers.extend(body),
            Placement::Member => members.extend(body),
            Placement::Extension => extensions.extend(body),
        }
    }
    let inherent = if members.is_empty() {
        TokenStream::new()
    } else {
        let name = &node.name;
        let (impl_generics, ty_generics, where_clause) = node.generics.split_for_impl();
        quote! {
            impl #impl_generics #name #ty_generics #where_clause {
                #members
            }
        }
    };
    quote! {
        #peers
        #inherent
        #extensions
    }
}

#[cfg(test)]
mod tests {
    //! Dispatcher tests: routing, configuration and rendering.
    #![allow(
        unfulfilled_lint_expectations,
        reason = "panicking lints are denied globally; tests may not hit those branches"
    )]
    #![expect(
        clippy::indexing_slicing,
        clippy::panic,
        reason = "tests panic to report unexpected expansions"
    )]

    use super::*;
    use anyhow::{Context, Result, ensure};
    use rstest::rstest;
    use syn::parse_quote;

    const EVERY_KIND: [StrategyKind; 5] = [
        StrategyKind::CaseDetection,
        StrategyKind::MetaMirror,
        StrategyKind::OptionSet,
        StrategyKind::Persistence,
        StrategyKind::AssociatedValues,
    ];

    #[rstest]
    fn every_strategy_yields_a_result_for_any_kind(
        #[values(
            StrategyKind::CaseDetection,
            StrategyKind::MetaMirror,
            StrategyKind::OptionSet,
            StrategyKind::Persistence,
            StrategyKind::AssociatedValues
        )]
        kind: StrategyKind,
        #[values(
            parse_quote! { enum Animal { Dog, Cat(i32) } },
            parse_quote! { struct Settings { flag: bool } },
            parse_quote! { union Bits { a: u8 } },
            parse_quote! { struct Pair(u8, u8); }
        )]
        input: DeriveInput,
    ) {
        let result = expand(&MacroRequest::derive(kind, input));
        if result.is_failed() {
            assert!(result.fragments().is_empty());
            assert!(result.diagnostics().iter().any(|d| d.is_error()));
        }
    }

    #[rstest]
    fn unions_fail_before_any_strategy_runs() {
        for kind in EVERY_KIND {
            let result = expand(&MacroRequest::derive(
                kind,
                parse_quote! { union Bits { a: u8 } },
            ));
            let [diagnostic] = result.diagnostics() else {
                panic!("expected exactly one diagnostic for {kind:?}");
            };
            assert_eq!(diagnostic.id, DiagnosticId::StructuralPrecondition);
        }
    }

    #[rstest]
    fn invalid_configuration_is_reported() {
        let result = expand(&MacroRequest::derive(
            StrategyKind::CaseDetection,
            parse_quote! {
                #[declkit(prefix = "x")]
                enum Animal { Dog }
            },
        ));
        assert_eq!(result.diagnostics()[0].id, DiagnosticId::InvalidConfiguration);
        assert!(result.fragments().is_empty());
    }

    #[rstest]
    fn members_share_one_generic_inherent_impl() -> Result<()> {
        let tokens = expand_to_tokens(&MacroRequest::derive(
            StrategyKind::CaseDetection,
            parse_quote! {
                enum Tree<T> where T: Clone { Leaf(T), Empty }
            },
        ));
        let file: syn::File = syn::parse2(tokens).context("expansion should parse")?;
        let [syn::Item::Impl(inherent)] = file.items.as_slice() else {
            anyhow::bail!("expected a single inherent impl");
        };
        ensure!(inherent.trait_.is_none());
        ensure!(inherent.generics.params.len() == 1);
        ensure!(inherent.generics.where_clause.is_some());
        ensure!(inherent.items.len() == 2);
        Ok(())
    }

    #[rstest]
    fn failures_render_only_errors() {
        let tokens = expand_to_tokens(&MacroRequest::derive(
            StrategyKind::CaseDetection,
            parse_quote! { struct Point { x: i32 } },
        ));
        let rendered = tokens.to_string();
        assert!(rendered.contains("compile_error"));
        assert!(!rendered.contains("fn is_"), "no partial output: {rendered}");
    }

    #[rstest]
    fn option_set_scope_is_re_emitted() -> Result<()> {
        let input: OptionSetInput = syn::parse2(quote! {
            pub struct Shipping: u8 {
                #[repr(u8)]
                enum Options { NextDay }
            }

            impl Shipping {
                pub fn label(&self) -> &'static str { "shipping" }
            }
        })
        .context("option set input should parse")?;
        let request = MacroRequest::option_set(input);
        ensure!(request.parameters.raw_type.is_some());
        let file: syn::File =
            syn::parse2(expand_to_tokens(&request)).context("expansion should parse")?;
        let handwritten = file.items.iter().any(|item| match item {
            syn::Item::Impl(item_impl) => item_impl.items.iter().any(|member| {
                matches!(member, syn::ImplItem::Fn(f) if f.sig.ident == "label")
            }),
            _ => false,
        });
        ensure!(handwritten, "sibling impl should survive expansion");
        Ok(())
    }

    #[rstest]
    fn option_set_context_sees_sibling_impls() -> Result<()> {
        let input: OptionSetInput = syn::parse2(quote! {
            struct Shipping {
                #[repr(u8)]
                enum Options { NextDay }
            }
            impl Shipping {}
            impl Other {}
        })
        .context("option set input should parse")?;
        let request = MacroRequest::option_set(input);
        let node = DeclarationNode::build(&request.target)
            .map_err(|_| anyhow::anyhow!("model should build"))?;
        let configuration = Configuration::default();
        let context = ExpansionContext {
            parameters: &request.parameters,
            configuration: &configuration,
            scope: request.target.scope(),
        };
        ensure!(context.sibling_impls(&node).len() == 1);
        Ok(())
    }

    #[rstest]
    fn warnings_render_as_deprecation_shims() -> Result<()> {
        let input: OptionSetInput = syn::parse2(quote! {
            struct Shipping {
                #[repr(u8)]
                enum Options { NextDay = 3 }
            }
        })
        .context("option set input should parse")?;
        let rendered = expand_to_tokens(&MacroRequest::option_set(input)).to_string();
        ensure!(rendered.contains("deprecated"), "missing warning shim: {rendered}");
        ensure!(rendered.contains("ignored-discriminant"));
        Ok(())
    }

    #[rstest]
    fn hand_written_conformances_are_not_synthesised() -> Result<()> {
        let input: OptionSetInput = syn::parse2(quote! {
            struct Shipping {
                #[repr(u8)]
                enum Options { NextDay }
            }

            impl ::core::convert::From<ShippingOptions> for Shipping {
                fn from(_: ShippingOptions) -> Self {
                    Self::NEXT_DAY
                }
            }

            impl ::core::ops::BitOr for Shipping {
                type Output = Self;
                fn bitor(self, rhs: Self) -> Self {
                    Self::from_raw_value(self.raw_value() | rhs.raw_value())
                }
            }

            impl FromIterator<Self> for Shipping {
                fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
                    iter.into_iter().fold(Self::NEXT_DAY, |set, option| set | option)
                }
            }
        })
        .context("option set input should parse")?;
        let result = expand(&MacroRequest::option_set(input));
        let conformances: Vec<_> = result.added_conformances().collect();
        for written in ["From<ShippingOptions>", "BitOr", "FromIterator<Shipping>"] {
            ensure!(!conformances.contains(&written), "{written} was synthesised again");
        }
        for remaining in ["BitAnd", "BitOrAssign", "Extend<Shipping>"] {
            ensure!(conformances.contains(&remaining), "{remaining} is missing");
        }
        Ok(())
    }

    #[rstest]
    #[case::plain(quote!(BitOr), "BitOr")]
    #[case::own_name(quote!(FromIterator<Shipping>), "FromIterator<Shipping>")]
    #[case::self_alias(quote!(FromIterator<Self>), "FromIterator<Shipping>")]
    #[case::nested(quote!(Extend<Option<Self>>), "Extend<Option<Shipping>>")]
    fn conformance_names_spell_out_self(
        #[case] segment: TokenStream,
        #[case] expected: &str,
    ) -> Result<()> {
        let segment: PathSegment = syn::parse2(segment).context("segment should parse")?;
        let owner = Ident::new("Shipping", proc_macro2::Span::call_site());
        ensure!(conformance_name(&segment, &owner) == expected);
        Ok(())
    }
}
