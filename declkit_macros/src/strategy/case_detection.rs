//! `CaseDetection`: one boolean predicate per enum case.
//!
//! `enum Animal { Dog, Cat(i32) }` gains `is_dog` and `is_cat`, each true for
//! exactly one case regardless of payload.

use quote::quote;

use super::{StrategyKind, other_cases_arm, require_kind, wildcard_pattern};
use crate::diagnostics::Diagnostics;
use crate::expansion::{DeclarationFragment, ExpansionResult};
use crate::model::{DeclarationKind, DeclarationNode};
use crate::names::{ensure_unique, predicate_ident};

pub(super) fn expand(node: &DeclarationNode) -> ExpansionResult {
    try_expand(node).unwrap_or_else(|failed| failed)
}

fn try_expand(node: &DeclarationNode) -> Result<ExpansionResult, ExpansionResult> {
    require_kind(node, DeclarationKind::Enum, StrategyKind::CaseDetection)?;

    let predicates: Vec<_> = node
        .enum_cases()
        .map(|case| (predicate_ident(&case.name), case.anchor()))
        .collect();
    let diagnostics = Diagnostics::from(ensure_unique(predicates.iter().cloned(), "predicate"));
    let warnings = diagnostics.check()?;

    let owner = quote! { Self };
    let vis = &node.access_level;
    let fragments = node
        .enum_cases()
        .zip(predicates)
        .map(|(case, (predicate, _))| {
            let matched = wildcard_pattern(&owner, case);
            let others = other_cases_arm(&owner, node, case, &quote! { false });
            let doc = format!("Returns `true` if `self` is `{}::{}`.", node.name, case.name);
            DeclarationFragment::member(quote! {
                #[doc = #doc]
                #[must_use]
                #vis fn #predicate(&self) -> bool {
                    match self {
                        #matched => true,
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

#[cfg(test)]
mod tests {
    //! Unit tests for case predicate synthesis.
    #![allow(
        unfulfilled_lint_expectations,
        reason = "panicking lints are denied globally; tests may not hit those branches"
    )]
    #![expect(
        clippy::indexing_slicing,
        clippy::panic,
        reason = "tests panic to report unexpected expansions"
    )]

    use super::super::test_support::{inherent_fn_names, parse_expansion, run};
    use super::*;
    use crate::diagnostics::DiagnosticId;
    use anyhow::{Result, ensure};
    use rstest::rstest;
    use syn::parse_quote;

    #[rstest]
    fn one_predicate_per_case_in_order() -> Result<()> {
        let result = run(
            StrategyKind::CaseDetection,
            parse_quote! {
                pub enum Animal { Dog, Cat(i32), Bird { wings: u8 } }
            },
        );
        ensure!(result.fragments().len() == 3, "expected three predicates");
        let file = parse_expansion(&result, "Animal")?;
        ensure!(inherent_fn_names(&file, "Animal") == ["is_dog", "is_cat", "is_bird"]);
        Ok(())
    }

    #[rstest]
    fn single_case_match_has_no_fallback_arm() {
        let result = run(StrategyKind::CaseDetection, parse_quote! { enum Only { One } });
        let body = result.fragments()[0].body.to_string();
        assert!(body.contains("Self :: One { .. } => true"));
        assert!(!body.contains("false"), "no other cases to reject: {body}");
    }

    #[rstest]
    fn predicates_carry_the_enum_visibility() -> Result<()> {
        let result = run(
            StrategyKind::CaseDetection,
            parse_quote! { pub(crate) enum Light { Red, Green } },
        );
        let body = result.fragments()[0].body.to_string();
        ensure!(body.contains("pub (crate) fn is_red"), "unexpected body: {body}");
        Ok(())
    }

    #[rstest]
    fn empty_enum_emits_nothing() {
        let result = run(StrategyKind::CaseDetection, parse_quote! { enum Never {} });
        assert!(!result.is_failed());
        assert!(result.fragments().is_empty());
    }

    #[rstest]
    fn structs_are_rejected() {
        let result = run(StrategyKind::CaseDetection, parse_quote! { struct Point { x: i32 } });
        let [diagnostic] = result.diagnostics() else {
            panic!("expected exactly one diagnostic");
        };
        assert_eq!(diagnostic.id, DiagnosticId::StructuralPrecondition);
        assert_eq!(diagnostic.anchor.label(), "Point");
        assert!(result.fragments().is_empty());
    }

    #[rstest]
    fn colliding_predicates_are_rejected() {
        let result = run(
            StrategyKind::CaseDetection,
            parse_quote! {
                #[allow(non_camel_case_types)]
                enum Loud { Dog, DOG }
            },
        );
        assert!(result.is_failed());
        let [diagnostic] = result.diagnostics() else {
            panic!("expected exactly one diagnostic");
        };
        assert_eq!(diagnostic.id, DiagnosticId::DuplicateSynthesizedName);
        assert_eq!(diagnostic.anchor.label(), "DOG");
    }
}
