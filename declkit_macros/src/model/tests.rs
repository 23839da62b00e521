//! Unit tests for building declaration nodes from host syntax.
#![allow(
    unfulfilled_lint_expectations,
    reason = "panicking lints are denied globally; tests may not hit those branches"
)]
#![expect(
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    reason = "tests panic to report unexpected expansions"
)]

use super::*;
use crate::diagnostics::DiagnosticId;
use anyhow::{Context, Result, anyhow, ensure};
use quote::quote;
use rstest::rstest;
use syn::{DeriveInput, parse_quote};

fn build(input: DeriveInput) -> Result<DeclarationNode> {
    DeclarationNode::build(&HostSyntax::Derive(input)).map_err(|diagnostics| {
        anyhow!(
            "model should build: {:?}",
            diagnostics.iter().map(|d| &d.message).collect::<Vec<_>>()
        )
    })
}

fn build_err(input: DeriveInput) -> Vec<DiagnosticId> {
    match DeclarationNode::build(&HostSyntax::Derive(input)) {
        Ok(_) => Vec::new(),
        Err(diagnostics) => diagnostics.iter().map(|d| d.id).collect(),
    }
}

#[rstest]
fn enums_keep_case_order_and_shapes() -> Result<()> {
    let node = build(parse_quote! {
        pub enum Animal { Dog, Cat(i32), Bird { wings: u8, name: String } }
    })?;
    ensure!(node.kind == DeclarationKind::Enum);
    let shapes: Vec<_> = node.enum_cases().map(|case| case.shape).collect();
    ensure!(shapes == [CaseShape::Unit, CaseShape::Tuple, CaseShape::Named]);
    let bird = node.enum_cases().last().context("bird case")?;
    let labels: Vec<_> = bird
        .associated_values
        .iter()
        .filter_map(|value| value.label.as_ref().map(ToString::to_string))
        .collect();
    ensure!(labels == ["wings", "name"]);
    ensure!(node.stored_properties().next().is_none());
    Ok(())
}

#[rstest]
fn structs_resolve_peer_annotations() -> Result<()> {
    let node = build(parse_quote! {
        struct Settings {
            #[coding_key("test")]
            #[coding_default(8.0)]
            rounding: f64,
            #[serde(skip)]
            show_count: bool,
        }
    })?;
    let mut properties = node.stored_properties();
    let rounding = properties.next().context("rounding")?;
    let key = node
        .peer_annotation(rounding, CODING_KEY)
        .and_then(AttributeAnnotation::string_argument)
        .context("coding key")?;
    ensure!(key.value() == "test");
    ensure!(rounding.default_value.is_some());
    ensure!(rounding.peer_annotations.len() == 2);

    let show_count = properties.next().context("show_count")?;
    ensure!(show_count.peer_annotations.is_empty(), "foreign attributes are not peers");
    ensure!(node.peer_annotation(show_count, CODING_KEY).is_none());
    Ok(())
}

#[rstest]
#[case::non_string_key(parse_quote! { struct S { #[coding_key(name)] a: u8 } })]
#[case::two_arguments(parse_quote! { struct S { #[coding_key("a", "b")] a: u8 } })]
#[case::repeated_default(parse_quote! { struct S { #[coding_default(1)] #[coding_default(2)] a: u8 } })]
fn malformed_annotations_are_ambiguous(#[case] input: DeriveInput) {
    assert_eq!(build_err(input), [DiagnosticId::AmbiguousAttributeArgument]);
}

#[rstest]
fn every_malformed_annotation_is_reported() {
    let ids = build_err(parse_quote! {
        struct S {
            #[coding_key(1)]
            a: u8,
            #[coding_key(2)]
            b: u8,
        }
    });
    assert_eq!(ids.len(), 2);
}

#[rstest]
#[case::union(parse_quote! { union Bits { a: u8, b: i8 } })]
#[case::tuple_struct(parse_quote! { struct Pair(u8, u8); })]
fn unsupported_shapes_fail_to_build(#[case] input: DeriveInput) {
    assert_eq!(build_err(input), [DiagnosticId::StructuralPrecondition]);
}

#[rstest]
fn unit_structs_have_no_properties() -> Result<()> {
    let node = build(parse_quote! { struct Marker; })?;
    ensure!(node.kind == DeclarationKind::Struct);
    ensure!(node.members.is_empty());
    Ok(())
}

#[rstest]
fn configuration_attributes_are_split_out() -> Result<()> {
    let node = build(parse_quote! {
        #[derive(Debug)]
        #[declkit(meta = "Kind")]
        enum Animal { Dog }
    })?;
    ensure!(node.attributes.len() == 1);
    ensure!(node.config_attributes.len() == 1);
    Ok(())
}

fn option_set_node(tokens: proc_macro2::TokenStream) -> Result<DeclarationNode> {
    let input: OptionSetInput = syn::parse2(tokens).context("option set input should parse")?;
    DeclarationNode::build(&HostSyntax::OptionSet(input)).map_err(|_| anyhow!("model should build"))
}

#[rstest]
#[case::plain(quote! { #[repr(u16)] }, Some("u16"))]
#[case::with_layout(quote! { #[repr(C, u8)] }, Some("u8"))]
#[case::aligned(quote! { #[repr(align(8), i32)] }, Some("i32"))]
#[case::missing(quote! {}, None)]
fn nested_enums_record_their_representation(
    #[case] repr: proc_macro2::TokenStream,
    #[case] expected: Option<&str>,
) -> Result<()> {
    let node = option_set_node(quote! {
        struct Flags {
            #repr
            enum Options { A, B = 4 }
        }
    })?;
    let options = node.first_nested_enum("Options").context("options enum")?;
    ensure!(options.raw_type.as_ref().map(ToString::to_string).as_deref() == expected);
    ensure!(options.cases.len() == 2);
    ensure!(options.cases.iter().filter(|case| case.explicit_raw_value.is_some()).count() == 1);
    Ok(())
}

#[rstest]
fn option_set_bodies_accept_only_enums() {
    let input: OptionSetInput = syn::parse2(quote! {
        struct Flags {
            #[repr(u8)]
            enum Options { A }
            const LIMIT: u8 = 3;
        }
    })
    .expect("option set input should parse");
    let Err(diagnostics) = DeclarationNode::build(&HostSyntax::OptionSet(input)) else {
        panic!("a const item should be rejected");
    };
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].anchor.label(), "nested item");
}

#[rstest]
fn sibling_impls_match_the_declaration_name() -> Result<()> {
    let node = build(parse_quote! { struct Shipping { a: u8 } })?;
    let scope: Vec<Item> = vec![
        parse_quote! { impl Shipping { fn f(&self) {} } },
        parse_quote! { impl crate::model::Shipping { } },
        parse_quote! { impl ::core::fmt::Debug for Shipping { fn fmt(&self, _: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result { Ok(()) } } },
        parse_quote! { impl Other { } },
        parse_quote! { fn free() {} },
    ];
    ensure!(sibling_impls(&node, &scope).len() == 3);
    Ok(())
}
