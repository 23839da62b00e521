//! Reduction of host syntax to a [`DeclarationNode`].

use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Fields, Item, ItemEnum, Variant};

use super::annotations;
use super::input::{OptionSetContainer, OptionSetDeclaration};
use super::{
    AssociatedValue, CaseShape, DeclarationKind, DeclarationNode, EnumCase, HostSyntax,
    MemberNode, NestedCase, NestedEnum, Property,
};
use crate::diagnostics::{Anchor, Diagnostic, DiagnosticId, error};

const CONFIG_ATTRIBUTE: &str = "declkit";

fn split_config_attributes(attrs: &[Attribute]) -> (Vec<Attribute>, Vec<Attribute>) {
    attrs
        .iter()
        .cloned()
        .partition(|attr| !attr.path().is_ident(CONFIG_ATTRIBUTE))
}

impl DeclarationNode {
    /// Reduce host syntax to a declaration node.
    ///
    /// Fails without running any strategy when the syntax is not a struct or
    /// enum, when a struct has unnamed fields, or when a peer annotation is
    /// malformed.
    pub(crate) fn build(syntax: &HostSyntax) -> Result<Self, Vec<Diagnostic>> {
        match syntax {
            HostSyntax::Derive(input) => Self::from_derive(input),
            HostSyntax::OptionSet(input) => match &input.declaration {
                OptionSetDeclaration::Container(container) => Self::from_container(container),
                OptionSetDeclaration::Other(item) => Self::from_item(item),
            },
        }
    }

    pub(crate) fn from_derive(input: &DeriveInput) -> Result<Self, Vec<Diagnostic>> {
        let (kind, members) = match &input.data {
            Data::Struct(data) => (DeclarationKind::Struct, struct_members(&data.fields)?),
            Data::Enum(data) => (
                DeclarationKind::Enum,
                data.variants.iter().map(enum_case).collect(),
            ),
            Data::Union(data) => {
                return Err(vec![error(
                    DiagnosticId::StructuralPrecondition,
                    "unions are not supported; expected a struct or enum",
                    Anchor::new(input.ident.to_string(), data.union_token.span),
                )]);
            }
        };
        let (attributes, config_attributes) = split_config_attributes(&input.attrs);
        Ok(Self {
            kind,
            name: input.ident.clone(),
            access_level: input.vis.clone(),
            generics: input.generics.clone(),
            attributes,
            config_attributes,
            members,
        })
    }

    fn from_item(item: &Item) -> Result<Self, Vec<Diagnostic>> {
        let input = match item {
            Item::Struct(item_struct) => DeriveInput::from(item_struct.clone()),
            Item::Enum(item_enum) => DeriveInput::from(item_enum.clone()),
            other => {
                return Err(vec![error(
                    DiagnosticId::StructuralPrecondition,
                    "expected a struct or enum declaration",
                    Anchor::new("item", other.span()),
                )]);
            }
        };
        Self::from_derive(&input)
    }

    fn from_container(container: &OptionSetContainer) -> Result<Self, Vec<Diagnostic>> {
        let mut members = Vec::new();
        let mut failures = Vec::new();
        for item in &container.items {
            match item {
                Item::Enum(nested) => members.push(MemberNode::NestedEnum(nested_enum(nested))),
                other => failures.push(error(
                    DiagnosticId::StructuralPrecondition,
                    "only nested enum declarations may appear in an option set body",
                    Anchor::new("nested item", other.span()),
                )),
            }
        }
        if !failures.is_empty() {
            return Err(failures);
        }
        let (attributes, config_attributes) = split_config_attributes(&container.attrs);
        Ok(Self {
            kind: DeclarationKind::Struct,
            name: container.ident.clone(),
            access_level: container.vis.clone(),
            generics: syn::Generics::default(),
            attributes,
            config_attributes,
            members,
        })
    }
}

fn struct_members(fields: &Fields) -> Result<Vec<MemberNode>, Vec<Diagnostic>> {
    if let Fields::Unnamed(unnamed) = fields {
        return Err(vec![error(
            DiagnosticId::StructuralPrecondition,
            "tuple structs are not supported; declare named fields",
            Anchor::new("fields", unnamed.span()),
        )]);
    }
    let mut members = Vec::new();
    let mut failures = Vec::new();
    for field in fields {
        let Some(name) = field.ident.clone() else {
            continue;
        };
        match annotations::resolve(&field.attrs) {
            Ok(resolved) => members.push(MemberNode::Property(Property {
                name,
                declared_type: field.ty.clone(),
                default_value: resolved.default_value,
                peer_annotations: resolved.annotations,
            })),
            Err(diagnostics) => failures.extend(diagnostics),
        }
    }
    if failures.is_empty() {
        Ok(members)
    } else {
        Err(failures)
    }
}

fn enum_case(variant: &Variant) -> MemberNode {
    let (shape, associated_values) = match &variant.fields {
        Fields::Unit => (CaseShape::Unit, Vec::new()),
        Fields::Unnamed(_) => (CaseShape::Tuple, associated_values(&variant.fields)),
        Fields::Named(_) => (CaseShape::Named, associated_values(&variant.fields)),
    };
    MemberNode::EnumCase(EnumCase {
        name: variant.ident.clone(),
        shape,
        associated_values,
    })
}

fn associated_values(fields: &Fields) -> Vec<AssociatedValue> {
    fields
        .iter()
        .map(|field| AssociatedValue {
            label: field.ident.clone(),
            ty: field.ty.clone(),
        })
        .collect()
}

fn nested_enum(item: &ItemEnum) -> NestedEnum {
    NestedEnum {
        name: item.ident.clone(),
        attributes: item.attrs.clone(),
        raw_type: repr_type(&item.attrs),
        cases: item
            .variants
            .iter()
            .map(|variant| NestedCase {
                name: variant.ident.clone(),
                explicit_raw_value: variant.discriminant.as_ref().map(|(_, expr)| expr.clone()),
            })
            .collect(),
    }
}

/// The primitive named in `#[repr(..)]`, skipping layout hints such as `C`.
fn repr_type(attrs: &[Attribute]) -> Option<syn::Ident> {
    let mut found = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("repr")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.input.peek(syn::token::Paren) {
                let content;
                syn::parenthesized!(content in meta.input);
                content.parse::<proc_macro2::TokenStream>()?;
                return Ok(());
            }
            let Some(ident) = meta.path.get_ident() else {
                return Ok(());
            };
            if ident != "C" && ident != "transparent" && found.is_none() {
                found = Some(ident.clone());
            }
            Ok(())
        });
        // A malformed repr is rustc's to report; treat it as absent here.
        if parsed.is_err() {
            return None;
        }
    }
    found
}
