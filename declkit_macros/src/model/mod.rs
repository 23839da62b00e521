//! Normalised, read-only view over the declaration being expanded.
//!
//! The host hands over `syn` syntax; [`DeclarationNode`] reduces it to the
//! handful of facts the strategies care about: the declaration kind, its
//! access level, and its ordered members. Peer annotations are resolved
//! while the node is built so strategies never re-parse attributes.

use std::fmt;

use syn::{
    Attribute, Expr, ExprLit, Generics, Ident, Item, ItemImpl, Lit, LitStr, Type, Visibility,
};

use crate::diagnostics::Anchor;

mod annotations;
mod build;
mod input;
#[cfg(test)]
mod tests;
mod type_utils;

pub(crate) use annotations::CODING_KEY;
pub(crate) use input::{HostSyntax, OptionSetDeclaration, OptionSetInput};
pub(crate) use type_utils::{bare_type_ident, integer_bit_width, option_inner};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DeclarationKind {
    Struct,
    Enum,
}

impl DeclarationKind {
    pub(crate) const fn with_article(self) -> &'static str {
        match self {
            Self::Struct => "a struct",
            Self::Enum => "an enum",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Struct => "struct",
            Self::Enum => "enum",
        })
    }
}

/// The struct or enum a macro is attached to.
#[derive(Clone, Debug)]
pub(crate) struct DeclarationNode {
    pub kind: DeclarationKind,
    pub name: Ident,
    pub access_level: Visibility,
    pub generics: Generics,
    /// Outer attributes other than `#[declkit(...)]`.
    pub attributes: Vec<Attribute>,
    /// `#[declkit(...)]` container configuration, parsed by the dispatcher.
    pub config_attributes: Vec<Attribute>,
    pub members: Vec<MemberNode>,
}

#[derive(Clone, Debug)]
pub(crate) enum MemberNode {
    Property(Property),
    EnumCase(EnumCase),
    NestedEnum(NestedEnum),
}

/// A named stored field.
#[derive(Clone, Debug)]
pub(crate) struct Property {
    pub name: Ident,
    pub declared_type: Type,
    /// Value used when a persisted payload omits this property.
    pub default_value: Option<Expr>,
    pub peer_annotations: Vec<AttributeAnnotation>,
}

/// A peer decoration attached to a [`Property`], such as
/// `#[coding_key("name")]`.
#[derive(Clone, Debug)]
pub(crate) struct AttributeAnnotation {
    pub name: Ident,
    pub argument: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CaseShape {
    Unit,
    Tuple,
    Named,
}

#[derive(Clone, Debug)]
pub(crate) struct EnumCase {
    pub name: Ident,
    pub shape: CaseShape,
    pub associated_values: Vec<AssociatedValue>,
}

#[derive(Clone, Debug)]
pub(crate) struct AssociatedValue {
    pub label: Option<Ident>,
    pub ty: Type,
}

/// An enum declared inside an `option_set!` body.
#[derive(Clone, Debug)]
pub(crate) struct NestedEnum {
    pub name: Ident,
    /// Outer attributes, including `#[repr(..)]`.
    pub attributes: Vec<Attribute>,
    /// The integer named by `#[repr(..)]`, if any.
    pub raw_type: Option<Ident>,
    pub cases: Vec<NestedCase>,
}

#[derive(Clone, Debug)]
pub(crate) struct NestedCase {
    pub name: Ident,
    pub explicit_raw_value: Option<Expr>,
}

impl DeclarationNode {
    pub(crate) fn anchor(&self) -> Anchor {
        Anchor::of(&self.name)
    }

    pub(crate) fn stored_properties(&self) -> impl Iterator<Item = &Property> {
        self.members.iter().filter_map(|member| match member {
            MemberNode::Property(property) => Some(property),
            _ => None,
        })
    }

    pub(crate) fn enum_cases(&self) -> impl Iterator<Item = &EnumCase> {
        self.members.iter().filter_map(|member| match member {
            MemberNode::EnumCase(case) => Some(case),
            _ => None,
        })
    }

    pub(crate) fn nested_enums(&self) -> impl Iterator<Item = &NestedEnum> {
        self.members.iter().filter_map(|member| match member {
            MemberNode::NestedEnum(nested) => Some(nested),
            _ => None,
        })
    }

    pub(crate) fn first_nested_enum(&self, named: &str) -> Option<&NestedEnum> {
        self.nested_enums().find(|nested| nested.name == named)
    }

    pub(crate) fn nested_enums_named<'a>(
        &'a self,
        named: &'a str,
    ) -> impl Iterator<Item = &'a NestedEnum> {
        self.nested_enums().filter(move |nested| nested.name == named)
    }

    /// Look up the peer annotation called `named` attached to `property`.
    pub(crate) fn peer_annotation<'p>(
        &self,
        property: &'p Property,
        named: &str,
    ) -> Option<&'p AttributeAnnotation> {
        property
            .peer_annotations
            .iter()
            .find(|annotation| annotation.name == named)
    }
}

impl AttributeAnnotation {
    /// The argument when it is a string literal.
    pub(crate) const fn string_argument(&self) -> Option<&LitStr> {
        match &self.argument {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) => Some(lit),
            _ => None,
        }
    }
}

impl EnumCase {
    pub(crate) fn anchor(&self) -> Anchor {
        Anchor::of(&self.name)
    }
}

/// Locate hand-written `impl` blocks for `of` among `scope`.
///
/// The dispatcher uses this to drop a synthesised conformance the author
/// already wrote by hand.
pub(crate) fn sibling_impls<'s>(of: &DeclarationNode, scope: &'s [Item]) -> Vec<&'s ItemImpl> {
    scope
        .iter()
        .filter_map(|item| match item {
            Item::Impl(item_impl) if impl_targets(item_impl, &of.name) => Some(item_impl),
            _ => None,
        })
        .collect()
}

fn impl_targets(item_impl: &ItemImpl, name: &Ident) -> bool {
    let Type::Path(path) = item_impl.self_ty.as_ref() else {
        return false;
    };
    path.qself.is_none()
        && path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == *name)
}
