//! Deterministic derivation of synthesised identifiers.
//!
//! Every function here is pure: the same source name always yields the same
//! identifier. The single exception is [`NameScope`], whose counter lives
//! only as long as one macro invocation.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use heck::{ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use proc_macro2::Span;
use syn::Ident;
use syn::ext::IdentExt;

use crate::diagnostics::{Anchor, Diagnostic, DiagnosticId, error};
use crate::model::{DeclarationNode, MemberNode, Property};

/// Capitalise the first character only, leaving the rest untouched.
///
/// ```text
/// dog      -> Dog
/// showCount -> ShowCount
/// ```
pub(crate) fn initial_uppercased(identifier: &str) -> String {
    let mut chars = identifier.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// The property's binding name as written, without any `r#` prefix.
pub(crate) fn property_name_as_string(property: &Property) -> String {
    property.name.unraw().to_string()
}

/// Build an identifier, falling back to a raw identifier for keywords.
///
/// `self`, `Self`, `super` and `crate` cannot be raw, so they gain a
/// trailing underscore instead.
///
/// Case conversion strips the underscore from names such as `_0`, so a
/// name that would start with a digit, or be empty, regains a leading `_`.
pub(crate) fn ident_from_str(name: &str, span: Span) -> Ident {
    let candidate = if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name.to_owned()
    };
    match syn::parse_str::<Ident>(&candidate) {
        Ok(mut ident) => {
            ident.set_span(span);
            ident
        }
        Err(_) if matches!(candidate.as_str(), "self" | "Self" | "super" | "crate" | "_") => {
            Ident::new(&format!("{candidate}_"), span)
        }
        Err(_) => Ident::new_raw(&candidate, span),
    }
}

fn snake(ident: &Ident) -> String {
    ident.unraw().to_string().to_snake_case()
}

/// `Dog` becomes `is_dog`.
pub(crate) fn predicate_ident(case: &Ident) -> Ident {
    ident_from_str(&format!("is_{}", snake(case)), case.span())
}

/// `Point` becomes `point`, or `point_x` when a suffix is supplied.
pub(crate) fn accessor_ident(case: &Ident, suffix: Option<&str>) -> Ident {
    let name = suffix.map_or_else(
        || snake(case),
        |suffix| format!("{}_{}", snake(case), suffix.to_snake_case()),
    );
    ident_from_str(&name, case.span())
}

/// `NextDay` becomes `NEXT_DAY`.
pub(crate) fn associated_const_ident(case: &Ident) -> Ident {
    ident_from_str(&case.unraw().to_string().to_shouty_snake_case(), case.span())
}

/// `show_count` becomes `ShowCount`.
pub(crate) fn variant_ident_for_property(property: &Property) -> Ident {
    let name = initial_uppercased(&property_name_as_string(property).to_upper_camel_case());
    ident_from_str(&name, property.name.span())
}

/// A companion type named after `base`, such as `AnimalMeta`.
pub(crate) fn companion_type_ident(base: &Ident, suffix: &str) -> Ident {
    let name = format!("{}{suffix}", initial_uppercased(&base.unraw().to_string()));
    ident_from_str(&name, base.span())
}

/// Unique names for one invocation.
///
/// Seeds itself with every identifier the declaration already uses so a
/// generated binding never shadows one of the author's.
pub(crate) struct NameScope {
    taken: HashSet<String>,
    counter: usize,
}

impl NameScope {
    pub(crate) fn for_declaration(node: &DeclarationNode) -> Self {
        let mut taken = HashSet::new();
        let mut take = |ident: &Ident| {
            taken.insert(ident.unraw().to_string());
        };
        take(&node.name);
        for param in node.generics.type_params() {
            take(&param.ident);
        }
        for param in node.generics.const_params() {
            take(&param.ident);
        }
        for member in &node.members {
            match member {
                MemberNode::Property(property) => take(&property.name),
                MemberNode::EnumCase(case) => {
                    take(&case.name);
                    case.associated_values
                        .iter()
                        .filter_map(|value| value.label.as_ref())
                        .for_each(&mut take);
                }
                MemberNode::NestedEnum(nested) => {
                    take(&nested.name);
                    nested.cases.iter().for_each(|case| take(&case.name));
                }
            }
        }
        Self { taken, counter: 0 }
    }

    /// A fresh identifier derived from `base`, such as `__original` or
    /// `__original_1` when the first choice is taken.
    pub(crate) fn unique(&mut self, base: &str) -> Ident {
        let mut candidate = format!("__{base}");
        while self.taken.contains(&candidate) {
            self.counter += 1;
            candidate = format!("__{base}_{}", self.counter);
        }
        self.taken.insert(candidate.clone());
        Ident::new(&candidate, Span::call_site())
    }
}

/// Report every synthesised identifier that repeats an earlier one.
///
/// Each entry pairs the synthesised identifier with the source node it was
/// derived from; the anchor of the later duplicate carries the diagnostic.
pub(crate) fn ensure_unique<I>(names: I, what: &str) -> Vec<Diagnostic>
where
    I: IntoIterator<Item = (Ident, Anchor)>,
{
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut collisions = Vec::new();
    for (ident, anchor) in names {
        match seen.entry(ident.unraw().to_string()) {
            Entry::Occupied(first) => collisions.push(error(
                DiagnosticId::DuplicateSynthesizedName,
                format!(
                    "{what} `{}` synthesised for `{}` collides with the one synthesised for `{}`",
                    first.key(),
                    anchor.label(),
                    first.get(),
                ),
                anchor,
            )),
            Entry::Vacant(slot) => {
                slot.insert(anchor.label().to_owned());
            }
        }
    }
    collisions
}
