//! Peer annotations read from property attributes.
//!
//! `#[coding_key("name")]` and `#[coding_default(expr)]` are inert derive
//! helpers: they do nothing on their own and exist only to carry
//! configuration that persistence synthesis reads through the model.

use syn::spanned::Spanned;
use syn::{Attribute, Expr};

use super::AttributeAnnotation;
use crate::diagnostics::{Anchor, Diagnostic, DiagnosticId, error};

pub(crate) const CODING_KEY: &str = "coding_key";
pub(crate) const CODING_DEFAULT: &str = "coding_default";

/// Annotations resolved for one property.
#[derive(Default)]
pub(super) struct ResolvedAnnotations {
    pub annotations: Vec<AttributeAnnotation>,
    pub default_value: Option<Expr>,
}

fn is_peer_annotation(attr: &Attribute) -> bool {
    attr.path().is_ident(CODING_KEY) || attr.path().is_ident(CODING_DEFAULT)
}

/// Parse the single argument of a peer annotation.
///
/// Anything other than one parenthesised expression is ambiguous: the
/// annotation must say exactly one thing.
fn single_argument(attr: &Attribute, name: &str) -> Result<Expr, Diagnostic> {
    attr.parse_args::<Expr>().map_err(|err| {
        error(
            DiagnosticId::AmbiguousAttributeArgument,
            format!("`#[{name}(..)]` takes exactly one argument: {err}"),
            Anchor::new(name, err.span()),
        )
    })
}

fn record_once<T>(
    slot: &mut Option<T>,
    value: T,
    attr: &Attribute,
    name: &str,
) -> Result<(), Diagnostic> {
    if slot.is_some() {
        return Err(error(
            DiagnosticId::AmbiguousAttributeArgument,
            format!("`#[{name}(..)]` may appear at most once per property"),
            Anchor::new(name, attr.span()),
        ));
    }
    *slot = Some(value);
    Ok(())
}

/// Resolve every peer annotation attached to a field.
///
/// All malformed annotations are reported, not just the first.
pub(super) fn resolve(attrs: &[Attribute]) -> Result<ResolvedAnnotations, Vec<Diagnostic>> {
    let mut out = ResolvedAnnotations::default();
    let mut key_seen = None;
    let mut failures = Vec::new();
    for attr in attrs.iter().filter(|attr| is_peer_annotation(attr)) {
        let Some(name) = attr.path().get_ident().cloned() else {
            continue;
        };
        let label = name.to_string();
        let outcome = single_argument(attr, &label).and_then(|argument| {
            let annotation = AttributeAnnotation {
                name: name.clone(),
                argument,
            };
            if name == CODING_KEY {
                if annotation.string_argument().is_none() {
                    return Err(error(
                        DiagnosticId::AmbiguousAttributeArgument,
                        "`#[coding_key(..)]` expects a single string literal",
                        Anchor::new(CODING_KEY, name.span()),
                    ));
                }
                record_once(&mut key_seen, (), attr, CODING_KEY)?;
            } else {
                let default = annotation.argument.clone();
                record_once(&mut out.default_value, default, attr, CODING_DEFAULT)?;
            }
            Ok(annotation)
        });
        match outcome {
            Ok(annotation) => out.annotations.push(annotation),
            Err(diagnostic) => failures.push(diagnostic),
        }
    }
    if failures.is_empty() {
        Ok(out)
    } else {
        Err(failures)
    }
}
