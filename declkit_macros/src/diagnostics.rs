//! Structured diagnostics raised while expanding a declaration.
//!
//! Every precondition failure becomes a [`Diagnostic`] anchored to the
//! offending declaration or member. A single invocation may raise several;
//! [`Diagnostics`] gathers them so the author sees every problem at once
//! rather than fixing them one compile at a time.

use std::fmt;

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote_spanned};
use syn::Ident;

use crate::expansion::ExpansionResult;

/// How seriously the host should treat a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Severity {
    Error,
    Warning,
}

/// Stable identifiers for every diagnostic the engine can raise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DiagnosticId {
    /// Wrong declaration kind or shape for the requested strategy.
    StructuralPrecondition,
    /// Option set synthesis without a nested `Options` enum.
    MissingRequiredNestedDeclaration,
    /// More than one nested `Options` enum.
    DuplicateNestedDeclaration,
    /// `Options` (or the requested storage) is not an integer type.
    UnsupportedRawType,
    /// More options than bits in the storage type.
    OptionSetOverflow,
    /// A peer annotation whose argument is not a single literal.
    AmbiguousAttributeArgument,
    /// Two synthesised members would share one identifier.
    DuplicateSynthesizedName,
    /// Two properties serialise under the same key.
    DuplicateCodingKey,
    /// Malformed `#[declkit(...)]` container attribute.
    InvalidConfiguration,
    /// Explicit discriminant on an `Options` case that bit layout ignores.
    IgnoredDiscriminant,
}

impl DiagnosticId {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::StructuralPrecondition => "structural-precondition",
            Self::MissingRequiredNestedDeclaration => "missing-required-nested-declaration",
            Self::DuplicateNestedDeclaration => "duplicate-nested-declaration",
            Self::UnsupportedRawType => "unsupported-raw-type",
            Self::OptionSetOverflow => "option-set-overflow",
            Self::AmbiguousAttributeArgument => "ambiguous-attribute-argument",
            Self::DuplicateSynthesizedName => "duplicate-synthesized-name",
            Self::DuplicateCodingKey => "duplicate-coding-key",
            Self::InvalidConfiguration => "invalid-configuration",
            Self::IgnoredDiscriminant => "ignored-discriminant",
        }
    }
}

impl fmt::Display for DiagnosticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The node a diagnostic points at.
///
/// `label` names the node for tests and messages; `span` is where the host
/// underlines the problem.
#[derive(Clone, Debug)]
pub(crate) struct Anchor {
    label: String,
    span: Span,
}

impl Anchor {
    pub(crate) fn new(label: impl Into<String>, span: Span) -> Self {
        Self {
            label: label.into(),
            span,
        }
    }

    pub(crate) fn of(ident: &Ident) -> Self {
        Self::new(ident.to_string(), ident.span())
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) const fn span(&self) -> Span {
        self.span
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Diagnostic {
    pub severity: Severity,
    pub id: DiagnosticId,
    pub message: String,
    pub anchor: Anchor,
}

/// Build a diagnostic anchored at `anchor`.
pub(crate) fn make_diagnostic(
    severity: Severity,
    id: DiagnosticId,
    message: impl Into<String>,
    anchor: Anchor,
) -> Diagnostic {
    Diagnostic {
        severity,
        id,
        message: message.into(),
        anchor,
    }
}

/// Shorthand for an `error`-severity diagnostic.
pub(crate) fn error(id: DiagnosticId, message: impl Into<String>, anchor: Anchor) -> Diagnostic {
    make_diagnostic(Severity::Error, id, message, anchor)
}

impl Diagnostic {
    pub(crate) fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    fn to_syn_error(&self) -> syn::Error {
        syn::Error::new(self.anchor.span(), &self.message)
    }

    /// Stable rustc has no warning API for proc macros, so a warning is
    /// rendered as the use of a deprecated item spanned at the anchor.
    fn render_warning(&self) -> TokenStream {
        let note = format!("{} [{}]", self.message, self.id);
        let marker = format_ident!("DeclkitWarning", span = self.anchor.span());
        quote_spanned! {self.anchor.span()=>
            const _: () = {
                #[deprecated(note = #note)]
                struct #marker;
                let _ = #marker;
            };
        }
    }
}

/// Convert a `syn` parse failure into diagnostics, one per combined error.
pub(crate) fn from_syn_error(id: DiagnosticId, err: syn::Error, label: &str) -> Vec<Diagnostic> {
    err.into_iter()
        .map(|e| error(id, e.to_string(), Anchor::new(label, e.span())))
        .collect()
}

/// Diagnostics gathered over a single invocation.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub(crate) fn has_errors(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    /// Fail fast: hand back every diagnostic if any of them is an error.
    pub(crate) fn check(self) -> Result<Vec<Diagnostic>, ExpansionResult> {
        if self.has_errors() {
            Err(ExpansionResult::Failed {
                diagnostics: self.0,
            })
        } else {
            Ok(self.0)
        }
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(value: Vec<Diagnostic>) -> Self {
        Self(value)
    }
}

/// Render error diagnostics as `compile_error!` invocations at their anchors.
pub(crate) fn render_errors(diagnostics: &[Diagnostic]) -> TokenStream {
    let mut errors = diagnostics
        .iter()
        .filter(|d| d.is_error())
        .map(Diagnostic::to_syn_error);
    let Some(mut combined) = errors.next() else {
        return TokenStream::new();
    };
    for next in errors {
        combined.combine(next);
    }
    combined.to_compile_error()
}

pub(crate) fn render_warnings(diagnostics: &[Diagnostic]) -> TokenStream {
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .map(Diagnostic::render_warning)
        .collect()
}
