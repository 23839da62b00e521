//! Expansion results and the fragments a strategy emits.

use proc_macro2::TokenStream;

use crate::diagnostics::Diagnostic;

/// Where a fragment lands relative to the expanded declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Placement {
    /// An associated item, gathered into the type's inherent `impl`.
    Member,
    /// A complete trait `impl` adding a conformance.
    Extension,
    /// A sibling item such as a synthesised companion type.
    Peer,
}

#[derive(Clone, Debug)]
pub(crate) struct DeclarationFragment {
    pub placement: Placement,
    pub added_conformances: Vec<String>,
    pub body: TokenStream,
}

impl DeclarationFragment {
    pub(crate) const fn member(body: TokenStream) -> Self {
        Self {
            placement: Placement::Member,
            added_conformances: Vec::new(),
            body,
        }
    }

    pub(crate) const fn peer(body: TokenStream) -> Self {
        Self {
            placement: Placement::Peer,
            added_conformances: Vec::new(),
            body,
        }
    }

    pub(crate) fn extension<I, S>(conformances: I, body: TokenStream) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            placement: Placement::Extension,
            added_conformances: conformances.into_iter().map(Into::into).collect(),
            body,
        }
    }
}

/// Outcome of a single macro invocation.
///
/// Expansion is all-or-nothing: `Failed` never carries fragments, so the
/// host can never observe a partially synthesised type.
#[derive(Debug)]
pub(crate) enum ExpansionResult {
    Emitted {
        fragments: Vec<DeclarationFragment>,
        warnings: Vec<Diagnostic>,
    },
    Failed {
        diagnostics: Vec<Diagnostic>,
    },
}

impl ExpansionResult {
    pub(crate) fn failed(diagnostics: impl Into<Vec<Diagnostic>>) -> Self {
        Self::Failed {
            diagnostics: diagnostics.into(),
        }
    }

    pub(crate) const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub(crate) fn fragments(&self) -> &[DeclarationFragment] {
        match self {
            Self::Emitted { fragments, .. } => fragments,
            Self::Failed { .. } => &[],
        }
    }

    pub(crate) fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Emitted { warnings, .. } => warnings,
            Self::Failed { diagnostics } => diagnostics,
        }
    }

    /// Every conformance the emitted fragments add, in emission order.
    #[cfg(test)]
    pub(crate) fn added_conformances(&self) -> impl Iterator<Item = &str> {
        self.fragments()
            .iter()
            .flat_map(|f| f.added_conformances.iter().map(String::as_str))
    }
}
