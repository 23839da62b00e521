//! Container configuration read from `#[declkit(...)]`.
//!
//! Two keys are recognised:
//!
//! - `crate = "path"` replaces the `::declkit` prefix in generated code so
//!   the runtime crate can be renamed or re-exported.
//! - `meta = "Name"` overrides the companion type name chosen by
//!   `MetaMirror`.
//!
//! Unlike derive helpers that silently discard unknown keys, every key here
//! changes generated code, so a typo is rejected rather than ignored.

use proc_macro2::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Ident, LitStr};

#[derive(Default, Clone)]
pub(crate) struct Configuration {
    /// Overrides the generated crate path for dependency aliasing.
    pub crate_path: Option<syn::Path>,
    /// Overrides the `MetaMirror` companion type name.
    pub meta_name: Option<Ident>,
}

impl Configuration {
    /// Tokens naming the runtime crate in generated code.
    pub(crate) fn krate(&self) -> TokenStream {
        resolve(self.crate_path.as_ref())
    }
}

fn lit_str(meta: &ParseNestedMeta, key: &str) -> syn::Result<LitStr> {
    let value = meta.value()?;
    value
        .parse::<LitStr>()
        .map_err(|err| syn::Error::new(err.span(), format!("{key} must be a string")))
}

/// Parse every `#[declkit(...)]` attribute, later keys overriding earlier ones.
pub(crate) fn parse_configuration(attrs: &[Attribute]) -> syn::Result<Configuration> {
    let mut out = Configuration::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("declkit")) {
        attr.parse_nested_meta(|meta| {
            match meta.path.get_ident().map(ToString::to_string).as_deref() {
                Some("crate") => {
                    let s = lit_str(&meta, "crate")?;
                    let path: syn::Path =
                        syn::parse_str(&s.value()).map_err(|e| syn::Error::new(s.span(), e))?;
                    out.crate_path = Some(path);
                    Ok(())
                }
                Some("meta") => {
                    let s = lit_str(&meta, "meta")?;
                    let mut ident: Ident =
                        syn::parse_str(&s.value()).map_err(|e| syn::Error::new(s.span(), e))?;
                    ident.set_span(s.span());
                    out.meta_name = Some(ident);
                    Ok(())
                }
                _ => Err(meta.error(
                    "unsupported declkit option; expected `crate = \"..\"` or `meta = \"..\"`",
                )),
            }
        })?;
    }
    Ok(out)
}

/// Resolve the crate path from the parsed container attribute.
///
/// Defaults to `::declkit` when no override is present.
///
/// # Examples
///
/// ```rust,ignore
/// let default = resolve(None);
/// assert_eq!(default.to_string(), ":: declkit");
///
/// let path: syn::Path = syn::parse_str("my_alias").unwrap();
/// let aliased = resolve(Some(&path));
/// assert_eq!(aliased.to_string(), "my_alias");
/// ```
pub(crate) fn resolve(crate_path: Option<&syn::Path>) -> TokenStream {
    crate_path.map_or_else(|| quote! { ::declkit }, |path| quote! { #path })
}
