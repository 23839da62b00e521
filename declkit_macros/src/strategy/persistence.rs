//! `Persistence`: keyed serialisation plus a JSON string raw value.
//!
//! Two conformances are synthesised for the same struct.
//!
//! The keyed half emits a `<Name>CodingKeys` enum with one case per stored
//! property and hand-rolled `serde::Serialize`/`serde::Deserialize` impls
//! that honour `#[coding_key("..")]` renames and `#[coding_default(..)]`
//! fallbacks for missing keys.
//!
//! The raw-value half implements `declkit::RawRepresentable` with a
//! `String` raw value: the JSON encoding of the whole struct. Encoding
//! failures produce an empty string and decoding failures produce `None`,
//! both logged through `tracing` by the runtime helpers.

use std::collections::HashMap;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, LitStr};

use super::{ExpansionContext, StrategyKind, require_kind};
use crate::diagnostics::{Anchor, Diagnostic, DiagnosticId, Diagnostics, error};
use crate::expansion::{DeclarationFragment, ExpansionResult};
use crate::model::{CODING_KEY, DeclarationKind, DeclarationNode, Property, option_inner};
use crate::names::{
    companion_type_ident, ensure_unique, ident_from_str, property_name_as_string,
    variant_ident_for_property,
};

pub(super) fn expand(node: &DeclarationNode, context: &ExpansionContext<'_>) -> ExpansionResult {
    try_expand(node, context).unwrap_or_else(|failed| failed)
}

/// One stored property and the key it is persisted under.
struct CodingKey<'a> {
    property: &'a Property,
    variant: Ident,
    key: LitStr,
    local: Ident,
}

impl<'a> CodingKey<'a> {
    fn new(node: &DeclarationNode, property: &'a Property) -> Self {
        let name = property_name_as_string(property);
        let key = node
            .peer_annotation(property, CODING_KEY)
            .and_then(|annotation| annotation.string_argument())
            .cloned()
            .unwrap_or_else(|| LitStr::new(&name, property.name.span()));
        Self {
            property,
            variant: variant_ident_for_property(property),
            key,
            local: ident_from_str(&format!("__field_{name}"), property.name.span()),
        }
    }
}

fn try_expand(
    node: &DeclarationNode,
    context: &ExpansionContext<'_>,
) -> Result<ExpansionResult, ExpansionResult> {
    require_kind(node, DeclarationKind::Struct, StrategyKind::Persistence)?;

    let mut diagnostics = Diagnostics::new();
    if !node.generics.params.is_empty() {
        diagnostics.push(error(
            DiagnosticId::StructuralPrecondition,
            format!(
                "Persistence cannot be applied to `{}` because it has generic parameters",
                node.name
            ),
            node.anchor(),
        ));
    }
    let keys: Vec<_> = node
        .stored_properties()
        .map(|property| CodingKey::new(node, property))
        .collect();
    diagnostics.extend(ensure_unique(
        keys.iter()
            .map(|key| (key.variant.clone(), Anchor::of(&key.property.name))),
        "coding key case",
    ));
    diagnostics.extend(duplicate_keys(&keys));
    let warnings = diagnostics.check()?;

    let krate = context.krate();
    let coding_keys = companion_type_ident(&node.name, "CodingKeys");
    let fragments = vec![
        DeclarationFragment::peer(coding_keys_enum(node, &coding_keys, &keys)),
        DeclarationFragment::extension(
            ["Serialize"],
            serialize(node, &coding_keys, &keys, &krate),
        ),
        DeclarationFragment::extension(
            ["Deserialize"],
            deserialize(node, &coding_keys, &keys, &krate),
        ),
        DeclarationFragment::extension(
            ["RawRepresentable", "Persistable"],
            raw_representable(node, &krate),
        ),
    ];
    Ok(ExpansionResult::Emitted {
        fragments,
        warnings,
    })
}

fn duplicate_keys(keys: &[CodingKey<'_>]) -> Vec<Diagnostic> {
    let mut seen: HashMap<String, &Ident> = HashMap::new();
    let mut duplicates = Vec::new();
    for key in keys {
        let value = key.key.value();
        if let Some(first) = seen.get(&value) {
            duplicates.push(error(
                DiagnosticId::DuplicateCodingKey,
                format!(
                    "`{}` is persisted under \"{value}\", which `{first}` already uses",
                    key.property.name
                ),
                Anchor::new(key.property.name.to_string(), key.key.span()),
            ));
        } else {
            seen.insert(value, &key.property.name);
        }
    }
    duplicates
}

fn coding_keys_enum(node: &DeclarationNode, ident: &Ident, keys: &[CodingKey<'_>]) -> TokenStream {
    let vis = &node.access_level;
    let doc = format!("The keys `{}` is persisted under.", node.name);
    let variants: Vec<_> = keys.iter().map(|key| &key.variant).collect();
    let literals: Vec<_> = keys.iter().map(|key| &key.key).collect();
    quote! {
        #[doc = #doc]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #vis enum #ident {
            #(#variants,)*
        }

        impl #ident {
            /// Every key, in declaration order.
            #vis const ALL: &'static [Self] = &[#(Self::#variants),*];

            /// The serialised spelling of this key.
            #[must_use]
            #vis const fn as_str(self) -> &'static str {
                match self {
                    #(Self::#variants => #literals,)*
                }
            }

            /// The key spelled `key`, if there is one.
            #[must_use]
            #vis fn from_key(key: &str) -> ::core::option::Option<Self> {
                match key {
                    #(#literals => ::core::option::Option::Some(Self::#variants),)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}

fn serialize(
    node: &DeclarationNode,
    coding_keys: &Ident,
    keys: &[CodingKey<'_>],
    krate: &TokenStream,
) -> TokenStream {
    let name = &node.name;
    let name_str = name.to_string();
    let serde = quote! { #krate::__private::serde };
    let count = keys.len();
    let state = if keys.is_empty() {
        quote! { __state }
    } else {
        quote! { mut __state }
    };
    let fields = keys.iter().map(|key| {
        let field = &key.property.name;
        let variant = &key.variant;
        quote! {
            #serde::ser::SerializeStruct::serialize_field(
                &mut __state,
                #coding_keys::#variant.as_str(),
                &self.#field,
            )?;
        }
    });
    quote! {
        impl #serde::Serialize for #name {
            fn serialize<__S>(
                &self,
                __serializer: __S,
            ) -> ::core::result::Result<__S::Ok, __S::Error>
            where
                __S: #serde::Serializer,
            {
                let #state = #serde::Serializer::serialize_struct(__serializer, #name_str, #count)?;
                #(#fields)*
                #serde::ser::SerializeStruct::end(__state)
            }
        }
    }
}

/// The value used when `key` is absent: the declared default, `None` for
/// optional properties, otherwise a `missing_field` error.
fn fallback(key: &CodingKey<'_>, serde: &TokenStream) -> TokenStream {
    if let Some(default) = &key.property.default_value {
        return quote! { #default };
    }
    if option_inner(&key.property.declared_type).is_some() {
        return quote! { ::core::option::Option::None };
    }
    let literal = &key.key;
    quote! {
        return ::core::result::Result::Err(
            <__A::Error as #serde::de::Error>::missing_field(#literal),
        )
    }
}

fn deserialize(
    node: &DeclarationNode,
    coding_keys: &Ident,
    keys: &[CodingKey<'_>],
    krate: &TokenStream,
) -> TokenStream {
    let name = &node.name;
    let name_str = name.to_string();
    let expecting = format!("struct {name}");
    let serde = quote! { #krate::__private::serde };
    let literals: Vec<_> = keys.iter().map(|key| &key.key).collect();
    let fields: Vec<_> = keys.iter().map(|key| &key.property.name).collect();
    let locals: Vec<_> = keys.iter().map(|key| &key.local).collect();

    let declarations = keys.iter().map(|key| {
        let local = &key.local;
        let ty = &key.property.declared_type;
        quote! {
            let mut #local: ::core::option::Option<#ty> = ::core::option::Option::None;
        }
    });
    let arms = keys.iter().map(|key| {
        let local = &key.local;
        let ty = &key.property.declared_type;
        let variant = &key.variant;
        let literal = &key.key;
        quote! {
            ::core::option::Option::Some(#coding_keys::#variant) => {
                if #local.is_some() {
                    return ::core::result::Result::Err(
                        <__A::Error as #serde::de::Error>::duplicate_field(#literal),
                    );
                }
                #local = ::core::option::Option::Some(
                    #serde::de::MapAccess::next_value::<#ty>(&mut __map)?,
                );
            }
        }
    });
    let resolved = keys.iter().map(|key| {
        let local = &key.local;
        let fallback = fallback(key, &serde);
        quote! {
            let #local = match #local {
                ::core::option::Option::Some(__value) => __value,
                ::core::option::Option::None => #fallback,
            };
        }
    });
    let expecting_len = format!("struct {name} with {} elements", keys.len());
    let elements = keys.iter().enumerate().map(|(index, key)| {
        let local = &key.local;
        let ty = &key.property.declared_type;
        let missing = key.property.default_value.as_ref().map_or_else(
            || {
                quote! {
                    return ::core::result::Result::Err(
                        <__A::Error as #serde::de::Error>::invalid_length(#index, &#expecting_len),
                    )
                }
            },
            |default| quote! { #default },
        );
        quote! {
            let #local = match #serde::de::SeqAccess::next_element::<#ty>(&mut __seq)? {
                ::core::option::Option::Some(__value) => __value,
                ::core::option::Option::None => #missing,
            };
        }
    });
    let seq_binding = if keys.is_empty() {
        quote! { __seq }
    } else {
        quote! { mut __seq }
    };

    quote! {
        impl<'de> #serde::Deserialize<'de> for #name {
            fn deserialize<__D>(__deserializer: __D) -> ::core::result::Result<Self, __D::Error>
            where
                __D: #serde::Deserializer<'de>,
            {
                struct __Visitor;

                impl<'__de> #serde::de::Visitor<'__de> for __Visitor {
                    type Value = #name;

                    fn expecting(
                        &self,
                        __formatter: &mut ::core::fmt::Formatter<'_>,
                    ) -> ::core::fmt::Result {
                        __formatter.write_str(#expecting)
                    }

                    fn visit_seq<__A>(
                        self,
                        #seq_binding: __A,
                    ) -> ::core::result::Result<#name, __A::Error>
                    where
                        __A: #serde::de::SeqAccess<'__de>,
                    {
                        #(#elements)*
                        ::core::result::Result::Ok(#name {
                            #(#fields: #locals,)*
                        })
                    }

                    fn visit_map<__A>(
                        self,
                        mut __map: __A,
                    ) -> ::core::result::Result<#name, __A::Error>
                    where
                        __A: #serde::de::MapAccess<'__de>,
                    {
                        #(#declarations)*
                        while let ::core::option::Option::Some(__key) =
                            #serde::de::MapAccess::next_key::<::std::string::String>(&mut __map)?
                        {
                            match #coding_keys::from_key(&__key) {
                                #(#arms)*
                                _ => {
                                    #serde::de::MapAccess::next_value::<#serde::de::IgnoredAny>(
                                        &mut __map,
                                    )?;
                                }
                            }
                        }
                        #(#resolved)*
                        ::core::result::Result::Ok(#name {
                            #(#fields: #locals,)*
                        })
                    }
                }

                #serde::Deserializer::deserialize_struct(
                    __deserializer,
                    #name_str,
                    &[#(#literals),*],
                    __Visitor,
                )
            }
        }
    }
}

fn raw_representable(node: &DeclarationNode, krate: &TokenStream) -> TokenStream {
    let name = &node.name;
    quote! {
        impl #krate::RawRepresentable for #name {
            type RawValue = ::std::string::String;

            fn raw_value(&self) -> ::std::string::String {
                #krate::persistence::encode_raw_value(self)
            }

            fn from_raw_value(raw_value: ::std::string::String) -> ::core::option::Option<Self> {
                #krate::persistence::decode_raw_value(&raw_value)
            }
        }

        impl #krate::Persistable for #name {}
    }
}
