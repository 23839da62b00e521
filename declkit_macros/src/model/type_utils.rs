//! Type introspection helpers.
//!
//! These utilities perform shallow inspection of `syn::Type` values: they
//! recognise `Option<T>` wrappers and primitive integer names. Nothing here
//! resolves aliases, so `type Bits = u8;` is not recognised as an integer.

use syn::{GenericArgument, Ident, PathArguments, Type};

/// Returns the inner type if `ty` is `Option<T>`.
///
/// The check only inspects the final path segment, so `std::option::Option<T>`
/// and `core::option::Option<T>` match as well. It is not recursive:
/// `Option<Option<T>>` yields `Option<T>`.
pub(crate) fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(p) = ty else {
        return None;
    };
    let last = p.path.segments.last()?;
    if last.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// Number of bits available for option flags in the named integer type.
///
/// Pointer-sized integers count as 32 bits so an option set keeps the same
/// capacity on every supported target.
pub(crate) fn integer_bit_width(ident: &Ident) -> Option<u32> {
    let width = match ident.to_string().as_str() {
        "u8" | "i8" => 8,
        "u16" | "i16" => 16,
        "u32" | "i32" | "usize" | "isize" => 32,
        "u64" | "i64" => 64,
        "u128" | "i128" => 128,
        _ => return None,
    };
    Some(width)
}

/// The identifier of a bare single-segment type path such as `u16`.
pub(crate) fn bare_type_ident(ty: &Type) -> Option<&Ident> {
    let Type::Path(p) = ty else {
        return None;
    };
    if p.qself.is_some() {
        return None;
    }
    p.path.get_ident()
}
