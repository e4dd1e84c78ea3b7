//! Utility functions for procedural macros
//!
//! This module contains the type classification helpers shared by the
//! `Mappable` derive: mapping Rust field types onto the engine's field
//! kinds and rendering normalized type names for the field catalog.

use syn::Type;

/// The mapping kind a Rust field type falls into
///
/// Mirrors the `FieldKind` enum in the view-mapper crate. The derive macro
/// classifies every struct field into one of these so it can generate the
/// right setter and getter arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Boolean value
    Bool,
    /// Integer value of any width
    Int,
    /// Floating point value
    Float,
    /// Text value
    Str,
    /// Date or date-time value
    Date,
    /// Nested view model
    Complex,
    /// Collection of nested view models
    Collection,
}

/// Classification result for a single struct field
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// The mapping kind of the field
    pub kind: FieldKind,
    /// Whether the field is wrapped in `Option<T>`
    pub nullable: bool,
    /// Normalized display name, e.g. `"Vec<MediaFile>"` or `"i32"`
    pub display: String,
    /// The field type with any `Option` wrapper stripped
    pub inner: Type,
}

const INT_IDENTS: &[&str] = &[
    "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize",
];

/// Classify a field type into its mapping kind
pub fn classify(ty: &Type) -> TypeInfo {
    if let Some(inner) = option_inner(ty) {
        let mut info = classify(inner);
        info.nullable = true;
        info
    } else {
        let display = type_display(ty);
        let kind = match last_ident(ty).as_deref() {
            Some("String" | "str") => FieldKind::Str,
            Some(ident) if INT_IDENTS.contains(&ident) => FieldKind::Int,
            Some("f32" | "f64") => FieldKind::Float,
            Some("bool") => FieldKind::Bool,
            Some("NaiveDate" | "NaiveDateTime") => FieldKind::Date,
            Some("Vec") => FieldKind::Collection,
            _ => FieldKind::Complex,
        };
        TypeInfo {
            kind,
            nullable: false,
            display,
            inner: ty.clone(),
        }
    }
}

/// Extract the inner type of an `Option<T>`, if the type is one
pub fn option_inner(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident != "Option" {
            return None;
        }
        if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
            if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                return Some(inner);
            }
        }
    }
    None
}

/// The identifier of the last path segment, e.g. `Vec` for `std::vec::Vec<T>`
pub fn last_ident(ty: &Type) -> Option<String> {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
    } else {
        None
    }
}

/// Render a normalized type name with module paths stripped
///
/// `models::media::MediaFile` becomes `MediaFile` and
/// `Vec<models::MediaFile>` becomes `Vec<MediaFile>`, so the names match
/// regardless of how the field type is spelled at the use site.
pub fn type_display(ty: &Type) -> String {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            let name = segment.ident.to_string();
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                let inner = args
                    .args
                    .iter()
                    .filter_map(|arg| {
                        if let syn::GenericArgument::Type(inner_ty) = arg {
                            Some(type_display(inner_ty))
                        } else {
                            None
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                if !inner.is_empty() {
                    return format!("{name}<{inner}>");
                }
            }
            return name;
        }
    }
    // Fall back to the raw token rendering for non-path types
    let mut raw = quote::quote!(#ty).to_string();
    raw.retain(|c| !c.is_whitespace());
    raw
}
