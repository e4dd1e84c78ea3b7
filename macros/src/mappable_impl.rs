//! Mappable derive macro implementation
//!
//! This module contains the implementation of the `Mappable` derive macro,
//! which generates the field catalog, typed setters and annotation rules
//! the mapping engine needs to populate a view model by field name.

use darling::{ast, FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use crate::utils::{classify, FieldKind, TypeInfo};

/// Receiver for the struct that derives Mappable
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(map), supports(struct_named))]
pub struct MappableReceiver {
    /// The struct identifier
    ident: syn::Ident,
    /// The struct data with parsed fields
    data: ast::Data<(), MappableFieldReceiver>,
}

/// Receiver for the fields in the struct
#[derive(Debug, FromField)]
#[darling(attributes(map))]
pub struct MappableFieldReceiver {
    /// The field identifier
    ident: Option<syn::Ident>,
    /// The field type
    ty: syn::Type,
    /// Source property alias to read instead of the field name
    #[darling(default)]
    source: Option<String>,
    /// Number of ancestors to walk up before reading
    #[darling(default)]
    levels_above: Option<u32>,
    /// Child property on a related node
    #[darling(default)]
    child: Option<String>,
    /// Property to read from a related node instead of the node itself
    #[darling(default)]
    related: Option<String>,
    /// Comma-separated source properties to concatenate
    #[darling(default)]
    concat: Option<String>,
    /// Separator used between concatenated values
    #[darling(default)]
    separator: Option<String>,
    /// Comma-separated source properties, first non-empty wins
    #[darling(default)]
    coalesce: Option<String>,
    /// Conditional mapping, written as "property=value"
    #[darling(default)]
    map_if: Option<String>,
    /// Default value applied before mapping runs
    #[darling(default, rename = "default")]
    default_value: Option<String>,
    /// Lookup table key to populate the field from
    #[darling(default)]
    dictionary_key: Option<String>,
    /// Skip this field entirely
    #[darling(default)]
    ignore: bool,
    /// Walk ancestors until a value is found
    #[darling(default)]
    recursive: bool,
    /// Comma-separated fallback methods: "ancestors", "default_language"
    #[darling(default)]
    fallback: Option<String>,
    /// Path to a custom mapping function
    #[darling(default)]
    custom: Option<syn::Path>,
    /// Path to a mapping hook invoked instead of the built-in assignment
    #[darling(default)]
    hook: Option<syn::Path>,
    /// Path to a string formatter applied to the resolved value
    #[darling(default)]
    format: Option<syn::Path>,
}

impl MappableFieldReceiver {
    /// Whether any `#[map(...)]` key was given for this field
    fn has_rule(&self) -> bool {
        self.source.is_some()
            || self.levels_above.is_some()
            || self.child.is_some()
            || self.related.is_some()
            || self.concat.is_some()
            || self.separator.is_some()
            || self.coalesce.is_some()
            || self.map_if.is_some()
            || self.default_value.is_some()
            || self.dictionary_key.is_some()
            || self.ignore
            || self.recursive
            || self.fallback.is_some()
            || self.custom.is_some()
            || self.format.is_some()
    }
}

/// Process the Mappable derive macro
pub fn process_derive_mappable(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let input = parse_macro_input!(input as DeriveInput);

    // Parse with darling
    let receiver = match MappableReceiver::from_derive_input(&input) {
        Ok(receiver) => receiver,
        Err(err) => return err.write_errors().into(),
    };

    // Extract the fields
    let ast::Data::Struct(fields) = &receiver.data else {
        unreachable!("Darling ensures this is a struct")
    };

    let expanded = match generate_mappable_impl(&receiver.ident, fields) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    };

    TokenStream::from(expanded)
}

/// Generate the full `Mappable` trait implementation
fn generate_mappable_impl(
    struct_name: &syn::Ident,
    fields: &ast::Fields<MappableFieldReceiver>,
) -> syn::Result<TokenStream2> {
    let type_name_str = struct_name.to_string();

    let mut specs = Vec::new();
    let mut set_arms = Vec::new();
    let mut get_arms = Vec::new();
    let mut complex_arms = Vec::new();
    let mut collection_arms = Vec::new();
    let mut boxed_arms = Vec::new();
    let mut cloned_arms = Vec::new();
    let mut rule_blocks = Vec::new();

    for field in fields.iter() {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let name_str = field_ident.to_string();
        let info = classify(&field.ty);

        specs.push(field_spec_tokens(&name_str, &info, field.hook.as_ref()));
        boxed_arms.push(boxed_arm(field_ident, &name_str, &field.ty, &info));

        match info.kind {
            FieldKind::Complex => {
                complex_arms.push(complex_arm(field_ident, &name_str, &info));
                cloned_arms.push(cloned_arm(field_ident, &name_str, &field.ty, &info));
            }
            FieldKind::Collection => {
                collection_arms.push(collection_arm(field_ident, &name_str, &info));
                cloned_arms.push(cloned_arm(field_ident, &name_str, &field.ty, &info));
            }
            _ => {
                set_arms.push(scalar_set_arm(field_ident, &name_str, &info));
                get_arms.push(scalar_get_arm(field_ident, &name_str, &info));
            }
        }

        if field.has_rule() {
            rule_blocks.push(rule_block(&name_str, field, &info)?);
        }
    }

    // Keep the generated bodies warning-free when a struct has no fields of
    // a given shape.
    let quiet_set = set_arms
        .is_empty()
        .then(|| quote! { let _ = &value; })
        .unwrap_or_default();
    let quiet_boxed = boxed_arms
        .is_empty()
        .then(|| quote! { let _ = &value; })
        .unwrap_or_default();
    let quiet_cloned = cloned_arms
        .is_empty()
        .then(|| quote! { let _ = &value; })
        .unwrap_or_default();
    let scalar_import = (!set_arms.is_empty())
        .then(|| quote! { use ::view_mapper::model::ScalarValue; })
        .unwrap_or_default();

    Ok(quote! {
        impl ::view_mapper::model::Mappable for #struct_name {
            fn type_name(&self) -> &'static str {
                #type_name_str
            }

            fn fields(&self) -> &'static [::view_mapper::model::FieldSpec] {
                static FIELDS: &[::view_mapper::model::FieldSpec] = &[ #(#specs),* ];
                FIELDS
            }

            fn annotated_rules(&self) -> ::view_mapper::rules::RuleMap {
                #[allow(unused_mut)]
                let mut rules = ::view_mapper::rules::RuleMap::default();
                #(#rule_blocks)*
                rules
            }

            fn set_scalar(&mut self, field: &str, value: ::view_mapper::model::ScalarValue) -> bool {
                #scalar_import
                #quiet_set
                match field {
                    #(#set_arms)*
                    _ => false,
                }
            }

            fn get_scalar(&self, field: &str) -> Option<::view_mapper::model::ScalarValue> {
                #scalar_import
                match field {
                    #(#get_arms)*
                    _ => None,
                }
            }

            fn complex_mut(&mut self, field: &str) -> Option<&mut dyn ::view_mapper::model::Mappable> {
                match field {
                    #(#complex_arms)*
                    _ => None,
                }
            }

            fn collection_mut(&mut self, field: &str) -> Option<&mut dyn ::view_mapper::model::MappableCollection> {
                match field {
                    #(#collection_arms)*
                    _ => None,
                }
            }

            fn set_boxed(&mut self, field: &str, value: Box<dyn ::std::any::Any>) -> ::view_mapper::error::Result<bool> {
                #quiet_boxed
                match field {
                    #(#boxed_arms)*
                    _ => Ok(false),
                }
            }

            fn set_cloned(&mut self, field: &str, value: &(dyn ::std::any::Any + Send + Sync)) -> bool {
                #quiet_cloned
                match field {
                    #(#cloned_arms)*
                    _ => false,
                }
            }
        }
    })
}

/// Generate one `FieldSpec` literal for the static field catalog
fn field_spec_tokens(
    name_str: &str,
    info: &TypeInfo,
    hook: Option<&syn::Path>,
) -> TokenStream2 {
    let kind = match info.kind {
        FieldKind::Bool => quote! { Bool },
        FieldKind::Int => quote! { Int },
        FieldKind::Float => quote! { Float },
        FieldKind::Str => quote! { Str },
        FieldKind::Date => quote! { Date },
        FieldKind::Complex => quote! { Complex },
        FieldKind::Collection => quote! { Collection },
    };
    let nullable = info.nullable;
    let display = &info.display;
    let hook_tokens = match hook {
        Some(path) => quote! { Some(#path as ::view_mapper::model::MapHook) },
        None => quote! { None },
    };
    quote! {
        ::view_mapper::model::FieldSpec {
            name: #name_str,
            kind: ::view_mapper::model::FieldKind::#kind,
            nullable: #nullable,
            type_name: #display,
            hook: #hook_tokens,
        }
    }
}

/// Wrap an assignment value in `Some` for nullable fields
fn wrap_value(info: &TypeInfo, expr: TokenStream2) -> TokenStream2 {
    if info.nullable {
        quote! { Some(#expr) }
    } else {
        expr
    }
}

/// Generate the `set_scalar` match arm for one scalar field
fn scalar_set_arm(field_ident: &syn::Ident, name_str: &str, info: &TypeInfo) -> TokenStream2 {
    let inner = &info.inner;
    let assign = match info.kind {
        FieldKind::Str => {
            let value = wrap_value(info, quote! { v });
            quote! {
                if let ScalarValue::Str(v) = value {
                    self.#field_ident = #value;
                }
            }
        }
        FieldKind::Bool => {
            let value = wrap_value(info, quote! { v });
            quote! {
                if let ScalarValue::Bool(v) = value {
                    self.#field_ident = #value;
                }
            }
        }
        FieldKind::Int => {
            if info.display == "i64" {
                let value = wrap_value(info, quote! { v });
                quote! {
                    if let ScalarValue::Int(v) = value {
                        self.#field_ident = #value;
                    }
                }
            } else {
                // Narrowing failures are silent no-ops, like any other
                // unparseable source value.
                let value = wrap_value(info, quote! { narrowed });
                quote! {
                    if let ScalarValue::Int(v) = value {
                        if let Ok(narrowed) = <#inner>::try_from(v) {
                            self.#field_ident = #value;
                        }
                    }
                }
            }
        }
        FieldKind::Float => {
            let converted = if info.display == "f32" {
                quote! { v as f32 }
            } else {
                quote! { v }
            };
            let value = wrap_value(info, converted);
            quote! {
                if let ScalarValue::Float(v) = value {
                    self.#field_ident = #value;
                }
            }
        }
        FieldKind::Date => {
            let converted = if info.display == "NaiveDate" {
                quote! { v.date() }
            } else {
                quote! { v }
            };
            let value = wrap_value(info, converted);
            quote! {
                if let ScalarValue::Date(v) = value {
                    self.#field_ident = #value;
                }
            }
        }
        FieldKind::Complex | FieldKind::Collection => unreachable!("scalar arm for scalar kinds"),
    };
    quote! {
        #name_str => {
            #assign
            true
        }
    }
}

/// Generate the `get_scalar` match arm for one scalar field
fn scalar_get_arm(field_ident: &syn::Ident, name_str: &str, info: &TypeInfo) -> TokenStream2 {
    let body = match info.kind {
        FieldKind::Str => {
            if info.nullable {
                quote! { self.#field_ident.clone().map(ScalarValue::Str) }
            } else {
                quote! { Some(ScalarValue::Str(self.#field_ident.clone())) }
            }
        }
        FieldKind::Bool => {
            if info.nullable {
                quote! { self.#field_ident.map(ScalarValue::Bool) }
            } else {
                quote! { Some(ScalarValue::Bool(self.#field_ident)) }
            }
        }
        FieldKind::Int => match info.display.as_str() {
            "i64" => {
                if info.nullable {
                    quote! { self.#field_ident.map(ScalarValue::Int) }
                } else {
                    quote! { Some(ScalarValue::Int(self.#field_ident)) }
                }
            }
            // Widening these can overflow; an unrepresentable value reads
            // as absent, matching the narrowing no-op on the write side.
            "u64" | "usize" | "isize" => {
                if info.nullable {
                    quote! {
                        self.#field_ident
                            .and_then(|v| i64::try_from(v).ok())
                            .map(ScalarValue::Int)
                    }
                } else {
                    quote! { i64::try_from(self.#field_ident).ok().map(ScalarValue::Int) }
                }
            }
            _ => {
                if info.nullable {
                    quote! { self.#field_ident.map(|v| ScalarValue::Int(i64::from(v))) }
                } else {
                    quote! { Some(ScalarValue::Int(i64::from(self.#field_ident))) }
                }
            }
        },
        FieldKind::Float => {
            if info.nullable {
                let conv = if info.display == "f32" {
                    quote! { f64::from(v) }
                } else {
                    quote! { v }
                };
                quote! { self.#field_ident.map(|v| ScalarValue::Float(#conv)) }
            } else {
                let conv = if info.display == "f32" {
                    quote! { f64::from(self.#field_ident) }
                } else {
                    quote! { self.#field_ident }
                };
                quote! { Some(ScalarValue::Float(#conv)) }
            }
        }
        FieldKind::Date => {
            let to_datetime = |value: TokenStream2| -> TokenStream2 {
                if info.display == "NaiveDate" {
                    quote! { #value.and_time(::view_mapper::chrono::NaiveTime::MIN) }
                } else {
                    value
                }
            };
            if info.nullable {
                let conv = to_datetime(quote! { v });
                quote! { self.#field_ident.map(|v| ScalarValue::Date(#conv)) }
            } else {
                let conv = to_datetime(quote! { self.#field_ident });
                quote! { Some(ScalarValue::Date(#conv)) }
            }
        }
        FieldKind::Complex | FieldKind::Collection => unreachable!("scalar arm for scalar kinds"),
    };
    quote! {
        #name_str => #body,
    }
}

/// Generate the `complex_mut` match arm for a nested model field
fn complex_arm(field_ident: &syn::Ident, name_str: &str, info: &TypeInfo) -> TokenStream2 {
    if info.nullable {
        quote! {
            #name_str => Some(self.#field_ident.get_or_insert_with(Default::default)),
        }
    } else {
        quote! {
            #name_str => Some(&mut self.#field_ident),
        }
    }
}

/// Generate the `collection_mut` match arm for a collection field
fn collection_arm(field_ident: &syn::Ident, name_str: &str, info: &TypeInfo) -> TokenStream2 {
    if info.nullable {
        quote! {
            #name_str => Some(self.#field_ident.get_or_insert_with(Default::default)),
        }
    } else {
        quote! {
            #name_str => Some(&mut self.#field_ident),
        }
    }
}

/// Generate the `set_boxed` match arm for one field
fn boxed_arm(
    field_ident: &syn::Ident,
    name_str: &str,
    ty: &syn::Type,
    info: &TypeInfo,
) -> TokenStream2 {
    let err = quote! {
        Err(::view_mapper::error::MappingError::PropertyWrite {
            field: #name_str.to_string(),
            value: "value of unexpected runtime type".to_string(),
        })
    };
    if info.nullable {
        let inner = &info.inner;
        quote! {
            #name_str => match value.downcast::<#ty>() {
                Ok(v) => {
                    self.#field_ident = *v;
                    Ok(true)
                }
                Err(value) => match value.downcast::<#inner>() {
                    Ok(v) => {
                        self.#field_ident = Some(*v);
                        Ok(true)
                    }
                    Err(_) => #err,
                },
            },
        }
    } else {
        quote! {
            #name_str => match value.downcast::<#ty>() {
                Ok(v) => {
                    self.#field_ident = *v;
                    Ok(true)
                }
                Err(_) => #err,
            },
        }
    }
}

/// Generate the `set_cloned` match arm for a complex or collection field
fn cloned_arm(
    field_ident: &syn::Ident,
    name_str: &str,
    ty: &syn::Type,
    info: &TypeInfo,
) -> TokenStream2 {
    if info.nullable {
        let inner = &info.inner;
        quote! {
            #name_str => {
                if let Some(v) = value.downcast_ref::<#ty>() {
                    self.#field_ident = v.clone();
                    true
                } else if let Some(v) = value.downcast_ref::<#inner>() {
                    self.#field_ident = Some(v.clone());
                    true
                } else {
                    false
                }
            }
        }
    } else {
        quote! {
            #name_str => {
                if let Some(v) = value.downcast_ref::<#ty>() {
                    self.#field_ident = v.clone();
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Split a comma-separated attribute value into trimmed parts
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Generate the annotation rule block for one field
fn rule_block(
    name_str: &str,
    field: &MappableFieldReceiver,
    info: &TypeInfo,
) -> syn::Result<TokenStream2> {
    let mut assignments = Vec::new();

    if let Some(source) = &field.source {
        assignments.push(quote! { rule.source_property = Some(#source.to_string()); });
    }
    if let Some(levels) = field.levels_above {
        assignments.push(quote! { rule.levels_above = #levels; });
    }
    if let Some(child) = &field.child {
        assignments.push(quote! { rule.source_child_property = Some(#child.to_string()); });
    }
    if let Some(related) = &field.related {
        assignments.push(quote! { rule.source_related_property = Some(#related.to_string()); });
    }
    if let Some(concat) = &field.concat {
        let props = split_list(concat);
        assignments
            .push(quote! { rule.concatenation_properties = Some(vec![#(#props.to_string()),*]); });
    }
    if let Some(separator) = &field.separator {
        assignments.push(quote! { rule.concatenation_separator = #separator.to_string(); });
    }
    if let Some(coalesce) = &field.coalesce {
        let props = split_list(coalesce);
        assignments
            .push(quote! { rule.coalescing_properties = Some(vec![#(#props.to_string()),*]); });
    }
    if let Some(map_if) = &field.map_if {
        let Some((property, expected)) = map_if.split_once('=') else {
            return Err(syn::Error::new_spanned(
                &field.ty,
                format!("map_if on `{name_str}` must be written as \"property=value\""),
            ));
        };
        let property = property.trim();
        let expected = expected.trim();
        assignments.push(quote! {
            rule.map_if_property_matches = Some((#property.to_string(), #expected.to_string()));
        });
    }
    if let Some(default) = &field.default_value {
        let value = default_value_tokens(name_str, default, info)?;
        assignments.push(quote! { rule.default_value = Some(#value); });
    }
    if let Some(key) = &field.dictionary_key {
        assignments.push(quote! { rule.dictionary_key = Some(#key.to_string()); });
    }
    if field.ignore {
        assignments.push(quote! { rule.ignore = true; });
    }
    if field.recursive {
        assignments.push(quote! { rule.map_recursively = true; });
    }
    if let Some(fallback) = &field.fallback {
        let mut methods = Vec::new();
        for part in split_list(fallback) {
            let method = match part.as_str() {
                "ancestors" => quote! { ::view_mapper::source::FallbackMethod::Ancestors },
                "default_language" => {
                    quote! { ::view_mapper::source::FallbackMethod::DefaultLanguage }
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        &field.ty,
                        format!("unknown fallback method `{other}` on `{name_str}`"),
                    ))
                }
            };
            methods.push(method);
        }
        assignments.push(quote! {
            rule.fallback = Some(::view_mapper::source::FallbackChain::from_slice(&[#(#methods),*]));
        });
    }
    if let Some(custom) = &field.custom {
        assignments.push(quote! { rule.custom = Some(::std::sync::Arc::new(#custom)); });
    }
    if let Some(format) = &field.format {
        assignments.push(quote! { rule.formatter = Some(::std::sync::Arc::new(#format)); });
    }

    Ok(quote! {
        {
            let mut rule = ::view_mapper::rules::MappingRule::default();
            #(#assignments)*
            rules.insert(#name_str.to_string(), rule);
        }
    })
}

/// Parse a `default = "..."` literal into a `ScalarValue` expression
///
/// Integer, float and boolean fields get their defaults parsed at macro
/// expansion time so a bad literal fails the build instead of silently
/// doing nothing at runtime. Everything else stays a string and goes
/// through the ordinary coercion path.
fn default_value_tokens(
    name_str: &str,
    raw: &str,
    info: &TypeInfo,
) -> syn::Result<TokenStream2> {
    let parse_error = |expected: &str| {
        syn::Error::new_spanned(
            &info.inner,
            format!("default for `{name_str}` is not a valid {expected}: `{raw}`"),
        )
    };
    match info.kind {
        FieldKind::Int => {
            let value: i64 = raw.trim().parse().map_err(|_| parse_error("integer"))?;
            Ok(quote! { ::view_mapper::model::ScalarValue::Int(#value) })
        }
        FieldKind::Float => {
            let value: f64 = raw.trim().parse().map_err(|_| parse_error("number"))?;
            Ok(quote! { ::view_mapper::model::ScalarValue::Float(#value) })
        }
        FieldKind::Bool => {
            let value: bool = raw.trim().parse().map_err(|_| parse_error("boolean"))?;
            Ok(quote! { ::view_mapper::model::ScalarValue::Bool(#value) })
        }
        _ => Ok(quote! { ::view_mapper::model::ScalarValue::Str(#raw.to_string()) }),
    }
}
