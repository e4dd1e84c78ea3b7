//! Procedural macros for the view-mapper crate
//!
//! This crate provides the `Mappable` derive macro, which generates the
//! string-keyed field catalog and typed setters that the mapping engine
//! drives at runtime.

use proc_macro::TokenStream;

// Import modules
mod utils;
mod mappable_impl;

// Tests
#[cfg(test)]
mod tests;

/// Derive macro for view models that can be populated by the mapping engine
///
/// Generates an implementation of the `Mappable` trait from a struct
/// definition: a static field catalog, typed scalar setters and getters keyed
/// by field name, access to nested models and collections, and the mapping
/// rules declared through `#[map(...)]` field attributes.
///
/// # Example
///
/// ```ignore
/// #[derive(Mappable, Default)]
/// struct ArticlePage {
///     id: i64,
///     name: String,
///
///     #[map(source = "bodyText")]
///     body_copy: String,
///
///     #[map(levels_above = 1)]
///     section_heading: String,
///
///     #[map(concat = "author, publishedOn", separator = " - ")]
///     byline: String,
/// }
/// ```
///
/// Supported `#[map(...)]` keys: `source`, `levels_above`, `child`,
/// `related`, `concat` + `separator`, `coalesce`, `map_if`, `default`,
/// `dictionary_key`, `ignore`, `recursive`, `fallback`, `custom`, `hook`
/// and `format`.
#[proc_macro_derive(Mappable, attributes(map))]
pub fn derive_mappable(input: TokenStream) -> TokenStream {
    mappable_impl::process_derive_mappable(input)
}
