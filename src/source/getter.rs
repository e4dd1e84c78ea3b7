//! Property value resolution against a content node

use crate::source::node::{ContentNode, FallbackChain, FallbackMethod};
use crate::source::value::Value;
use crate::utils::strings::camel_case;

/// Strategy for reading a property value off a node
///
/// The engine uses one getter for all reads; a mapping rule can swap in its
/// own for a single field. Implementations decide alias conventions and how
/// the fallback chain is honored.
pub trait PropertyValueGetter: Send + Sync {
    /// Resolve `alias` on `node` for `culture`, trying `fallback` steps when
    /// the node itself has no value
    fn property_value(
        &self,
        node: &dyn ContentNode,
        alias: &str,
        culture: &str,
        fallback: &FallbackChain,
    ) -> Option<Value>;
}

/// The convention-based getter used by default
///
/// Tries the alias verbatim, then its camel-cased spelling, then the
/// built-in `id` and `name` accessors. An empty string value counts as
/// missing, so fallback steps can still produce something.
pub struct DefaultPropertyValueGetter;

impl DefaultPropertyValueGetter {
    fn read_local(node: &dyn ContentNode, alias: &str, culture: &str) -> Option<Value> {
        let value = node
            .raw_value(alias, culture)
            .or_else(|| node.raw_value(&camel_case(alias), culture))
            .or_else(|| builtin_accessor(node, alias))?;
        match value {
            Value::Str(s) if s.is_empty() => None,
            other => Some(other),
        }
    }
}

impl PropertyValueGetter for DefaultPropertyValueGetter {
    fn property_value(
        &self,
        node: &dyn ContentNode,
        alias: &str,
        culture: &str,
        fallback: &FallbackChain,
    ) -> Option<Value> {
        if let Some(value) = Self::read_local(node, alias, culture) {
            return Some(value);
        }
        for method in fallback {
            match method {
                FallbackMethod::Ancestors => {
                    let mut current = node.parent();
                    while let Some(ancestor) = current {
                        if let Some(value) = Self::read_local(ancestor.as_ref(), alias, culture) {
                            return Some(value);
                        }
                        current = ancestor.parent();
                    }
                }
                FallbackMethod::DefaultLanguage => {
                    if !culture.is_empty() {
                        if let Some(value) = Self::read_local(node, alias, "") {
                            return Some(value);
                        }
                    }
                }
            }
        }
        None
    }
}

/// The `id` and `name` node accessors exposed as pseudo-properties
fn builtin_accessor(node: &dyn ContentNode, alias: &str) -> Option<Value> {
    if alias.eq_ignore_ascii_case("id") {
        Some(Value::Int(node.id()))
    } else if alias.eq_ignore_ascii_case("name") {
        Some(Value::Str(node.name().to_string()))
    } else {
        None
    }
}
