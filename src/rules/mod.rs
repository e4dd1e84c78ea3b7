//! Mapping rules
//!
//! A `MappingRule` overrides the convention for one field: a different
//! source alias, ancestor walking, multi-property combination, conditional
//! mapping, custom functions and so on. Rules come from two places, the
//! caller and `#[map(...)]` attributes on the model, and are merged field
//! by field before a mapping run.

use std::any::Any;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::mapper::{ContentMapper, MappingContext};
use crate::model::{Mappable, ScalarValue};
use crate::source::{ContentNode, FallbackChain, FallbackMethod, PropertyValueGetter, Value};

/// Formatter applied to a resolved string before assignment
pub type StringFormatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A custom mapping that resolves a field value from a content node
///
/// Receives the engine, the mapping context, the node being mapped, the
/// source alias for the field and the fallback chain in effect. Returns the
/// boxed value to assign, or `None` to leave the field untouched.
pub type CustomMappingFn = Arc<
    dyn Fn(
            &ContentMapper,
            &MappingContext,
            &dyn ContentNode,
            &str,
            &FallbackChain,
        ) -> Option<Box<dyn Any>>
        + Send
        + Sync,
>;

/// A custom mapping that resolves a field value from a raw `Value`
pub type CustomObjectMappingFn =
    Arc<dyn Fn(&ContentMapper, &MappingContext, &Value) -> Option<Box<dyn Any>> + Send + Sync>;

/// Rules keyed by field name
pub type RuleMap = FxHashMap<String, MappingRule>;

/// Per-field mapping rule
#[derive(Clone, Default)]
pub struct MappingRule {
    /// Source alias to read instead of the field name
    pub source_property: Option<String>,
    /// Number of ancestors to walk up before reading
    pub levels_above: u32,
    /// Child property read off a related node
    pub source_child_property: Option<String>,
    /// Property read from a related node instead of the node itself
    pub source_related_property: Option<String>,
    /// Source properties whose values are concatenated in order
    pub concatenation_properties: Option<Vec<String>>,
    /// Separator placed between concatenated values
    pub concatenation_separator: String,
    /// Source properties tried in order, first non-empty wins
    pub coalescing_properties: Option<Vec<String>>,
    /// Map only when this property renders equal to the expected string
    pub map_if_property_matches: Option<(String, String)>,
    /// Value assigned before mapping runs
    pub default_value: Option<ScalarValue>,
    /// Populate the field from the lookup table instead of the source
    pub dictionary_key: Option<String>,
    /// Skip the field entirely
    pub ignore: bool,
    /// Walk ancestors until a value is found
    pub map_recursively: bool,
    /// Explicit fallback chain for this field
    pub fallback: Option<FallbackChain>,
    /// Getter overriding the engine-wide one for this field
    pub value_getter: Option<Arc<dyn PropertyValueGetter>>,
    /// Custom mapping taking over value resolution for this field
    pub custom: Option<CustomMappingFn>,
    /// Formatter applied to the resolved string
    pub formatter: Option<StringFormatter>,
}

/// How a rule combines multiple source properties
pub enum MultiMapping<'a> {
    /// Concatenate all values with a separator
    Concatenate(&'a [String], &'a str),
    /// First non-empty value wins
    Coalesce(&'a [String]),
    /// Single source property
    None,
}

impl MappingRule {
    /// Create an empty rule
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from `alias` instead of the field name
    #[must_use]
    pub fn with_source(mut self, alias: impl Into<String>) -> Self {
        self.source_property = Some(alias.into());
        self
    }

    /// Read from an ancestor `levels` above the node
    #[must_use]
    pub fn with_levels_above(mut self, levels: u32) -> Self {
        self.levels_above = levels;
        self
    }

    /// Read `child` off the node held by the source property
    #[must_use]
    pub fn with_child(mut self, child: impl Into<String>) -> Self {
        self.source_child_property = Some(child.into());
        self
    }

    /// Follow the source property to a related node and read `property` there
    #[must_use]
    pub fn with_related(mut self, property: impl Into<String>) -> Self {
        self.source_related_property = Some(property.into());
        self
    }

    /// Concatenate the given source properties with `separator`
    #[must_use]
    pub fn with_concatenation(
        mut self,
        properties: Vec<String>,
        separator: impl Into<String>,
    ) -> Self {
        self.concatenation_properties = Some(properties);
        self.concatenation_separator = separator.into();
        self
    }

    /// Use the first non-empty value of the given source properties
    #[must_use]
    pub fn with_coalescing(mut self, properties: Vec<String>) -> Self {
        self.coalescing_properties = Some(properties);
        self
    }

    /// Map only when `property` renders equal to `value` (case-insensitive)
    #[must_use]
    pub fn with_condition(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.map_if_property_matches = Some((property.into(), value.into()));
        self
    }

    /// Assign `value` before mapping runs
    #[must_use]
    pub fn with_default(mut self, value: ScalarValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Populate the field from the lookup table under `key`
    #[must_use]
    pub fn with_dictionary_key(mut self, key: impl Into<String>) -> Self {
        self.dictionary_key = Some(key.into());
        self
    }

    /// Skip the field entirely
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Walk ancestors until a value is found
    #[must_use]
    pub fn recursive(mut self) -> Self {
        self.map_recursively = true;
        self
    }

    /// Use an explicit fallback chain
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackChain) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Resolve values with a field-specific getter
    #[must_use]
    pub fn with_value_getter(mut self, getter: Arc<dyn PropertyValueGetter>) -> Self {
        self.value_getter = Some(getter);
        self
    }

    /// Resolve the value with a custom mapping function
    #[must_use]
    pub fn with_custom(mut self, custom: CustomMappingFn) -> Self {
        self.custom = Some(custom);
        self
    }

    /// Format the resolved string before assignment
    #[must_use]
    pub fn with_formatter(mut self, formatter: StringFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// The multi-property combination this rule asks for, if any
    #[must_use]
    pub fn multi_mapping(&self) -> MultiMapping<'_> {
        if let Some(properties) = &self.concatenation_properties {
            if !properties.is_empty() {
                return MultiMapping::Concatenate(properties, &self.concatenation_separator);
            }
        }
        if let Some(properties) = &self.coalescing_properties {
            if !properties.is_empty() {
                return MultiMapping::Coalesce(properties);
            }
        }
        MultiMapping::None
    }

    /// The fallback chain in effect for this rule
    ///
    /// An explicit chain wins; `map_recursively` is shorthand for walking
    /// ancestors.
    #[must_use]
    pub fn effective_fallback(&self) -> FallbackChain {
        if let Some(fallback) = &self.fallback {
            return fallback.clone();
        }
        if self.map_recursively {
            return FallbackChain::from_slice(&[FallbackMethod::Ancestors]);
        }
        FallbackChain::new()
    }

    /// Fill unset parts of this rule from a `#[map(...)]` annotation
    ///
    /// Caller-supplied parts win field by field. `ignore` and
    /// `map_recursively` always come from the annotation, so a model author
    /// can rely on them regardless of what the caller passes.
    pub fn fill_missing_from(&mut self, annotation: &MappingRule) {
        if self.source_property.is_none() {
            self.source_property = annotation.source_property.clone();
        }
        if self.levels_above == 0 {
            self.levels_above = annotation.levels_above;
        }
        if self.source_child_property.is_none() {
            self.source_child_property = annotation.source_child_property.clone();
        }
        if self.source_related_property.is_none() {
            self.source_related_property = annotation.source_related_property.clone();
        }
        if self.concatenation_properties.is_none() {
            self.concatenation_properties = annotation.concatenation_properties.clone();
        }
        if self.concatenation_separator.is_empty() {
            self.concatenation_separator = annotation.concatenation_separator.clone();
        }
        if self.coalescing_properties.is_none() {
            self.coalescing_properties = annotation.coalescing_properties.clone();
        }
        if self.map_if_property_matches.is_none() {
            self.map_if_property_matches = annotation.map_if_property_matches.clone();
        }
        if self.default_value.is_none() {
            self.default_value = annotation.default_value.clone();
        }
        if self.dictionary_key.is_none() {
            self.dictionary_key = annotation.dictionary_key.clone();
        }
        self.ignore = annotation.ignore;
        self.map_recursively = annotation.map_recursively;
        if self.fallback.is_none() {
            self.fallback = annotation.fallback.clone();
        }
        if self.value_getter.is_none() {
            self.value_getter = annotation.value_getter.clone();
        }
        if self.custom.is_none() {
            self.custom = annotation.custom.clone();
        }
        if self.formatter.is_none() {
            self.formatter = annotation.formatter.clone();
        }
    }
}

/// Merge caller rules with the model's annotations
///
/// The result holds one entry per field that either side mentions. Where
/// both mention the same field, the caller's entry is kept and its unset
/// parts are filled from the annotation.
#[must_use]
pub fn resolve(model: &dyn Mappable, caller: &RuleMap) -> RuleMap {
    let mut merged = caller.clone();
    for (field, annotation) in model.annotated_rules() {
        match merged.entry(field) {
            std::collections::hash_map::Entry::Occupied(mut entry) => {
                entry.get_mut().fill_missing_from(&annotation);
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(annotation);
            }
        }
    }
    merged
}
