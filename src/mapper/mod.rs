//! The mapping engine
//!
//! `ContentMapper` populates view models from four source shapes: content
//! node trees, XML elements, parsed JSON and dictionaries. Each source has
//! its own submodule; this module holds the engine itself, its registries
//! of custom mappings and the helpers shared across sources.

pub mod collections;
pub mod context;
pub mod dictionary;
pub mod json;
pub mod node;
pub mod xml;

pub use context::MappingContext;
pub use dictionary::DictionaryCollectionOptions;
pub use json::JsonCollectionOptions;
pub use xml::XmlCollectionOptions;

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::config::MapperConfig;
use crate::model::FieldSpec;
use crate::models::picked_media;
use crate::rules::{CustomMappingFn, CustomObjectMappingFn};
use crate::source::{
    DefaultPropertyValueGetter, EmptyLookup, LookupTable, NodeRef, NodeResolver, NullResolver,
    PropertyValueGetter, Value,
};

/// A dictionary source: property values keyed by name
pub type Dictionary = FxHashMap<String, Value>;

/// The convention-driven mapping engine
///
/// One instance is built per application (or per test) and reused across
/// mapping calls. Collaborators and custom mappings are installed up front;
/// the mapping calls themselves take `&self` and can be chained.
pub struct ContentMapper {
    config: MapperConfig,
    resolver: Arc<dyn NodeResolver>,
    value_getter: Arc<dyn PropertyValueGetter>,
    lookup: Arc<dyn LookupTable>,
    custom_mappings: FxHashMap<String, CustomMappingFn>,
    custom_object_mappings: FxHashMap<String, CustomObjectMappingFn>,
}

impl std::fmt::Debug for ContentMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentMapper")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ContentMapper {
    /// Create an engine with default collaborators
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MapperConfig::default())
    }

    /// Create an engine with the given configuration
    #[must_use]
    pub fn with_config(config: MapperConfig) -> Self {
        let mut mapper = Self {
            config,
            resolver: Arc::new(NullResolver),
            value_getter: Arc::new(DefaultPropertyValueGetter),
            lookup: Arc::new(EmptyLookup),
            custom_mappings: FxHashMap::default(),
            custom_object_mappings: FxHashMap::default(),
        };
        mapper.install_default_mappings();
        mapper
    }

    /// Picked-media fields work out of the box; callers can re-register
    /// over these.
    fn install_default_mappings(&mut self) {
        self.add_custom_mapping("MediaFile", None, Arc::new(picked_media::map_media_file));
        self.add_custom_mapping(
            "Vec<MediaFile>",
            None,
            Arc::new(picked_media::map_media_file_collection),
        );
        self.add_custom_object_mapping(
            "MediaFile",
            None,
            Arc::new(picked_media::map_media_file_object),
        );
        self.add_custom_object_mapping(
            "Vec<MediaFile>",
            None,
            Arc::new(picked_media::map_media_file_collection_object),
        );
    }

    /// Swap in a node resolver
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn NodeResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Swap in an engine-wide property value getter
    #[must_use]
    pub fn with_value_getter(mut self, getter: Arc<dyn PropertyValueGetter>) -> Self {
        self.value_getter = getter;
        self
    }

    /// Swap in a lookup table for dictionary-key rules
    #[must_use]
    pub fn with_lookup(mut self, lookup: Arc<dyn LookupTable>) -> Self {
        self.lookup = lookup;
        self
    }

    /// Register a node-based custom mapping
    ///
    /// Keyed by the target type name, optionally narrowed to one field:
    /// `("Link", Some("home"))` applies only to fields named `home` of type
    /// `Link`, `("Link", None)` to every `Link` field.
    pub fn add_custom_mapping(
        &mut self,
        type_name: &str,
        field: Option<&str>,
        mapping: CustomMappingFn,
    ) -> &mut Self {
        self.custom_mappings
            .insert(mapping_key(type_name, field), mapping);
        self
    }

    /// Register a value-based custom mapping, used by dictionary sources
    pub fn add_custom_object_mapping(
        &mut self,
        type_name: &str,
        field: Option<&str>,
        mapping: CustomObjectMappingFn,
    ) -> &mut Self {
        self.custom_object_mappings
            .insert(mapping_key(type_name, field), mapping);
        self
    }

    /// The engine configuration
    #[must_use]
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// The node resolver in use
    #[must_use]
    pub fn resolver(&self) -> &dyn NodeResolver {
        self.resolver.as_ref()
    }

    /// The engine-wide property value getter
    #[must_use]
    pub fn value_getter(&self) -> &dyn PropertyValueGetter {
        self.value_getter.as_ref()
    }

    /// The lookup table in use
    #[must_use]
    pub fn lookup(&self) -> &dyn LookupTable {
        self.lookup.as_ref()
    }

    /// Custom mapping for a field: field-specific registration first, then
    /// type-wide
    pub(crate) fn find_custom_mapping(&self, field: &FieldSpec) -> Option<CustomMappingFn> {
        self.custom_mappings
            .get(&mapping_key(field.type_name, Some(field.name)))
            .or_else(|| self.custom_mappings.get(field.type_name))
            .cloned()
    }

    pub(crate) fn find_type_custom_mapping(&self, type_name: &str) -> Option<CustomMappingFn> {
        self.custom_mappings.get(type_name).cloned()
    }

    pub(crate) fn find_custom_object_mapping(
        &self,
        type_name: &str,
        field: Option<&str>,
    ) -> Option<CustomObjectMappingFn> {
        if let Some(field) = field {
            if let Some(mapping) = self
                .custom_object_mappings
                .get(&mapping_key(type_name, Some(field)))
            {
                return Some(mapping.clone());
            }
        }
        self.custom_object_mappings.get(type_name).cloned()
    }

    /// Follow a property value to the node it points at
    ///
    /// A node value is used directly, a list contributes its first node,
    /// and anything that renders as an integer goes through the resolver.
    pub(crate) fn related_node(&self, value: &Value) -> Option<NodeRef> {
        match value {
            Value::Node(node) => Some(Arc::clone(node)),
            Value::Nodes(nodes) => nodes.first().cloned(),
            other => other
                .render()
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(|id| self.resolver.node_by_id(id)),
        }
    }
}

impl Default for ContentMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk up `levels` ancestors, stopping at the root
pub(crate) fn ancestor_or_self(node: &NodeRef, levels: u32) -> NodeRef {
    let mut current = Arc::clone(node);
    for _ in 0..levels {
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current
}

fn mapping_key(type_name: &str, field: Option<&str>) -> String {
    match field {
        Some(field) => format!("{type_name}.{field}"),
        None => type_name.to_string(),
    }
}
