//! Collection mapping and reconciliation
//!
//! Node lists rebuild the target collection from scratch. Document-shaped
//! sources (XML, JSON, dictionaries) instead reconcile against what is
//! already there: existing items are matched by identifier and updated in
//! place, unmatched source items are appended, and nothing is ever deleted.

use crate::error::{MappingError, Result};
use crate::mapper::{ContentMapper, MappingContext};
use crate::model::{Mappable, MappableCollection};
use std::sync::Arc;

use crate::rules::{self, RuleMap};
use crate::source::{FallbackChain, NodeRef, Value};

impl ContentMapper {
    /// Map a list of content nodes onto a collection of view models
    ///
    /// The collection is cleared first when `clear_first` is set. Each node
    /// produces one item; a type-level custom mapping for the element type
    /// builds items wholesale when registered.
    pub fn map_node_collection<T>(
        &self,
        nodes: &[NodeRef],
        collection: &mut Vec<T>,
        culture: &str,
        rules: &RuleMap,
        clear_first: bool,
    ) -> Result<&Self>
    where
        T: Mappable + Default + 'static,
    {
        self.map_nodes_into(nodes, collection, culture, rules, clear_first)?;
        Ok(self)
    }

    pub(crate) fn map_nodes_into(
        &self,
        nodes: &[NodeRef],
        collection: &mut dyn MappableCollection,
        culture: &str,
        rules: &RuleMap,
        clear_first: bool,
    ) -> Result<()> {
        if clear_first && !collection.is_empty() {
            collection.clear();
        }
        let ctx = MappingContext::new(culture);
        let element_type = collection.element_type_name();
        let object_custom = self.find_custom_object_mapping(element_type, None);
        let node_custom = self.find_type_custom_mapping(element_type);
        for node in nodes {
            // A type-level custom mapping builds the item wholesale, the
            // value-based registration consulted first.
            let item = if let Some(custom) = &object_custom {
                Some(custom(self, &ctx, &Value::Node(Arc::clone(node))))
            } else {
                node_custom
                    .as_ref()
                    .map(|custom| custom(self, &ctx, node.as_ref(), "", &FallbackChain::new()))
            };
            match item {
                Some(Some(item)) => {
                    if !collection.push_boxed(item) {
                        return Err(MappingError::Configuration(format!(
                            "custom mapping for '{element_type}' produced a value of the wrong type"
                        )));
                    }
                }
                Some(None) => {
                    log::warn!(
                        "custom mapping for '{element_type}' produced nothing for node #{}",
                        node.id()
                    );
                }
                None => {
                    let item = collection.push_new();
                    let merged = rules::resolve(item, rules);
                    self.map_node_with_rules(node, item, culture, &merged)?;
                }
            }
        }
        Ok(())
    }
}

/// Find or create the collection item a source entry maps onto
///
/// When the element type has no `dest_id` field, matching is impossible and
/// every entry creates a new item. Otherwise an entry matching an existing
/// item's identifier updates it in place; unmatched entries create a new
/// item unless creation is disabled, in which case they are skipped.
pub(crate) fn reconcile_item<'c>(
    collection: &'c mut dyn MappableCollection,
    dest_id: &str,
    source_key: Option<&str>,
    create_if_missing: bool,
) -> Option<&'c mut dyn Mappable> {
    if !collection.has_field(dest_id) {
        return Some(collection.push_new());
    }
    if let Some(key) = source_key {
        if let Some(index) = collection.find_by(dest_id, key) {
            return collection.item_mut(index);
        }
    }
    if create_if_missing {
        Some(collection.push_new())
    } else {
        None
    }
}
