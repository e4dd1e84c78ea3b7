//! Content node abstraction and its collaborators

use smallvec::SmallVec;
use std::sync::Arc;

use crate::source::value::Value;

/// A node in a content tree
///
/// Every node has an identifier, a name and an optional parent, plus a bag
/// of raw property values addressed by alias. A culture code selects a
/// localized variant of a value; the empty string means the neutral
/// (invariant) value.
pub trait ContentNode: Send + Sync {
    /// Unique identifier of the node
    fn id(&self) -> i64;

    /// Display name of the node
    fn name(&self) -> &str;

    /// Parent node, `None` at the root
    fn parent(&self) -> Option<NodeRef>;

    /// Raw property value stored under `alias` for the given culture
    fn raw_value(&self, alias: &str, culture: &str) -> Option<Value>;
}

/// Shared handle to a content node
pub type NodeRef = Arc<dyn ContentNode>;

/// Resolves node identifiers to nodes
///
/// Used when a property holds the id of another node rather than the node
/// itself, e.g. a related-content picker that stores integers.
pub trait NodeResolver: Send + Sync {
    /// Look up a node by its identifier
    fn node_by_id(&self, id: i64) -> Option<NodeRef>;
}

/// A resolver that never finds anything
pub struct NullResolver;

impl NodeResolver for NullResolver {
    fn node_by_id(&self, _id: i64) -> Option<NodeRef> {
        None
    }
}

/// Key-value lookup for translated or configured strings
pub trait LookupTable: Send + Sync {
    /// The string stored under `key`, if any
    fn entry(&self, key: &str) -> Option<String>;
}

/// A lookup table with no entries
pub struct EmptyLookup;

impl LookupTable for EmptyLookup {
    fn entry(&self, _key: &str) -> Option<String> {
        None
    }
}

impl LookupTable for rustc_hash::FxHashMap<String, String> {
    fn entry(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A fallback step tried when a property has no value on the node itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackMethod {
    /// Walk up the ancestor chain until a value is found
    Ancestors,
    /// Retry with the neutral culture
    DefaultLanguage,
}

/// Ordered fallback steps for one property read
pub type FallbackChain = SmallVec<[FallbackMethod; 2]>;
