//! In-memory content nodes
//!
//! A simple tree-building source, used by tests and by callers that want to
//! map from data they assembled themselves.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::source::node::{ContentNode, NodeRef, NodeResolver};
use crate::source::value::Value;

/// A content node held entirely in memory
pub struct MemoryNode {
    id: i64,
    name: String,
    parent: Option<NodeRef>,
    values: FxHashMap<String, Value>,
    localized: FxHashMap<String, FxHashMap<String, Value>>,
}

impl MemoryNode {
    /// Create a node with an id and a name
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            values: FxHashMap::default(),
            localized: FxHashMap::default(),
        }
    }

    /// Add a neutral-culture property value
    #[must_use]
    pub fn with_value(mut self, alias: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(alias.into(), value.into());
        self
    }

    /// Add a culture-specific property value
    #[must_use]
    pub fn with_localized_value(
        mut self,
        culture: impl Into<String>,
        alias: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.localized
            .entry(culture.into())
            .or_default()
            .insert(alias.into(), value.into());
        self
    }

    /// Attach this node below `parent`
    #[must_use]
    pub fn with_parent(mut self, parent: &NodeRef) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Finish building and return a shareable node handle
    #[must_use]
    pub fn into_node(self) -> NodeRef {
        Arc::new(self)
    }
}

impl ContentNode for MemoryNode {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<NodeRef> {
        self.parent.clone()
    }

    fn raw_value(&self, alias: &str, culture: &str) -> Option<Value> {
        if culture.is_empty() {
            self.values.get(alias).cloned()
        } else {
            // Strict: a culture-specific read never falls back to the
            // neutral value by itself. That is what fallback chains are for.
            self.localized
                .get(culture)
                .and_then(|values| values.get(alias))
                .cloned()
        }
    }
}

/// Resolver over a fixed set of in-memory nodes
#[derive(Default)]
pub struct MemoryResolver {
    nodes: FxHashMap<i64, NodeRef>,
}

impl MemoryResolver {
    /// Create an empty resolver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node under its own id
    pub fn add(&mut self, node: NodeRef) -> &mut Self {
        self.nodes.insert(node.id(), node);
        self
    }
}

impl NodeResolver for MemoryResolver {
    fn node_by_id(&self, id: i64) -> Option<NodeRef> {
        self.nodes.get(&id).cloned()
    }
}
