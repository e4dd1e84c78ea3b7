//! Content sources the mapping engine can read from
//!
//! A source is anything that can hand out property values by alias: a
//! content node tree, an in-memory test fixture, or a lookup table of
//! translated strings. XML and JSON documents are handled directly by the
//! engine and do not go through these traits.

pub mod getter;
pub mod memory;
pub mod node;
pub mod value;

pub use getter::{DefaultPropertyValueGetter, PropertyValueGetter};
pub use memory::{MemoryNode, MemoryResolver};
pub use node::{
    ContentNode, EmptyLookup, FallbackChain, FallbackMethod, LookupTable, NodeRef, NodeResolver,
    NullResolver,
};
pub use value::Value;
