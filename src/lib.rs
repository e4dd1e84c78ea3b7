//! A Rust library for convention-driven mapping of content node trees, XML,
//! JSON and dictionary sources onto statically shaped view models, with
//! per-field rules, custom mappings and collection reconciliation.

// Lets the derive macro emit `::view_mapper::` paths that resolve both
// inside this crate and downstream.
extern crate self as view_mapper;

pub mod coerce;
pub mod config;
pub mod error;
pub mod mapper;
pub mod model;
pub mod models;
pub mod rules;
pub mod source;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::MapperConfig;
pub use error::{MappingError, Result};
pub use mapper::{ContentMapper, Dictionary, MappingContext};
pub use model::{FieldKind, FieldSpec, MapHook, MappableCollection, ScalarValue};

// The derive macro and the trait it implements share a name, like serde's
// Serialize.
pub use macros::Mappable;
pub use model::Mappable as MappableTrait;

// Mapping rules
pub use rules::{CustomMappingFn, CustomObjectMappingFn, MappingRule, RuleMap, StringFormatter};

// Content sources
pub use source::{
    ContentNode, DefaultPropertyValueGetter, FallbackChain, FallbackMethod, LookupTable,
    MemoryNode, MemoryResolver, NodeRef, NodeResolver, PropertyValueGetter, Value,
};

// Collection mapping options
pub use mapper::{DictionaryCollectionOptions, JsonCollectionOptions, XmlCollectionOptions};

// Built-in models
pub use models::MediaFile;

// Re-exported for code generated by the derive macro
pub use chrono;

// Utility functions
pub use utils::init_logging;
