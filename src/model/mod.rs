//! View model contracts
//!
//! This module defines the trait the mapping engine drives and the field
//! catalog it reads. Implementations are normally generated with the
//! `Mappable` derive macro rather than written by hand.

pub mod collection;

pub use collection::MappableCollection;

use std::any::Any;
use std::fmt;

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::mapper::MappingContext;
use crate::rules::RuleMap;
use crate::source::Value;

/// The mapping kind of a view model field
///
/// This enum standardizes field types across view models, allowing the
/// engine to pick the right coercion without knowing concrete Rust types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Boolean value
    Bool,
    /// Integer value of any width
    Int,
    /// Floating point value
    Float,
    /// Text value
    Str,
    /// Date or date-time value
    Date,
    /// Nested view model
    Complex,
    /// Collection of nested view models
    Collection,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Bool => write!(f, "Bool"),
            FieldKind::Int => write!(f, "Int"),
            FieldKind::Float => write!(f, "Float"),
            FieldKind::Str => write!(f, "Str"),
            FieldKind::Date => write!(f, "Date"),
            FieldKind::Complex => write!(f, "Complex"),
            FieldKind::Collection => write!(f, "Collection"),
        }
    }
}

/// A scalar value in the shape a field stores it
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Boolean value
    Bool(bool),
    /// Integer value, widened to 64 bits
    Int(i64),
    /// Floating point value, widened to 64 bits
    Float(f64),
    /// Text value
    Str(String),
    /// Date-time value
    Date(NaiveDateTime),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(v) => write!(f, "{v}"),
            ScalarValue::Int(v) => write!(f, "{v}"),
            ScalarValue::Float(v) => write!(f, "{v}"),
            ScalarValue::Str(v) => write!(f, "{v}"),
            ScalarValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// A hook invoked instead of the built-in assignment for one field
///
/// Receives the mapping context, the raw value resolved for the field (if
/// any), the model being populated and the field name. The hook owns the
/// write; the engine only re-applies concatenation or coalescing afterwards.
pub type MapHook =
    fn(&MappingContext, Option<&Value>, &mut dyn Mappable, &str) -> Result<()>;

/// Catalog entry describing one mappable field
///
/// The derive macro emits one of these per struct field into a static
/// slice, so the catalog is computed once at compile time.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name, which doubles as the default source alias
    pub name: &'static str,
    /// The mapping kind of the field
    pub kind: FieldKind,
    /// Whether the field is `Option`-wrapped
    pub nullable: bool,
    /// Normalized type name, e.g. `"Vec<MediaFile>"`; used to key custom
    /// mappings
    pub type_name: &'static str,
    /// Hook that takes over assignment for this field
    pub hook: Option<MapHook>,
}

/// A view model the engine can populate by field name
///
/// `Mappable` is object safe: the engine works against `&mut dyn Mappable`
/// throughout, so nested models and collections of differing types can all
/// be driven through the same interface.
pub trait Mappable {
    /// The model's type name, used to key type-level custom mappings
    fn type_name(&self) -> &'static str;

    /// The static field catalog
    fn fields(&self) -> &'static [FieldSpec];

    /// Mapping rules declared with `#[map(...)]` attributes
    ///
    /// Returns a fresh map on every call; callers merge it with their own
    /// rules.
    fn annotated_rules(&self) -> RuleMap;

    /// Write a scalar value into `field`
    ///
    /// Returns `false` when the field is unknown or not scalar. A value
    /// that does not fit (e.g. integer narrowing overflow) is silently
    /// dropped and still counts as handled.
    fn set_scalar(&mut self, field: &str, value: ScalarValue) -> bool;

    /// Read the current scalar value of `field`
    fn get_scalar(&self, field: &str) -> Option<ScalarValue>;

    /// Mutable access to a nested model field
    fn complex_mut(&mut self, field: &str) -> Option<&mut dyn Mappable>;

    /// Mutable access to a collection field
    fn collection_mut(&mut self, field: &str) -> Option<&mut dyn MappableCollection>;

    /// Write an owned value of the field's concrete type into `field`
    ///
    /// Used by custom mappings. Returns `Ok(false)` for an unknown field
    /// and an error when the runtime type does not match.
    fn set_boxed(&mut self, field: &str, value: Box<dyn Any>) -> Result<bool>;

    /// Clone a borrowed value of the field's concrete type into `field`
    ///
    /// Used for `Value::Object` sources. Returns `false` when the field is
    /// unknown or the runtime type does not match.
    fn set_cloned(&mut self, field: &str, value: &(dyn Any + Send + Sync)) -> bool;
}
