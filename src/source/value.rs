//! Raw property values handed out by content sources

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use itertools::Itertools;

use crate::source::node::NodeRef;

/// A raw value read from a content source
///
/// Scalar shapes carry the value directly. `Node` and `Nodes` point at
/// other content nodes (picked content, related items). `Object` carries an
/// arbitrary pre-built value that a field can take over wholesale.
#[derive(Clone)]
pub enum Value {
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Text value
    Str(String),
    /// Date-time value
    Date(NaiveDateTime),
    /// A single linked content node
    Node(NodeRef),
    /// A list of linked content nodes
    Nodes(Vec<NodeRef>),
    /// An arbitrary pre-built value
    Object(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wrap an arbitrary value for wholesale assignment
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Value::Object(Arc::new(value))
    }

    /// Render the value as the string the coercion layer parses
    ///
    /// Nodes render as their names; `Object` values have no string form.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Value::Bool(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Str(v) => v.clone(),
            Value::Date(v) => v.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Node(n) => n.name().to_string(),
            Value::Nodes(nodes) => nodes.iter().map(|n| n.name()).join(", "),
            Value::Object(_) => String::new(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::Int(v) => write!(f, "Int({v})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::Str(v) => write!(f, "Str({v:?})"),
            Value::Date(v) => write!(f, "Date({v})"),
            Value::Node(n) => write!(f, "Node(#{} {:?})", n.id(), n.name()),
            Value::Nodes(nodes) => write!(f, "Nodes(len={})", nodes.len()),
            Value::Object(_) => write!(f, "Object(..)"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Date(value)
    }
}

impl From<NodeRef> for Value {
    fn from(value: NodeRef) -> Self {
        Value::Node(value)
    }
}

impl From<Vec<NodeRef>> for Value {
    fn from(value: Vec<NodeRef>) -> Self {
        Value::Nodes(value)
    }
}
