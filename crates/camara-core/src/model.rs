//! Graph data model.
//!
//! Every node type is keyed by a natural identifier that is unique within
//! its label. Property values are restricted to scalars: the store never
//! receives nested objects or lists.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Node labels written by the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Deputy,
    Party,
    Organ,
    Votation,
    Proposition,
}

/// Type of a label's natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Integer,
    Text,
}

impl Label {
    pub const ALL: [Label; 5] = [
        Label::Deputy,
        Label::Party,
        Label::Organ,
        Label::Votation,
        Label::Proposition,
    ];

    /// The Neo4j node label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Deputy => "Deputy",
            Label::Party => "Party",
            Label::Organ => "Organ",
            Label::Votation => "Votation",
            Label::Proposition => "Proposition",
        }
    }

    /// Property holding the natural key.
    pub fn key_field(&self) -> &'static str {
        match self {
            Label::Party => "sigla",
            _ => "id",
        }
    }

    pub fn key_kind(&self) -> KeyKind {
        match self {
            Label::Party | Label::Votation => KeyKind::Text,
            Label::Deputy | Label::Organ | Label::Proposition => KeyKind::Integer,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A natural key value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    Int(i64),
    Text(String),
}

impl NodeKey {
    pub fn kind(&self) -> KeyKind {
        match self {
            NodeKey::Int(_) => KeyKind::Integer,
            NodeKey::Text(_) => KeyKind::Text,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Int(id) => write!(f, "{id}"),
            NodeKey::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for NodeKey {
    fn from(id: i64) -> Self {
        NodeKey::Int(id)
    }
}

impl From<&str> for NodeKey {
    fn from(id: &str) -> Self {
        NodeKey::Text(id.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(id: String) -> Self {
        NodeKey::Text(id)
    }
}

/// A scalar property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    /// Convert a JSON value, returning `None` for objects and arrays.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(PropertyValue::Null),
            Value::Bool(b) => Some(PropertyValue::Bool(*b)),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => PropertyValue::Int(i),
                None => PropertyValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            Value::String(s) => Some(PropertyValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret this value as a natural key.
    pub fn as_key(&self) -> Option<NodeKey> {
        match self {
            PropertyValue::Int(i) => Some(NodeKey::Int(*i)),
            PropertyValue::Text(s) => Some(NodeKey::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<NodeKey> for PropertyValue {
    fn from(key: NodeKey) -> Self {
        match key {
            NodeKey::Int(i) => PropertyValue::Int(i),
            NodeKey::Text(s) => PropertyValue::Text(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

/// Flat property map of a node or relationship.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A node ready to be upserted: its natural key plus all properties.
///
/// `properties` always contains the key under the label's key field.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub key: NodeKey,
    pub properties: Properties,
}

impl Node {
    /// Build a node, writing `key` into `properties` under `key_field`.
    pub fn new(key_field: &str, key: NodeKey, mut properties: Properties) -> Self {
        properties.insert(key_field.to_string(), key.clone().into());
        Self { key, properties }
    }

    pub fn get(&self, field: &str) -> Option<&PropertyValue> {
        self.properties.get(field)
    }
}
