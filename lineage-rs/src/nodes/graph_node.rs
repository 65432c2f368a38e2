//! GraphNode: a vertex in the lineage graph with its property bag.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::NodeType;

/// Store-assigned handle of a node.
pub type NodeId = Uuid;

/// A value in a node's open property bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Integer(i64),
    Text(String),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            PropertyValue::Integer(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(v) => Some(*v),
            PropertyValue::Text(_) => None,
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Integer(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Text(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Text(v.to_string())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Integer(v) => write!(f, "{v}"),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

/// A node in the lineage graph.
///
/// `name` is unique within `node_type` for entity nodes. Instance nodes on the
/// always-create paths may share a name with earlier nodes of the same type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub uuid: NodeId,
    pub name: String,
    pub node_type: NodeType,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl GraphNode {
    /// Build a node with a fresh id and an empty property bag.
    pub fn new(name: impl Into<String>, node_type: NodeType, created_at: DateTime<Utc>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            node_type,
            created_at,
            properties: BTreeMap::new(),
        }
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}
