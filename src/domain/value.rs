//! Dynamic attribute values and node identifiers

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::TreeNode;

/// Value stored under an attribute key of a [`TreeNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<NodeValue>),
    Map(IndexMap<String, NodeValue>),
    /// Child nodes; only meaningful under the schema's children key.
    Nodes(Vec<TreeNode>),
}

impl NodeValue {
    /// Short shape name used in cast errors.
    pub fn kind(&self) -> &'static str {
        match self {
            NodeValue::Bool(_) => "bool",
            NodeValue::Int(_) => "integer",
            NodeValue::Float(_) => "float",
            NodeValue::Text(_) => "text",
            NodeValue::List(_) => "list",
            NodeValue::Map(_) => "map",
            NodeValue::Nodes(_) => "node list",
        }
    }

    /// Whether this value can act as a weight.
    pub fn is_orderable(&self) -> bool {
        matches!(
            self,
            NodeValue::Bool(_) | NodeValue::Int(_) | NodeValue::Float(_) | NodeValue::Text(_)
        )
    }
}

/// Compares two weights.
///
/// Returns `None` when the pair is incomparable (different shapes, or NaN).
pub fn compare_weights(a: &NodeValue, b: &NodeValue) -> Option<Ordering> {
    match (a, b) {
        (NodeValue::Int(x), NodeValue::Int(y)) => Some(x.cmp(y)),
        (NodeValue::Float(x), NodeValue::Float(y)) => x.partial_cmp(y),
        (NodeValue::Int(x), NodeValue::Float(y)) => (*x as f64).partial_cmp(y),
        (NodeValue::Float(x), NodeValue::Int(y)) => x.partial_cmp(&(*y as f64)),
        (NodeValue::Text(x), NodeValue::Text(y)) => Some(x.cmp(y)),
        (NodeValue::Bool(x), NodeValue::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Bool(b) => write!(f, "{}", b),
            NodeValue::Int(i) => write!(f, "{}", i),
            NodeValue::Float(x) => write!(f, "{}", x),
            NodeValue::Text(s) => write!(f, "{}", s),
            NodeValue::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            NodeValue::Map(map) => write!(
                f,
                "{{{}}}",
                map.iter().map(|(k, v)| format!("{}: {}", k, v)).join(", ")
            ),
            NodeValue::Nodes(nodes) => write!(f, "<{} nodes>", nodes.len()),
        }
    }
}

impl From<bool> for NodeValue {
    fn from(v: bool) -> Self {
        NodeValue::Bool(v)
    }
}

impl From<i64> for NodeValue {
    fn from(v: i64) -> Self {
        NodeValue::Int(v)
    }
}

impl From<i32> for NodeValue {
    fn from(v: i32) -> Self {
        NodeValue::Int(v.into())
    }
}

impl From<u32> for NodeValue {
    fn from(v: u32) -> Self {
        NodeValue::Int(v.into())
    }
}

impl From<f64> for NodeValue {
    fn from(v: f64) -> Self {
        NodeValue::Float(v)
    }
}

impl From<&str> for NodeValue {
    fn from(v: &str) -> Self {
        NodeValue::Text(v.to_string())
    }
}

impl From<String> for NodeValue {
    fn from(v: String) -> Self {
        NodeValue::Text(v)
    }
}

impl From<Vec<TreeNode>> for NodeValue {
    fn from(v: Vec<TreeNode>) -> Self {
        NodeValue::Nodes(v)
    }
}

impl From<NodeId> for NodeValue {
    fn from(id: NodeId) -> Self {
        match id {
            NodeId::Int(i) => NodeValue::Int(i),
            NodeId::Text(s) => NodeValue::Text(s),
        }
    }
}

impl From<toml::Value> for NodeValue {
    fn from(v: toml::Value) -> Self {
        match v {
            toml::Value::String(s) => NodeValue::Text(s),
            toml::Value::Integer(i) => NodeValue::Int(i),
            toml::Value::Float(x) => NodeValue::Float(x),
            toml::Value::Boolean(b) => NodeValue::Bool(b),
            toml::Value::Datetime(d) => NodeValue::Text(d.to_string()),
            toml::Value::Array(items) => {
                NodeValue::List(items.into_iter().map(NodeValue::from).collect())
            }
            toml::Value::Table(table) => NodeValue::Map(
                table
                    .into_iter()
                    .map(|(k, v)| (k, NodeValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Identifier of a node: the shapes usable as registry keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Text(String),
}

impl NodeId {
    /// Interprets the value stored under `key` as an id.
    pub fn from_value(key: &str, value: &NodeValue) -> DomainResult<Self> {
        match value {
            NodeValue::Int(i) => Ok(NodeId::Int(*i)),
            NodeValue::Text(s) => Ok(NodeId::Text(s.clone())),
            other => Err(DomainError::Cast {
                key: key.to_string(),
                expected: "integer or text id",
                found: other.kind(),
            }),
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        NodeId::Int(0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Int(i) => write!(f, "{}", i),
            NodeId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Integer literals parse as `Int`, everything else as `Text`.
impl FromStr for NodeId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(i) => NodeId::Int(i),
            Err(_) => NodeId::Text(s.to_string()),
        })
    }
}

impl From<i64> for NodeId {
    fn from(v: i64) -> Self {
        NodeId::Int(v)
    }
}

impl From<i32> for NodeId {
    fn from(v: i32) -> Self {
        NodeId::Int(v.into())
    }
}

impl From<&str> for NodeId {
    fn from(v: &str) -> Self {
        NodeId::Text(v.to_string())
    }
}

impl From<String> for NodeId {
    fn from(v: String) -> Self {
        NodeId::Text(v)
    }
}
