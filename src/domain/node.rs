//! Generic tree node: an insertion-ordered attribute bag read through a schema

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ordering::sort_by_weight;
use crate::domain::schema::NodeSchema;
use crate::domain::value::{compare_weights, NodeId, NodeValue};

/// Tree node backed by an ordered attribute map.
///
/// The schema decides which attributes act as id, parent id, name, weight
/// and children. Every other attribute is an extra and is never interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    schema: Arc<NodeSchema>,
    attributes: IndexMap<String, NodeValue>,
}

impl Default for TreeNode {
    fn default() -> Self {
        Self::new(Arc::new(NodeSchema::default()))
    }
}

impl TreeNode {
    /// Creates a node whose children slot holds an empty node list.
    pub fn new(schema: Arc<NodeSchema>) -> Self {
        let mut attributes = IndexMap::new();
        attributes.insert(
            schema.children_key().to_string(),
            NodeValue::Nodes(Vec::new()),
        );
        Self { schema, attributes }
    }

    pub fn schema(&self) -> &Arc<NodeSchema> {
        &self.schema
    }

    pub fn get(&self, key: &str) -> Option<&NodeValue> {
        self.attributes.get(key)
    }

    /// Stores `value` under `key`, returning the previous value.
    ///
    /// No shape checks happen here; the typed accessors check on read.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<NodeValue>) -> Option<NodeValue> {
        self.attributes.insert(key.into(), value.into())
    }

    pub fn put_extra(&mut self, key: impl Into<String>, value: impl Into<NodeValue>) -> &mut Self {
        self.set(key, value);
        self
    }

    pub fn set_id(&mut self, id: impl Into<NodeId>) -> &mut Self {
        let key = self.schema.id_key().to_string();
        self.set(key, NodeValue::from(id.into()));
        self
    }

    pub fn set_parent_id(&mut self, parent_id: impl Into<NodeId>) -> &mut Self {
        let key = self.schema.parent_id_key().to_string();
        self.set(key, NodeValue::from(parent_id.into()));
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        let key = self.schema.name_key().to_string();
        self.set(key, NodeValue::Text(name.into()));
        self
    }

    pub fn set_weight(&mut self, weight: impl Into<NodeValue>) -> &mut Self {
        let key = self.schema.weight_key().to_string();
        self.set(key, weight);
        self
    }

    /// The node id; a node without one cannot take part in a build.
    pub fn id(&self) -> DomainResult<NodeId> {
        let key = self.schema.id_key();
        match self.get(key) {
            Some(value) => NodeId::from_value(key, value),
            None => Err(DomainError::MissingAttribute {
                key: key.to_string(),
            }),
        }
    }

    pub fn parent_id(&self) -> DomainResult<Option<NodeId>> {
        let key = self.schema.parent_id_key();
        self.get(key)
            .map(|value| NodeId::from_value(key, value))
            .transpose()
    }

    pub fn name(&self) -> DomainResult<Option<&str>> {
        let key = self.schema.name_key();
        match self.get(key) {
            None => Ok(None),
            Some(NodeValue::Text(s)) => Ok(Some(s)),
            Some(other) => Err(DomainError::Cast {
                key: key.to_string(),
                expected: "text",
                found: other.kind(),
            }),
        }
    }

    pub fn weight(&self) -> DomainResult<Option<&NodeValue>> {
        let key = self.schema.weight_key();
        match self.get(key) {
            None => Ok(None),
            Some(value) if value.is_orderable() => Ok(Some(value)),
            Some(other) => Err(DomainError::Cast {
                key: key.to_string(),
                expected: "orderable weight",
                found: other.kind(),
            }),
        }
    }

    /// Child nodes; an absent children slot reads as no children.
    pub fn children(&self) -> DomainResult<&[TreeNode]> {
        let key = self.schema.children_key();
        match self.get(key) {
            None => Ok(&[]),
            Some(NodeValue::Nodes(nodes)) => Ok(nodes),
            Some(other) => Err(DomainError::Cast {
                key: key.to_string(),
                expected: "node list",
                found: other.kind(),
            }),
        }
    }

    pub fn children_mut(&mut self) -> DomainResult<&mut Vec<TreeNode>> {
        let key = self.schema.children_key().to_string();
        match self
            .attributes
            .entry(key.clone())
            .or_insert_with(|| NodeValue::Nodes(Vec::new()))
        {
            NodeValue::Nodes(nodes) => Ok(nodes),
            other => Err(DomainError::Cast {
                key,
                expected: "node list",
                found: other.kind(),
            }),
        }
    }

    /// Children for read-only traversal; a malformed slot counts as a leaf.
    pub(crate) fn child_nodes(&self) -> &[TreeNode] {
        self.children().unwrap_or(&[])
    }

    /// All attributes in insertion order, role keys included.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &NodeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Attributes not bound to a schema role.
    pub fn extras(&self) -> impl Iterator<Item = (&str, &NodeValue)> {
        self.attributes()
            .filter(move |(k, _)| !self.schema.is_role_key(k))
    }

    /// Orders two nodes by weight.
    ///
    /// When this node has no weight the result is `Equal` without looking
    /// at `other`. A missing or incomparable weight on `other` is also
    /// `Equal`, so a stable sort keeps input order for those nodes.
    pub fn compare_weight(&self, other: &TreeNode) -> DomainResult<Ordering> {
        let Some(mine) = self.weight()? else {
            return Ok(Ordering::Equal);
        };
        let Some(theirs) = other.weight()? else {
            return Ok(Ordering::Equal);
        };
        Ok(compare_weights(mine, theirs).unwrap_or(Ordering::Equal))
    }

    /// Sorts every sibling list below this node by weight.
    pub fn sort_descendants(&mut self) -> DomainResult<()> {
        let children = self.children_mut()?;
        sort_by_weight(children)?;
        for child in children.iter_mut() {
            child.sort_descendants()?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self
            .get(self.schema.id_key())
            .map(|v| v.to_string())
            .unwrap_or_else(|| "?".to_string());
        match self.get(self.schema.name_key()) {
            Some(name) => write!(f, "{} [{}]", name, id),
            None => write!(f, "[{}]", id),
        }
    }
}
