//! Attribute-key schema for tree nodes

use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};

pub const DEFAULT_ID_KEY: &str = "id";
pub const DEFAULT_PARENT_ID_KEY: &str = "parentId";
pub const DEFAULT_NAME_KEY: &str = "name";
pub const DEFAULT_WEIGHT_KEY: &str = "weight";
pub const DEFAULT_CHILDREN_KEY: &str = "children";

/// Names the attribute keys that carry the five node roles.
///
/// Keys are never blank. They need not be distinct, but two roles sharing a
/// key make both roles read the same attribute; avoiding that is up to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeSchema {
    id_key: String,
    parent_id_key: String,
    name_key: String,
    weight_key: String,
    children_key: String,
}

impl Default for NodeSchema {
    fn default() -> Self {
        Self {
            id_key: DEFAULT_ID_KEY.to_string(),
            parent_id_key: DEFAULT_PARENT_ID_KEY.to_string(),
            name_key: DEFAULT_NAME_KEY.to_string(),
            weight_key: DEFAULT_WEIGHT_KEY.to_string(),
            children_key: DEFAULT_CHILDREN_KEY.to_string(),
        }
    }
}

impl NodeSchema {
    #[instrument(level = "trace")]
    pub fn new(
        id_key: &str,
        parent_id_key: &str,
        name_key: &str,
        weight_key: &str,
        children_key: &str,
    ) -> DomainResult<Self> {
        Ok(Self {
            id_key: checked("id", id_key)?,
            parent_id_key: checked("parent id", parent_id_key)?,
            name_key: checked("name", name_key)?,
            weight_key: checked("weight", weight_key)?,
            children_key: checked("children", children_key)?,
        })
    }

    pub fn id_key(&self) -> &str {
        &self.id_key
    }

    pub fn parent_id_key(&self) -> &str {
        &self.parent_id_key
    }

    pub fn name_key(&self) -> &str {
        &self.name_key
    }

    pub fn weight_key(&self) -> &str {
        &self.weight_key
    }

    pub fn children_key(&self) -> &str {
        &self.children_key
    }

    pub fn with_id_key(mut self, key: &str) -> DomainResult<Self> {
        self.id_key = checked("id", key)?;
        Ok(self)
    }

    pub fn with_parent_id_key(mut self, key: &str) -> DomainResult<Self> {
        self.parent_id_key = checked("parent id", key)?;
        Ok(self)
    }

    pub fn with_name_key(mut self, key: &str) -> DomainResult<Self> {
        self.name_key = checked("name", key)?;
        Ok(self)
    }

    pub fn with_weight_key(mut self, key: &str) -> DomainResult<Self> {
        self.weight_key = checked("weight", key)?;
        Ok(self)
    }

    pub fn with_children_key(mut self, key: &str) -> DomainResult<Self> {
        self.children_key = checked("children", key)?;
        Ok(self)
    }

    /// Whether `key` is bound to one of the five roles.
    pub fn is_role_key(&self, key: &str) -> bool {
        [
            &self.id_key,
            &self.parent_id_key,
            &self.name_key,
            &self.weight_key,
            &self.children_key,
        ]
        .iter()
        .any(|k| k.as_str() == key)
    }
}

fn checked(role: &'static str, key: &str) -> DomainResult<String> {
    if key.trim().is_empty() {
        return Err(DomainError::InvalidSchema {
            role,
            key: key.to_string(),
        });
    }
    Ok(key.to_string())
}
