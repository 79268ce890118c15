//! Per-build node index
//!
//! Holds every node of one build in an arena, keyed by id, plus the set of
//! nodes whose declared parent could not be resolved. Discarded when the
//! build returns.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::NodeArena;
use crate::domain::error::DomainResult;
use crate::domain::node::TreeNode;
use crate::domain::ordering::stable_sort_by;
use crate::domain::value::NodeId;

#[derive(Debug)]
pub struct NodeRegistry {
    arena: NodeArena,
    /// Input order of all indexed nodes
    order: Vec<Index>,
    by_id: HashMap<NodeId, Index>,
    /// Nodes promoted to roots: their parent id resolved to nothing, or
    /// their parent chain looped. Keyed by node identity: two nodes may
    /// share an id.
    orphans: HashSet<Index>,
    root_parent_id: Option<NodeId>,
}

impl NodeRegistry {
    /// Creates an empty registry; `root_parent_id` is the "no parent" sentinel.
    pub fn new(root_parent_id: Option<NodeId>) -> Self {
        Self {
            arena: NodeArena::new(),
            order: Vec::new(),
            by_id: HashMap::new(),
            orphans: HashSet::new(),
            root_parent_id,
        }
    }

    /// Indexes nodes by id in input order.
    ///
    /// A repeated id silently replaces the earlier entry in the lookup
    /// table; the earlier node stays in the build but can no longer be
    /// found as a parent.
    #[instrument(level = "debug", skip_all, fields(nodes = nodes.len()))]
    pub fn index(&mut self, nodes: Vec<TreeNode>) -> DomainResult<()> {
        self.arena = NodeArena::with_capacity(nodes.len());
        self.order = Vec::with_capacity(nodes.len());
        self.by_id.clear();
        self.orphans.clear();

        let mut overwritten = 0usize;
        for node in nodes {
            let id = node.id()?;
            let idx = self.arena.insert_node(node);
            self.order.push(idx);
            if self.by_id.insert(id.clone(), idx).is_some() {
                debug!("duplicate node id {}: later node wins parent lookups", id);
                overwritten += 1;
            }
        }
        debug!(
            "indexed {} nodes ({} distinct ids, {} overwritten)",
            self.order.len(),
            self.by_id.len(),
            overwritten
        );
        Ok(())
    }

    pub fn lookup(&self, id: &NodeId) -> Option<&TreeNode> {
        self.lookup_index(id).and_then(|idx| self.node(idx))
    }

    pub fn lookup_index(&self, id: &NodeId) -> Option<Index> {
        self.by_id.get(id).copied()
    }

    pub fn node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get_node(idx).map(|slot| &slot.node)
    }

    /// Indexed nodes in input order.
    pub fn order(&self) -> &[Index] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `parent_id` means "no parent": absent, or the sentinel.
    pub fn is_root_parent(&self, parent_id: Option<&NodeId>) -> bool {
        match parent_id {
            None => true,
            Some(pid) => self.root_parent_id.as_ref() == Some(pid),
        }
    }

    /// Records that the node at `idx` has no usable parent, making it a
    /// root. Idempotent; returns whether it was new.
    pub fn mark_orphan_parent(&mut self, idx: Index) -> bool {
        self.orphans.insert(idx)
    }

    pub fn orphan_count(&self) -> usize {
        self.orphans.len()
    }

    pub fn attach(&mut self, parent: Index, child: Index) {
        self.arena.attach(parent, child);
    }

    pub fn detach(&mut self, child: Index) {
        self.arena.detach(child);
    }

    /// Roots in weight order, ties kept in input order.
    ///
    /// A root either has the "no parent" parent id or was marked via
    /// [`NodeRegistry::mark_orphan_parent`]. Each node appears at most once.
    #[instrument(level = "debug", skip(self))]
    pub fn roots(&self) -> DomainResult<Vec<Index>> {
        let mut collected = HashSet::new();
        let mut roots = Vec::new();
        for &idx in &self.order {
            let Some(node) = self.node(idx) else {
                continue;
            };
            let is_root = self.is_root_parent(node.parent_id()?.as_ref())
                || self.orphans.contains(&idx);
            if is_root && collected.insert(idx) {
                roots.push(idx);
            }
        }

        stable_sort_by(&mut roots, |&a, &b| match (self.node(a), self.node(b)) {
            (Some(a), Some(b)) => a.compare_weight(b),
            _ => Ok(std::cmp::Ordering::Equal),
        })?;
        Ok(roots)
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn into_arena(self) -> NodeArena {
        self.arena
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, parent: Option<i64>, name: &str) -> TreeNode {
        let mut n = TreeNode::default();
        n.set_id(id).set_name(name);
        if let Some(p) = parent {
            n.set_parent_id(p);
        }
        n
    }

    fn root_ids(registry: &NodeRegistry) -> Vec<NodeId> {
        registry
            .roots()
            .unwrap()
            .into_iter()
            .map(|idx| registry.node(idx).unwrap().id().unwrap())
            .collect()
    }

    #[test]
    fn given_nodes_when_indexing_then_lookup_by_id() {
        let mut registry = NodeRegistry::new(Some(NodeId::Int(0)));
        registry
            .index(vec![node(1, Some(0), "a"), node(2, Some(1), "b")])
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup(&NodeId::Int(2)).unwrap().name().unwrap(), Some("b"));
        assert!(registry.lookup(&NodeId::Int(3)).is_none());
    }

    #[test]
    fn given_duplicate_ids_when_indexing_then_last_write_wins() {
        let mut registry = NodeRegistry::new(Some(NodeId::Int(0)));
        registry
            .index(vec![node(1, Some(0), "a"), node(1, Some(0), "b")])
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup(&NodeId::Int(1)).unwrap().name().unwrap(), Some("b"));
        assert_eq!(root_ids(&registry), vec![NodeId::Int(1), NodeId::Int(1)]);
    }

    #[test]
    fn given_orphan_marked_twice_then_idempotent() {
        let mut registry = NodeRegistry::new(Some(NodeId::Int(0)));
        registry.index(vec![node(1, Some(99), "a")]).unwrap();
        let idx = registry.order()[0];

        assert!(root_ids(&registry).is_empty());
        assert!(registry.mark_orphan_parent(idx));
        assert!(!registry.mark_orphan_parent(idx));
        assert_eq!(registry.orphan_count(), 1);
        assert_eq!(root_ids(&registry), vec![NodeId::Int(1)]);
    }

    #[test]
    fn given_sentinel_disabled_then_only_absent_parent_is_root() {
        let mut registry = NodeRegistry::new(None);
        registry
            .index(vec![node(1, Some(0), "a"), node(2, None, "b")])
            .unwrap();

        assert!(!registry.is_root_parent(Some(&NodeId::Int(0))));
        assert_eq!(root_ids(&registry), vec![NodeId::Int(2)]);
    }

    #[test]
    fn given_weighted_roots_then_sorted_by_weight() {
        let mut registry = NodeRegistry::new(Some(NodeId::Int(0)));
        let mut heavy = node(1, Some(0), "heavy");
        heavy.set_weight(5);
        let mut light = node(2, Some(0), "light");
        light.set_weight(1);
        registry.index(vec![heavy, light]).unwrap();

        assert_eq!(root_ids(&registry), vec![NodeId::Int(2), NodeId::Int(1)]);
    }

    #[test]
    fn given_node_without_id_when_indexing_then_errors() {
        let mut registry = NodeRegistry::new(None);
        let result = registry.index(vec![TreeNode::default()]);
        assert!(result.is_err());
    }
}
