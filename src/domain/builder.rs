//! Forest builder: links flat parent-referencing nodes into sorted trees.

use std::collections::HashSet;
use std::sync::Arc;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::TreeNode;
use crate::domain::registry::NodeRegistry;
use crate::domain::schema::NodeSchema;
use crate::domain::value::NodeId;

/// Name given to the synthetic node returned by [`ForestBuilder::build_single`].
pub const SINGLE_ROOT_NAME: &str = "root";

/// Converts one source record into a node.
///
/// Invoked once per record with a fresh node bound to the build's schema.
/// How ids are sourced is up to the mapper.
pub trait RecordMapper<R: ?Sized> {
    fn parse(&self, record: &R, node: &mut TreeNode) -> DomainResult<()>;
}

impl<R: ?Sized, F> RecordMapper<R> for F
where
    F: Fn(&R, &mut TreeNode) -> DomainResult<()>,
{
    fn parse(&self, record: &R, node: &mut TreeNode) -> DomainResult<()> {
        self(record, node)
    }
}

/// Builds forests from flat node lists.
///
/// Holds configuration only; every build gets its own registry, so one
/// builder can serve independent builds on several threads.
#[derive(Debug, Clone)]
pub struct ForestBuilder {
    schema: Arc<NodeSchema>,
    root_parent_id: Option<NodeId>,
    max_depth: Option<usize>,
}

impl Default for ForestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestBuilder {
    /// Default schema, root parent id `0`, unlimited depth.
    pub fn new() -> Self {
        Self::with_schema(NodeSchema::default())
    }

    pub fn with_schema(schema: NodeSchema) -> Self {
        Self {
            schema: Arc::new(schema),
            root_parent_id: Some(NodeId::default()),
            max_depth: None,
        }
    }

    /// Sets the parent id that means "no parent". `None` disables the
    /// sentinel so only absent or unresolved parents make roots.
    pub fn root_parent_id(mut self, id: Option<NodeId>) -> Self {
        self.root_parent_id = id;
        self
    }

    /// Drops subtrees below `depth`; roots sit at depth 0.
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn schema(&self) -> &Arc<NodeSchema> {
        &self.schema
    }

    /// A fresh node bound to this builder's schema.
    pub fn new_node(&self) -> TreeNode {
        TreeNode::new(Arc::clone(&self.schema))
    }

    /// Maps every record to a node, then builds the forest.
    #[instrument(level = "debug", skip_all)]
    pub fn build_from<R, I, M>(&self, records: I, mapper: &M) -> DomainResult<Vec<TreeNode>>
    where
        I: IntoIterator<Item = R>,
        M: RecordMapper<R> + ?Sized,
    {
        self.build(self.map_records(records, mapper)?)
    }

    /// Like [`ForestBuilder::build_from`], but returns one synthetic root.
    #[instrument(level = "debug", skip_all)]
    pub fn build_single_from<R, I, M>(&self, records: I, mapper: &M) -> DomainResult<TreeNode>
    where
        I: IntoIterator<Item = R>,
        M: RecordMapper<R> + ?Sized,
    {
        self.build_single(self.map_records(records, mapper)?)
    }

    /// One fresh node per record; a mapper failure names the record's position.
    fn map_records<R, I, M>(&self, records: I, mapper: &M) -> DomainResult<Vec<TreeNode>>
    where
        I: IntoIterator<Item = R>,
        M: RecordMapper<R> + ?Sized,
    {
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let mut node = self.new_node();
                mapper
                    .parse(&record, &mut node)
                    .map_err(|e| DomainError::Mapping {
                        index,
                        source: Box::new(e),
                    })?;
                Ok(node)
            })
            .collect()
    }

    /// Links `nodes` into a forest and returns the weight-sorted roots.
    ///
    /// A node whose parent id is absent or the sentinel is a root. A node
    /// whose parent id names another node becomes that node's child;
    /// siblings keep input order. A node whose parent id names nothing is
    /// promoted to a root rather than rejected, and so is the first node
    /// (in input order) of a parent cycle that cannot reach any root.
    #[instrument(level = "debug", skip_all, fields(nodes = nodes.len()))]
    pub fn build(&self, nodes: Vec<TreeNode>) -> DomainResult<Vec<TreeNode>> {
        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        let mut registry = NodeRegistry::new(self.root_parent_id.clone());
        registry.index(nodes)?;

        let order = registry.order().to_vec();
        for idx in order {
            let parent_id = match registry.node(idx) {
                Some(node) => node.parent_id()?,
                None => continue,
            };
            if registry.is_root_parent(parent_id.as_ref()) {
                continue;
            }
            let Some(parent_id) = parent_id else {
                continue;
            };
            match registry.lookup_index(&parent_id) {
                Some(parent_idx) => registry.attach(parent_idx, idx),
                None => {
                    registry.mark_orphan_parent(idx);
                }
            }
        }

        let roots = self.break_cycles(&mut registry)?;
        debug!(
            "linked {} nodes into {} roots ({} orphaned)",
            registry.len(),
            roots.len(),
            registry.orphan_count()
        );

        registry.into_arena().materialize(&roots, self.max_depth)
    }

    /// Like [`ForestBuilder::build`], but hangs the roots under one
    /// synthetic node carrying the root parent id.
    #[instrument(level = "debug", skip_all)]
    pub fn build_single(&self, nodes: Vec<TreeNode>) -> DomainResult<TreeNode> {
        let roots = self.build(nodes)?;
        let mut single = self.new_node();
        single
            .set_id(self.root_parent_id.clone().unwrap_or_default())
            .set_name(SINGLE_ROOT_NAME);
        single.children_mut()?.extend(roots);
        Ok(single)
    }

    /// Every node must hang below some root. A node left over sits on (or
    /// below) a parent cycle; the first such node in input order is cut
    /// loose and promoted, then reachability is checked again.
    fn break_cycles(&self, registry: &mut NodeRegistry) -> DomainResult<Vec<Index>> {
        loop {
            let roots = registry.roots()?;
            let reachable: HashSet<Index> = registry
                .arena()
                .iter_postorder(&roots, None)
                .map(|(idx, _)| idx)
                .collect();
            if reachable.len() == registry.len() {
                return Ok(roots);
            }
            let stranded = registry
                .order()
                .iter()
                .copied()
                .find(|idx| !reachable.contains(idx));
            let Some(idx) = stranded else {
                return Ok(roots);
            };
            if let Some(node) = registry.node(idx) {
                debug!("parent cycle at node {}: promoted to root", node.id()?);
            }
            registry.detach(idx);
            registry.mark_orphan_parent(idx);
        }
    }
}
