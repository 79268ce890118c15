use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::domain::error::DomainResult;
use crate::domain::node::TreeNode;

/// Arena slot: a node plus the links established during a build.
#[derive(Debug)]
pub struct ArenaNode {
    /// The node being placed into the forest
    pub node: TreeNode,
    /// Index of the resolved parent, None for roots and orphans
    pub parent: Option<Index>,
    /// Indices of attached children, in attachment order
    pub children: Vec<Index>,
}

/// Arena holding the nodes of one build.
///
/// Links are plain indices until [`NodeArena::materialize`] moves every
/// reachable node into its parent's children slot.
#[derive(Debug, Default)]
pub struct NodeArena {
    arena: Arena<ArenaNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            arena: Arena::with_capacity(n),
        }
    }

    #[instrument(level = "trace", skip_all)]
    pub fn insert_node(&mut self, node: TreeNode) -> Index {
        self.arena.insert(ArenaNode {
            node,
            parent: None,
            children: Vec::new(),
        })
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode> {
        self.arena.get(idx)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Links `child` under `parent`. Children keep attachment order.
    #[instrument(level = "trace", skip(self))]
    pub fn attach(&mut self, parent: Index, child: Index) {
        if let Some(slot) = self.arena.get_mut(child) {
            slot.parent = Some(parent);
        }
        if let Some(slot) = self.arena.get_mut(parent) {
            slot.children.push(child);
        }
    }

    /// Unlinks `child` from its parent, if it has one.
    #[instrument(level = "trace", skip(self))]
    pub fn detach(&mut self, child: Index) {
        let Some(parent) = self.arena.get_mut(child).and_then(|slot| slot.parent.take()) else {
            return;
        };
        if let Some(slot) = self.arena.get_mut(parent) {
            slot.children.retain(|&c| c != child);
        }
    }

    /// Post-order walk over the subtrees below `roots`, yielding depths.
    ///
    /// Nodes at `max_depth` are yielded but not descended into.
    pub fn iter_postorder<'a>(
        &'a self,
        roots: &[Index],
        max_depth: Option<usize>,
    ) -> PostOrderIterator<'a> {
        PostOrderIterator::new(self, roots, max_depth)
    }

    /// Moves the linked nodes into nested children lists and returns the
    /// roots in the given order. Subtrees below `max_depth` are dropped.
    #[instrument(level = "debug", skip(self, roots))]
    pub fn materialize(
        mut self,
        roots: &[Index],
        max_depth: Option<usize>,
    ) -> DomainResult<Vec<TreeNode>> {
        let order: Vec<(Index, usize)> = self.iter_postorder(roots, max_depth).collect();

        for (idx, depth) in order {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            let child_idxs = match self.arena.get_mut(idx) {
                Some(slot) => std::mem::take(&mut slot.children),
                None => continue,
            };
            if child_idxs.is_empty() {
                continue;
            }
            let children: Vec<TreeNode> = child_idxs
                .into_iter()
                .filter_map(|c| self.arena.remove(c))
                .map(|slot| slot.node)
                .collect();
            trace!("attaching {} children at depth {}", children.len(), depth);
            if let Some(slot) = self.arena.get_mut(idx) {
                slot.node.children_mut()?.extend(children);
            }
        }

        Ok(roots
            .iter()
            .filter_map(|&r| self.arena.remove(r))
            .map(|slot| slot.node)
            .collect())
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a NodeArena,
    stack: Vec<(Index, usize, bool)>,
    max_depth: Option<usize>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a NodeArena, roots: &[Index], max_depth: Option<usize>) -> Self {
        // Reverse so the first root is finished first
        let stack = roots.iter().rev().map(|&r| (r, 0, false)).collect();
        Self {
            arena,
            stack,
            max_depth,
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, depth, visited)) = self.stack.pop() {
            if let Some(slot) = self.arena.get_node(current_idx) {
                if visited {
                    return Some((current_idx, depth));
                }
                self.stack.push((current_idx, depth, true));
                if self.max_depth.map_or(true, |max| depth < max) {
                    for &child in slot.children.iter().rev() {
                        self.stack.push((child, depth + 1, false));
                    }
                }
            }
        }
        None
    }
}
