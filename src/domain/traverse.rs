//! Read-only traversal over built trees.
//!
//! All walks are iterative, so deep trees cannot overflow the call stack.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::instrument;

use crate::domain::node::TreeNode;
use crate::domain::value::{NodeId, NodeValue};

impl TreeNode {
    /// Pre-order walk, this node first, children left to right.
    pub fn walk(&self) -> PreOrderIter<'_> {
        PreOrderIter { stack: vec![self] }
    }

    /// Post-order walk, children before their parent.
    pub fn walk_postorder(&self) -> PostOrderIter<'_> {
        PostOrderIter {
            stack: vec![(self, false)],
        }
    }

    /// Number of levels in this subtree; a lone node has depth 1.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut queue = VecDeque::new();
        queue.push_back((self, 1));

        while let Some((node, depth)) = queue.pop_front() {
            max_depth = max_depth.max(depth);
            for child in node.child_nodes() {
                queue.push_back((child, depth + 1));
            }
        }

        max_depth
    }

    /// Nodes without children, in pre-order.
    pub fn leaf_nodes(&self) -> Vec<&TreeNode> {
        self.walk()
            .filter(|node| node.child_nodes().is_empty())
            .collect()
    }

    /// First node in pre-order carrying `id`.
    pub fn find(&self, id: &NodeId) -> Option<&TreeNode> {
        self.walk().find(|node| node.id().ok().as_ref() == Some(id))
    }

    /// Copy of this subtree keeping only nodes that match `predicate` and
    /// their ancestors. Returns `None` when nothing matches.
    pub fn filter<P>(&self, predicate: &P) -> Option<TreeNode>
    where
        P: Fn(&TreeNode) -> bool,
    {
        let kept: Vec<TreeNode> = self
            .child_nodes()
            .iter()
            .filter_map(|child| child.filter(predicate))
            .collect();
        if kept.is_empty() && !predicate(self) {
            return None;
        }

        let children_key = self.schema().children_key().to_string();
        let mut kept = Some(kept);
        let mut copy = TreeNode::new(Arc::clone(self.schema()));
        for (key, value) in self.attributes() {
            let value = if key == children_key {
                NodeValue::Nodes(kept.take().unwrap_or_default())
            } else {
                value.clone()
            };
            copy.set(key, value);
        }
        Some(copy)
    }
}

pub struct PreOrderIter<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in current.child_nodes().iter().rev() {
            self.stack.push(child);
        }
        Some(current)
    }
}

pub struct PostOrderIter<'a> {
    stack: Vec<(&'a TreeNode, bool)>,
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if visited {
                return Some(current);
            }
            self.stack.push((current, true));
            for child in current.child_nodes().iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Total number of nodes in a forest.
pub fn count_nodes(roots: &[TreeNode]) -> usize {
    roots.iter().map(|root| root.walk().count()).sum()
}

/// First node carrying `id` across a forest, roots in order.
pub fn find_in<'a>(roots: &'a [TreeNode], id: &NodeId) -> Option<&'a TreeNode> {
    roots.iter().find_map(|root| root.find(id))
}

/// Chain from a root down to the node carrying `id`, both ends included.
#[instrument(level = "debug", skip(roots))]
pub fn path_to<'a>(roots: &'a [TreeNode], id: &NodeId) -> Option<Vec<&'a TreeNode>> {
    let mut stack: Vec<(&TreeNode, Vec<&TreeNode>)> = roots
        .iter()
        .rev()
        .map(|root| (root, vec![root]))
        .collect();

    while let Some((node, path)) = stack.pop() {
        if node.id().ok().as_ref() == Some(id) {
            return Some(path);
        }
        for child in node.child_nodes().iter().rev() {
            let mut new_path = path.clone();
            new_path.push(child);
            stack.push((child, new_path));
        }
    }
    None
}

/// Every root-to-leaf chain of a forest, in pre-order.
pub fn leaf_paths(roots: &[TreeNode]) -> Vec<Vec<&TreeNode>> {
    let mut paths = Vec::new();
    let mut stack: Vec<(&TreeNode, Vec<&TreeNode>)> = roots
        .iter()
        .rev()
        .map(|root| (root, vec![root]))
        .collect();

    while let Some((node, path)) = stack.pop() {
        let children = node.child_nodes();
        if children.is_empty() {
            paths.push(path);
            continue;
        }
        for child in children.iter().rev() {
            let mut new_path = path.clone();
            new_path.push(child);
            stack.push((child, new_path));
        }
    }
    paths
}
