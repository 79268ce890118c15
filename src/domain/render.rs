use termtree::Tree;
use tracing::instrument;

use crate::domain::node::TreeNode;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for TreeNode {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        // The label of the Tree<String> is the node's display form
        let leaves: Vec<_> = self
            .child_nodes()
            .iter()
            .map(|c| c.to_tree_string())
            .collect();

        Tree::new(self.to_string()).with_leaves(leaves)
    }
}

/// A forest renders as its roots hung below a `.` node.
impl TreeNodeConvert for [TreeNode] {
    fn to_tree_string(&self) -> Tree<String> {
        if self.is_empty() {
            return Tree::new("Empty forest".to_string());
        }
        Tree::new(".".to_string()).with_leaves(self.iter().map(|root| root.to_tree_string()))
    }
}
