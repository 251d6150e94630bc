use termtree::Tree;
use tracing::instrument;

use crate::domain::{Forest, Node, NodeRef};

/// Render a node and its subtree as a `termtree` of names.
pub fn to_termtree<N: Node>(node: &N) -> Tree<String> {
    let leaves: Vec<_> = node.children().iter().map(to_termtree).collect();
    Tree::new(node.name()).with_leaves(leaves)
}

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for NodeRef {
    #[instrument(level = "trace")]
    fn to_tree_string(&self) -> Tree<String> {
        to_termtree(self)
    }
}

// Every root of the forest, detached subtrees included
impl TreeNodeConvert for Forest {
    fn to_tree_string(&self) -> Tree<String> {
        let roots = self.roots();
        if roots.is_empty() {
            return Tree::new("Empty forest".to_string());
        }
        Tree::new("forest".to_string()).with_leaves(roots.iter().map(to_termtree))
    }
}
