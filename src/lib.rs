//! Traversal, query, transformation and reconstruction algorithms over parent-linked trees.
//!
//! The algorithms work on any node handle implementing [`domain::Node`] (plus
//! [`domain::MutableNode`] for rewriting and [`domain::BuildNode`] for producing new
//! trees). [`domain::NodeRef`] is the bundled arena-backed implementation.
//!
//! All operations are synchronous and assume the tree is not mutated while they run.

pub mod builder;
pub mod config;
pub mod domain;
pub mod errors;
pub mod paths;
pub mod queries;
pub mod stats;
pub mod subtree;
pub mod traversal;
pub mod tree_traits;
pub mod util;

pub use builder::{paths_to_tree, PathElement, TreeBuilder};
pub use domain::{BuildNode, Forest, MutableNode, Node, NodeRef, Payload};
pub use errors::{TreeError, TreeResult};
pub use paths::{ancestors, distance, find_path, lca, node_to_leaf_paths, path, size};
pub use queries::{
    depth, descendants, height, is_ancestor, is_descendant, is_internal, is_leaf, is_root,
    is_sibling, leaves, siblings,
};
pub use stats::{node_stats, NodeStats};
pub use subtree::{subtree_centered_at, subtree_rooted_at};
pub use traversal::{
    breadth_first, breadth_first_undirected, find_node, find_nodes, map, prune, visit, Order,
};
