//! Diagnostic snapshot of a node's relations

use std::fmt;

use serde::Serialize;
use tracing::instrument;

use crate::domain::{Node, Payload};
use crate::errors::TreeResult;
use crate::paths::{ancestors, distance, path, size};
use crate::queries::{depth, descendants, height, is_internal, is_leaf, is_root, leaves, siblings};

/// Relations of the node itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    pub payload: Payload,
    pub children: Vec<String>,
    pub parent: Option<String>,
    pub depth: usize,
    pub is_root: bool,
    pub is_leaf: bool,
    pub is_internal: bool,
    pub ancestors: Vec<String>,
    pub siblings: Vec<String>,
    pub descendants: Vec<String>,
    pub path: Vec<String>,
    pub root_distance: usize,
    pub leaves_under: Vec<String>,
}

/// Figures about the subtree under the node and the tree it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtreeInfo {
    /// Leaves of the whole tree
    pub leaves: Vec<String>,
    pub height: usize,
    pub root: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStats {
    pub node_info: NodeInfo,
    pub subtree_info: SubtreeInfo,
}

impl NodeStats {
    /// Snapshot using the node's own `name` and `payload`.
    pub fn collect<N: Node>(node: &N) -> TreeResult<Self> {
        node_stats(node, |n| n.name(), |n| n.payload())
    }
}

impl fmt::Display for NodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        write!(f, "{json}")
    }
}

/// Read-only snapshot of `node`; `node_name` and `payload` choose how nodes are reported.
#[instrument(level = "debug", skip_all)]
pub fn node_stats<N, FN, FP>(node: &N, node_name: FN, payload: FP) -> TreeResult<NodeStats>
where
    N: Node,
    FN: Fn(&N) -> String,
    FP: Fn(&N) -> Payload,
{
    let names = |nodes: Vec<N>| -> Vec<String> { nodes.iter().map(&node_name).collect() };
    let root = node.root();

    let node_info = NodeInfo {
        type_name: std::any::type_name::<N>().to_string(),
        name: node_name(node),
        payload: payload(node),
        children: names(node.children()),
        parent: node.parent().map(|p| node_name(&p)),
        depth: depth(node),
        is_root: is_root(node),
        is_leaf: is_leaf(node),
        is_internal: is_internal(node),
        ancestors: names(ancestors(node)),
        siblings: names(siblings(node)),
        descendants: names(descendants(node)?),
        path: names(path(node)),
        root_distance: distance(&root, node).unwrap_or_else(|| depth(node)),
        leaves_under: names(leaves(node)?),
    };
    let subtree_info = SubtreeInfo {
        leaves: names(leaves(&root)?),
        height: height(node),
        root: node_name(&root),
        size: size(node)?,
    };

    Ok(NodeStats {
        node_info,
        subtree_info,
    })
}
