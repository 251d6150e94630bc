//! Relationship queries
//!
//! Closed-form compositions of the traversal engine, recomputed on every call.
//! Membership predicates scan a freshly computed node list: O(subtree size) per call.

use tracing::instrument;

use crate::domain::Node;
use crate::errors::TreeResult;
use crate::traversal::{visit, Order};

/// Every node below `node` in pre order, excluding `node` itself.
#[instrument(level = "trace", skip(node))]
pub fn descendants<N: Node>(node: &N) -> TreeResult<Vec<N>> {
    let mut results = Vec::new();
    visit(
        node,
        |n: &N| -> TreeResult<bool> {
            results.push(n.clone());
            Ok(false)
        },
        Order::Pre,
        None,
    )?;
    results.remove(0);
    Ok(results)
}

/// Other children of `node`'s parent; empty for a root.
pub fn siblings<N: Node>(node: &N) -> Vec<N> {
    match node.parent() {
        None => Vec::new(),
        Some(parent) => parent
            .children()
            .into_iter()
            .filter(|c| c != node)
            .collect(),
    }
}

/// Childless nodes under (and including) `node`, left to right.
#[instrument(level = "trace", skip(node))]
pub fn leaves<N: Node>(node: &N) -> TreeResult<Vec<N>> {
    let mut results = Vec::new();
    visit(
        node,
        |n: &N| -> TreeResult<bool> {
            if is_leaf(n) {
                results.push(n.clone());
            }
            Ok(false)
        },
        Order::Post,
        None,
    )?;
    Ok(results)
}

/// Length of the longest downward path from `node` to a leaf.
pub fn height<N: Node>(node: &N) -> usize {
    node.children()
        .iter()
        .map(|c| 1 + height(c))
        .max()
        .unwrap_or(0)
}

/// Number of edges between `node` and its root.
///
/// Does not terminate on a cyclic parent chain.
pub fn depth<N: Node>(node: &N) -> usize {
    let mut depth = 0;
    let mut current = node.parent();
    while let Some(parent) = current {
        depth += 1;
        current = parent.parent();
    }
    depth
}

pub fn is_root<N: Node>(node: &N) -> bool {
    node.parent().is_none()
}

pub fn is_leaf<N: Node>(node: &N) -> bool {
    !is_internal(node)
}

pub fn is_internal<N: Node>(node: &N) -> bool {
    !node.children().is_empty()
}

/// True if `other` lies strictly below `node`.
pub fn is_ancestor<N: Node>(node: &N, other: &N) -> TreeResult<bool> {
    Ok(descendants(node)?.contains(other))
}

/// True if `node` lies strictly below `other`.
pub fn is_descendant<N: Node>(node: &N, other: &N) -> TreeResult<bool> {
    Ok(descendants(other)?.contains(node))
}

pub fn is_sibling<N: Node>(node: &N, other: &N) -> bool {
    siblings(other).contains(node)
}
