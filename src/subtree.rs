//! Subtree extraction
//!
//! Both extractions copy into a freshly constructed tree: the new nodes carry the
//! names and payloads of the originals but are distinct identities.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::domain::BuildNode;
use crate::errors::TreeResult;
use crate::traversal::{breadth_first, breadth_first_undirected};

/// Copy of `node` and everything at most `max_level` levels below it.
#[instrument(level = "debug", skip(node), fields(node = ?node))]
pub fn subtree_rooted_at<N: BuildNode>(node: &N, max_level: Option<usize>) -> TreeResult<N> {
    let mut within: HashSet<N> = HashSet::new();
    breadth_first(
        node,
        |n: &N, _level| -> TreeResult<bool> {
            within.insert(n.clone());
            Ok(false)
        },
        max_level,
    )?;
    debug!("collected {} nodes", within.len());
    copy_induced(node, None, &within)
}

/// Copy of the neighbourhood of `node`: every node within `max_hops` hops through
/// parent or child links, re-rooted at the shallowest collected ancestor of `node`.
#[instrument(level = "debug", skip(node), fields(node = ?node))]
pub fn subtree_centered_at<N: BuildNode>(node: &N, max_hops: Option<usize>) -> TreeResult<N> {
    let within: HashSet<N> = breadth_first_undirected(node, max_hops)?
        .into_iter()
        .collect();

    // The collected set is connected, so its root is the last collected node on the
    // parent chain; the walk stops at the first parent outside the set.
    let mut root = node.clone();
    while let Some(parent) = root.parent() {
        if !within.contains(&parent) {
            break;
        }
        root = parent;
    }
    debug!("re-rooted at {:?} with {} nodes", root, within.len());
    copy_induced(&root, None, &within)
}

/// Rebuild `node` under `parent`, descending only into children contained in `within`.
fn copy_induced<N: BuildNode>(node: &N, parent: Option<&N>, within: &HashSet<N>) -> TreeResult<N> {
    let new_node = N::construct(&node.name(), parent, node.payload())?;
    for child in node.children() {
        if within.contains(&child) {
            copy_induced(&child, Some(&new_node), within)?;
        }
    }
    Ok(new_node)
}
