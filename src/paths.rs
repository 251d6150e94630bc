//! Paths, lowest common ancestor and distances

use itertools::Itertools;
use tracing::{instrument, trace};

use crate::domain::Node;
use crate::errors::TreeResult;
use crate::queries::{depth, descendants, is_leaf};

/// Ancestors of `node` by parent walk, nearest first, root last.
///
/// Does not terminate on a cyclic parent chain.
pub fn ancestors<N: Node>(node: &N) -> Vec<N> {
    let mut anc = Vec::new();
    let mut current = node.parent();
    while let Some(parent) = current {
        current = parent.parent();
        anc.push(parent);
    }
    anc
}

/// Root-to-`node` path, found by searching down from `node`'s root.
pub fn path<N: Node>(node: &N) -> Vec<N> {
    find_path(&node.root(), node).unwrap_or_default()
}

/// First path (pre order, leftmost first) from `source` down to `dest`,
/// or `None` if `dest` is not reachable from `source`.
#[instrument(level = "trace", skip(source, dest))]
pub fn find_path<N: Node>(source: &N, dest: &N) -> Option<Vec<N>> {
    fn search<N: Node>(n: &N, dest: &N, path: &mut Vec<N>) -> bool {
        path.push(n.clone());
        if n == dest {
            return true;
        }
        for child in n.children() {
            if search(&child, dest, path) {
                return true;
            }
        }
        path.pop();
        false
    }

    let mut path = Vec::new();
    search(source, dest, &mut path).then_some(path)
}

/// Every path from `node` to a leaf below it, left to right.
///
/// ```text
///     A
///     ├── B
///     │   ├── D
///     │   └── E
///     └── C
///         └── F
/// ```
/// yields `[[A, B, D], [A, B, E], [A, C, F]]`.
pub fn node_to_leaf_paths<N: Node>(node: &N) -> Vec<Vec<N>> {
    fn collect<N: Node>(n: &N, prefix: &mut Vec<N>, paths: &mut Vec<Vec<N>>) {
        prefix.push(n.clone());
        if is_leaf(n) {
            paths.push(prefix.clone());
        } else {
            for child in n.children() {
                collect(&child, prefix, paths);
            }
        }
        prefix.pop();
    }

    let mut paths = Vec::new();
    collect(node, &mut Vec::new(), &mut paths);
    paths
}

/// Number of nodes in the subtree rooted at `node`, `node` included.
pub fn size<N: Node>(node: &N) -> TreeResult<usize> {
    Ok(descendants(node)?.len() + 1)
}

/// Deepest node that is an ancestor-or-self of both `a` and `b`.
///
/// `None` if the two nodes belong to different trees.
#[instrument(level = "trace", skip(a, b))]
pub fn lca<N: Node>(a: &N, b: &N) -> Option<N> {
    let lca = path(a)
        .into_iter()
        .zip(path(b))
        .take_while(|(n1, n2)| n1 == n2)
        .map(|(n, _)| n)
        .last();
    trace!("lca({:?}, {:?}) = {:?}", a, b, lca);
    lca
}

/// Hop distance between `a` and `b` through their lowest common ancestor.
///
/// `None` if the two nodes belong to different trees.
pub fn distance<N: Node>(a: &N, b: &N) -> Option<usize> {
    let common = lca(a, b)?;
    Some(depth(a) + depth(b) - 2 * depth(&common))
}

/// Names along a path, joined for log and report output.
pub(crate) fn path_label<N: Node>(path: &[N]) -> String {
    path.iter().map(|n| n.name()).join("/")
}
