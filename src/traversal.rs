//! Traversal engine
//!
//! Depth-first visit and map, breadth-first visit, and an undirected breadth-first
//! expansion that also follows the parent edge. All other algorithms of the crate
//! are built on these.
//!
//! Callbacks are fallible: their error type `E` only needs `From<TreeError>`, so errors
//! raised by a callback reach the caller unmodified and engine errors share the channel.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use tracing::{debug, instrument, trace};

use crate::domain::{MutableNode, Node};
use crate::errors::{TreeError, TreeResult};

/// Order of a depth-first traversal, or level order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    Pre,
    #[default]
    Post,
    Level,
}

impl FromStr for Order {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre" => Ok(Order::Pre),
            "post" => Ok(Order::Post),
            "level" => Ok(Order::Level),
            other => Err(TreeError::InvalidArgument(format!("Invalid order: {other}"))),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Order::Pre => "pre",
            Order::Post => "post",
            Order::Level => "level",
        };
        write!(f, "{s}")
    }
}

fn ensure_live<N: Node>(node: &N, operation: &str) -> TreeResult<()> {
    if node.is_live() {
        Ok(())
    } else {
        Err(TreeError::missing_capability(operation))
    }
}

/// Depth-first visit of the tree rooted at `node` using an explicit stack.
///
/// `func` returns `true` to stop the traversal; `visit` then returns `true`.
/// Nodes deeper than `max_hops` below `node` are skipped together with their subtree.
///
/// With `Order::Post` the callback runs after the node's children are pushed but
/// before any of them is popped, so side effects still happen node-before-descendants,
/// exactly as with `Order::Pre`. `Order::Level` delegates to [`breadth_first`] with
/// `max_hops` as the level ceiling.
#[instrument(level = "trace", skip(node, func))]
pub fn visit<N, F, E>(node: &N, mut func: F, order: Order, max_hops: Option<usize>) -> Result<bool, E>
where
    N: Node,
    F: FnMut(&N) -> Result<bool, E>,
    E: From<TreeError>,
{
    ensure_live(node, "visit")?;

    if order == Order::Level {
        return breadth_first(node, |n, _level| func(n), max_hops);
    }

    let mut stack = vec![(node.clone(), 0usize)];
    while let Some((current, depth)) = stack.pop() {
        if max_hops.is_some_and(|max| depth > max) {
            continue;
        }

        if order == Order::Pre && func(&current)? {
            debug!("visit stopped at {:?}", current);
            return Ok(true);
        }

        // Push children in reverse order for left-to-right traversal
        stack.extend(
            current
                .children()
                .into_iter()
                .rev()
                .map(|child| (child, depth + 1)),
        );

        if order == Order::Post && func(&current)? {
            debug!("visit stopped at {:?}", current);
            return Ok(true);
        }
    }
    Ok(false)
}

/// Rewrite the tree rooted at `node` with `func`, a `Node -> Option<Node>` transformer.
///
/// A `None` result prunes the node: it disappears from its parent's new children list.
/// With `Order::Pre` the node is transformed before its children are rewritten, so a
/// pruned node's subtree is never visited. With `Order::Post` the children are rewritten
/// and assigned first. Returns the rewritten root, or `None` if the root was pruned.
#[instrument(level = "trace", skip(node, func))]
pub fn map<N, F, E>(node: &N, mut func: F, order: Order) -> Result<Option<N>, E>
where
    N: MutableNode,
    F: FnMut(&N) -> Result<Option<N>, E>,
    E: From<TreeError>,
{
    if order == Order::Level {
        return Err(TreeError::InvalidArgument(format!("Invalid order: {order}")).into());
    }
    ensure_live(node, "map")?;
    map_subtree(node, &mut func, order)
}

fn map_subtree<N, F, E>(node: &N, func: &mut F, order: Order) -> Result<Option<N>, E>
where
    N: MutableNode,
    F: FnMut(&N) -> Result<Option<N>, E>,
    E: From<TreeError>,
{
    let current = match order {
        Order::Pre => match func(node)? {
            Some(n) => n,
            None => {
                trace!("pruned {:?}", node);
                return Ok(None);
            }
        },
        _ => node.clone(),
    };

    let mut rewritten = Vec::new();
    for child in current.children() {
        if let Some(new_child) = map_subtree(&child, func, order)? {
            rewritten.push(new_child);
        }
    }
    current.set_children(rewritten)?;

    match order {
        Order::Post => func(&current),
        _ => Ok(Some(current)),
    }
}

/// Level-order traversal; `func` receives each node with its level below `node`.
///
/// Entries beyond `max_level` are skipped without expanding their children.
/// Early exit works as in [`visit`].
#[instrument(level = "trace", skip(node, func))]
pub fn breadth_first<N, F, E>(node: &N, mut func: F, max_level: Option<usize>) -> Result<bool, E>
where
    N: Node,
    F: FnMut(&N, usize) -> Result<bool, E>,
    E: From<TreeError>,
{
    ensure_live(node, "breadth_first")?;

    let mut queue = VecDeque::from([(node.clone(), 0usize)]);
    while let Some((current, level)) = queue.pop_front() {
        if max_level.is_some_and(|max| level > max) {
            continue;
        }
        if func(&current, level)? {
            debug!("breadth_first stopped at {:?} (level {})", current, level);
            return Ok(true);
        }
        queue.extend(current.children().into_iter().map(|c| (c, level + 1)));
    }
    Ok(false)
}

/// Nodes reachable from `node` within `max_hops` hops, treating parent and child
/// links as undirected edges. Returned in discovery order, `node` first.
#[instrument(level = "trace", skip(node))]
pub fn breadth_first_undirected<N: Node>(node: &N, max_hops: Option<usize>) -> TreeResult<Vec<N>> {
    ensure_live(node, "breadth_first_undirected")?;

    let mut within_hops = Vec::new();
    let mut visited: HashSet<N> = HashSet::new();
    let mut queue = VecDeque::from([(node.clone(), 0usize)]);

    while let Some((current, hops)) = queue.pop_front() {
        if max_hops.is_some_and(|max| hops > max) {
            continue;
        }
        if !visited.insert(current.clone()) {
            continue;
        }
        queue.extend(current.children().into_iter().map(|c| (c, hops + 1)));
        if let Some(parent) = current.parent() {
            queue.push_back((parent, hops + 1));
        }
        within_hops.push(current);
    }
    Ok(within_hops)
}

/// All nodes under (and including) `node` satisfying `pred`, in pre order.
pub fn find_nodes<N, P>(node: &N, mut pred: P) -> TreeResult<Vec<N>>
where
    N: Node,
    P: FnMut(&N) -> bool,
{
    let mut nodes = Vec::new();
    visit(
        node,
        |n: &N| -> TreeResult<bool> {
            if pred(n) {
                nodes.push(n.clone());
            }
            Ok(false)
        },
        Order::Pre,
        None,
    )?;
    Ok(nodes)
}

/// Closest node under (and including) `node` satisfying `pred`, where closeness is the
/// level below `node`. Ties at the same level resolve to sibling order.
pub fn find_node<N, P>(node: &N, mut pred: P) -> TreeResult<Option<N>>
where
    N: Node,
    P: FnMut(&N, usize) -> bool,
{
    let mut found = None;
    breadth_first(
        node,
        |n: &N, level| -> TreeResult<bool> {
            if pred(n, level) {
                found = Some(n.clone());
                return Ok(true);
            }
            Ok(false)
        },
        None,
    )?;
    Ok(found)
}

/// Remove every subtree whose root satisfies `pred`.
///
/// Returns `None` when `node` itself is pruned.
pub fn prune<N, P>(node: &N, mut pred: P) -> TreeResult<Option<N>>
where
    N: MutableNode,
    P: FnMut(&N) -> bool,
{
    map(
        node,
        |n: &N| -> TreeResult<Option<N>> { Ok(if pred(n) { None } else { Some(n.clone()) }) },
        Order::Pre,
    )
}
