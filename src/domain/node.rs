//! Node capability contract
//!
//! Every algorithm in this crate is generic over a node *handle* implementing [`Node`].
//! Handles are cheap to clone and compare by identity: two distinct nodes carrying the
//! same name and payload are not equal.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::errors::TreeResult;

/// Arbitrary associated values of a node. Copied and read, never interpreted.
pub type Payload = BTreeMap<String, serde_json::Value>;

/// Minimal read-only shape required by the traversal, query and path algorithms.
///
/// `Eq` and `Hash` must be identity based. Membership checks throughout the crate
/// (`is_ancestor`, `is_sibling`, the visited set of undirected expansion, ...) rely on it.
pub trait Node: Clone + Eq + Hash + Debug {
    /// Ordered snapshot of the children. Order determines traversal order.
    fn children(&self) -> Vec<Self>;

    /// Parent node, `None` for a root.
    fn parent(&self) -> Option<Self>;

    /// Identifier of the node, not required to be unique.
    fn name(&self) -> String;

    fn payload(&self) -> Payload;

    /// Whether the handle still exposes `children`.
    ///
    /// Entry-validated operations fail with `MissingCapability` when this is false.
    fn is_live(&self) -> bool {
        true
    }

    /// Node reached by following `parent` until absent.
    ///
    /// Does not terminate on a cyclic parent chain.
    fn root(&self) -> Self {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }
}

/// Node whose children sequence can be assigned as a whole.
pub trait MutableNode: Node {
    /// Replace the children. Nodes no longer listed become detached roots,
    /// newly listed nodes are reparented under `self`.
    fn set_children(&self, children: Vec<Self>) -> TreeResult<()>;
}

/// Node type exposing a constructor, used wherever new trees are produced.
pub trait BuildNode: Node {
    /// Create a node named `name` under `parent` (a new root if `None`).
    ///
    /// A constructor refusing a name must report `TreeError::DuplicateName`;
    /// that is the only error the rename retry of `paths_to_tree` reacts to.
    fn construct(name: &str, parent: Option<&Self>, payload: Payload) -> TreeResult<Self>;
}
