//! Domain layer: the node capability contract and the arena-backed reference node.
//!
//! The algorithms only see the traits in [`node`]; [`arena`] is one implementation.

pub mod arena;
pub mod node;

pub use arena::{Forest, NodeRef, NodeSlot};
pub use node::{BuildNode, MutableNode, Node, Payload};
