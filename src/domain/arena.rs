use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::node::{BuildNode, MutableNode, Node, Payload};
use crate::errors::{TreeError, TreeResult};

/// Storage slot of a single node inside a [`Forest`].
#[derive(Debug, Clone)]
pub struct NodeSlot {
    /// Name of the node, unique among its siblings
    pub name: String,
    /// Associated values, never interpreted
    pub payload: Payload,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena
    pub children: Vec<Index>,
}

/// Arena shared by all nodes created from the same root.
///
/// Uses generational arena for memory-safe node references: handles to removed
/// nodes stay valid values but no longer resolve.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    arena: Rc<RefCell<Arena<NodeSlot>>>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// All parentless nodes of the forest, including detached subtrees.
    pub fn roots(&self) -> Vec<NodeRef> {
        let arena = self.arena.borrow();
        let mut roots: Vec<Index> = arena
            .iter()
            .filter(|(_, slot)| slot.parent.is_none())
            .map(|(idx, _)| idx)
            .collect();
        roots.sort();
        drop(arena);
        roots.into_iter().map(|idx| self.handle(idx)).collect()
    }

    /// Insert a node, as a new root if `parent` is `None`.
    ///
    /// Fails with `DuplicateName` if `parent` already has a child called `name`.
    #[instrument(level = "trace", skip(self, payload))]
    pub fn insert(
        &self,
        name: &str,
        payload: Payload,
        parent: Option<&NodeRef>,
    ) -> TreeResult<NodeRef> {
        let parent_idx = match parent {
            Some(p) => {
                self.ensure_member(p)?;
                Some(p.idx)
            }
            None => None,
        };

        let mut arena = self.arena.borrow_mut();
        if let Some(pidx) = parent_idx {
            let slot = arena
                .get(pidx)
                .ok_or_else(|| TreeError::missing_capability("insert"))?;
            if has_child_named(&arena, &slot.children, name, None) {
                return Err(TreeError::DuplicateName {
                    parent: slot.name.clone(),
                    name: name.to_string(),
                });
            }
        }

        let node_idx = arena.insert(NodeSlot {
            name: name.to_string(),
            payload,
            parent: parent_idx,
            children: Vec::new(),
        });
        if let Some(pidx) = parent_idx {
            if let Some(parent) = arena.get_mut(pidx) {
                parent.children.push(node_idx);
            }
        }
        drop(arena);

        Ok(self.handle(node_idx))
    }

    fn handle(&self, idx: Index) -> NodeRef {
        NodeRef {
            forest: self.clone(),
            idx,
        }
    }

    fn same_as(&self, other: &Forest) -> bool {
        Rc::ptr_eq(&self.arena, &other.arena)
    }

    fn ensure_member(&self, node: &NodeRef) -> TreeResult<()> {
        if self.same_as(&node.forest) {
            Ok(())
        } else {
            Err(TreeError::ForeignNode(node.name()))
        }
    }
}

/// Handle to a node stored in a [`Forest`].
///
/// Equality and hashing are identity based: same arena, same index.
#[derive(Clone)]
pub struct NodeRef {
    forest: Forest,
    idx: Index,
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx && self.forest.same_as(&other.forest)
    }
}

impl Eq for NodeRef {}

impl Hash for NodeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.forest.arena).hash(state);
        self.idx.hash(state);
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (gen_idx, generation) = self.idx.into_raw_parts();
        write!(f, "NodeRef({:?} @{}v{})", self.name(), gen_idx, generation)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl NodeRef {
    /// Create a root node in a fresh forest.
    pub fn new_root(name: &str, payload: Payload) -> Self {
        let forest = Forest::new();
        let idx = forest.arena.borrow_mut().insert(NodeSlot {
            name: name.to_string(),
            payload,
            parent: None,
            children: Vec::new(),
        });
        forest.handle(idx)
    }

    /// Append a new child. Fails with `DuplicateName` on a sibling name clash.
    pub fn add_child(&self, name: &str, payload: Payload) -> TreeResult<NodeRef> {
        self.forest.insert(name, payload, Some(self))
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn set_payload(&self, payload: Payload) -> TreeResult<()> {
        let mut arena = self.forest.arena.borrow_mut();
        let slot = arena
            .get_mut(self.idx)
            .ok_or_else(|| TreeError::missing_capability("set_payload"))?;
        slot.payload = payload;
        Ok(())
    }

    pub fn set_name(&self, name: &str) -> TreeResult<()> {
        let mut arena = self.forest.arena.borrow_mut();
        let parent = arena
            .get(self.idx)
            .ok_or_else(|| TreeError::missing_capability("set_name"))?
            .parent;
        if let Some(pidx) = parent {
            if let Some(pslot) = arena.get(pidx) {
                if has_child_named(&arena, &pslot.children, name, Some(self.idx)) {
                    return Err(TreeError::DuplicateName {
                        parent: pslot.name.clone(),
                        name: name.to_string(),
                    });
                }
            }
        }
        if let Some(slot) = arena.get_mut(self.idx) {
            slot.name = name.to_string();
        }
        Ok(())
    }

    /// Move this node (with its subtree) under `new_parent`, or detach it with `None`.
    ///
    /// Detaching from the old parent and attaching to the new one happen together,
    /// so the node never appears in two children lists.
    #[instrument(level = "debug", skip(self, new_parent), fields(node = %self))]
    pub fn reparent(&self, new_parent: Option<&NodeRef>) -> TreeResult<()> {
        if let Some(p) = new_parent {
            self.forest.ensure_member(p)?;
        }
        let mut arena = self.forest.arena.borrow_mut();
        let name = arena
            .get(self.idx)
            .ok_or_else(|| TreeError::missing_capability("reparent"))?
            .name
            .clone();

        if let Some(p) = new_parent {
            let pslot = arena
                .get(p.idx)
                .ok_or_else(|| TreeError::missing_capability("reparent"))?;
            if is_ancestor_or_self(&arena, self.idx, p.idx) {
                return Err(TreeError::CycleDetected(format!(
                    "{} cannot become a child of {}",
                    name, pslot.name
                )));
            }
            if has_child_named(&arena, &pslot.children, &name, Some(self.idx)) {
                return Err(TreeError::DuplicateName {
                    parent: pslot.name.clone(),
                    name,
                });
            }
        }

        detach(&mut arena, self.idx);
        if let Some(p) = new_parent {
            attach(&mut arena, self.idx, p.idx);
        }
        debug!("reparented {} under {:?}", name, new_parent.map(|p| p.idx));
        Ok(())
    }

    /// Delete this node and its whole subtree from the forest.
    ///
    /// Handles to deleted nodes report `is_live() == false` afterwards.
    #[instrument(level = "debug", skip(self), fields(node = %self))]
    pub fn remove(&self) -> TreeResult<()> {
        let mut arena = self.forest.arena.borrow_mut();
        if !arena.contains(self.idx) {
            return Err(TreeError::missing_capability("remove"));
        }
        detach(&mut arena, self.idx);

        let mut stack = vec![self.idx];
        while let Some(idx) = stack.pop() {
            if let Some(slot) = arena.remove(idx) {
                stack.extend(slot.children);
            }
        }
        Ok(())
    }

    fn with_slot<R>(&self, f: impl FnOnce(&NodeSlot) -> R) -> Option<R> {
        self.forest.arena.borrow().get(self.idx).map(f)
    }
}

impl Node for NodeRef {
    fn children(&self) -> Vec<Self> {
        self.with_slot(|slot| slot.children.clone())
            .unwrap_or_default()
            .into_iter()
            .map(|idx| self.forest.handle(idx))
            .collect()
    }

    fn parent(&self) -> Option<Self> {
        self.with_slot(|slot| slot.parent)
            .flatten()
            .map(|idx| self.forest.handle(idx))
    }

    fn name(&self) -> String {
        self.with_slot(|slot| slot.name.clone()).unwrap_or_default()
    }

    fn payload(&self) -> Payload {
        self.with_slot(|slot| slot.payload.clone())
            .unwrap_or_default()
    }

    fn is_live(&self) -> bool {
        self.forest.arena.borrow().contains(self.idx)
    }
}

impl MutableNode for NodeRef {
    #[instrument(level = "trace", skip(self, children), fields(node = %self, count = children.len()))]
    fn set_children(&self, children: Vec<Self>) -> TreeResult<()> {
        for child in &children {
            self.forest.ensure_member(child)?;
        }
        let mut arena = self.forest.arena.borrow_mut();
        let slot = arena
            .get(self.idx)
            .ok_or_else(|| TreeError::missing_capability("set_children"))?;
        let parent_name = slot.name.clone();
        let old_children = slot.children.clone();

        let mut names = Vec::with_capacity(children.len());
        for child in &children {
            let cslot = arena
                .get(child.idx)
                .ok_or_else(|| TreeError::missing_capability("set_children"))?;
            if names.contains(&cslot.name) {
                return Err(TreeError::DuplicateName {
                    parent: parent_name,
                    name: cslot.name.clone(),
                });
            }
            if is_ancestor_or_self(&arena, child.idx, self.idx) {
                return Err(TreeError::CycleDetected(format!(
                    "{} cannot become a child of {}",
                    cslot.name, parent_name
                )));
            }
            names.push(cslot.name.clone());
        }

        let new_children: Vec<Index> = children.iter().map(|c| c.idx).collect();
        for idx in old_children {
            if !new_children.contains(&idx) {
                if let Some(old) = arena.get_mut(idx) {
                    old.parent = None;
                }
            }
        }
        for &idx in &new_children {
            let current_parent = arena.get(idx).and_then(|s| s.parent);
            if current_parent != Some(self.idx) {
                detach(&mut arena, idx);
            }
            if let Some(child) = arena.get_mut(idx) {
                child.parent = Some(self.idx);
            }
        }
        if let Some(slot) = arena.get_mut(self.idx) {
            slot.children = new_children;
        }
        Ok(())
    }
}

impl BuildNode for NodeRef {
    fn construct(name: &str, parent: Option<&Self>, payload: Payload) -> TreeResult<Self> {
        match parent {
            Some(p) => p.add_child(name, payload),
            None => Ok(NodeRef::new_root(name, payload)),
        }
    }
}

fn has_child_named(
    arena: &Arena<NodeSlot>,
    children: &[Index],
    name: &str,
    except: Option<Index>,
) -> bool {
    children
        .iter()
        .filter(|&&idx| Some(idx) != except)
        .filter_map(|&idx| arena.get(idx))
        .any(|slot| slot.name == name)
}

/// True if `ancestor` is `node` itself or lies on the parent chain of `node`.
fn is_ancestor_or_self(arena: &Arena<NodeSlot>, ancestor: Index, node: Index) -> bool {
    let mut current = Some(node);
    while let Some(idx) = current {
        if idx == ancestor {
            return true;
        }
        current = arena.get(idx).and_then(|slot| slot.parent);
    }
    false
}

fn detach(arena: &mut Arena<NodeSlot>, idx: Index) {
    let parent = arena.get_mut(idx).and_then(|slot| slot.parent.take());
    if let Some(pidx) = parent {
        if let Some(pslot) = arena.get_mut(pidx) {
            pslot.children.retain(|&c| c != idx);
        }
    }
}

fn attach(arena: &mut Arena<NodeSlot>, idx: Index, parent: Index) {
    if let Some(pslot) = arena.get_mut(parent) {
        pslot.children.push(idx);
    }
    if let Some(slot) = arena.get_mut(idx) {
        slot.parent = Some(parent);
    }
}
