//! Tree reconstruction from root-to-node paths.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::{debug, instrument, trace};

use crate::config::{Settings, DEFAULT_MAX_RENAME_TRIES};
use crate::domain::{BuildNode, Node, NodeRef, Payload};
use crate::errors::{TreeError, TreeResult};
use crate::paths::{path as root_path, path_label};
use crate::tree_traits::to_termtree;

/// Element of a root-to-node path: a source-tree node or a plain value.
///
/// Path prefixes are memoized by `Eq`/`Hash` of their elements, so shared prefixes
/// collapse into one constructed node.
pub trait PathElement: Clone + Eq + Hash {
    /// Name given to the node constructed for this element.
    fn label(&self) -> String;

    /// Payload copied into the constructed node.
    fn payload(&self) -> Payload {
        Payload::new()
    }
}

impl PathElement for NodeRef {
    fn label(&self) -> String {
        self.name()
    }

    fn payload(&self) -> Payload {
        Node::payload(self)
    }
}

impl PathElement for String {
    fn label(&self) -> String {
        self.clone()
    }
}

impl PathElement for &str {
    fn label(&self) -> String {
        (*self).to_string()
    }
}

/// Builds trees of `N` from collections of paths.
pub struct TreeBuilder<P, N> {
    nodes: HashMap<Vec<P>, N>,
    max_rename_tries: usize,
    rename_separator: String,
}

impl<P: PathElement, N: BuildNode> Default for TreeBuilder<P, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PathElement, N: BuildNode> TreeBuilder<P, N> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            max_rename_tries: DEFAULT_MAX_RENAME_TRIES,
            rename_separator: "_".into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            nodes: HashMap::new(),
            max_rename_tries: settings.max_rename_tries,
            rename_separator: settings.rename_separator.clone(),
        }
    }

    pub fn with_max_rename_tries(mut self, max_rename_tries: usize) -> Self {
        self.max_rename_tries = max_rename_tries;
        self
    }

    /// Build one tree from `paths`.
    ///
    /// Each path is walked from its first element; a node is constructed for every
    /// prefix not seen before, under the node of the one-shorter prefix. On a refused
    /// duplicate name the node is retried as `name_0`, `name_1`, ... until the retry
    /// ceiling is hit, which fails with `ConstructionExhausted`.
    ///
    /// Returns the root of the last node reached, `None` for no (or only empty) paths.
    /// On error the partially built tree is left as is.
    #[instrument(level = "debug", skip_all, fields(paths = paths.len()))]
    pub fn build(
        &mut self,
        paths: &[Vec<P>],
        payload_fn: Option<&dyn Fn(&P) -> Payload>,
    ) -> TreeResult<Option<N>> {
        // Reset state for a fresh build
        self.nodes.clear();
        let mut last: Option<N> = None;

        for path in paths {
            let mut parent: Option<N> = None;
            let mut prefix: Vec<P> = Vec::with_capacity(path.len());

            for element in path {
                prefix.push(element.clone());
                let node = match self.nodes.get(&prefix).cloned() {
                    Some(existing) => existing,
                    None => {
                        let payload = match payload_fn {
                            Some(f) => f(element),
                            None => element.payload(),
                        };
                        let created =
                            self.construct_unique(&element.label(), parent.as_ref(), payload)?;
                        self.nodes.insert(prefix.clone(), created.clone());
                        created
                    }
                };
                parent = Some(node);
            }

            if let Some(end) = parent {
                trace!("path done: {}", path_label(&root_path(&end)));
                last = Some(end);
            }
        }

        let root = last.map(|n| n.root());
        if let Some(r) = &root {
            debug!("built tree:\n{}", to_termtree(r));
        }
        Ok(root)
    }

    fn construct_unique(&self, base: &str, parent: Option<&N>, payload: Payload) -> TreeResult<N> {
        let mut name = base.to_string();
        for attempt in 0..self.max_rename_tries {
            match N::construct(&name, parent, payload.clone()) {
                Ok(node) => return Ok(node),
                Err(TreeError::DuplicateName { .. }) => {
                    name = format!("{}{}{}", base, self.rename_separator, attempt);
                    debug!("name collision on {}, retrying as {}", base, name);
                }
                Err(e) => return Err(e),
            }
        }
        Err(TreeError::ConstructionExhausted {
            name: base.to_string(),
            attempts: self.max_rename_tries,
        })
    }
}

/// Build a tree of `N` from root-to-node `paths`. See [`TreeBuilder::build`].
///
/// Renamed nodes always use the `_` separator (`x_0`); build through
/// [`TreeBuilder::from_settings`] to apply a configured `rename_separator`.
pub fn paths_to_tree<P, N>(
    paths: &[Vec<P>],
    payload_fn: Option<&dyn Fn(&P) -> Payload>,
    max_rename_tries: usize,
) -> TreeResult<Option<N>>
where
    P: PathElement,
    N: BuildNode,
{
    TreeBuilder::new()
        .with_max_rename_tries(max_rename_tries)
        .build(paths, payload_fn)
}
