use langsrv_frontend::{Node, NodeId};
use langsrv_position::Position;
use std::collections::{HashMap, HashSet};

/// A point-in-time, read-only view of every module's AST for a project
/// scope.
///
/// Built once (by [`crate::visit_full`] or [`crate::visit_incremental`])
/// and never mutated afterwards — a scope publishes a new `AstIndex`
/// wholesale rather than editing one in place, so any handle a reader
/// already holds stays consistent for its whole lifetime.
#[derive(Debug, Default, Clone)]
pub struct AstIndex {
    pub(crate) nodes_by_uri: HashMap<String, Vec<Node>>,
    pub(crate) parents: HashMap<NodeId, Node>,
    pub(crate) classes_by_uri: HashMap<String, Vec<Node>>,
    pub(crate) classes_by_name: HashMap<String, (String, Node)>,
    pub(crate) deps_by_uri: HashMap<String, Vec<String>>,
}

impl AstIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every indexed (non-synthetic) node belonging to `uri`, in visit
    /// order.
    pub fn nodes_by_uri(&self, uri: &str) -> &[Node] {
        self.nodes_by_uri.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The parent of `node`, or `None` if it is a module root (or was not
    /// indexed — the lookup uses the node's identity, not its contents).
    pub fn parent_of(&self, node: &Node) -> Option<&Node> {
        self.parents.get(&node.id())
    }

    pub fn classes_by_uri(&self, uri: &str) -> &[Node] {
        self.classes_by_uri.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn class_by_name(&self, qualified_name: &str) -> Option<(&str, &Node)> {
        self.classes_by_name.get(qualified_name).map(|(uri, node)| (uri.as_str(), node))
    }

    pub fn classes_by_name_iter(&self) -> impl Iterator<Item = (&str, &str, &Node)> {
        self.classes_by_name.iter().map(|(name, (uri, node))| (name.as_str(), uri.as_str(), node))
    }

    /// Fully-qualified names of every dependency this file references
    /// (imports, superclass, interfaces), already filtered against the
    /// configured runtime/platform namespace set and with star imports
    /// expanded.
    pub fn deps_by_uri(&self, uri: &str) -> &[String] {
        self.deps_by_uri.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.nodes_by_uri.keys().map(String::as_str)
    }

    /// Finds the most specific node at `uri`/`line`/`col`. See
    /// [`crate::query::node_at`] for the tie-break rules.
    pub fn node_at(&self, uri: &str, line: u32, col: u32) -> Option<&Node> {
        crate::query::node_at(self, uri, Position::new(line, col))
    }

    pub(crate) fn candidates_containing(&self, uri: &str, pos: Position) -> Vec<&Node> {
        self.nodes_by_uri(uri).iter().filter(|n| n.range().contains(pos)).collect()
    }

    /// Restores `previous`'s entries for `uris` into `self`, overwriting
    /// whatever a visit already populated for them — a URI with nothing
    /// in `previous` is left untouched. Used when a front-end reports a
    /// per-file catastrophic failure for a URI it otherwise skipped: the
    /// file's last-known AST is worth keeping over losing it outright.
    pub fn recover_uris(mut self, previous: &AstIndex, uris: &HashSet<String>) -> Self {
        for uri in uris {
            if let Some(nodes) = previous.nodes_by_uri.get(uri) {
                for node in nodes {
                    if let Some(parent) = previous.parents.get(&node.id()) {
                        self.parents.insert(node.id(), parent.clone());
                    }
                }
                self.nodes_by_uri.insert(uri.clone(), nodes.clone());
            }
            if let Some(classes) = previous.classes_by_uri.get(uri) {
                self.classes_by_uri.insert(uri.clone(), classes.clone());
            }
            for (name, (owner, node)) in &previous.classes_by_name {
                if owner == uri {
                    self.classes_by_name.insert(name.clone(), (owner.clone(), node.clone()));
                }
            }
            if let Some(deps) = previous.deps_by_uri.get(uri) {
                self.deps_by_uri.insert(uri.clone(), deps.clone());
            }
        }
        self
    }
}
