//! The opaque AST node handle the rest of the engine indexes.
//!
//! The engine never mutates a node; it only reads positions and structure
//! off of it. [`Node`] wraps the compiler's node data behind an `Arc` so it
//! is cheap to clone and hold across lock boundaries, and so its identity
//! (for the AST index's identity-keyed parent map) is just the `Arc`'s
//! allocation address — never the node's `PartialEq` impl, which several
//! real compiler front-ends define loosely (e.g. comparing class nodes by
//! name alone).

use langsrv_position::Range;
use std::sync::Arc;

/// What shape of declaration a node represents, as far as the engine's
/// indexing needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The top-level container of a single source file.
    Module,
    ClassDecl,
    ConstructorDecl,
    MethodDecl,
    Import,
    /// A `extends Super` / `implements I1, I2` reference on a class.
    TypeRef,
    /// Anything else (statements, expressions, ...); the engine still
    /// indexes these for `node_at` but never inspects their shape.
    Other,
}

/// The import flavor of an [`NodeKind::Import`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Regular,
    Star,
    Static,
    StaticStar,
}

/// Opaque identity for a [`Node`], derived from its backing allocation's
/// address. Two clones of the same `Node` compare equal; two structurally
/// identical but independently-constructed nodes do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    range: Range,
    children: Vec<Node>,
    synthetic: bool,
    qualified_name: Option<String>,
    superclass: Option<String>,
    interfaces: Vec<String>,
    imported_name: Option<String>,
    imported_alias: Option<String>,
    import_kind: Option<ImportKind>,
}

/// A handle to a node in a compiled module's AST.
///
/// Cheap to clone (an `Arc` bump); clones share identity for the purposes
/// of [`Node::id`].
#[derive(Debug, Clone)]
pub struct Node(Arc<NodeData>);

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Node {}

impl Node {
    pub fn id(&self) -> NodeId {
        NodeId(Arc::as_ptr(&self.0) as usize)
    }

    pub fn kind(&self) -> NodeKind {
        self.0.kind
    }

    pub fn range(&self) -> Range {
        self.0.range
    }

    pub fn children(&self) -> &[Node] {
        &self.0.children
    }

    pub fn is_synthetic(&self) -> bool {
        self.0.synthetic
    }

    pub fn qualified_name(&self) -> Option<&str> {
        self.0.qualified_name.as_deref()
    }

    pub fn superclass(&self) -> Option<&str> {
        self.0.superclass.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.0.interfaces
    }

    pub fn imported_name(&self) -> Option<&str> {
        self.0.imported_name.as_deref()
    }

    pub fn imported_alias(&self) -> Option<&str> {
        self.0.imported_alias.as_deref()
    }

    pub fn import_kind(&self) -> Option<ImportKind> {
        self.0.import_kind
    }
}

/// Builder for a [`Node`]; front-ends construct their tree bottom-up
/// (children first) and wrap each level with this.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    kind: NodeKind,
    range: Range,
    children: Vec<Node>,
    synthetic: bool,
    qualified_name: Option<String>,
    superclass: Option<String>,
    interfaces: Vec<String>,
    imported_name: Option<String>,
    imported_alias: Option<String>,
    import_kind: Option<ImportKind>,
}

impl NodeBuilder {
    pub fn new(kind: NodeKind, range: Range) -> Self {
        Self {
            kind,
            range,
            children: Vec::new(),
            synthetic: false,
            qualified_name: None,
            superclass: None,
            interfaces: Vec::new(),
            imported_name: None,
            imported_alias: None,
            import_kind: None,
        }
    }

    pub fn children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn synthetic(mut self, synthetic: bool) -> Self {
        self.synthetic = synthetic;
        self
    }

    pub fn qualified_name(mut self, name: impl Into<String>) -> Self {
        self.qualified_name = Some(name.into());
        self
    }

    pub fn superclass(mut self, name: impl Into<String>) -> Self {
        self.superclass = Some(name.into());
        self
    }

    pub fn interfaces(mut self, names: Vec<String>) -> Self {
        self.interfaces = names;
        self
    }

    pub fn imported_name(mut self, name: impl Into<String>) -> Self {
        self.imported_name = Some(name.into());
        self
    }

    pub fn imported_alias(mut self, alias: impl Into<String>) -> Self {
        self.imported_alias = Some(alias.into());
        self
    }

    pub fn import_kind(mut self, kind: ImportKind) -> Self {
        self.import_kind = Some(kind);
        self
    }

    pub fn build(self) -> Node {
        Node(Arc::new(NodeData {
            kind: self.kind,
            range: self.range,
            children: self.children,
            synthetic: self.synthetic,
            qualified_name: self.qualified_name,
            superclass: self.superclass,
            interfaces: self.interfaces,
            imported_name: self.imported_name,
            imported_alias: self.imported_alias,
            import_kind: self.import_kind,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langsrv_position::Position;

    #[test]
    fn clones_share_identity() {
        let node = NodeBuilder::new(NodeKind::Module, Range::empty(Position::new(0, 0))).build();
        let clone = node.clone();
        assert_eq!(node.id(), clone.id());
        assert_eq!(node, clone);
    }

    #[test]
    fn structurally_identical_nodes_have_distinct_identity() {
        let a = NodeBuilder::new(NodeKind::ClassDecl, Range::empty(Position::new(0, 0)))
            .qualified_name("Foo")
            .build();
        let b = NodeBuilder::new(NodeKind::ClassDecl, Range::empty(Position::new(0, 0)))
            .qualified_name("Foo")
            .build();
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }
}
