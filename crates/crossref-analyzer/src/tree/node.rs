use std::{fmt, sync::Arc};

use rowan::TextRange;
use serde::{Deserialize, Serialize};

use crate::{linker::Reference, tree::NodePath};

/// Containment property of top-level statements under the model root.
pub const STATEMENTS: &str = "statements";
/// Containment property of members inside a declaration body.
pub const MEMBERS: &str = "members";
/// Reference property of a `uses` statement.
pub const TARGET: &str = "target";
/// Reference property of a member's declared type.
pub const TYPE: &str = "type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Model,
    Declaration,
    Member,
    Uses,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Model => "Model",
            NodeKind::Declaration => "Declaration",
            NodeKind::Member => "Member",
            NodeKind::Uses => "Uses",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the semantic tree built from one document's syntax.
///
/// Nodes are immutable once built and shared through `Arc`: a declaration
/// node may be the resolved target of references in many documents. The only
/// mutable state reachable from a node is the cache inside its
/// [`Reference`] cells.
pub struct AstNode {
    pub(crate) kind: NodeKind,
    pub(crate) name: Option<String>,
    pub(crate) path: NodePath,
    pub(crate) container_property: Option<&'static str>,
    pub(crate) range: TextRange,
    pub(crate) name_range: Option<TextRange>,
    pub(crate) children: Vec<Arc<AstNode>>,
    pub(crate) references: Vec<Arc<Reference>>,
}

impl AstNode {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// The property of the parent under which this node is contained.
    pub fn container_property(&self) -> Option<&'static str> {
        self.container_property
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Range of the name token, falling back to the whole node.
    pub fn name_range(&self) -> TextRange {
        self.name_range.unwrap_or(self.range)
    }

    pub fn children(&self) -> &[Arc<AstNode>] {
        &self.children
    }

    pub fn children_of<'a>(
        &'a self,
        property: &'a str,
    ) -> impl Iterator<Item = &'a Arc<AstNode>> + 'a {
        self.children.iter().filter(move |child| child.container_property == Some(property))
    }

    pub fn references(&self) -> &[Arc<Reference>] {
        &self.references
    }

    /// The reference cell stored under `property`, if this node has one.
    pub fn reference(
        &self,
        property: &str,
    ) -> Option<&Arc<Reference>> {
        self.references.iter().find(|r| r.site().property == property)
    }

    /// Depth-first pre-order traversal starting at (and including) `self`.
    ///
    /// Children are visited in source order, so the sequence is stable
    /// across repeated traversals of the same tree.
    pub fn preorder(self: &Arc<Self>) -> Preorder {
        Preorder {
            stack: vec![Arc::clone(self)],
        }
    }
}

impl fmt::Debug for AstNode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("AstNode")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("path", &self.path.to_string())
            .field("children", &self.children.len())
            .field("references", &self.references.len())
            .finish()
    }
}

pub struct Preorder {
    stack: Vec<Arc<AstNode>>,
}

impl Iterator for Preorder {
    type Item = Arc<AstNode>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev().cloned());
        Some(node)
    }
}
