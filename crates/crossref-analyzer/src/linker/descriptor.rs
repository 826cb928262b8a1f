use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::Url;

use crate::tree::{AstNode, NodeKind, NodePath};

/// Identity of a declaration, independent of whether its document is loaded.
///
/// Produced by scope computation and never mutated afterwards. The resident
/// `node` pointer is a shortcut only: it is not serialized, and a descriptor
/// without it can always be materialized again through the document index
/// and the node path.
#[derive(Clone, Serialize, Deserialize)]
pub struct DeclarationDescriptor {
    /// Document that owns the declaration.
    pub document: Url,
    /// Structural address of the declaration inside its document.
    pub path: NodePath,
    /// Name the declaration is reachable by in the scope that produced it.
    pub name: String,
    pub kind: NodeKind,
    #[serde(skip)]
    pub node: Option<Arc<AstNode>>,
}

impl DeclarationDescriptor {
    pub fn new(
        document: Url,
        path: NodePath,
        name: impl Into<String>,
        kind: NodeKind,
    ) -> Self {
        Self {
            document,
            path,
            name: name.into(),
            kind,
            node: None,
        }
    }

    pub fn with_node(
        mut self,
        node: Arc<AstNode>,
    ) -> Self {
        self.node = Some(node);
        self
    }

    /// Copy without the resident node pointer.
    pub fn detached(&self) -> Self {
        Self {
            node: None,
            ..self.clone()
        }
    }

    /// Same declaration, ignoring the display name and residency.
    pub fn same_target(
        &self,
        other: &DeclarationDescriptor,
    ) -> bool {
        self.document == other.document && self.path == other.path
    }
}

impl PartialEq for DeclarationDescriptor {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.same_target(other) && self.name == other.name && self.kind == other.kind
    }
}

impl Eq for DeclarationDescriptor {}

impl fmt::Debug for DeclarationDescriptor {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("DeclarationDescriptor")
            .field("document", &self.document.as_str())
            .field("path", &self.path.to_string())
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("resident", &self.node.is_some())
            .finish()
    }
}
