use std::sync::Arc;

use crate::tree::{AstNode, NodePath};

/// Find the node at `path` below `root`.
///
/// Returns `None` when any segment names a property or index the tree does
/// not have, e.g. because the document changed since the path was taken.
pub fn locate(
    root: &Arc<AstNode>,
    path: &NodePath,
) -> Option<Arc<AstNode>> {
    let mut current = Arc::clone(root);
    for segment in path.segments() {
        let next = current.children_of(&segment.property).nth(segment.index).cloned()?;
        current = next;
    }
    Some(current)
}
