use std::{collections::HashMap, sync::Arc};

use crate::{
    document::Document,
    linker::DeclarationDescriptor,
    tree::{MEMBERS, NodeKind, NodePath, STATEMENTS},
};

/// Elements each container makes visible to the nodes below it, keyed by
/// the container's path.
pub type LocalScopes = HashMap<NodePath, Vec<DeclarationDescriptor>>;

/// Declarations a document contributes to the global scope, qualified by
/// its module name: `Foo` in `b.xref` is exported as `b.Foo`.
pub fn compute_exports(document: &Document) -> Vec<DeclarationDescriptor> {
    let root = document.root();
    root.children_of(STATEMENTS)
        .filter(|node| node.kind() == NodeKind::Declaration)
        .filter_map(|node| {
            let name = node.name()?;
            let qualified = format!("{}.{name}", document.module_name());
            Some(
                DeclarationDescriptor::new(document.uri().clone(), node.path().clone(), qualified, node.kind())
                    .with_node(Arc::clone(node)),
            )
        })
        .collect()
}

/// Unqualified names visible inside a document: its own declarations at the
/// root, and each declaration's members inside that declaration.
pub fn compute_local_scopes(document: &Document) -> LocalScopes {
    let root = document.root();
    let mut scopes = LocalScopes::new();

    for declaration in root.children_of(STATEMENTS).filter(|node| node.kind() == NodeKind::Declaration) {
        let Some(name) = declaration.name() else {
            continue;
        };
        scopes.entry(root.path().clone()).or_default().push(
            DeclarationDescriptor::new(
                document.uri().clone(),
                declaration.path().clone(),
                name,
                declaration.kind(),
            )
            .with_node(Arc::clone(declaration)),
        );

        let members: Vec<_> = declaration
            .children_of(MEMBERS)
            .filter_map(|member| {
                let name = member.name()?;
                Some(
                    DeclarationDescriptor::new(document.uri().clone(), member.path().clone(), name, member.kind())
                        .with_node(Arc::clone(member)),
                )
            })
            .collect();
        if !members.is_empty() {
            scopes.insert(declaration.path().clone(), members);
        }
    }
    scopes
}

#[cfg(test)]
#[path = "../../tests/src/scope/computation_tests.rs"]
mod tests;
