use std::sync::Arc;

use tower_lsp::lsp_types::Url;

use crate::{
    linker::{ContainerRef, build_reference},
    syntax::{
        SyntaxTree,
        ast::{self, AstNode as _, Statement},
    },
    tree::{AstNode, MEMBERS, NodeKind, NodePath, STATEMENTS, TARGET, TYPE},
};

/// Build the semantic tree for one parsed document.
///
/// Every reference site gets a fresh, unresolved [`crate::linker::Reference`];
/// nothing is resolved here.
pub fn build(
    uri: &Url,
    syntax: &SyntaxTree,
) -> Arc<AstNode> {
    let root_path = NodePath::root();
    let mut children = Vec::new();

    if let Some(root) = syntax.ast() {
        for (index, statement) in root.statements().enumerate() {
            let path = root_path.child(STATEMENTS, index);
            let node = match statement {
                Statement::Declaration(declaration) => build_declaration(uri, &declaration, path),
                Statement::Uses(uses) => build_uses(uri, &uses, path),
            };
            children.push(node);
        }
    }

    Arc::new(AstNode {
        kind: NodeKind::Model,
        name: None,
        path: root_path,
        container_property: None,
        range: syntax.root().text_range(),
        name_range: None,
        children,
        references: Vec::new(),
    })
}

fn build_declaration(
    uri: &Url,
    declaration: &ast::Declaration,
    path: NodePath,
) -> Arc<AstNode> {
    let name = declaration.name_token();
    let members = declaration
        .members()
        .enumerate()
        .map(|(index, member)| build_member(uri, &member, path.child(MEMBERS, index)))
        .collect();

    Arc::new(AstNode {
        kind: NodeKind::Declaration,
        name: name.as_ref().map(|token| token.text().to_string()),
        path,
        container_property: Some(STATEMENTS),
        range: declaration.syntax().text_range(),
        name_range: name.map(|token| token.text_range()),
        children: members,
        references: Vec::new(),
    })
}

fn build_member(
    uri: &Url,
    member: &ast::Member,
    path: NodePath,
) -> Arc<AstNode> {
    let name = member.name_token();
    let references = member
        .type_ref()
        .map(|type_ref| reference_for(uri, &path, NodeKind::Member, TYPE, &type_ref))
        .into_iter()
        .collect();

    Arc::new(AstNode {
        kind: NodeKind::Member,
        name: name.as_ref().map(|token| token.text().to_string()),
        path,
        container_property: Some(MEMBERS),
        range: member.syntax().text_range(),
        name_range: name.map(|token| token.text_range()),
        children: Vec::new(),
        references,
    })
}

fn build_uses(
    uri: &Url,
    uses: &ast::Uses,
    path: NodePath,
) -> Arc<AstNode> {
    let references = uses
        .target()
        .map(|target| reference_for(uri, &path, NodeKind::Uses, TARGET, &target))
        .into_iter()
        .collect();

    Arc::new(AstNode {
        kind: NodeKind::Uses,
        name: None,
        path,
        container_property: Some(STATEMENTS),
        range: uses.syntax().text_range(),
        name_range: None,
        children: Vec::new(),
        references,
    })
}

fn reference_for(
    uri: &Url,
    path: &NodePath,
    kind: NodeKind,
    property: &'static str,
    name: &ast::QualifiedName,
) -> Arc<crate::linker::Reference> {
    let container = ContainerRef {
        document: uri,
        path,
        kind,
    };
    build_reference(container, property, Some(name.syntax().text_range()), name.text())
}

#[cfg(test)]
#[path = "../../tests/src/tree/builder_tests.rs"]
mod tests;
