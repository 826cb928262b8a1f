use crate::syntax::cst::{SyntaxNode, SyntaxToken};
use crate::syntax::kind::SyntaxKind;

pub trait AstNode: Sized {
    fn cast(syntax: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn cast(syntax: SyntaxNode) -> Option<Self> {
                if syntax.kind() == SyntaxKind::$kind {
                    Some(Self { syntax })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

ast_node!(Root, Root);
ast_node!(Declaration, Declaration);
ast_node!(Member, Member);
ast_node!(Uses, Uses);
ast_node!(QualifiedName, QualifiedName);

fn first_ident_token(syntax: &SyntaxNode) -> Option<SyntaxToken> {
    syntax
        .children_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| token.kind() == SyntaxKind::Ident)
}

/// A top-level statement, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    Declaration(Declaration),
    Uses(Uses),
}

impl Root {
    pub fn statements(&self) -> impl Iterator<Item = Statement> {
        self.syntax.children().filter_map(|node| match node.kind() {
            SyntaxKind::Declaration => Declaration::cast(node).map(Statement::Declaration),
            SyntaxKind::Uses => Uses::cast(node).map(Statement::Uses),
            _ => None,
        })
    }
}

impl Declaration {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        first_ident_token(&self.syntax)
    }

    pub fn members(&self) -> impl Iterator<Item = Member> {
        self.syntax.children().filter_map(Member::cast)
    }
}

impl Member {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        first_ident_token(&self.syntax)
    }

    pub fn type_ref(&self) -> Option<QualifiedName> {
        self.syntax.children().find_map(QualifiedName::cast)
    }
}

impl Uses {
    pub fn target(&self) -> Option<QualifiedName> {
        self.syntax.children().find_map(QualifiedName::cast)
    }
}

impl QualifiedName {
    /// Dotted text with any trailing dot removed.
    pub fn text(&self) -> String {
        let text = self.syntax.text().to_string();
        text.trim_end_matches('.').to_string()
    }

    pub fn segments(&self) -> Vec<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .filter(|token| token.kind() == SyntaxKind::Ident)
            .map(|token| token.text().to_string())
            .collect()
    }
}
