//! Lossless concrete syntax for `.xref` documents.

pub mod ast;
pub mod cst;
pub mod cst_parser;
pub mod kind;
pub mod lexer;

use std::sync::Arc;

pub use cst_parser::ParseError;

use crate::syntax::ast::AstNode;
use crate::syntax::cst::SyntaxNode;
use crate::syntax::cst_parser::Parser;

/// Immutable syntax snapshot for a parsed document.
#[derive(Clone)]
pub struct SyntaxTree {
    green: rowan::GreenNode,
    source: Arc<str>,
    errors: Arc<[ParseError]>,
}

impl SyntaxTree {
    pub fn parse(source: &str) -> Self {
        let (green, errors) = Parser::new(source).parse();
        Self {
            green,
            source: Arc::from(source),
            errors: errors.into(),
        }
    }

    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn ast(&self) -> Option<ast::Root> {
        ast::Root::cast(self.root())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("len", &self.source.len())
            .field("errors", &self.errors.len())
            .finish()
    }
}
