use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

use crate::syntax::{kind::SyntaxKind, lexer::Lexer};

/// A recoverable syntax error. The tree is still produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub range: TextRange,
}

pub struct Parser<'a> {
    tokens: Vec<(SyntaxKind, &'a str)>,
    pos: usize,
    offset: TextSize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let tokens: Vec<_> = Lexer::new(input).collect();
        Self {
            tokens,
            pos: 0,
            offset: TextSize::from(0),
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    pub fn parse(mut self) -> (GreenNode, Vec<ParseError>) {
        self.start_node(SyntaxKind::Root);
        self.parse_root();
        self.finish_node();
        (self.builder.finish(), self.errors)
    }

    fn start_node(
        &mut self,
        kind: SyntaxKind,
    ) {
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn parse_root(&mut self) {
        loop {
            self.skip_trivia();
            if self.is_eof() {
                break;
            }

            match self.peek() {
                SyntaxKind::KwDeclares => self.parse_declaration(),
                SyntaxKind::KwUses => self.parse_uses(),
                _ => self.error_and_bump("expected 'declares' or 'uses'"),
            }
        }
    }

    fn parse_declaration(&mut self) {
        self.start_node(SyntaxKind::Declaration);
        self.bump(); // declares
        self.skip_trivia();

        if self.at(SyntaxKind::Ident) {
            self.bump();
        } else {
            self.error("expected declaration name");
        }
        self.skip_trivia();

        if self.at(SyntaxKind::LBrace) {
            self.bump();
            self.parse_members();
        }
        self.skip_trivia();

        if self.at(SyntaxKind::Semicolon) {
            self.bump();
        }
        self.finish_node();
    }

    fn parse_members(&mut self) {
        loop {
            self.skip_trivia();
            match self.peek() {
                SyntaxKind::RBrace => {
                    self.bump();
                    return;
                },
                SyntaxKind::Ident => self.parse_member(),
                // A new statement means the closing brace is missing.
                SyntaxKind::KwDeclares | SyntaxKind::KwUses => {
                    self.error("expected '}'");
                    return;
                },
                _ if self.is_eof() => {
                    self.error("expected '}'");
                    return;
                },
                _ => self.error_and_bump("expected member or '}'"),
            }
        }
    }

    fn parse_member(&mut self) {
        self.start_node(SyntaxKind::Member);
        self.bump(); // name
        self.skip_trivia();

        if self.at(SyntaxKind::Colon) {
            self.bump();
            self.skip_trivia();
            if self.at(SyntaxKind::Ident) {
                self.parse_qualified_name();
            } else {
                self.error("expected type reference");
            }
        } else {
            self.error("expected ':'");
        }
        self.skip_trivia();
        self.expect_semicolon();
        self.finish_node();
    }

    fn parse_uses(&mut self) {
        self.start_node(SyntaxKind::Uses);
        self.bump(); // uses
        self.skip_trivia();

        if self.at(SyntaxKind::Ident) {
            self.parse_qualified_name();
        } else {
            self.error("expected reference after 'uses'");
        }
        self.skip_trivia();
        self.expect_semicolon();
        self.finish_node();
    }

    /// `Ident ('.' Ident)*` without interior trivia.
    fn parse_qualified_name(&mut self) {
        self.start_node(SyntaxKind::QualifiedName);
        self.bump();
        while self.at(SyntaxKind::Dot) && self.nth(1) == Some(SyntaxKind::Ident) {
            self.bump();
            self.bump();
        }
        if self.at(SyntaxKind::Dot) {
            self.bump();
            self.error("expected identifier after '.'");
        }
        self.finish_node();
    }

    fn expect_semicolon(&mut self) {
        if self.at(SyntaxKind::Semicolon) {
            self.bump();
        } else {
            self.error("expected ';'");
        }
    }

    fn error(
        &mut self,
        message: &str,
    ) {
        let len = if self.is_eof() {
            TextSize::from(0)
        } else {
            TextSize::of(self.tokens[self.pos].1)
        };
        self.errors.push(ParseError {
            message: message.to_string(),
            range: TextRange::at(self.offset, len),
        });
    }

    fn error_and_bump(
        &mut self,
        message: &str,
    ) {
        self.error(message);
        self.start_node(SyntaxKind::ErrorNode);
        self.bump();
        self.finish_node();
    }

    fn skip_trivia(&mut self) {
        while !self.is_eof() && self.peek().is_trivia() {
            self.bump();
        }
    }

    fn peek(&self) -> SyntaxKind {
        if self.is_eof() {
            return SyntaxKind::Error;
        }
        self.tokens[self.pos].0
    }

    fn nth(
        &self,
        n: usize,
    ) -> Option<SyntaxKind> {
        self.tokens.get(self.pos + n).map(|(kind, _)| *kind)
    }

    fn at(
        &self,
        kind: SyntaxKind,
    ) -> bool {
        !self.is_eof() && self.peek() == kind
    }

    fn bump(&mut self) {
        if !self.is_eof() {
            let (kind, text) = self.tokens[self.pos];
            self.builder.token(kind.into(), text);
            self.offset += TextSize::of(text);
            self.pos += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

#[cfg(test)]
#[path = "../../tests/src/syntax/cst_parser_tests.rs"]
mod tests;
