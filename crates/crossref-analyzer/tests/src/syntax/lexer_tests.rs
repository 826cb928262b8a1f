use super::*;

fn lex(input: &str) -> Vec<(SyntaxKind, &str)> {
    Lexer::new(input).collect()
}

#[test]
fn test_keywords() {
    let tokens = lex("declares uses");
    assert_eq!(
        tokens,
        vec![
            (SyntaxKind::KwDeclares, "declares"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::KwUses, "uses"),
        ]
    );
}

#[test]
fn test_keyword_prefix_is_identifier() {
    let tokens = lex("declaresFoo user");
    assert_eq!(
        tokens,
        vec![
            (SyntaxKind::Ident, "declaresFoo"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Ident, "user"),
        ]
    );
}

#[test]
fn test_punctuation() {
    let tokens = lex("{ } : ; .");
    assert_eq!(
        tokens,
        vec![
            (SyntaxKind::LBrace, "{"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::RBrace, "}"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Colon, ":"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Semicolon, ";"),
            (SyntaxKind::Whitespace, " "),
            (SyntaxKind::Dot, "."),
        ]
    );
}

#[test]
fn test_qualified_name() {
    let tokens = lex("b.Foo");
    assert_eq!(
        tokens,
        vec![(SyntaxKind::Ident, "b"), (SyntaxKind::Dot, "."), (SyntaxKind::Ident, "Foo")]
    );
}

#[test]
fn test_comments() {
    let tokens = lex("// note\n/* block */");
    assert_eq!(
        tokens,
        vec![
            (SyntaxKind::Comment, "// note"),
            (SyntaxKind::Whitespace, "\n"),
            (SyntaxKind::Comment, "/* block */"),
        ]
    );
}

#[test]
fn test_error() {
    let tokens = lex("#");
    assert_eq!(tokens, vec![(SyntaxKind::Error, "#")]);
}
