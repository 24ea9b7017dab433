//! Scanner integration tests.
//!
//! Verifies that the scanner correctly tokenizes Go constructs, including
//! automatic semicolon insertion.

use errside_ast::syntax_kind::SyntaxKind;
use errside_scanner::Scanner;

/// Helper: scan all tokens from source and return as (kind, value) pairs.
fn scan_all(source: &str) -> Vec<(SyntaxKind, String)> {
    let mut scanner = Scanner::new(source, "test.go");
    let mut tokens = Vec::new();
    loop {
        let kind = scanner.scan();
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
        tokens.push((kind, scanner.token_value().to_string()));
    }
    tokens
}

/// Helper: scan all token kinds.
fn scan_kinds(source: &str) -> Vec<SyntaxKind> {
    scan_all(source).into_iter().map(|(k, _)| k).collect()
}

#[test]
fn test_empty_source() {
    assert!(scan_all("").is_empty());
}

#[test]
fn test_whitespace_only() {
    assert!(scan_all("   \n\t  \r\n").is_empty());
}

#[test]
fn test_numeric_literals() {
    let cases = [
        ("42", SyntaxKind::IntLiteral),
        ("0xFF", SyntaxKind::IntLiteral),
        ("0b1010", SyntaxKind::IntLiteral),
        ("0o77", SyntaxKind::IntLiteral),
        ("0755", SyntaxKind::IntLiteral),
        ("1_000_000", SyntaxKind::IntLiteral),
        ("3.14", SyntaxKind::FloatLiteral),
        (".5", SyntaxKind::FloatLiteral),
        ("1e9", SyntaxKind::FloatLiteral),
        ("6.02E+23", SyntaxKind::FloatLiteral),
        ("0x1p-2", SyntaxKind::FloatLiteral),
        ("2i", SyntaxKind::ImaginaryLiteral),
    ];
    for (source, kind) in cases {
        let tokens = scan_all(source);
        assert_eq!(tokens[0].0, kind, "{}", source);
        assert_eq!(tokens[0].1, source);
    }
}

#[test]
fn test_invalid_numeric_literal() {
    let mut scanner = Scanner::new("0x", "test.go");
    scanner.scan();
    assert!(scanner.diagnostics().has_errors());
}

#[test]
fn test_string_literals() {
    let tokens = scan_all(r#""hello\n\"x\"""#);
    assert_eq!(tokens[0].0, SyntaxKind::StringLiteral);
    assert_eq!(tokens[0].1, r#""hello\n\"x\"""#);

    let tokens = scan_all("`raw\nstring`");
    assert_eq!(tokens[0].0, SyntaxKind::StringLiteral);
    assert_eq!(tokens[0].1, "`raw\nstring`");

    let tokens = scan_all(r"'\''");
    assert_eq!(tokens[0].0, SyntaxKind::RuneLiteral);
    assert_eq!(tokens[0].1, r"'\''");
}

#[test]
fn test_unterminated_string() {
    let mut scanner = Scanner::new("\"abc\nx", "test.go");
    scanner.scan();
    let diags = scanner.take_diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags.diagnostics()[0].message_text, "newline in string");
}

#[test]
fn test_identifiers() {
    let tokens = scan_all("foo _bar baz9 ñandú");
    let idents: Vec<&str> = tokens
        .iter()
        .filter(|(k, _)| *k == SyntaxKind::Identifier)
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(idents, vec!["foo", "_bar", "baz9", "ñandú"]);
}

#[test]
fn test_keywords() {
    let kinds = scan_kinds("if else for range func go defer select chan");
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::IfKeyword,
            SyntaxKind::ElseKeyword,
            SyntaxKind::ForKeyword,
            SyntaxKind::RangeKeyword,
            SyntaxKind::FuncKeyword,
            SyntaxKind::GoKeyword,
            SyntaxKind::DeferKeyword,
            SyntaxKind::SelectKeyword,
            SyntaxKind::ChanKeyword,
        ]
    );
}

#[test]
fn test_operators() {
    let kinds = scan_kinds("+ - * / % &^ &^= << >>= <- := ... != == && || !");
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::PlusToken,
            SyntaxKind::MinusToken,
            SyntaxKind::AsteriskToken,
            SyntaxKind::SlashToken,
            SyntaxKind::PercentToken,
            SyntaxKind::AmpersandCaretToken,
            SyntaxKind::AmpersandCaretEqualsToken,
            SyntaxKind::LessThanLessThanToken,
            SyntaxKind::GreaterThanGreaterThanEqualsToken,
            SyntaxKind::ArrowToken,
            SyntaxKind::ColonEqualsToken,
            SyntaxKind::DotDotDotToken,
            SyntaxKind::ExclamationEqualsToken,
            SyntaxKind::EqualsEqualsToken,
            SyntaxKind::AmpersandAmpersandToken,
            SyntaxKind::BarBarToken,
            SyntaxKind::ExclamationToken,
        ]
    );
}

#[test]
fn test_semicolon_insertion() {
    let tokens = scan_all("x := f()\nif err != nil {\n\treturn err\n}\n");
    let kinds: Vec<SyntaxKind> = tokens.iter().map(|(k, _)| *k).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::ColonEqualsToken,
            SyntaxKind::Identifier,
            SyntaxKind::OpenParenToken,
            SyntaxKind::CloseParenToken,
            SyntaxKind::SemicolonToken,
            SyntaxKind::IfKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::ExclamationEqualsToken,
            SyntaxKind::Identifier,
            SyntaxKind::OpenBraceToken,
            SyntaxKind::ReturnKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::SemicolonToken,
            SyntaxKind::CloseBraceToken,
            SyntaxKind::SemicolonToken,
        ]
    );
    assert_eq!(tokens[5].1, "\n");
}

#[test]
fn test_no_semicolon_after_operator_at_line_end() {
    let kinds = scan_kinds("a +\nb");
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::PlusToken,
            SyntaxKind::Identifier,
            SyntaxKind::SemicolonToken,
        ]
    );
}

#[test]
fn test_comments_are_collected() {
    let mut scanner = Scanner::new("x // trailing\n/* block */ y", "test.go");
    while scanner.scan() != SyntaxKind::EndOfFileToken {}
    let comments = scanner.take_comments();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].text, "// trailing");
    assert!(!comments[0].is_block());
    assert_eq!(comments[1].text, "/* block */");
    assert!(comments[1].is_block());
}

#[test]
fn test_semicolon_before_line_comment() {
    // The comment does not stop `x` from ending the statement.
    let kinds = scan_kinds("x // c\ny");
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::SemicolonToken,
            SyntaxKind::Identifier,
            SyntaxKind::SemicolonToken,
        ]
    );
}

#[test]
fn test_multiline_block_comment_acts_as_newline() {
    let kinds = scan_kinds("x /* a\nb */ y");
    assert_eq!(kinds[1], SyntaxKind::SemicolonToken);
}

#[test]
fn test_invalid_character() {
    let mut scanner = Scanner::new("@", "test.go");
    assert_eq!(scanner.scan(), SyntaxKind::Unknown);
    let diags = scanner.take_diagnostics();
    assert_eq!(
        diags.diagnostics()[0].message_text,
        "invalid character U+0040 '@' in source"
    );
}
