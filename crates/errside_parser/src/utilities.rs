//! Parser utility functions.

use errside_ast::node::Expr;
use errside_ast::syntax_kind::SyntaxKind;

/// Check if a token kind can start a type.
pub fn can_start_type(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Identifier
            | SyntaxKind::OpenBracketToken
            | SyntaxKind::StructKeyword
            | SyntaxKind::AsteriskToken
            | SyntaxKind::FuncKeyword
            | SyntaxKind::InterfaceKeyword
            | SyntaxKind::MapKeyword
            | SyntaxKind::ChanKeyword
            | SyntaxKind::ArrowToken
            | SyntaxKind::OpenParenToken
    )
}

/// Unary operators that build a `UnaryExpr`.
pub fn is_unary_operator(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::CaretToken
            | SyntaxKind::AmpersandToken
            | SyntaxKind::TildeToken
    )
}

/// Whether `{` after `x` may start a composite literal.
pub fn is_literal_type(x: &Expr) -> bool {
    match x {
        Expr::Ident(_) | Expr::ArrayType(_) | Expr::StructType(_) | Expr::MapType(_) => true,
        Expr::Selector(sel) => matches!(sel.x, Expr::Ident(_)),
        _ => false,
    }
}

/// A bare or package-qualified name.
pub fn is_type_name(x: &Expr) -> bool {
    match x {
        Expr::Ident(_) => true,
        Expr::Selector(sel) => matches!(sel.x, Expr::Ident(_)),
        _ => false,
    }
}
