//! Operator precedence for binary operators.

use errside_ast::syntax_kind::SyntaxKind;

/// Binary operator precedence levels, matching the Go specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperatorPrecedence {
    // Ranges from lowest to highest
    LogicalOr = 1,
    LogicalAnd = 2,
    Comparison = 3,
    Additive = 4,
    Multiplicative = 5,
}

/// Get the binary operator precedence for a given token kind, or `None` if
/// the token is not a binary operator.
pub fn get_binary_operator_precedence(kind: SyntaxKind) -> Option<OperatorPrecedence> {
    let prec = match kind {
        SyntaxKind::BarBarToken => OperatorPrecedence::LogicalOr,
        SyntaxKind::AmpersandAmpersandToken => OperatorPrecedence::LogicalAnd,
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::LessThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::GreaterThanEqualsToken => OperatorPrecedence::Comparison,
        SyntaxKind::PlusToken
        | SyntaxKind::MinusToken
        | SyntaxKind::BarToken
        | SyntaxKind::CaretToken => OperatorPrecedence::Additive,
        SyntaxKind::AsteriskToken
        | SyntaxKind::SlashToken
        | SyntaxKind::PercentToken
        | SyntaxKind::LessThanLessThanToken
        | SyntaxKind::GreaterThanGreaterThanToken
        | SyntaxKind::AmpersandToken
        | SyntaxKind::AmpersandCaretToken => OperatorPrecedence::Multiplicative,
        _ => return None,
    };
    Some(prec)
}
