//! Tri-state classification of `if` conditions.
//!
//! A condition is `True` when it holds exactly when some error value is
//! non-nil, `False` when it holds exactly when it is nil, and `Unknown`
//! otherwise. Only comparisons of an `error`-typed operand against untyped
//! `nil`, under any mix of parentheses and `!`, are understood.

use crate::oracle::BindingOracle;
use errside_ast::node::Expr;
use errside_ast::types::SymbolId;
use errside_ast::SyntaxKind;
use std::ops::Not;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    #[default]
    Unknown,
    False,
    True,
}

impl Not for TriState {
    type Output = TriState;

    fn not(self) -> TriState {
        match self {
            TriState::Unknown => TriState::Unknown,
            TriState::False => TriState::True,
            TriState::True => TriState::False,
        }
    }
}

/// The verdict on one condition, with the error binding it tests when that
/// operand is a plain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub binding: Option<SymbolId>,
    pub result: TriState,
}

impl Classification {
    const UNKNOWN: Classification = Classification {
        binding: None,
        result: TriState::Unknown,
    };

    fn negate(self) -> Self {
        Self {
            binding: self.binding,
            result: !self.result,
        }
    }
}

/// Decide whether `expr` means "the error is non-nil".
pub fn classify(expr: &Expr, oracle: &dyn BindingOracle) -> Classification {
    match expr {
        Expr::Binary(binary) => match binary.op {
            SyntaxKind::EqualsEqualsToken => err_equals_nil(&binary.x, &binary.y, oracle).negate(),
            SyntaxKind::ExclamationEqualsToken => err_equals_nil(&binary.x, &binary.y, oracle),
            _ => Classification::UNKNOWN,
        },
        Expr::Paren(paren) => classify(&paren.x, oracle),
        Expr::Unary(unary) if unary.op == SyntaxKind::ExclamationToken => {
            classify(&unary.x, oracle).negate()
        }
        _ => Classification::UNKNOWN,
    }
}

/// `True` when one operand has type `error` and the other is untyped `nil`,
/// in either order; `False` for any other pair of operands.
///
/// The binding is reported only when the `error` operand is an identifier
/// as written, without parentheses.
pub fn err_equals_nil(a: &Expr, b: &Expr, oracle: &dyn BindingOracle) -> Classification {
    let is_error = |e: &Expr| oracle.type_of(e.id()).is_some_and(|ty| oracle.is_error_type(ty));
    let is_nil = |e: &Expr| oracle.type_of(e.id()).is_some_and(|ty| oracle.is_untyped_nil(ty));

    let err_operand = if is_error(a) && is_nil(b) {
        a
    } else if is_error(b) && is_nil(a) {
        b
    } else {
        return Classification {
            binding: None,
            result: TriState::False,
        };
    };

    Classification {
        binding: err_operand.as_ident().and_then(|ident| oracle.use_of(ident.data.id)),
        result: TriState::True,
    }
}
