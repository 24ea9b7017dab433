//! errside_idiom: Finds and fuses the "assign, then check the error" idiom.
//!
//! A statement that produces an `error` value, followed directly by an `if`
//! that tests that same binding against `nil`, is replaced by one
//! [`AssignIfErrStmt`](errside_ast::node::AssignIfErrStmt). Matching goes by
//! resolved bindings only, supplied through a [`BindingOracle`].

mod classify;
mod merge;
mod oracle;

pub use classify::{classify, err_equals_nil, Classification, TriState};
pub use merge::{last_assignments, merge_block, merge_file, ErrRange};
pub use oracle::{BindingConflict, BindingOracle};
