//! errside_ast: Abstract Syntax Tree definitions for Go source files.
//!
//! This module defines all AST node types, the SyntaxKind enum, and the
//! handle types shared with the binder and checker. The node set follows
//! Go's own `go/ast` package, plus one composite statement used to render
//! an assignment together with its error check.

pub mod node;
pub mod syntax_kind;
pub mod types;
pub mod visitor;

// Re-export key types
pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use types::*;
