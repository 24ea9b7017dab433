//! errside_binder: Scope analysis for Go packages.
//!
//! The binder walks every file of a package, creates a symbol for each
//! declaration, and records for every identifier occurrence whether it
//! declares a symbol (a def) or refers to one (a use).

mod binder;
mod bindings;
mod scope;
mod symbol;

pub use binder::{guess_package_name, Binder};
pub use bindings::Bindings;
pub use scope::ScopeKind;
pub use symbol::{Predeclared, Symbol, SymbolKind, SymbolTable};
