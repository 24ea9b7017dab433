//! Scope management for the binder.

use crate::symbol::SymbolTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Imports of one file.
    File,
    /// Parameters, results, and the outermost statements of a function.
    Function,
    /// Explicit blocks, the implicit blocks of `if`/`for`/`switch`, and
    /// case clauses.
    Block,
}

/// A scope in the binding phase. Scopes form a chain from inner to outer,
/// ending at a file scope. The package and universe blocks sit above every
/// chain and are held by the binder itself.
#[derive(Debug)]
pub struct Scope {
    /// The symbols declared in this scope.
    pub locals: SymbolTable,
    /// The parent scope (None for a file scope).
    pub parent: Option<Box<Scope>>,
    pub kind: ScopeKind,
}

impl Scope {
    pub fn new(parent: Option<Box<Scope>>, kind: ScopeKind) -> Self {
        Self {
            locals: SymbolTable::new(),
            parent,
            kind,
        }
    }
}
