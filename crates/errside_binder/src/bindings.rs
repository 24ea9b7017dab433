//! The result of binding one package.

use crate::symbol::{Predeclared, Symbol, SymbolTable};
use errside_ast::types::{NodeId, SymbolId};
use errside_core::intern::InternedString;
use errside_core::FxMap;

/// Def/use tables for every identifier occurrence of a package.
///
/// An identifier that declares an entity appears in `defs`; one that refers
/// to an existing entity appears in `uses`. Struct field names, selectors,
/// method names, and labels appear in neither.
#[derive(Debug, Default)]
pub struct Bindings {
    pub package_name: String,
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) defs: FxMap<NodeId, SymbolId>,
    pub(crate) uses: FxMap<NodeId, SymbolId>,
    /// Case clause of a type switch -> the variable it declares implicitly.
    pub(crate) implicits: FxMap<NodeId, SymbolId>,
    /// Identifiers that only resolve through a dot import, with the candidate
    /// import paths.
    pub(crate) dot_uses: FxMap<NodeId, Vec<String>>,
    pub(crate) universe: SymbolTable,
    pub(crate) package: SymbolTable,
}

impl Bindings {
    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// The symbol declared by the identifier with this node id.
    pub fn def_of(&self, ident: NodeId) -> Option<SymbolId> {
        self.defs.get(&ident).copied()
    }

    /// The symbol referred to by the identifier with this node id.
    pub fn use_of(&self, ident: NodeId) -> Option<SymbolId> {
        self.uses.get(&ident).copied()
    }

    /// The variable a type switch clause declares for its guard binding.
    pub fn implicit_of(&self, clause: NodeId) -> Option<SymbolId> {
        self.implicits.get(&clause).copied()
    }

    pub fn dot_import_candidates(&self, ident: NodeId) -> Option<&[String]> {
        self.dot_uses.get(&ident).map(Vec::as_slice)
    }

    /// A package-level declaration by name.
    pub fn package_member(&self, name: InternedString) -> Option<SymbolId> {
        self.package.get(&name)
    }

    pub fn package_members(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.package.iter().map(|(_, id)| *id)
    }

    /// The universe symbol for a predeclared entity.
    pub fn universe_symbol(&self, which: Predeclared) -> Option<SymbolId> {
        self.symbols
            .iter()
            .take(Predeclared::ALL.len())
            .find(|s| s.universe == Some(which))
            .map(|s| s.id)
    }

    pub fn universe_lookup(&self, name: InternedString) -> Option<SymbolId> {
        self.universe.get(&name)
    }

    pub fn def_count(&self) -> usize {
        self.defs.len()
    }

    pub fn use_count(&self) -> usize {
        self.uses.len()
    }
}
