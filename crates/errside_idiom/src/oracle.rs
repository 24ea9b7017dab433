//! The view of name resolution and typing the merger depends on.

use errside_ast::node::{Ident, SourceFile};
use errside_ast::types::{NodeId, SymbolId, TypeId};
use errside_core::TextPos;
use thiserror::Error;

/// Resolved bindings and static types for one package.
///
/// Implemented by the checker's type information; tests supply their own.
pub trait BindingOracle {
    /// The symbol an identifier occurrence declares, if it declares one.
    fn def_of(&self, ident: NodeId) -> Option<SymbolId>;

    /// The symbol an identifier occurrence refers to, if it refers to one.
    fn use_of(&self, ident: NodeId) -> Option<SymbolId>;

    /// The static type of an expression.
    fn type_of(&self, expr: NodeId) -> Option<TypeId>;

    /// Whether `ty` is the predeclared `error` type.
    fn is_error_type(&self, ty: TypeId) -> bool;

    fn is_untyped_nil(&self, ty: TypeId) -> bool;

    /// The binding of an identifier occurrence: the symbol it declares, or
    /// else the one it uses.
    ///
    /// An occurrence recorded as declaring one symbol and using another means
    /// the resolution tables are corrupt.
    fn binding_of(&self, ident: &Ident) -> Result<Option<SymbolId>, BindingConflict> {
        let def = self.def_of(ident.data.id);
        let used = self.use_of(ident.data.id);
        match (def, used) {
            (Some(def), Some(used)) if def != used => Err(BindingConflict::new(ident, def, used)),
            (Some(def), _) => Ok(Some(def)),
            (None, used) => Ok(used),
        }
    }
}

/// An identifier occurrence that both declares and uses, with different
/// symbols. Fatal for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: identifier `{name}` declares {def} but uses {used}")]
pub struct BindingConflict {
    pub name: String,
    pub pos: TextPos,
    /// `file:line:col` once located, the byte offset before that.
    pub location: String,
    pub def: SymbolId,
    pub used: SymbolId,
}

impl BindingConflict {
    pub fn new(ident: &Ident, def: SymbolId, used: SymbolId) -> Self {
        let pos = ident.data.range.pos;
        Self {
            name: ident.text.clone(),
            pos,
            location: format!("offset {}", pos),
            def,
            used,
        }
    }

    /// Attach the file position of the occurrence.
    pub fn locate(mut self, file: &SourceFile) -> Self {
        let at = file.line_map.line_and_column_of(self.pos);
        self.location = format!("{}:{}:{}", file.file_name, at.line + 1, at.column + 1);
        self
    }
}
