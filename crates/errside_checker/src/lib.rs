//! errside_checker: Static types for Go packages.
//!
//! The checker assigns a type to every expression and every declared symbol
//! of a bound package. Together with the binder's def/use tables this forms
//! the [`TypeInfo`] the idiom merger consults.

mod checker;
mod importer;
mod types;

pub use checker::{CheckedTypes, Checker};
pub use importer::{has_stub, Importer, Member, Package};
pub use types::{BasicKind, Method, StructField, Type, TypeKind, TypeTable};

use errside_ast::node::SourceFile;
use errside_ast::types::{NodeId, SymbolId, TypeId};
use errside_binder::Bindings;
use errside_core::intern::StringInterner;
use errside_core::FxMap;
use errside_diagnostics::DiagnosticCollection;
use errside_idiom::BindingOracle;

/// Everything known about the identifiers and expressions of one package.
#[derive(Debug)]
pub struct TypeInfo {
    bindings: Bindings,
    table: TypeTable,
    types: FxMap<NodeId, TypeId>,
    symbol_types: FxMap<SymbolId, TypeId>,
}

impl TypeInfo {
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn table(&self) -> &TypeTable {
        &self.table
    }

    /// The type recorded for an expression.
    pub fn type_of_expr(&self, expr: NodeId) -> Option<TypeId> {
        self.types.get(&expr).copied()
    }

    pub fn type_of_symbol(&self, sym: SymbolId) -> Option<TypeId> {
        self.symbol_types.get(&sym).copied()
    }

    /// The type of an expression as Go would print it.
    pub fn type_string(&self, expr: NodeId) -> Option<String> {
        self.type_of_expr(expr).map(|ty| self.table.type_to_string(ty))
    }

    pub fn expr_count(&self) -> usize {
        self.types.len()
    }
}

impl BindingOracle for TypeInfo {
    fn def_of(&self, ident: NodeId) -> Option<SymbolId> {
        self.bindings.def_of(ident)
    }

    fn use_of(&self, ident: NodeId) -> Option<SymbolId> {
        self.bindings.use_of(ident)
    }

    fn type_of(&self, expr: NodeId) -> Option<TypeId> {
        self.type_of_expr(expr)
    }

    fn is_error_type(&self, ty: TypeId) -> bool {
        self.table.is_error_type(ty)
    }

    fn is_untyped_nil(&self, ty: TypeId) -> bool {
        self.table.is_untyped_nil(ty)
    }
}

/// Type-check a bound package.
///
/// The returned diagnostics hold errors and warnings; the type information
/// is complete either way, with the invalid type wherever checking failed.
pub fn check_package(
    files: &[SourceFile],
    bindings: Bindings,
    interner: &StringInterner,
) -> (TypeInfo, DiagnosticCollection) {
    let mut table = TypeTable::new();
    let mut importer = Importer::new(interner.clone());
    let package_path = bindings.package_name.clone();

    let mut checker = Checker::new(&mut table, &mut importer, &bindings, files, package_path);
    checker.check_package();
    let diagnostics = checker.take_diagnostics();
    let CheckedTypes { types, symbol_types } = checker.finish();
    tracing::debug!(
        package = %bindings.package_name,
        expressions = types.len(),
        imports = importer.loaded_count(),
        "checked package"
    );

    (
        TypeInfo {
            bindings,
            table,
            types,
            symbol_types,
        },
        diagnostics,
    )
}
