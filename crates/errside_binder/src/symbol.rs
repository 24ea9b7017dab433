//! Symbol and symbol table definitions.

use errside_ast::types::{NodeId, SymbolId};
use errside_core::intern::InternedString;
use rustc_hash::FxHashMap;

/// What kind of entity a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Var,
    Const,
    TypeName,
    Func,
    /// An imported package name.
    PkgName,
    /// A builtin function such as `len` or `append`.
    Builtin,
    /// The predeclared `nil`.
    Nil,
}

/// The entities of Go's universe block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predeclared {
    // Types
    Bool,
    Byte,
    Complex64,
    Complex128,
    Error,
    Float32,
    Float64,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Rune,
    String,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Any,

    // Constants
    True,
    False,
    Iota,

    Nil,

    // Builtin functions
    Append,
    Cap,
    Clear,
    Close,
    Complex,
    Copy,
    Delete,
    Imag,
    Len,
    Make,
    Max,
    Min,
    New,
    Panic,
    Print,
    Println,
    Real,
    Recover,
}

impl Predeclared {
    /// Every universe entry with its name and symbol kind.
    pub const ALL: &'static [(&'static str, SymbolKind, Predeclared)] = &[
        ("bool", SymbolKind::TypeName, Predeclared::Bool),
        ("byte", SymbolKind::TypeName, Predeclared::Byte),
        ("complex64", SymbolKind::TypeName, Predeclared::Complex64),
        ("complex128", SymbolKind::TypeName, Predeclared::Complex128),
        ("error", SymbolKind::TypeName, Predeclared::Error),
        ("float32", SymbolKind::TypeName, Predeclared::Float32),
        ("float64", SymbolKind::TypeName, Predeclared::Float64),
        ("int", SymbolKind::TypeName, Predeclared::Int),
        ("int8", SymbolKind::TypeName, Predeclared::Int8),
        ("int16", SymbolKind::TypeName, Predeclared::Int16),
        ("int32", SymbolKind::TypeName, Predeclared::Int32),
        ("int64", SymbolKind::TypeName, Predeclared::Int64),
        ("rune", SymbolKind::TypeName, Predeclared::Rune),
        ("string", SymbolKind::TypeName, Predeclared::String),
        ("uint", SymbolKind::TypeName, Predeclared::Uint),
        ("uint8", SymbolKind::TypeName, Predeclared::Uint8),
        ("uint16", SymbolKind::TypeName, Predeclared::Uint16),
        ("uint32", SymbolKind::TypeName, Predeclared::Uint32),
        ("uint64", SymbolKind::TypeName, Predeclared::Uint64),
        ("uintptr", SymbolKind::TypeName, Predeclared::Uintptr),
        ("any", SymbolKind::TypeName, Predeclared::Any),
        ("true", SymbolKind::Const, Predeclared::True),
        ("false", SymbolKind::Const, Predeclared::False),
        ("iota", SymbolKind::Const, Predeclared::Iota),
        ("nil", SymbolKind::Nil, Predeclared::Nil),
        ("append", SymbolKind::Builtin, Predeclared::Append),
        ("cap", SymbolKind::Builtin, Predeclared::Cap),
        ("clear", SymbolKind::Builtin, Predeclared::Clear),
        ("close", SymbolKind::Builtin, Predeclared::Close),
        ("complex", SymbolKind::Builtin, Predeclared::Complex),
        ("copy", SymbolKind::Builtin, Predeclared::Copy),
        ("delete", SymbolKind::Builtin, Predeclared::Delete),
        ("imag", SymbolKind::Builtin, Predeclared::Imag),
        ("len", SymbolKind::Builtin, Predeclared::Len),
        ("make", SymbolKind::Builtin, Predeclared::Make),
        ("max", SymbolKind::Builtin, Predeclared::Max),
        ("min", SymbolKind::Builtin, Predeclared::Min),
        ("new", SymbolKind::Builtin, Predeclared::New),
        ("panic", SymbolKind::Builtin, Predeclared::Panic),
        ("print", SymbolKind::Builtin, Predeclared::Print),
        ("println", SymbolKind::Builtin, Predeclared::Println),
        ("real", SymbolKind::Builtin, Predeclared::Real),
        ("recover", SymbolKind::Builtin, Predeclared::Recover),
    ];
}

/// A symbol represents a named entity in the package: a variable, constant,
/// type, function, imported package, or universe entry.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Unique identifier for this symbol.
    pub id: SymbolId,
    /// The name of this symbol (interned).
    pub name: InternedString,
    /// The name as written.
    pub name_text: String,
    pub kind: SymbolKind,
    /// The declaring identifier, or `NodeId::INVALID` for universe entries.
    pub decl: NodeId,
    /// Set for the entities of the universe block.
    pub universe: Option<Predeclared>,
    /// For package names, the import path.
    pub import_path: Option<String>,
    /// Whether the symbol lives in the package block.
    pub package_level: bool,
}

impl Symbol {
    pub fn new(id: SymbolId, name: InternedString, name_text: String, kind: SymbolKind, decl: NodeId) -> Self {
        Self {
            id,
            name,
            name_text,
            kind,
            decl,
            universe: None,
            import_path: None,
            package_level: false,
        }
    }

    /// Whether this is the predeclared `error` type.
    pub fn is_error_type(&self) -> bool {
        self.universe == Some(Predeclared::Error)
    }
}

/// A symbol table maps names to symbols.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    table: FxHashMap<InternedString, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            table: FxHashMap::default(),
        }
    }

    pub fn get(&self, name: &InternedString) -> Option<SymbolId> {
        self.table.get(name).copied()
    }

    pub fn set(&mut self, name: InternedString, symbol: SymbolId) {
        self.table.insert(name, symbol);
    }

    pub fn has(&self, name: &InternedString) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InternedString, &SymbolId)> {
        self.table.iter()
    }
}
