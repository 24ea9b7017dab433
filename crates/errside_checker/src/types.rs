//! Type system representation.
//!
//! Types are stored in a TypeTable (type arena) and referenced by TypeId.
//! This avoids lifetime issues with recursive type structures: a named type
//! is allocated before its underlying type is known and patched afterwards.

use errside_ast::types::{ChanDir, TypeId};
use errside_core::FxMap;
use indexmap::IndexMap;

/// The predeclared non-composite types, typed and untyped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,

    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedComplex,
    UntypedString,
    UntypedNil,
}

impl BasicKind {
    const ALL: [BasicKind; 24] = [
        BasicKind::Bool,
        BasicKind::Int,
        BasicKind::Int8,
        BasicKind::Int16,
        BasicKind::Int32,
        BasicKind::Int64,
        BasicKind::Uint,
        BasicKind::Uint8,
        BasicKind::Uint16,
        BasicKind::Uint32,
        BasicKind::Uint64,
        BasicKind::Uintptr,
        BasicKind::Float32,
        BasicKind::Float64,
        BasicKind::Complex64,
        BasicKind::Complex128,
        BasicKind::String,
        BasicKind::UntypedBool,
        BasicKind::UntypedInt,
        BasicKind::UntypedRune,
        BasicKind::UntypedFloat,
        BasicKind::UntypedComplex,
        BasicKind::UntypedString,
        BasicKind::UntypedNil,
    ];

    pub fn is_untyped(self) -> bool {
        matches!(
            self,
            BasicKind::UntypedBool
                | BasicKind::UntypedInt
                | BasicKind::UntypedRune
                | BasicKind::UntypedFloat
                | BasicKind::UntypedComplex
                | BasicKind::UntypedString
                | BasicKind::UntypedNil
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            BasicKind::Int
                | BasicKind::Int8
                | BasicKind::Int16
                | BasicKind::Int32
                | BasicKind::Int64
                | BasicKind::Uint
                | BasicKind::Uint8
                | BasicKind::Uint16
                | BasicKind::Uint32
                | BasicKind::Uint64
                | BasicKind::Uintptr
                | BasicKind::UntypedInt
                | BasicKind::UntypedRune
        )
    }

    /// The type an untyped constant takes when nothing else decides it.
    pub fn default_kind(self) -> BasicKind {
        match self {
            BasicKind::UntypedBool => BasicKind::Bool,
            BasicKind::UntypedInt => BasicKind::Int,
            BasicKind::UntypedRune => BasicKind::Int32,
            BasicKind::UntypedFloat => BasicKind::Float64,
            BasicKind::UntypedComplex => BasicKind::Complex128,
            BasicKind::UntypedString => BasicKind::String,
            other => other,
        }
    }

    /// Ordering of untyped numeric kinds: mixing two yields the larger.
    fn numeric_rank(self) -> u8 {
        match self {
            BasicKind::UntypedInt => 1,
            BasicKind::UntypedRune => 2,
            BasicKind::UntypedFloat => 3,
            BasicKind::UntypedComplex => 4,
            _ => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::String => "string",
            BasicKind::UntypedBool => "untyped bool",
            BasicKind::UntypedInt => "untyped int",
            BasicKind::UntypedRune => "untyped rune",
            BasicKind::UntypedFloat => "untyped float",
            BasicKind::UntypedComplex => "untyped complex",
            BasicKind::UntypedString => "untyped string",
            BasicKind::UntypedNil => "untyped nil",
        }
    }
}

/// A method of a named type.
#[derive(Debug, Clone, Copy)]
pub struct Method {
    /// The method's signature, without the receiver.
    pub sig: TypeId,
    pub pointer_receiver: bool,
}

#[derive(Debug, Clone)]
pub struct StructField {
    pub name: String,
    pub ty: TypeId,
    pub embedded: bool,
}

/// The specific data for each type kind.
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// The type of anything that could not be typed. Never reported twice.
    Invalid,
    Basic(BasicKind),
    /// A defined type. `pkg` is `None` only for the predeclared `error`.
    Named {
        name: String,
        pkg: Option<String>,
        underlying: TypeId,
        methods: IndexMap<String, Method>,
    },
    Pointer(TypeId),
    Slice(TypeId),
    /// `len` is `None` when it is not a literal.
    Array {
        len: Option<u64>,
        elem: TypeId,
    },
    Map {
        key: TypeId,
        value: TypeId,
    },
    Chan {
        dir: ChanDir,
        elem: TypeId,
    },
    Struct {
        fields: Vec<StructField>,
    },
    Interface {
        methods: IndexMap<String, TypeId>,
        embedded: Vec<TypeId>,
    },
    Signature {
        params: Vec<TypeId>,
        results: Vec<TypeId>,
        variadic: bool,
    },
    /// The result of a call returning zero or several values.
    Tuple(Vec<TypeId>),
}

/// A type in the table.
#[derive(Debug, Clone)]
pub struct Type {
    /// Unique identifier.
    pub id: TypeId,
    /// The specific kind of type.
    pub kind: TypeKind,
}

/// Structural types that are shared rather than re-created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TypeKey {
    Pointer(TypeId),
    Slice(TypeId),
    Array(Option<u64>, TypeId),
    Map(TypeId, TypeId),
    Chan(ChanDir, TypeId),
    Tuple(Vec<TypeId>),
}

/// The type table stores all types and provides access by TypeId.
#[derive(Debug)]
pub struct TypeTable {
    types: Vec<Type>,
    interned: FxMap<TypeKey, TypeId>,
    // Well-known types
    pub invalid_type: TypeId,
    pub untyped_nil: TypeId,
    pub error_type: TypeId,
    /// `interface{}`, also spelled `any`.
    pub empty_interface: TypeId,
    basics: FxMap<BasicKind, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = Self {
            types: Vec::with_capacity(256),
            interned: FxMap::default(),
            invalid_type: TypeId(0),
            untyped_nil: TypeId(0),
            error_type: TypeId(0),
            empty_interface: TypeId(0),
            basics: FxMap::default(),
        };
        table.invalid_type = table.add_type(TypeKind::Invalid);
        for kind in BasicKind::ALL {
            let id = table.add_type(TypeKind::Basic(kind));
            table.basics.insert(kind, id);
        }
        table.untyped_nil = table.basic(BasicKind::UntypedNil);
        table.empty_interface = table.add_type(TypeKind::Interface {
            methods: IndexMap::new(),
            embedded: Vec::new(),
        });

        // type error interface { Error() string }
        let string = table.basic(BasicKind::String);
        let error_sig = table.add_type(TypeKind::Signature {
            params: Vec::new(),
            results: vec![string],
            variadic: false,
        });
        let mut methods = IndexMap::new();
        methods.insert("Error".to_string(), error_sig);
        let error_underlying = table.add_type(TypeKind::Interface {
            methods,
            embedded: Vec::new(),
        });
        table.error_type = table.new_named("error", None);
        table.set_underlying(table.error_type, error_underlying);
        table
    }

    /// Add a new type to the table and return its ID.
    pub fn add_type(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(Type { id, kind });
        id
    }

    fn intern(&mut self, key: TypeKey, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.interned.get(&key) {
            return id;
        }
        let id = self.add_type(kind);
        self.interned.insert(key, id);
        id
    }

    /// Get a type by its ID.
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.index()].kind
    }

    /// Get the total number of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    pub fn basic(&self, kind: BasicKind) -> TypeId {
        self.basics.get(&kind).copied().unwrap_or(self.invalid_type)
    }

    pub fn pointer(&mut self, base: TypeId) -> TypeId {
        self.intern(TypeKey::Pointer(base), TypeKind::Pointer(base))
    }

    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        self.intern(TypeKey::Slice(elem), TypeKind::Slice(elem))
    }

    pub fn array(&mut self, len: Option<u64>, elem: TypeId) -> TypeId {
        self.intern(TypeKey::Array(len, elem), TypeKind::Array { len, elem })
    }

    pub fn map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(TypeKey::Map(key, value), TypeKind::Map { key, value })
    }

    pub fn chan(&mut self, dir: ChanDir, elem: TypeId) -> TypeId {
        self.intern(TypeKey::Chan(dir, elem), TypeKind::Chan { dir, elem })
    }

    pub fn tuple(&mut self, elems: Vec<TypeId>) -> TypeId {
        self.intern(TypeKey::Tuple(elems.clone()), TypeKind::Tuple(elems))
    }

    pub fn signature(&mut self, params: Vec<TypeId>, results: Vec<TypeId>, variadic: bool) -> TypeId {
        self.add_type(TypeKind::Signature {
            params,
            results,
            variadic,
        })
    }

    /// A named type whose underlying type is set later.
    pub fn new_named(&mut self, name: &str, pkg: Option<&str>) -> TypeId {
        let invalid = self.invalid_type;
        self.add_type(TypeKind::Named {
            name: name.to_string(),
            pkg: pkg.map(str::to_string),
            underlying: invalid,
            methods: IndexMap::new(),
        })
    }

    pub fn set_underlying(&mut self, named: TypeId, underlying: TypeId) {
        let resolved = self.underlying(underlying);
        if let TypeKind::Named { underlying: slot, .. } = &mut self.types[named.index()].kind {
            *slot = resolved;
        }
    }

    pub fn add_method(&mut self, named: TypeId, name: &str, method: Method) {
        if let TypeKind::Named { methods, .. } = &mut self.types[named.index()].kind {
            methods.insert(name.to_string(), method);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The underlying type: named types are replaced by their definition.
    pub fn underlying(&self, id: TypeId) -> TypeId {
        match self.kind(id) {
            TypeKind::Named { underlying, .. } => *underlying,
            _ => id,
        }
    }

    pub fn is_invalid(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Invalid)
    }

    /// Whether `id` is the predeclared `error` type itself.
    pub fn is_error_type(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Named { name, pkg: None, .. } if name == "error")
    }

    pub fn is_untyped_nil(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Basic(BasicKind::UntypedNil))
    }

    pub fn basic_kind(&self, id: TypeId) -> Option<BasicKind> {
        match self.kind(self.underlying(id)) {
            TypeKind::Basic(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_untyped(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Basic(kind) if kind.is_untyped())
    }

    pub fn is_string(&self, id: TypeId) -> bool {
        matches!(
            self.basic_kind(id),
            Some(BasicKind::String | BasicKind::UntypedString)
        )
    }

    /// The type an untyped value takes in a declaration.
    pub fn default_type(&self, id: TypeId) -> TypeId {
        match self.kind(id) {
            TypeKind::Basic(kind) if kind.is_untyped() => self.basic(kind.default_kind()),
            _ => id,
        }
    }

    /// The type of `x op y` for a non-comparison operator.
    pub fn binary_result(&self, x: TypeId, y: TypeId) -> TypeId {
        match (self.kind(x), self.kind(y)) {
            (TypeKind::Basic(a), TypeKind::Basic(b)) if a.is_untyped() && b.is_untyped() => {
                if b.numeric_rank() > a.numeric_rank() {
                    y
                } else {
                    x
                }
            }
            (TypeKind::Basic(a), _) if a.is_untyped() && !self.is_invalid(y) => y,
            _ => x,
        }
    }

    /// Results of a signature as one value: the single result, or a tuple.
    pub fn call_result(&mut self, sig: TypeId) -> Option<TypeId> {
        let results = match self.kind(self.underlying(sig)) {
            TypeKind::Signature { results, .. } => results.clone(),
            _ => return None,
        };
        Some(match results.len() {
            1 => results[0],
            _ => self.tuple(results),
        })
    }

    /// The values a tuple or single type stands for.
    pub fn values_of(&self, id: TypeId) -> Vec<TypeId> {
        match self.kind(id) {
            TypeKind::Tuple(elems) => elems.clone(),
            _ => vec![id],
        }
    }

    /// Look up a field or method of `id`, following pointers and embedded
    /// fields breadth first.
    pub fn lookup_member(&self, id: TypeId, name: &str) -> Option<TypeId> {
        let mut level = vec![id];
        for _ in 0..8 {
            let mut next = Vec::new();
            for ty in level {
                let base = match self.kind(ty) {
                    TypeKind::Pointer(base) => *base,
                    _ => ty,
                };
                if let TypeKind::Named { methods, .. } = self.kind(base) {
                    if let Some(method) = methods.get(name) {
                        return Some(method.sig);
                    }
                }
                match self.kind(self.underlying(base)) {
                    TypeKind::Struct { fields } => {
                        if let Some(field) = fields.iter().find(|f| f.name == name) {
                            return Some(field.ty);
                        }
                        next.extend(fields.iter().filter(|f| f.embedded).map(|f| f.ty));
                    }
                    TypeKind::Interface { methods, embedded } => {
                        if let Some(&sig) = methods.get(name) {
                            return Some(sig);
                        }
                        next.extend(embedded.iter().copied());
                    }
                    _ => {}
                }
            }
            if next.is_empty() {
                break;
            }
            level = next;
        }
        None
    }

    /// A human-readable rendering of a type, used in diagnostics.
    pub fn type_to_string(&self, id: TypeId) -> String {
        self.type_to_string_inner(id, 0)
    }

    fn type_to_string_inner(&self, id: TypeId, depth: u32) -> String {
        if depth > 8 {
            return "...".to_string();
        }
        let inner = |t: TypeId| self.type_to_string_inner(t, depth + 1);
        let list = |ts: &[TypeId]| ts.iter().map(|&t| inner(t)).collect::<Vec<_>>().join(", ");
        match self.kind(id) {
            TypeKind::Invalid => "invalid type".to_string(),
            TypeKind::Basic(kind) => kind.name().to_string(),
            TypeKind::Named { name, pkg, .. } => match pkg {
                Some(pkg) => format!("{}.{}", pkg, name),
                None => name.clone(),
            },
            TypeKind::Pointer(base) => format!("*{}", inner(*base)),
            TypeKind::Slice(elem) => format!("[]{}", inner(*elem)),
            TypeKind::Array { len, elem } => match len {
                Some(len) => format!("[{}]{}", len, inner(*elem)),
                None => format!("[?]{}", inner(*elem)),
            },
            TypeKind::Map { key, value } => format!("map[{}]{}", inner(*key), inner(*value)),
            TypeKind::Chan { dir, elem } => {
                let prefix = if *dir == ChanDir::SEND {
                    "chan<- "
                } else if *dir == ChanDir::RECV {
                    "<-chan "
                } else {
                    "chan "
                };
                format!("{}{}", prefix, inner(*elem))
            }
            TypeKind::Struct { fields } => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        if f.embedded {
                            inner(f.ty)
                        } else {
                            format!("{} {}", f.name, inner(f.ty))
                        }
                    })
                    .collect();
                format!("struct{{{}}}", fields.join("; "))
            }
            TypeKind::Interface { methods, embedded } if methods.is_empty() && embedded.is_empty() => {
                "interface{}".to_string()
            }
            TypeKind::Interface { .. } => "interface{...}".to_string(),
            TypeKind::Signature { params, results, .. } => match results.len() {
                0 => format!("func({})", list(params)),
                1 => format!("func({}) {}", list(params), inner(results[0])),
                _ => format!("func({}) ({})", list(params), list(results)),
            },
            TypeKind::Tuple(elems) => format!("({})", list(elems)),
        }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}
