//! AST node definitions for Go source files.
//!
//! The tree is owned: children live in `Box`es and `Vec`s so that statement
//! lists can be spliced in place after binding. Every node carries a
//! [`NodeData`] with a package-unique [`NodeId`] and its source range.

use crate::syntax_kind::SyntaxKind;
use crate::types::*;
use errside_core::intern::InternedString;
use errside_core::text::{LineMap, TextPos, TextRange};

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Common data shared by all AST nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeData {
    /// Unique node ID, assigned by the parser.
    pub id: NodeId,
    /// Source position range.
    pub range: TextRange,
}

impl NodeData {
    pub fn new(id: NodeId, pos: TextPos, end: TextPos) -> Self {
        Self {
            id,
            range: TextRange::new(pos, end),
        }
    }
}

// ============================================================================
// Source File
// ============================================================================

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub data: NodeData,
    pub package: Ident,
    pub decls: Vec<Decl>,
    /// Every comment in the file, in source order.
    pub comments: Vec<Comment>,
    pub file_name: String,
    pub text: String,
    pub line_map: LineMap,
}

impl SourceFile {
    /// The import specs of the file, in source order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls.iter().flat_map(|decl| match decl {
            Decl::Gen(gen) if gen.tok == SyntaxKind::ImportKeyword => gen.specs.iter(),
            _ => [].iter(),
        })
        .filter_map(|spec| match spec {
            Spec::Import(import) => Some(import),
            _ => None,
        })
    }

    /// The zero-based line of a position in this file.
    pub fn line_of(&self, pos: TextPos) -> u32 {
        self.line_map.line_of(pos)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub range: TextRange,
    /// The comment text including its `//` or `/* */` delimiters.
    pub text: String,
}

impl Comment {
    pub fn is_block(&self) -> bool {
        self.text.starts_with("/*")
    }
}

// ============================================================================
// Identifiers and Literals
// ============================================================================

#[derive(Debug, Clone)]
pub struct Ident {
    pub data: NodeData,
    /// The interned name, used as the scope key.
    pub name: InternedString,
    /// The name as written.
    pub text: String,
}

impl Ident {
    pub fn is_blank(&self) -> bool {
        self.text == "_"
    }

    /// Exported names start with an upper-case letter.
    pub fn is_exported(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone)]
pub struct BasicLit {
    pub data: NodeData,
    pub kind: LitKind,
    /// The literal as written, quotes included.
    pub value: String,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone)]
pub enum Expr {
    Ident(Ident),
    BasicLit(BasicLit),
    CompositeLit(Box<CompositeLit>),
    FuncLit(Box<FuncLit>),
    Paren(Box<ParenExpr>),
    Selector(Box<SelectorExpr>),
    Index(Box<IndexExpr>),
    Slice(Box<SliceExpr>),
    TypeAssert(Box<TypeAssertExpr>),
    Call(Box<CallExpr>),
    Star(Box<StarExpr>),
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    KeyValue(Box<KeyValueExpr>),

    // Type expressions
    ArrayType(Box<ArrayType>),
    MapType(Box<MapType>),
    ChanType(Box<ChanType>),
    FuncType(Box<FuncType>),
    StructType(Box<StructType>),
    InterfaceType(Box<InterfaceType>),
    Ellipsis(Box<Ellipsis>),
}

#[derive(Debug, Clone)]
pub struct CompositeLit {
    pub data: NodeData,
    /// `None` for elided types inside another composite literal.
    pub ty: Option<Expr>,
    pub lbrace: TextPos,
    pub elts: Vec<Expr>,
    pub rbrace: TextPos,
}

#[derive(Debug, Clone)]
pub struct FuncLit {
    pub data: NodeData,
    pub ty: FuncType,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct ParenExpr {
    pub data: NodeData,
    pub x: Expr,
}

#[derive(Debug, Clone)]
pub struct SelectorExpr {
    pub data: NodeData,
    pub x: Expr,
    pub sel: Ident,
}

#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub data: NodeData,
    pub x: Expr,
    pub index: Expr,
}

#[derive(Debug, Clone)]
pub struct SliceExpr {
    pub data: NodeData,
    pub x: Expr,
    pub low: Option<Expr>,
    pub high: Option<Expr>,
    pub max: Option<Expr>,
    /// `x[a:b:c]` form.
    pub slice3: bool,
}

#[derive(Debug, Clone)]
pub struct TypeAssertExpr {
    pub data: NodeData,
    pub x: Expr,
    /// `None` for the `x.(type)` guard of a type switch.
    pub ty: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub data: NodeData,
    pub fun: Expr,
    pub args: Vec<Expr>,
    /// `f(xs...)`
    pub ellipsis: bool,
    pub rparen: TextPos,
}

#[derive(Debug, Clone)]
pub struct StarExpr {
    pub data: NodeData,
    pub x: Expr,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub data: NodeData,
    pub op: SyntaxKind,
    pub x: Expr,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub data: NodeData,
    pub x: Expr,
    pub op: SyntaxKind,
    pub y: Expr,
}

#[derive(Debug, Clone)]
pub struct KeyValueExpr {
    pub data: NodeData,
    pub key: Expr,
    pub value: Expr,
}

/// `[N]T`, `[...]T`, or `[]T` when `len` is `None`.
#[derive(Debug, Clone)]
pub struct ArrayType {
    pub data: NodeData,
    pub len: Option<Expr>,
    pub elt: Expr,
}

#[derive(Debug, Clone)]
pub struct MapType {
    pub data: NodeData,
    pub key: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct ChanType {
    pub data: NodeData,
    pub dir: ChanDir,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct FuncType {
    pub data: NodeData,
    pub params: FieldList,
    pub results: Option<FieldList>,
}

#[derive(Debug, Clone)]
pub struct StructType {
    pub data: NodeData,
    pub fields: FieldList,
}

#[derive(Debug, Clone)]
pub struct InterfaceType {
    pub data: NodeData,
    pub methods: FieldList,
}

/// `...T` in a parameter list, or `...` as an array length.
#[derive(Debug, Clone)]
pub struct Ellipsis {
    pub data: NodeData,
    pub elt: Option<Expr>,
}

/// A parameter, result, struct field, or interface method.
///
/// Interface methods have one name and a `FuncType`; embedded fields and
/// unnamed parameters have no names.
#[derive(Debug, Clone)]
pub struct Field {
    pub data: NodeData,
    pub names: Vec<Ident>,
    pub ty: Expr,
    pub tag: Option<BasicLit>,
}

#[derive(Debug, Clone)]
pub struct FieldList {
    pub data: NodeData,
    pub list: Vec<Field>,
    /// Whether the list was written inside parentheses or braces.
    pub delimited: bool,
}

impl FieldList {
    /// The number of entries the list declares, counting grouped names.
    pub fn arity(&self) -> usize {
        self.list.iter().map(|f| f.names.len().max(1)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone)]
pub enum Stmt {
    Decl(Box<GenDecl>),
    Labeled(Box<LabeledStmt>),
    Expr(Box<ExprStmt>),
    Send(Box<SendStmt>),
    IncDec(Box<IncDecStmt>),
    Assign(Box<AssignStmt>),
    Go(Box<GoStmt>),
    Defer(Box<DeferStmt>),
    Return(Box<ReturnStmt>),
    Branch(Box<BranchStmt>),
    Block(Box<Block>),
    If(Box<IfStmt>),
    Switch(Box<SwitchStmt>),
    TypeSwitch(Box<TypeSwitchStmt>),
    Select(Box<SelectStmt>),
    For(Box<ForStmt>),
    Range(Box<RangeStmt>),
    Empty(EmptyStmt),
    /// An assignment fused with the `if err != nil` check that follows it.
    AssignIfErr(Box<AssignIfErrStmt>),
}

#[derive(Debug, Clone)]
pub struct Block {
    pub data: NodeData,
    pub stmts: Vec<Stmt>,
    pub rbrace: TextPos,
}

#[derive(Debug, Clone)]
pub struct LabeledStmt {
    pub data: NodeData,
    pub label: Ident,
    pub stmt: Stmt,
}

#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub data: NodeData,
    pub x: Expr,
}

#[derive(Debug, Clone)]
pub struct SendStmt {
    pub data: NodeData,
    pub chan: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct IncDecStmt {
    pub data: NodeData,
    pub x: Expr,
    /// `PlusPlusToken` or `MinusMinusToken`.
    pub tok: SyntaxKind,
}

#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub data: NodeData,
    pub lhs: Vec<Expr>,
    /// `ColonEqualsToken`, `EqualsToken`, or a compound operator like `+=`.
    pub tok: SyntaxKind,
    pub rhs: Vec<Expr>,
}

impl AssignStmt {
    pub fn is_define(&self) -> bool {
        self.tok == SyntaxKind::ColonEqualsToken
    }
}

#[derive(Debug, Clone)]
pub struct GoStmt {
    pub data: NodeData,
    pub call: Expr,
}

#[derive(Debug, Clone)]
pub struct DeferStmt {
    pub data: NodeData,
    pub call: Expr,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub data: NodeData,
    pub results: Vec<Expr>,
}

/// `break`, `continue`, `goto`, or `fallthrough`.
#[derive(Debug, Clone)]
pub struct BranchStmt {
    pub data: NodeData,
    pub tok: SyntaxKind,
    pub label: Option<Ident>,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub data: NodeData,
    pub init: Option<Stmt>,
    pub cond: Expr,
    pub body: Block,
    /// Either a `Stmt::Block` or a chained `Stmt::If`.
    pub else_: Option<Stmt>,
}

/// A `case` or `default` clause of an expression or type switch.
#[derive(Debug, Clone)]
pub struct CaseClause {
    pub data: NodeData,
    /// `None` for `default`.
    pub list: Option<Vec<Expr>>,
    pub colon: TextPos,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct SwitchStmt {
    pub data: NodeData,
    pub init: Option<Stmt>,
    pub tag: Option<Expr>,
    pub clauses: Vec<CaseClause>,
    pub rbrace: TextPos,
}

/// `switch [init;] [v :=] x.(type) { ... }`
#[derive(Debug, Clone)]
pub struct TypeSwitchStmt {
    pub data: NodeData,
    pub init: Option<Stmt>,
    /// The `v` of `v := x.(type)`. Each clause declares its own `v`.
    pub binding: Option<Ident>,
    /// The operand `x` of the guard.
    pub x: Expr,
    pub clauses: Vec<CaseClause>,
    pub rbrace: TextPos,
}

#[derive(Debug, Clone)]
pub struct CommClause {
    pub data: NodeData,
    /// Send or receive statement; `None` for `default`.
    pub comm: Option<Stmt>,
    pub colon: TextPos,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct SelectStmt {
    pub data: NodeData,
    pub clauses: Vec<CommClause>,
    pub rbrace: TextPos,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub data: NodeData,
    pub init: Option<Stmt>,
    pub cond: Option<Expr>,
    pub post: Option<Stmt>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct RangeStmt {
    pub data: NodeData,
    pub key: Option<Expr>,
    pub value: Option<Expr>,
    /// `ColonEqualsToken` or `EqualsToken` when there is a key.
    pub tok: Option<SyntaxKind>,
    pub x: Expr,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct EmptyStmt {
    pub data: NodeData,
}

/// An assignment and the `if` statement checking its error, fused.
///
/// `leading` is either the assignment with its last target removed (when it
/// had two or more targets) or an expression statement holding its single
/// value (when it had one). The range runs from the start of `leading` to the
/// end of `cond`.
#[derive(Debug, Clone)]
pub struct AssignIfErrStmt {
    pub data: NodeData,
    pub leading: Stmt,
    pub cond: IfStmt,
    /// The binding tested by `cond`.
    pub err_var: SymbolId,
    /// Whether the original assignment used `:=`.
    pub short_form: bool,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone)]
pub enum Decl {
    Func(Box<FuncDecl>),
    Gen(Box<GenDecl>),
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub data: NodeData,
    pub recv: Option<FieldList>,
    pub name: Ident,
    pub ty: FuncType,
    /// `None` for functions implemented outside Go.
    pub body: Option<Block>,
}

/// `import`, `const`, `type`, or `var` declaration.
#[derive(Debug, Clone)]
pub struct GenDecl {
    pub data: NodeData,
    pub tok: SyntaxKind,
    /// Position of `(` when the specs are grouped.
    pub lparen: Option<TextPos>,
    pub specs: Vec<Spec>,
    pub rparen: Option<TextPos>,
}

#[derive(Debug, Clone)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

#[derive(Debug, Clone)]
pub struct ImportSpec {
    pub data: NodeData,
    /// Local name, `.`, or `_`.
    pub name: Option<Ident>,
    pub path: BasicLit,
}

impl ImportSpec {
    /// The import path without quotes.
    pub fn path_value(&self) -> &str {
        self.path.value.trim_matches(|c| c == '"' || c == '`')
    }
}

/// A `const` or `var` spec.
#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub data: NodeData,
    pub names: Vec<Ident>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
    /// For constants, the index of the spec within its group. Constants with
    /// no values repeat the expressions of the last spec that had them.
    pub iota: u32,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub data: NodeData,
    pub name: Ident,
    /// `type A = B`
    pub alias: bool,
    pub ty: Expr,
}

// ============================================================================
// Accessors
// ============================================================================

impl Expr {
    pub fn data(&self) -> &NodeData {
        match self {
            Expr::Ident(n) => &n.data,
            Expr::BasicLit(n) => &n.data,
            Expr::CompositeLit(n) => &n.data,
            Expr::FuncLit(n) => &n.data,
            Expr::Paren(n) => &n.data,
            Expr::Selector(n) => &n.data,
            Expr::Index(n) => &n.data,
            Expr::Slice(n) => &n.data,
            Expr::TypeAssert(n) => &n.data,
            Expr::Call(n) => &n.data,
            Expr::Star(n) => &n.data,
            Expr::Unary(n) => &n.data,
            Expr::Binary(n) => &n.data,
            Expr::KeyValue(n) => &n.data,
            Expr::ArrayType(n) => &n.data,
            Expr::MapType(n) => &n.data,
            Expr::ChanType(n) => &n.data,
            Expr::FuncType(n) => &n.data,
            Expr::StructType(n) => &n.data,
            Expr::InterfaceType(n) => &n.data,
            Expr::Ellipsis(n) => &n.data,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.data().id
    }

    #[inline]
    pub fn range(&self) -> TextRange {
        self.data().range
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren(paren) = expr {
            expr = &paren.x;
        }
        expr
    }
}

impl Stmt {
    pub fn data(&self) -> &NodeData {
        match self {
            Stmt::Decl(n) => &n.data,
            Stmt::Labeled(n) => &n.data,
            Stmt::Expr(n) => &n.data,
            Stmt::Send(n) => &n.data,
            Stmt::IncDec(n) => &n.data,
            Stmt::Assign(n) => &n.data,
            Stmt::Go(n) => &n.data,
            Stmt::Defer(n) => &n.data,
            Stmt::Return(n) => &n.data,
            Stmt::Branch(n) => &n.data,
            Stmt::Block(n) => &n.data,
            Stmt::If(n) => &n.data,
            Stmt::Switch(n) => &n.data,
            Stmt::TypeSwitch(n) => &n.data,
            Stmt::Select(n) => &n.data,
            Stmt::For(n) => &n.data,
            Stmt::Range(n) => &n.data,
            Stmt::Empty(n) => &n.data,
            Stmt::AssignIfErr(n) => &n.data,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.data().id
    }

    #[inline]
    pub fn range(&self) -> TextRange {
        self.data().range
    }

    /// Statements that end in a `}` and are printed over several lines.
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            Stmt::Block(_)
                | Stmt::If(_)
                | Stmt::Switch(_)
                | Stmt::TypeSwitch(_)
                | Stmt::Select(_)
                | Stmt::For(_)
                | Stmt::Range(_)
                | Stmt::AssignIfErr(_)
        )
    }
}

impl Decl {
    pub fn data(&self) -> &NodeData {
        match self {
            Decl::Func(n) => &n.data,
            Decl::Gen(n) => &n.data,
        }
    }

    #[inline]
    pub fn range(&self) -> TextRange {
        self.data().range
    }
}

impl Spec {
    pub fn data(&self) -> &NodeData {
        match self {
            Spec::Import(n) => &n.data,
            Spec::Value(n) => &n.data,
            Spec::Type(n) => &n.data,
        }
    }

    #[inline]
    pub fn range(&self) -> TextRange {
        self.data().range
    }
}
