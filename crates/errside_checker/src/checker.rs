//! The type checker implementation.
//!
//! Computes a static type for every expression and every declared symbol of
//! one package. Package-level declarations are typed on demand, so they may
//! appear in any order and in any file; function bodies are checked in source
//! order. The checker is deliberately lenient: whatever it cannot type gets
//! the invalid type without an error, and the invalid type never triggers a
//! follow-on error.

use crate::importer::{Importer, Member};
use crate::types::{BasicKind, Method, StructField, TypeKind, TypeTable};
use errside_ast::node::*;
use errside_ast::syntax_kind::SyntaxKind;
use errside_ast::types::*;
use errside_binder::{Bindings, Predeclared, SymbolKind};
use errside_core::text::TextRange;
use errside_core::{FxMap, FxSet};
use errside_diagnostics::messages::*;
use errside_diagnostics::{Diagnostic, DiagnosticCollection, DiagnosticMessage};
use indexmap::IndexMap;

/// Where a package-level symbol is declared.
#[derive(Clone, Copy)]
enum PackageDecl<'a> {
    Func {
        func: &'a FuncDecl,
        file: usize,
    },
    Value {
        spec: &'a ValueSpec,
        /// For constants, the last spec of the group that had values.
        init: Option<&'a ValueSpec>,
        is_const: bool,
        file: usize,
    },
    Type {
        spec: &'a TypeSpec,
        file: usize,
    },
}

/// Result of looking a name up in an imported package.
enum MemberLookup {
    Found(Member),
    Missing,
    /// The package has no type information.
    Opaque,
}

/// The types computed for one package.
#[derive(Debug, Default)]
pub struct CheckedTypes {
    pub types: FxMap<NodeId, TypeId>,
    pub symbol_types: FxMap<SymbolId, TypeId>,
}

/// The type checker computes types and reports type errors.
pub struct Checker<'a> {
    table: &'a mut TypeTable,
    importer: &'a mut Importer,
    bindings: &'a Bindings,
    files: &'a [SourceFile],
    /// Qualifier for the named types this package declares.
    package_path: String,
    /// Index into `files` of the file being checked.
    file: usize,
    decls: FxMap<SymbolId, PackageDecl<'a>>,
    /// Type name symbol -> methods declared on it.
    methods: FxMap<SymbolId, Vec<(&'a FuncDecl, usize)>>,
    types: FxMap<NodeId, TypeId>,
    symbol_types: FxMap<SymbolId, TypeId>,
    /// Value specs whose initializers have been (or are being) checked.
    checked_specs: FxSet<NodeId>,
    resolving_specs: FxSet<NodeId>,
    resolving_aliases: FxSet<SymbolId>,
    /// Named types whose underlying type is being resolved.
    pending: FxSet<TypeId>,
    diagnostics: DiagnosticCollection,
}

impl<'a> Checker<'a> {
    pub fn new(
        table: &'a mut TypeTable,
        importer: &'a mut Importer,
        bindings: &'a Bindings,
        files: &'a [SourceFile],
        package_path: impl Into<String>,
    ) -> Self {
        Self {
            table,
            importer,
            bindings,
            files,
            package_path: package_path.into(),
            file: 0,
            decls: FxMap::default(),
            methods: FxMap::default(),
            types: FxMap::default(),
            symbol_types: FxMap::default(),
            checked_specs: FxSet::default(),
            resolving_specs: FxSet::default(),
            resolving_aliases: FxSet::default(),
            pending: FxSet::default(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Take diagnostics from the checker.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Consume the checker, yielding the computed types.
    pub fn finish(self) -> CheckedTypes {
        CheckedTypes {
            types: self.types,
            symbol_types: self.symbol_types,
        }
    }

    fn invalid(&self) -> TypeId {
        self.table.invalid_type
    }

    fn error(&mut self, range: TextRange, message: &DiagnosticMessage, args: &[&str]) {
        let files = self.files;
        let file_name = files
            .get(self.file)
            .map(|f| f.file_name.as_str())
            .unwrap_or_default();
        self.diagnostics
            .add(Diagnostic::with_location(file_name, range, message, args));
    }

    fn source_text(&self, range: TextRange) -> &'a str {
        let files = self.files;
        files
            .get(self.file)
            .and_then(|f| f.text.get(range.pos as usize..range.end as usize))
            .unwrap_or_default()
    }

    fn in_file<T>(&mut self, file: usize, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.file, file);
        let result = f(self);
        self.file = saved;
        result
    }

    // ========================================================================
    // Package checking
    // ========================================================================

    /// Check every file of the package.
    pub fn check_package(&mut self) {
        self.index_package();
        let files = self.files;
        for (index, file) in files.iter().enumerate() {
            self.file = index;
            self.check_imports(file);
            for decl in &file.decls {
                self.check_decl(decl);
            }
        }
        for file in files {
            self.diagnostics.locate(&file.file_name, &file.line_map);
        }
        self.diagnostics.sort();
    }

    fn index_package(&mut self) {
        let files = self.files;
        let bindings = self.bindings;
        for (file, source) in files.iter().enumerate() {
            for decl in &source.decls {
                match decl {
                    Decl::Func(func) => {
                        let func: &'a FuncDecl = func;
                        if let Some(sym) = bindings.def_of(func.name.data.id) {
                            self.decls.insert(sym, PackageDecl::Func { func, file });
                        }
                        let base = func.recv.as_ref().and_then(receiver_base);
                        if let Some(type_sym) = base.and_then(|ident| bindings.use_of(ident.data.id)) {
                            self.methods.entry(type_sym).or_default().push((func, file));
                        }
                    }
                    Decl::Gen(gen) => {
                        let is_const = gen.tok == SyntaxKind::ConstKeyword;
                        let mut init = None;
                        for spec in &gen.specs {
                            match spec {
                                Spec::Value(spec) => {
                                    if is_const && !spec.values.is_empty() {
                                        init = Some(spec);
                                    }
                                    for name in &spec.names {
                                        if let Some(sym) = bindings.def_of(name.data.id) {
                                            self.decls.insert(
                                                sym,
                                                PackageDecl::Value {
                                                    spec,
                                                    init,
                                                    is_const,
                                                    file,
                                                },
                                            );
                                        }
                                    }
                                }
                                Spec::Type(spec) => {
                                    if let Some(sym) = bindings.def_of(spec.name.data.id) {
                                        self.decls.insert(sym, PackageDecl::Type { spec, file });
                                    }
                                }
                                Spec::Import(_) => {}
                            }
                        }
                    }
                }
            }
        }
    }

    fn check_imports(&mut self, file: &'a SourceFile) {
        for import in file.imports() {
            let path = import.path_value();
            if self.importer.import(path, self.table).opaque {
                let quoted = format!("\"{}\"", path);
                self.error(import.path.data.range, &COULD_NOT_IMPORT_0, &[&quoted]);
            }
        }
    }

    fn check_decl(&mut self, decl: &'a Decl) {
        match decl {
            Decl::Func(func) => {
                if let Some(sym) = self.bindings.def_of(func.name.data.id) {
                    self.type_of_symbol(sym);
                }
                self.check_func_decl(func);
            }
            Decl::Gen(gen) => self.check_gen_decl(gen, true),
        }
    }

    fn check_func_decl(&mut self, func: &'a FuncDecl) {
        if let Some(recv) = &func.recv {
            self.declare_fields(recv);
        }
        self.declare_fields(&func.ty.params);
        if let Some(results) = &func.ty.results {
            self.declare_fields(results);
        }
        if let Some(body) = &func.body {
            self.check_block(body);
        }
    }

    fn check_gen_decl(&mut self, gen: &'a GenDecl, package_level: bool) {
        let is_const = gen.tok == SyntaxKind::ConstKeyword;
        let mut init = None;
        for spec in &gen.specs {
            match spec {
                Spec::Value(spec) => {
                    if is_const && !spec.values.is_empty() {
                        init = Some(spec);
                    }
                    if package_level {
                        self.resolve_value_spec(spec, init, is_const, self.file);
                    } else {
                        self.check_value_spec(spec, init, is_const);
                    }
                }
                Spec::Type(spec) => {
                    let sym = self.bindings.def_of(spec.name.data.id);
                    match sym {
                        Some(sym) if package_level => {
                            self.type_of_symbol(sym);
                        }
                        _ => {
                            self.define_type(sym, spec);
                        }
                    }
                }
                Spec::Import(_) => {}
            }
        }
    }

    // ========================================================================
    // Symbols
    // ========================================================================

    /// The type of a symbol, computing it first for package-level symbols.
    pub fn type_of_symbol(&mut self, sym: SymbolId) -> TypeId {
        if let Some(&ty) = self.symbol_types.get(&sym) {
            return ty;
        }
        let bindings = self.bindings;
        let Some(symbol) = bindings.symbol(sym) else {
            return self.invalid();
        };
        if let Some(which) = symbol.universe {
            return self.universe_type(which);
        }
        match self.decls.get(&sym).copied() {
            Some(PackageDecl::Type { spec, file }) => self.in_file(file, |c| c.define_type(Some(sym), spec)),
            Some(PackageDecl::Value {
                spec,
                init,
                is_const,
                file,
            }) => {
                self.resolve_value_spec(spec, init, is_const, file);
                match self.symbol_types.get(&sym) {
                    Some(&ty) => ty,
                    None => self.invalid(),
                }
            }
            Some(PackageDecl::Func { func, file }) => {
                let sig = self.in_file(file, |c| c.signature(&func.ty));
                self.symbol_types.insert(sym, sig);
                sig
            }
            None => self.invalid(),
        }
    }

    fn universe_type(&self, which: Predeclared) -> TypeId {
        let kind = match which {
            Predeclared::Bool => BasicKind::Bool,
            Predeclared::Byte | Predeclared::Uint8 => BasicKind::Uint8,
            Predeclared::Rune | Predeclared::Int32 => BasicKind::Int32,
            Predeclared::Complex64 => BasicKind::Complex64,
            Predeclared::Complex128 => BasicKind::Complex128,
            Predeclared::Float32 => BasicKind::Float32,
            Predeclared::Float64 => BasicKind::Float64,
            Predeclared::Int => BasicKind::Int,
            Predeclared::Int8 => BasicKind::Int8,
            Predeclared::Int16 => BasicKind::Int16,
            Predeclared::Int64 => BasicKind::Int64,
            Predeclared::String => BasicKind::String,
            Predeclared::Uint => BasicKind::Uint,
            Predeclared::Uint16 => BasicKind::Uint16,
            Predeclared::Uint32 => BasicKind::Uint32,
            Predeclared::Uint64 => BasicKind::Uint64,
            Predeclared::Uintptr => BasicKind::Uintptr,
            Predeclared::True | Predeclared::False => BasicKind::UntypedBool,
            Predeclared::Iota => BasicKind::UntypedInt,
            Predeclared::Nil => BasicKind::UntypedNil,
            Predeclared::Error => return self.table.error_type,
            Predeclared::Any => return self.table.empty_interface,
            _ => return self.invalid(),
        };
        self.table.basic(kind)
    }

    /// Record the type of a declaring identifier.
    fn declare(&mut self, ident: &Ident, ty: TypeId) {
        if let Some(sym) = self.bindings.def_of(ident.data.id) {
            self.symbol_types.insert(sym, ty);
        }
        self.types.insert(ident.data.id, ty);
    }

    fn declare_fields(&mut self, list: &'a FieldList) {
        for field in &list.list {
            let ty = match self.types.get(&field.ty.id()) {
                Some(&ty) => ty,
                None => self.resolve_type(&field.ty),
            };
            for name in &field.names {
                self.declare(name, ty);
            }
        }
    }

    // ========================================================================
    // Value declarations
    // ========================================================================

    fn resolve_value_spec(&mut self, spec: &'a ValueSpec, init: Option<&'a ValueSpec>, is_const: bool, file: usize) {
        let id = spec.data.id;
        if !self.checked_specs.insert(id) {
            if self.resolving_specs.contains(&id) {
                let name = spec.names.first().map(|n| n.text.as_str()).unwrap_or("_");
                let range = spec.data.range;
                self.in_file(file, |c| c.error(range, &INITIALIZATION_CYCLE_0, &[name]));
            }
            return;
        }
        self.resolving_specs.insert(id);
        self.in_file(file, |c| c.check_value_spec(spec, init, is_const));
        self.resolving_specs.remove(&id);
    }

    /// Type the names of a `var` or `const` spec. Constants without values
    /// repeat the type and values of `init`.
    fn check_value_spec(&mut self, spec: &'a ValueSpec, init: Option<&'a ValueSpec>, is_const: bool) {
        let repeated = is_const && spec.values.is_empty();
        let (ty_expr, values): (Option<&'a Expr>, &'a [Expr]) = match init {
            Some(init) if repeated => (init.ty.as_ref(), init.values.as_slice()),
            _ => (spec.ty.as_ref(), spec.values.as_slice()),
        };
        let declared = ty_expr.map(|ty| self.resolve_type(ty));
        let value_types = if values.is_empty() {
            Vec::new()
        } else {
            self.assign_types(spec.names.len(), values, spec.data.range)
        };

        for (i, name) in spec.names.iter().enumerate() {
            let ty = match declared {
                Some(ty) => ty,
                None => {
                    let ty = value_types.get(i).copied().unwrap_or(self.invalid());
                    if is_const {
                        ty
                    } else if self.table.is_untyped_nil(ty) {
                        let range = values.get(i).map(Expr::range).unwrap_or(spec.data.range);
                        self.error(range, &USE_OF_UNTYPED_NIL, &[]);
                        self.invalid()
                    } else {
                        self.table.default_type(ty)
                    }
                }
            };
            self.declare(name, ty);
        }
    }

    /// The types `lhs_count` targets receive from `rhs`.
    fn assign_types(&mut self, lhs_count: usize, rhs: &'a [Expr], range: TextRange) -> Vec<TypeId> {
        let invalid = self.invalid();
        if rhs.len() == 1 {
            let value = &rhs[0];
            let ty = self.check_expr(value);
            if self.table.is_invalid(ty) {
                return vec![invalid; lhs_count];
            }
            if lhs_count == 2 && self.is_comma_ok(value) {
                return vec![ty, self.table.basic(BasicKind::Bool)];
            }
            let values = self.table.values_of(ty);
            if values.len() == lhs_count {
                return values;
            }
            let (lhs, rhs) = (lhs_count.to_string(), values.len().to_string());
            self.error(range, &ASSIGNMENT_MISMATCH, &[&lhs, &rhs]);
            return vec![invalid; lhs_count];
        }

        let types: Vec<TypeId> = rhs.iter().map(|value| self.check_expr(value)).collect();
        if types.len() == lhs_count {
            return types;
        }
        let (lhs, rhs) = (lhs_count.to_string(), rhs.len().to_string());
        self.error(range, &ASSIGNMENT_MISMATCH, &[&lhs, &rhs]);
        vec![invalid; lhs_count]
    }

    /// Map index, type assertion, and receive yield an extra boolean when
    /// assigned to two targets.
    fn is_comma_ok(&self, value: &Expr) -> bool {
        match value.unparen() {
            Expr::TypeAssert(_) => true,
            Expr::Unary(unary) => unary.op == SyntaxKind::ArrowToken,
            Expr::Index(index) => self
                .types
                .get(&index.x.id())
                .is_some_and(|&ty| matches!(self.table.kind(self.table.underlying(ty)), TypeKind::Map { .. })),
            _ => false,
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn check_block(&mut self, block: &'a Block) {
        for stmt in &block.stmts {
            self.check_stmt(stmt);
        }
    }

    fn check_stmts(&mut self, stmts: &'a [Stmt]) {
        for stmt in stmts {
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Decl(gen) => self.check_gen_decl(gen, false),
            Stmt::Labeled(labeled) => self.check_stmt(&labeled.stmt),
            Stmt::Expr(expr) => {
                self.check_expr(&expr.x);
            }
            Stmt::Send(send) => {
                self.check_expr(&send.chan);
                self.check_expr(&send.value);
            }
            Stmt::IncDec(inc) => {
                self.check_expr(&inc.x);
            }
            Stmt::Assign(assign) => self.check_assign(assign),
            Stmt::Go(go) => {
                self.check_expr(&go.call);
            }
            Stmt::Defer(defer) => {
                self.check_expr(&defer.call);
            }
            Stmt::Return(ret) => {
                for result in &ret.results {
                    self.check_expr(result);
                }
            }
            Stmt::Branch(_) | Stmt::Empty(_) => {}
            Stmt::Block(block) => self.check_block(block),
            Stmt::If(if_stmt) => self.check_if(if_stmt),
            Stmt::Switch(switch) => {
                if let Some(init) = &switch.init {
                    self.check_stmt(init);
                }
                if let Some(tag) = &switch.tag {
                    self.check_expr(tag);
                }
                for clause in &switch.clauses {
                    for expr in clause.list.iter().flatten() {
                        self.check_expr(expr);
                    }
                    self.check_stmts(&clause.body);
                }
            }
            Stmt::TypeSwitch(switch) => self.check_type_switch(switch),
            Stmt::Select(select) => {
                for clause in &select.clauses {
                    if let Some(comm) = &clause.comm {
                        self.check_stmt(comm);
                    }
                    self.check_stmts(&clause.body);
                }
            }
            Stmt::For(for_stmt) => {
                if let Some(init) = &for_stmt.init {
                    self.check_stmt(init);
                }
                if let Some(cond) = &for_stmt.cond {
                    self.check_expr(cond);
                }
                if let Some(post) = &for_stmt.post {
                    self.check_stmt(post);
                }
                self.check_block(&for_stmt.body);
            }
            Stmt::Range(range) => self.check_range(range),
            Stmt::AssignIfErr(merged) => {
                self.check_stmt(&merged.leading);
                self.check_if(&merged.cond);
            }
        }
    }

    fn check_if(&mut self, if_stmt: &'a IfStmt) {
        if let Some(init) = &if_stmt.init {
            self.check_stmt(init);
        }
        self.check_expr(&if_stmt.cond);
        self.check_block(&if_stmt.body);
        if let Some(else_) = &if_stmt.else_ {
            self.check_stmt(else_);
        }
    }

    fn check_assign(&mut self, assign: &'a AssignStmt) {
        match assign.tok {
            SyntaxKind::ColonEqualsToken => {
                let types = self.assign_types(assign.lhs.len(), &assign.rhs, assign.data.range);
                let one_to_one = assign.lhs.len() == assign.rhs.len();
                for (i, (target, &ty)) in assign.lhs.iter().zip(&types).enumerate() {
                    let Expr::Ident(ident) = target else { continue };
                    if ident.is_blank() {
                        continue;
                    }
                    if self.bindings.def_of(ident.data.id).is_some() {
                        let ty = if self.table.is_untyped_nil(ty) {
                            let range = if one_to_one { assign.rhs[i].range() } else { assign.data.range };
                            self.error(range, &USE_OF_UNTYPED_NIL, &[]);
                            self.invalid()
                        } else {
                            self.table.default_type(ty)
                        };
                        self.declare(ident, ty);
                    } else if let Some(sym) = self.bindings.use_of(ident.data.id) {
                        let ty = self.type_of_symbol(sym);
                        self.types.insert(ident.data.id, ty);
                    }
                }
            }
            SyntaxKind::EqualsToken => {
                for target in &assign.lhs {
                    if !matches!(target, Expr::Ident(ident) if ident.is_blank()) {
                        self.check_expr(target);
                    }
                }
                self.assign_types(assign.lhs.len(), &assign.rhs, assign.data.range);
            }
            _ => {
                for expr in assign.lhs.iter().chain(&assign.rhs) {
                    self.check_expr(expr);
                }
            }
        }
    }

    fn check_type_switch(&mut self, switch: &'a TypeSwitchStmt) {
        if let Some(init) = &switch.init {
            self.check_stmt(init);
        }
        let guard = self.check_expr(&switch.x);
        if let Some(binding) = &switch.binding {
            self.types.insert(binding.data.id, guard);
        }
        for clause in &switch.clauses {
            let mut listed = Vec::new();
            for expr in clause.list.iter().flatten() {
                let ty = if self.is_nil(expr) {
                    self.check_expr(expr)
                } else {
                    self.resolve_type(expr)
                };
                listed.push(ty);
            }
            if let Some(sym) = self.bindings.implicit_of(clause.data.id) {
                // A single listed type narrows the variable; anything else
                // leaves it with the type of the guard.
                let ty = match listed.as_slice() {
                    [single] if !self.table.is_untyped_nil(*single) => *single,
                    _ => guard,
                };
                self.symbol_types.insert(sym, ty);
            }
            self.check_stmts(&clause.body);
        }
    }

    fn check_range(&mut self, range: &'a RangeStmt) {
        let ty = self.check_expr(&range.x);
        let (key_type, value_type) = self.range_types(ty);
        if range.tok == Some(SyntaxKind::ColonEqualsToken) {
            for (target, ty) in [(&range.key, key_type), (&range.value, value_type)] {
                if let Some(Expr::Ident(ident)) = target {
                    self.declare(ident, ty);
                }
            }
        } else {
            for target in [&range.key, &range.value].into_iter().flatten() {
                self.check_expr(target);
            }
        }
        self.check_block(&range.body);
    }

    fn range_types(&mut self, ty: TypeId) -> (TypeId, TypeId) {
        let invalid = self.invalid();
        let int = self.table.basic(BasicKind::Int);
        let underlying = self.table.underlying(ty);
        match self.table.kind(underlying) {
            TypeKind::Basic(BasicKind::String | BasicKind::UntypedString) => {
                (int, self.table.basic(BasicKind::Int32))
            }
            // Go 1.22 range over an integer.
            TypeKind::Basic(kind) if kind.is_integer() => (self.table.default_type(ty), invalid),
            TypeKind::Slice(elem) | TypeKind::Array { elem, .. } => (int, *elem),
            TypeKind::Pointer(base) => match self.table.kind(self.table.underlying(*base)) {
                TypeKind::Array { elem, .. } => (int, *elem),
                _ => (invalid, invalid),
            },
            TypeKind::Map { key, value } => (*key, *value),
            TypeKind::Chan { elem, .. } => (*elem, invalid),
            _ => (invalid, invalid),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Check an expression and record its type.
    pub fn check_expr(&mut self, expr: &'a Expr) -> TypeId {
        let ty = self.check_expr_inner(expr);
        self.types.insert(expr.id(), ty);
        ty
    }

    fn check_expr_inner(&mut self, expr: &'a Expr) -> TypeId {
        match expr {
            Expr::Ident(ident) => self.check_ident(ident),
            Expr::BasicLit(lit) => self.table.basic(match lit.kind {
                LitKind::Int => BasicKind::UntypedInt,
                LitKind::Float => BasicKind::UntypedFloat,
                LitKind::Imag => BasicKind::UntypedComplex,
                LitKind::Char => BasicKind::UntypedRune,
                LitKind::String => BasicKind::UntypedString,
            }),
            Expr::CompositeLit(lit) => self.check_composite(lit, None),
            Expr::FuncLit(lit) => {
                let sig = self.signature(&lit.ty);
                self.declare_fields(&lit.ty.params);
                if let Some(results) = &lit.ty.results {
                    self.declare_fields(results);
                }
                self.check_block(&lit.body);
                sig
            }
            Expr::Paren(paren) => self.check_expr(&paren.x),
            Expr::Selector(selector) => self.check_selector(selector),
            Expr::Index(index) => {
                let ty = self.check_expr(&index.x);
                self.check_expr(&index.index);
                self.index_result(ty)
            }
            Expr::Slice(slice) => {
                let ty = self.check_expr(&slice.x);
                for bound in [&slice.low, &slice.high, &slice.max].into_iter().flatten() {
                    self.check_expr(bound);
                }
                self.slice_result(ty)
            }
            Expr::TypeAssert(assert) => {
                let operand = self.check_expr(&assert.x);
                match &assert.ty {
                    Some(ty) => self.resolve_type(ty),
                    None => operand,
                }
            }
            Expr::Call(call) => self.check_call(call),
            Expr::Star(star) => {
                if self.denotes_type(&star.x) {
                    let base = self.resolve_type(&star.x);
                    return self.table.pointer(base);
                }
                let ty = self.check_expr(&star.x);
                match self.table.kind(self.table.underlying(ty)) {
                    TypeKind::Pointer(base) => *base,
                    _ => self.invalid(),
                }
            }
            Expr::Unary(unary) => self.check_unary(unary),
            Expr::Binary(binary) => {
                let x = self.check_expr(&binary.x);
                let y = self.check_expr(&binary.y);
                if binary.op.is_comparison() {
                    self.table.basic(BasicKind::UntypedBool)
                } else if matches!(
                    binary.op,
                    SyntaxKind::LessThanLessThanToken | SyntaxKind::GreaterThanGreaterThanToken
                ) {
                    x
                } else {
                    self.table.binary_result(x, y)
                }
            }
            Expr::KeyValue(kv) => {
                self.check_expr(&kv.value);
                self.invalid()
            }
            Expr::ArrayType(_)
            | Expr::MapType(_)
            | Expr::ChanType(_)
            | Expr::FuncType(_)
            | Expr::StructType(_)
            | Expr::InterfaceType(_) => self.resolve_type_inner(expr),
            Expr::Ellipsis(_) => self.invalid(),
        }
    }

    fn check_ident(&mut self, ident: &'a Ident) -> TypeId {
        if ident.is_blank() {
            return self.invalid();
        }
        let bindings = self.bindings;
        let sym = bindings.use_of(ident.data.id).or_else(|| bindings.def_of(ident.data.id));
        if let Some(sym) = sym {
            return match bindings.symbol(sym).map(|s| s.kind) {
                Some(SymbolKind::PkgName | SymbolKind::Builtin) | None => self.invalid(),
                Some(_) => self.type_of_symbol(sym),
            };
        }
        match self.dot_import_member(ident) {
            Some(member) => member.ty,
            None => self.invalid(),
        }
    }

    fn is_nil(&self, expr: &Expr) -> bool {
        match expr.unparen() {
            Expr::Ident(ident) => self
                .bindings
                .use_of(ident.data.id)
                .and_then(|sym| self.bindings.symbol(sym))
                .is_some_and(|s| s.kind == SymbolKind::Nil),
            _ => false,
        }
    }

    fn check_unary(&mut self, unary: &'a UnaryExpr) -> TypeId {
        let ty = self.check_expr(&unary.x);
        if self.table.is_invalid(ty) {
            return ty;
        }
        match unary.op {
            SyntaxKind::AmpersandToken => self.table.pointer(ty),
            SyntaxKind::ArrowToken => match self.table.kind(self.table.underlying(ty)) {
                TypeKind::Chan { elem, .. } => *elem,
                _ => self.invalid(),
            },
            _ => ty,
        }
    }

    fn index_result(&mut self, ty: TypeId) -> TypeId {
        let underlying = self.table.underlying(ty);
        match self.table.kind(underlying) {
            TypeKind::Slice(elem) | TypeKind::Array { elem, .. } => *elem,
            TypeKind::Map { value, .. } => *value,
            TypeKind::Pointer(base) => match self.table.kind(self.table.underlying(*base)) {
                TypeKind::Array { elem, .. } => *elem,
                _ => self.invalid(),
            },
            _ if self.table.is_string(ty) => self.table.basic(BasicKind::Uint8),
            _ => self.invalid(),
        }
    }

    fn slice_result(&mut self, ty: TypeId) -> TypeId {
        let underlying = self.table.underlying(ty);
        match self.table.kind(underlying).clone() {
            TypeKind::Basic(BasicKind::UntypedString) => self.table.basic(BasicKind::String),
            TypeKind::Basic(BasicKind::String) | TypeKind::Slice(_) => ty,
            TypeKind::Array { elem, .. } => self.table.slice(elem),
            TypeKind::Pointer(base) => match self.table.kind(self.table.underlying(base)).clone() {
                TypeKind::Array { elem, .. } => self.table.slice(elem),
                _ => self.invalid(),
            },
            _ => self.invalid(),
        }
    }

    fn check_selector(&mut self, selector: &'a SelectorExpr) -> TypeId {
        let name = selector.sel.text.as_str();
        if let Expr::Ident(x) = &selector.x {
            if let Some(path) = self.package_path_of(x) {
                return match self.package_member(path, name) {
                    MemberLookup::Found(member) => member.ty,
                    MemberLookup::Missing => {
                        self.report_missing_member(x, &selector.sel);
                        self.invalid()
                    }
                    MemberLookup::Opaque => self.invalid(),
                };
            }
        }

        let ty = if self.denotes_type(&selector.x) {
            self.resolve_type(&selector.x)
        } else {
            self.check_expr(&selector.x)
        };
        if self.table.is_invalid(ty) {
            return ty;
        }
        self.table.lookup_member(ty, name).unwrap_or(self.table.invalid_type)
    }

    fn check_call(&mut self, call: &'a CallExpr) -> TypeId {
        let fun = call.fun.unparen();
        if self.denotes_type(fun) {
            let ty = self.resolve_type(&call.fun);
            for arg in &call.args {
                self.check_expr(arg);
            }
            return ty;
        }
        if let Some(which) = self.builtin_of(fun) {
            return self.check_builtin(which, call);
        }

        let ty = self.check_expr(&call.fun);
        for arg in &call.args {
            self.check_expr(arg);
        }
        match self.table.kind(self.table.underlying(ty)) {
            TypeKind::Signature { .. } => self.table.call_result(ty).unwrap_or(self.table.invalid_type),
            TypeKind::Invalid => ty,
            _ => {
                let text = self.source_text(call.fun.range());
                self.error(call.fun.range(), &INVALID_OPERATION_CANNOT_CALL_NON_FUNCTION_0, &[text]);
                self.invalid()
            }
        }
    }

    fn builtin_of(&self, fun: &Expr) -> Option<Predeclared> {
        let ident = fun.as_ident()?;
        let symbol = self.bindings.symbol(self.bindings.use_of(ident.data.id)?)?;
        match symbol.kind {
            SymbolKind::Builtin => symbol.universe,
            _ => None,
        }
    }

    fn check_builtin(&mut self, which: Predeclared, call: &'a CallExpr) -> TypeId {
        if matches!(which, Predeclared::Make | Predeclared::New) {
            let ty = match call.args.first() {
                Some(arg) => self.resolve_type(arg),
                None => self.invalid(),
            };
            for arg in call.args.iter().skip(1) {
                self.check_expr(arg);
            }
            return match which {
                Predeclared::New => self.table.pointer(ty),
                _ => ty,
            };
        }

        let args: Vec<TypeId> = call.args.iter().map(|arg| self.check_expr(arg)).collect();
        match which {
            Predeclared::Len | Predeclared::Cap | Predeclared::Copy => self.table.basic(BasicKind::Int),
            Predeclared::Append => args.first().copied().unwrap_or(self.table.invalid_type),
            Predeclared::Min | Predeclared::Max => {
                let table = &*self.table;
                args.iter()
                    .copied()
                    .reduce(|a, b| table.binary_result(a, b))
                    .unwrap_or(table.invalid_type)
            }
            Predeclared::Complex => self.table.basic(BasicKind::Complex128),
            Predeclared::Real | Predeclared::Imag => self.table.basic(BasicKind::Float64),
            Predeclared::Recover => self.table.empty_interface,
            // panic, print, println, close, delete, clear
            _ => self.table.tuple(Vec::new()),
        }
    }

    fn check_composite(&mut self, lit: &'a CompositeLit, hint: Option<TypeId>) -> TypeId {
        let ty = match (&lit.ty, hint) {
            (Some(ty), _) => self.resolve_type(ty),
            (None, Some(hint)) => hint,
            (None, None) => self.invalid(),
        };
        // `[]*T{{...}}` elides `&T`.
        let literal_type = match (&lit.ty, self.table.kind(ty)) {
            (None, TypeKind::Pointer(base)) => *base,
            _ => ty,
        };

        let underlying = self.table.underlying(literal_type);
        match self.table.kind(underlying).clone() {
            TypeKind::Struct { fields } => {
                for (i, elt) in lit.elts.iter().enumerate() {
                    match elt {
                        Expr::KeyValue(kv) => {
                            let field = kv
                                .key
                                .as_ident()
                                .and_then(|key| fields.iter().find(|f| f.name == key.text))
                                .map(|f| f.ty);
                            self.check_element(&kv.value, field);
                        }
                        _ => {
                            let field = fields.get(i).map(|f| f.ty);
                            self.check_element(elt, field);
                        }
                    }
                }
            }
            TypeKind::Slice(elem) | TypeKind::Array { elem, .. } => {
                for elt in &lit.elts {
                    match elt {
                        Expr::KeyValue(kv) => {
                            self.check_expr(&kv.key);
                            self.check_element(&kv.value, Some(elem));
                        }
                        _ => {
                            self.check_element(elt, Some(elem));
                        }
                    }
                }
            }
            TypeKind::Map { key, value } => {
                for elt in &lit.elts {
                    match elt {
                        Expr::KeyValue(kv) => {
                            self.check_element(&kv.key, Some(key));
                            self.check_element(&kv.value, Some(value));
                        }
                        _ => {
                            self.check_expr(elt);
                        }
                    }
                }
            }
            _ => {
                for elt in &lit.elts {
                    match elt {
                        // Keys may be field names of a struct we know nothing about.
                        Expr::KeyValue(kv) => {
                            self.check_element(&kv.value, None);
                        }
                        _ => {
                            self.check_element(elt, None);
                        }
                    }
                }
            }
        }
        ty
    }

    fn check_element(&mut self, elt: &'a Expr, hint: Option<TypeId>) -> TypeId {
        match elt {
            Expr::CompositeLit(lit) if lit.ty.is_none() => {
                let ty = self.check_composite(lit, hint);
                self.types.insert(elt.id(), ty);
                ty
            }
            _ => self.check_expr(elt),
        }
    }

    // ========================================================================
    // Packages
    // ========================================================================

    /// The import path of an identifier naming an imported package.
    fn package_path_of(&self, ident: &Ident) -> Option<&'a str> {
        let bindings = self.bindings;
        let symbol = bindings.symbol(bindings.use_of(ident.data.id)?)?;
        match symbol.kind {
            SymbolKind::PkgName => symbol.import_path.as_deref(),
            _ => None,
        }
    }

    fn package_member(&mut self, path: &str, name: &str) -> MemberLookup {
        let package = self.importer.import(path, self.table);
        if package.opaque {
            return MemberLookup::Opaque;
        }
        match package.members.get(name) {
            Some(member) => MemberLookup::Found(*member),
            None => MemberLookup::Missing,
        }
    }

    /// Package descriptions only cover part of each package, so a missing
    /// exported name is not an error. An unexported one can never resolve.
    fn report_missing_member(&mut self, package: &Ident, sel: &Ident) {
        if sel.is_exported() {
            tracing::debug!(package = %package.text, name = %sel.text, "no type information for package member");
            return;
        }
        self.error(sel.data.range, &UNDEFINED_0_1, &[&package.text, &sel.text]);
    }

    fn dot_import_member(&mut self, ident: &Ident) -> Option<Member> {
        let bindings = self.bindings;
        let candidates = bindings.dot_import_candidates(ident.data.id)?;
        candidates
            .iter()
            .find_map(|path| match self.package_member(path, &ident.text) {
                MemberLookup::Found(member) => Some(member),
                _ => None,
            })
    }

    // ========================================================================
    // Type expressions
    // ========================================================================

    /// Whether an expression denotes a type rather than a value.
    fn denotes_type(&mut self, expr: &'a Expr) -> bool {
        match expr.unparen() {
            Expr::Ident(ident) => {
                let bindings = self.bindings;
                match bindings.use_of(ident.data.id) {
                    Some(sym) => bindings.symbol(sym).is_some_and(|s| s.kind == SymbolKind::TypeName),
                    None => self
                        .dot_import_member(ident)
                        .is_some_and(|m| m.kind == SymbolKind::TypeName),
                }
            }
            Expr::Selector(selector) => match &selector.x {
                Expr::Ident(x) => match self.package_path_of(x) {
                    Some(path) => matches!(
                        self.package_member(path, &selector.sel.text),
                        MemberLookup::Found(Member { kind: SymbolKind::TypeName, .. })
                    ),
                    None => false,
                },
                _ => false,
            },
            Expr::Star(star) => self.denotes_type(&star.x),
            Expr::ArrayType(_)
            | Expr::MapType(_)
            | Expr::ChanType(_)
            | Expr::FuncType(_)
            | Expr::StructType(_)
            | Expr::InterfaceType(_) => true,
            _ => false,
        }
    }

    /// Resolve a type expression and record it.
    pub fn resolve_type(&mut self, expr: &'a Expr) -> TypeId {
        let ty = self.resolve_type_inner(expr);
        self.types.insert(expr.id(), ty);
        ty
    }

    fn resolve_type_inner(&mut self, expr: &'a Expr) -> TypeId {
        match expr {
            Expr::Ident(ident) => self.resolve_type_name(ident),
            Expr::Selector(selector) => {
                let Expr::Ident(x) = &selector.x else {
                    return self.not_a_type(expr);
                };
                let Some(path) = self.package_path_of(x) else {
                    return self.not_a_type(expr);
                };
                match self.package_member(path, &selector.sel.text) {
                    MemberLookup::Found(Member {
                        kind: SymbolKind::TypeName,
                        ty,
                    }) => ty,
                    MemberLookup::Found(_) => self.not_a_type(expr),
                    MemberLookup::Missing => {
                        self.report_missing_member(x, &selector.sel);
                        self.invalid()
                    }
                    MemberLookup::Opaque => self.invalid(),
                }
            }
            Expr::Paren(paren) => self.resolve_type(&paren.x),
            Expr::Star(star) => {
                let base = self.resolve_type(&star.x);
                self.table.pointer(base)
            }
            Expr::ArrayType(array) => {
                let elem = self.resolve_type(&array.elt);
                match &array.len {
                    None => self.table.slice(elem),
                    Some(Expr::Ellipsis(_)) => self.table.array(None, elem),
                    Some(len) => {
                        self.check_expr(len);
                        let literal = match len {
                            Expr::BasicLit(lit) if lit.kind == LitKind::Int => lit.value.replace('_', "").parse().ok(),
                            _ => None,
                        };
                        self.table.array(literal, elem)
                    }
                }
            }
            Expr::MapType(map) => {
                let key = self.resolve_type(&map.key);
                let value = self.resolve_type(&map.value);
                self.table.map(key, value)
            }
            Expr::ChanType(chan) => {
                let elem = self.resolve_type(&chan.value);
                self.table.chan(chan.dir, elem)
            }
            Expr::FuncType(func) => self.signature(func),
            Expr::StructType(structure) => self.struct_type(structure),
            Expr::InterfaceType(interface) => self.interface_type(interface),
            Expr::Ellipsis(ellipsis) => {
                let elem = match &ellipsis.elt {
                    Some(elt) => self.resolve_type(elt),
                    None => self.invalid(),
                };
                self.table.slice(elem)
            }
            _ => self.not_a_type(expr),
        }
    }

    fn not_a_type(&mut self, expr: &Expr) -> TypeId {
        let text = self.source_text(expr.range());
        self.error(expr.range(), &_0_IS_NOT_A_TYPE, &[text]);
        self.invalid()
    }

    fn resolve_type_name(&mut self, ident: &'a Ident) -> TypeId {
        let bindings = self.bindings;
        if let Some(sym) = bindings.use_of(ident.data.id) {
            return match bindings.symbol(sym).map(|s| s.kind) {
                Some(SymbolKind::TypeName) => self.type_of_symbol(sym),
                _ => {
                    self.error(ident.data.range, &_0_IS_NOT_A_TYPE, &[&ident.text]);
                    self.invalid()
                }
            };
        }
        match self.dot_import_member(ident) {
            Some(Member {
                kind: SymbolKind::TypeName,
                ty,
            }) => ty,
            _ => self.invalid(),
        }
    }

    /// Create the type declared by a type spec. Only package-level types get
    /// the methods declared on them.
    fn define_type(&mut self, sym: Option<SymbolId>, spec: &'a TypeSpec) -> TypeId {
        if spec.alias {
            if let Some(sym) = sym {
                if !self.resolving_aliases.insert(sym) {
                    self.error(spec.name.data.range, &INVALID_RECURSIVE_TYPE_0, &[&spec.name.text]);
                    return self.invalid();
                }
            }
            let ty = self.resolve_type(&spec.ty);
            if let Some(sym) = sym {
                self.resolving_aliases.remove(&sym);
            }
            self.declare(&spec.name, ty);
            return ty;
        }

        let qualifier = self.package_path.clone();
        let named = self.table.new_named(&spec.name.text, Some(&qualifier));
        self.declare(&spec.name, named);
        self.pending.insert(named);
        let source = self.resolve_type(&spec.ty);
        let cyclic = self.pending.contains(&source);
        self.pending.remove(&named);

        if cyclic {
            self.error(spec.name.data.range, &INVALID_RECURSIVE_TYPE_0, &[&spec.name.text]);
        } else {
            self.table.set_underlying(named, source);
        }

        let methods = sym.and_then(|sym| self.methods.get(&sym).cloned()).unwrap_or_default();
        for (func, file) in methods {
            let sig = self.in_file(file, |c| c.signature(&func.ty));
            let pointer_receiver = func
                .recv
                .as_ref()
                .and_then(|recv| recv.list.first())
                .is_some_and(|field| matches!(field.ty.unparen(), Expr::Star(_)));
            self.table.add_method(
                named,
                &func.name.text,
                Method {
                    sig,
                    pointer_receiver,
                },
            );
            if let Some(method) = self.bindings.def_of(func.name.data.id) {
                self.symbol_types.insert(method, sig);
            }
        }
        named
    }

    fn signature(&mut self, func: &'a FuncType) -> TypeId {
        let (params, variadic) = self.field_types(&func.params);
        let results = match &func.results {
            Some(results) => self.field_types(results).0,
            None => Vec::new(),
        };
        let sig = self.table.signature(params, results, variadic);
        self.types.insert(func.data.id, sig);
        sig
    }

    fn field_types(&mut self, list: &'a FieldList) -> (Vec<TypeId>, bool) {
        let mut types = Vec::with_capacity(list.arity());
        let mut variadic = false;
        for field in &list.list {
            let ty = self.resolve_type(&field.ty);
            variadic |= matches!(field.ty, Expr::Ellipsis(_));
            types.extend(std::iter::repeat(ty).take(field.names.len().max(1)));
        }
        (types, variadic)
    }

    fn struct_type(&mut self, structure: &'a StructType) -> TypeId {
        let mut fields = Vec::with_capacity(structure.fields.arity());
        for field in &structure.fields.list {
            let ty = self.resolve_type(&field.ty);
            if field.names.is_empty() {
                fields.push(StructField {
                    name: embedded_name(&field.ty).to_string(),
                    ty,
                    embedded: true,
                });
            }
            for name in &field.names {
                fields.push(StructField {
                    name: name.text.clone(),
                    ty,
                    embedded: false,
                });
            }
        }
        self.table.add_type(TypeKind::Struct { fields })
    }

    fn interface_type(&mut self, interface: &'a InterfaceType) -> TypeId {
        let mut methods = IndexMap::new();
        let mut embedded = Vec::new();
        for field in &interface.methods.list {
            match (field.names.as_slice(), &field.ty) {
                ([name], Expr::FuncType(func)) => {
                    let sig = self.signature(func);
                    self.types.insert(field.ty.id(), sig);
                    methods.insert(name.text.clone(), sig);
                }
                _ => embedded.push(self.resolve_type(&field.ty)),
            }
        }
        self.table.add_type(TypeKind::Interface { methods, embedded })
    }
}

/// The type name a method receiver is declared on.
fn receiver_base(recv: &FieldList) -> Option<&Ident> {
    let ty = recv.list.first()?.ty.unparen();
    let base = match ty {
        Expr::Star(star) => star.x.unparen(),
        other => other,
    };
    base.as_ident()
}

/// The implicit field name of an embedded field: `T`, `*T`, and `pkg.T`
/// all embed a field named `T`.
fn embedded_name(ty: &Expr) -> &str {
    match ty.unparen() {
        Expr::Ident(ident) => &ident.text,
        Expr::Star(star) => embedded_name(&star.x),
        Expr::Selector(selector) => &selector.sel.text,
        _ => "",
    }
}
