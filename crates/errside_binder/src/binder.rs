//! The binder implementation.
//!
//! Walks every file of a package and resolves each identifier occurrence to
//! the declaration it introduces or refers to. Handles:
//! - The universe block (predeclared types, constants, `nil`, builtins)
//! - Package-level declarations shared by all files, visible before use
//! - File scopes holding imports
//! - Function, block, and implicit `if`/`for`/`switch`/`select` scopes
//! - `:=` redeclaration rules
//! - The per-clause variables of type switches

use crate::bindings::Bindings;
use crate::scope::{Scope, ScopeKind};
use crate::symbol::{Predeclared, Symbol, SymbolKind, SymbolTable};
use errside_ast::node::*;
use errside_ast::syntax_kind::SyntaxKind;
use errside_ast::types::*;
use errside_core::intern::{InternedString, StringInterner};
use errside_core::text::TextRange;
use errside_core::FxMap;
use errside_diagnostics::messages::*;
use errside_diagnostics::{Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// The binder creates symbols and records defs and uses.
pub struct Binder {
    interner: StringInterner,
    /// All symbols created during binding. Universe symbols come first.
    symbols: Vec<Symbol>,
    universe: SymbolTable,
    package: SymbolTable,
    /// The innermost scope of the file being bound.
    current_scope: Option<Box<Scope>>,
    defs: FxMap<NodeId, SymbolId>,
    uses: FxMap<NodeId, SymbolId>,
    implicits: FxMap<NodeId, SymbolId>,
    dot_uses: FxMap<NodeId, Vec<String>>,
    /// Dot-imported paths of the current file.
    dot_imports: Vec<String>,
    file_name: String,
    diagnostics: DiagnosticCollection,
    /// Nesting depth for scope tracking.
    scope_depth: u32,
}

impl Binder {
    /// Maximum scope chain traversal depth to guard against cycles.
    const MAX_SCOPE_DEPTH: u32 = 500;

    pub fn new(interner: StringInterner) -> Self {
        let mut binder = Self {
            interner,
            symbols: Vec::new(),
            universe: SymbolTable::new(),
            package: SymbolTable::new(),
            current_scope: None,
            defs: FxMap::default(),
            uses: FxMap::default(),
            implicits: FxMap::default(),
            dot_uses: FxMap::default(),
            dot_imports: Vec::new(),
            file_name: String::new(),
            diagnostics: DiagnosticCollection::new(),
            scope_depth: 0,
        };
        binder.declare_universe();
        binder
    }

    fn declare_universe(&mut self) {
        for &(name, kind, which) in Predeclared::ALL {
            let interned = self.interner.intern_static(name);
            let id = self.new_symbol(interned, name.to_string(), kind, NodeId::INVALID);
            self.symbols[id.index()].universe = Some(which);
            self.universe.set(interned, id);
        }
    }

    /// Take diagnostics from the binder.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Get the current scope depth.
    pub fn scope_depth(&self) -> u32 {
        self.scope_depth
    }

    /// Consume the binder, yielding the def/use tables.
    pub fn finish(self, package_name: impl Into<String>) -> Bindings {
        Bindings {
            package_name: package_name.into(),
            symbols: self.symbols,
            defs: self.defs,
            uses: self.uses,
            implicits: self.implicits,
            dot_uses: self.dot_uses,
            universe: self.universe,
            package: self.package,
        }
    }

    // ========================================================================
    // Package binding
    // ========================================================================

    /// Bind all files of one package. Package-level names are collected from
    /// every file first, so declaration order across files does not matter.
    pub fn bind_package(&mut self, files: &[SourceFile]) {
        for file in files {
            self.file_name = file.file_name.clone();
            self.collect_package_decls(file);
        }
        for file in files {
            self.bind_source_file(file);
        }
        for file in files {
            self.diagnostics.locate(&file.file_name, &file.line_map);
        }
        self.diagnostics.sort();
    }

    fn collect_package_decls(&mut self, file: &SourceFile) {
        for decl in &file.decls {
            match decl {
                Decl::Func(func) => {
                    let is_method = func.recv.is_some();
                    if is_method || func.name.text == "init" || func.name.is_blank() {
                        // Reachable only through a receiver, or not at all.
                        self.define_hidden(&func.name, SymbolKind::Func);
                    } else {
                        self.declare_package(&func.name, SymbolKind::Func);
                    }
                }
                Decl::Gen(gen) => {
                    let kind = match gen.tok {
                        SyntaxKind::VarKeyword => SymbolKind::Var,
                        SyntaxKind::ConstKeyword => SymbolKind::Const,
                        SyntaxKind::TypeKeyword => SymbolKind::TypeName,
                        _ => continue,
                    };
                    for spec in &gen.specs {
                        match spec {
                            Spec::Value(value) => {
                                for name in &value.names {
                                    self.declare_package(name, kind);
                                }
                            }
                            Spec::Type(ty) => self.declare_package(&ty.name, kind),
                            Spec::Import(_) => {}
                        }
                    }
                }
            }
        }
    }

    fn declare_package(&mut self, ident: &Ident, kind: SymbolKind) {
        if ident.is_blank() {
            self.define_hidden(ident, kind);
            return;
        }
        if self.package.has(&ident.name) {
            self.error_at(ident.data.range, &_0_REDECLARED_IN_THIS_BLOCK, &[&ident.text]);
            return;
        }
        let id = self.new_symbol(ident.name, ident.text.clone(), kind, ident.data.id);
        self.symbols[id.index()].package_level = true;
        self.package.set(ident.name, id);
        self.defs.insert(ident.data.id, id);
    }

    /// Record a def for an identifier that is not entered into any scope.
    fn define_hidden(&mut self, ident: &Ident, kind: SymbolKind) -> SymbolId {
        let id = self.new_symbol(ident.name, ident.text.clone(), kind, ident.data.id);
        self.defs.insert(ident.data.id, id);
        id
    }

    /// Bind a source file: its imports, then the bodies and initializers of
    /// its declarations.
    pub fn bind_source_file(&mut self, file: &SourceFile) {
        self.file_name = file.file_name.clone();
        self.dot_imports.clear();
        self.current_scope = Some(Box::new(Scope::new(None, ScopeKind::File)));

        for import in file.imports() {
            self.bind_import(import);
        }

        for decl in &file.decls {
            match decl {
                Decl::Func(func) => self.bind_func_decl(func),
                Decl::Gen(gen) => match gen.tok {
                    SyntaxKind::VarKeyword | SyntaxKind::ConstKeyword | SyntaxKind::TypeKeyword => {
                        self.bind_package_gen_decl(gen)
                    }
                    _ => {}
                },
            }
        }

        self.current_scope = None;
    }

    fn bind_import(&mut self, import: &ImportSpec) {
        let path = import.path_value().to_string();
        match import.name.as_ref() {
            Some(name) if name.text == "." => self.dot_imports.push(path),
            Some(name) if name.is_blank() => {}
            Some(name) => {
                let id = self.declare(name, SymbolKind::PkgName);
                self.symbols[id.index()].import_path = Some(path);
            }
            None => {
                let local = guess_package_name(&path);
                let interned = self.interner.intern(&local);
                let id = self.new_symbol(interned, local, SymbolKind::PkgName, import.path.data.id);
                self.symbols[id.index()].import_path = Some(path);
                if let Some(scope) = &mut self.current_scope {
                    scope.locals.set(interned, id);
                }
            }
        }
    }

    /// Package-level var, const, and type specs. Their names were declared
    /// by `collect_package_decls`; only the expressions remain.
    fn bind_package_gen_decl(&mut self, gen: &GenDecl) {
        for spec in &gen.specs {
            match spec {
                Spec::Value(value) => {
                    if let Some(ref ty) = value.ty {
                        self.bind_expr(ty);
                    }
                    for expr in &value.values {
                        self.bind_expr(expr);
                    }
                }
                Spec::Type(ty) => self.bind_expr(&ty.ty),
                Spec::Import(_) => {}
            }
        }
    }

    fn bind_func_decl(&mut self, func: &FuncDecl) {
        self.push_scope(ScopeKind::Function);
        if let Some(ref recv) = func.recv {
            self.bind_field_types(recv);
        }
        self.bind_func_type_types(&func.ty);
        if let Some(ref recv) = func.recv {
            self.declare_fields(recv);
        }
        self.declare_signature_names(&func.ty);
        if let Some(ref body) = func.body {
            // The parameters and the outermost statements share one block.
            self.bind_stmt_list(&body.stmts);
        }
        self.pop_scope();
    }

    // ========================================================================
    // Statement binding
    // ========================================================================

    fn bind_stmt_list(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.bind_stmt(stmt);
        }
    }

    fn bind_block(&mut self, block: &Block) {
        self.push_scope(ScopeKind::Block);
        self.bind_stmt_list(&block.stmts);
        self.pop_scope();
    }

    fn bind_opt_stmt(&mut self, stmt: &Option<Stmt>) {
        if let Some(stmt) = stmt {
            self.bind_stmt(stmt);
        }
    }

    fn bind_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(n) => self.bind_local_gen_decl(n),
            Stmt::Labeled(n) => self.bind_stmt(&n.stmt),
            Stmt::Expr(n) => self.bind_expr(&n.x),
            Stmt::Send(n) => {
                self.bind_expr(&n.chan);
                self.bind_expr(&n.value);
            }
            Stmt::IncDec(n) => self.bind_expr(&n.x),
            Stmt::Assign(n) => self.bind_assign_stmt(n),
            Stmt::Go(n) => self.bind_expr(&n.call),
            Stmt::Defer(n) => self.bind_expr(&n.call),
            Stmt::Return(n) => {
                for result in &n.results {
                    self.bind_expr(result);
                }
            }
            Stmt::Branch(_) | Stmt::Empty(_) => {}
            Stmt::Block(n) => self.bind_block(n),
            Stmt::If(n) => self.bind_if_stmt(n),
            Stmt::Switch(n) => self.bind_switch_stmt(n),
            Stmt::TypeSwitch(n) => self.bind_type_switch_stmt(n),
            Stmt::Select(n) => {
                for clause in &n.clauses {
                    self.push_scope(ScopeKind::Block);
                    self.bind_opt_stmt(&clause.comm);
                    self.bind_stmt_list(&clause.body);
                    self.pop_scope();
                }
            }
            Stmt::For(n) => {
                self.push_scope(ScopeKind::Block);
                self.bind_opt_stmt(&n.init);
                if let Some(ref cond) = n.cond {
                    self.bind_expr(cond);
                }
                self.bind_opt_stmt(&n.post);
                self.bind_block(&n.body);
                self.pop_scope();
            }
            Stmt::Range(n) => self.bind_range_stmt(n),
            Stmt::AssignIfErr(n) => {
                self.bind_stmt(&n.leading);
                self.bind_if_stmt(&n.cond);
            }
        }
    }

    fn bind_local_gen_decl(&mut self, gen: &GenDecl) {
        let kind = match gen.tok {
            SyntaxKind::VarKeyword => SymbolKind::Var,
            SyntaxKind::ConstKeyword => SymbolKind::Const,
            _ => SymbolKind::TypeName,
        };
        for spec in &gen.specs {
            match spec {
                Spec::Value(value) => {
                    // The scope of a local variable starts after its spec.
                    if let Some(ref ty) = value.ty {
                        self.bind_expr(ty);
                    }
                    for expr in &value.values {
                        self.bind_expr(expr);
                    }
                    for name in &value.names {
                        self.declare(name, kind);
                    }
                }
                Spec::Type(ty) => {
                    // A type is in scope inside its own definition.
                    self.declare(&ty.name, kind);
                    self.bind_expr(&ty.ty);
                }
                Spec::Import(_) => {}
            }
        }
    }

    fn bind_assign_stmt(&mut self, node: &AssignStmt) {
        for rhs in &node.rhs {
            self.bind_expr(rhs);
        }
        if !node.is_define() {
            for lhs in &node.lhs {
                if !matches!(lhs, Expr::Ident(ident) if ident.is_blank()) {
                    self.bind_expr(lhs);
                }
            }
            return;
        }

        let mut any_new = false;
        for lhs in &node.lhs {
            let Expr::Ident(ident) = lhs else {
                self.bind_expr(lhs);
                continue;
            };
            if ident.is_blank() {
                continue;
            }
            match self.lookup_current(ident) {
                Some(existing) => {
                    self.uses.insert(ident.data.id, existing);
                }
                None => {
                    self.declare(ident, SymbolKind::Var);
                    any_new = true;
                }
            }
        }
        if !any_new {
            self.error_at(node.data.range, &NO_NEW_VARIABLES_ON_LEFT_SIDE, &[]);
        }
    }

    fn bind_if_stmt(&mut self, node: &IfStmt) {
        self.push_scope(ScopeKind::Block);
        self.bind_opt_stmt(&node.init);
        self.bind_expr(&node.cond);
        self.bind_block(&node.body);
        self.bind_opt_stmt(&node.else_);
        self.pop_scope();
    }

    fn bind_switch_stmt(&mut self, node: &SwitchStmt) {
        self.push_scope(ScopeKind::Block);
        self.bind_opt_stmt(&node.init);
        if let Some(ref tag) = node.tag {
            self.bind_expr(tag);
        }
        for clause in &node.clauses {
            self.push_scope(ScopeKind::Block);
            for expr in clause.list.iter().flatten() {
                self.bind_expr(expr);
            }
            self.bind_stmt_list(&clause.body);
            self.pop_scope();
        }
        self.pop_scope();
    }

    /// The guard binding itself declares nothing; each clause gets its own
    /// variable of that name, recorded against the clause.
    fn bind_type_switch_stmt(&mut self, node: &TypeSwitchStmt) {
        self.push_scope(ScopeKind::Block);
        self.bind_opt_stmt(&node.init);
        self.bind_expr(&node.x);
        for clause in &node.clauses {
            self.push_scope(ScopeKind::Block);
            for expr in clause.list.iter().flatten() {
                self.bind_expr(expr);
            }
            if let Some(ref binding) = node.binding {
                if !binding.is_blank() {
                    let id = self.new_symbol(
                        binding.name,
                        binding.text.clone(),
                        SymbolKind::Var,
                        binding.data.id,
                    );
                    if let Some(scope) = &mut self.current_scope {
                        scope.locals.set(binding.name, id);
                    }
                    self.implicits.insert(clause.data.id, id);
                }
            }
            self.bind_stmt_list(&clause.body);
            self.pop_scope();
        }
        self.pop_scope();
    }

    fn bind_range_stmt(&mut self, node: &RangeStmt) {
        self.push_scope(ScopeKind::Block);
        // The range expression is evaluated before the iteration variables
        // come into scope.
        self.bind_expr(&node.x);
        let targets = [&node.key, &node.value];
        if node.tok == Some(SyntaxKind::ColonEqualsToken) {
            for target in targets.into_iter().flatten() {
                match target {
                    Expr::Ident(ident) if ident.is_blank() => {}
                    Expr::Ident(ident) => {
                        self.declare(ident, SymbolKind::Var);
                    }
                    other => self.bind_expr(other),
                }
            }
        } else {
            for target in targets.into_iter().flatten() {
                if !matches!(target, Expr::Ident(ident) if ident.is_blank()) {
                    self.bind_expr(target);
                }
            }
        }
        self.bind_block(&node.body);
        self.pop_scope();
    }

    // ========================================================================
    // Expression binding
    // ========================================================================

    fn bind_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(ident) => self.bind_ident_use(ident),
            Expr::BasicLit(_) => {}
            Expr::CompositeLit(n) => {
                if let Some(ref ty) = n.ty {
                    self.bind_expr(ty);
                }
                for elt in &n.elts {
                    self.bind_element(elt);
                }
            }
            Expr::FuncLit(n) => {
                self.push_scope(ScopeKind::Function);
                self.bind_func_type_types(&n.ty);
                self.declare_signature_names(&n.ty);
                self.bind_stmt_list(&n.body.stmts);
                self.pop_scope();
            }
            Expr::Paren(n) => self.bind_expr(&n.x),
            Expr::Selector(n) => {
                // `pkg.Name`: the package name is a use, `Name` is resolved
                // by the checker against the imported package.
                if let Expr::Ident(x) = &n.x {
                    if let Some(id) = self.resolve(x) {
                        if self.symbols[id.index()].kind == SymbolKind::PkgName {
                            self.uses.insert(x.data.id, id);
                            return;
                        }
                    }
                }
                self.bind_expr(&n.x);
            }
            Expr::Index(n) => {
                self.bind_expr(&n.x);
                self.bind_expr(&n.index);
            }
            Expr::Slice(n) => {
                self.bind_expr(&n.x);
                for part in [&n.low, &n.high, &n.max].into_iter().flatten() {
                    self.bind_expr(part);
                }
            }
            Expr::TypeAssert(n) => {
                self.bind_expr(&n.x);
                if let Some(ref ty) = n.ty {
                    self.bind_expr(ty);
                }
            }
            Expr::Call(n) => {
                self.bind_expr(&n.fun);
                for arg in &n.args {
                    self.bind_expr(arg);
                }
            }
            Expr::Star(n) => self.bind_expr(&n.x),
            Expr::Unary(n) => self.bind_expr(&n.x),
            Expr::Binary(n) => {
                self.bind_expr(&n.x);
                self.bind_expr(&n.y);
            }
            Expr::KeyValue(n) => {
                self.bind_expr(&n.key);
                self.bind_expr(&n.value);
            }
            Expr::ArrayType(n) => {
                if let Some(ref len) = n.len {
                    self.bind_expr(len);
                }
                self.bind_expr(&n.elt);
            }
            Expr::MapType(n) => {
                self.bind_expr(&n.key);
                self.bind_expr(&n.value);
            }
            Expr::ChanType(n) => self.bind_expr(&n.value),
            Expr::FuncType(n) => self.bind_func_type_types(n),
            Expr::StructType(n) => self.bind_field_types(&n.fields),
            Expr::InterfaceType(n) => self.bind_field_types(&n.methods),
            Expr::Ellipsis(n) => {
                if let Some(ref elt) = n.elt {
                    self.bind_expr(elt);
                }
            }
        }
    }

    /// A composite literal element. A bare identifier key is either a struct
    /// field name or a map/array key expression; it is bound only if it
    /// resolves.
    fn bind_element(&mut self, elt: &Expr) {
        match elt {
            Expr::KeyValue(kv) => {
                match &kv.key {
                    Expr::Ident(key) => {
                        if let Some(id) = self.resolve(key) {
                            self.uses.insert(key.data.id, id);
                        }
                    }
                    other => self.bind_element_value(other),
                }
                self.bind_element_value(&kv.value);
            }
            other => self.bind_element_value(other),
        }
    }

    fn bind_element_value(&mut self, value: &Expr) {
        match value {
            Expr::CompositeLit(lit) if lit.ty.is_none() => {
                for elt in &lit.elts {
                    self.bind_element(elt);
                }
            }
            other => self.bind_expr(other),
        }
    }

    fn bind_ident_use(&mut self, ident: &Ident) {
        if ident.is_blank() {
            self.error_at(ident.data.range, &CANNOT_USE_BLANK_AS_VALUE, &[]);
            return;
        }
        match self.resolve(ident) {
            Some(id) => {
                if self.symbols[id.index()].kind == SymbolKind::PkgName {
                    self.error_at(ident.data.range, &USE_OF_PACKAGE_0_WITHOUT_SELECTOR, &[&ident.text]);
                }
                self.uses.insert(ident.data.id, id);
            }
            None if !self.dot_imports.is_empty() => {
                self.dot_uses.insert(ident.data.id, self.dot_imports.clone());
            }
            None => self.error_at(ident.data.range, &UNDEFINED_0, &[&ident.text]),
        }
    }

    // ========================================================================
    // Signatures and fields
    // ========================================================================

    fn bind_func_type_types(&mut self, ty: &FuncType) {
        self.bind_field_types(&ty.params);
        if let Some(ref results) = ty.results {
            self.bind_field_types(results);
        }
    }

    /// Bind the types of a field list; names are left alone.
    fn bind_field_types(&mut self, list: &FieldList) {
        for field in &list.list {
            self.bind_expr(&field.ty);
        }
    }

    fn declare_signature_names(&mut self, ty: &FuncType) {
        self.declare_fields(&ty.params);
        if let Some(ref results) = ty.results {
            self.declare_fields(results);
        }
    }

    fn declare_fields(&mut self, list: &FieldList) {
        for field in &list.list {
            for name in &field.names {
                self.declare(name, SymbolKind::Var);
            }
        }
    }

    // ========================================================================
    // Symbol resolution
    // ========================================================================

    /// Resolve a name through the scope chain, then the package and
    /// universe blocks.
    fn resolve(&self, ident: &Ident) -> Option<SymbolId> {
        let mut scope = self.current_scope.as_ref();
        let mut depth = 0u32;
        while let Some(s) = scope {
            if let Some(id) = s.locals.get(&ident.name) {
                return Some(id);
            }
            depth += 1;
            if depth > Self::MAX_SCOPE_DEPTH {
                break;
            }
            scope = s.parent.as_ref();
        }
        self.package
            .get(&ident.name)
            .or_else(|| self.universe.get(&ident.name))
    }

    /// Look a name up in the innermost scope only.
    fn lookup_current(&self, ident: &Ident) -> Option<SymbolId> {
        self.current_scope
            .as_ref()
            .and_then(|scope| scope.locals.get(&ident.name))
    }

    // ========================================================================
    // Symbol and scope management
    // ========================================================================

    fn new_symbol(&mut self, name: InternedString, text: String, kind: SymbolKind, decl: NodeId) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol::new(id, name, text, kind, decl));
        id
    }

    /// Declare `ident` in the innermost scope and record its def.
    fn declare(&mut self, ident: &Ident, kind: SymbolKind) -> SymbolId {
        if ident.is_blank() {
            return self.define_hidden(ident, kind);
        }
        if let Some(existing) = self.lookup_current(ident) {
            self.error_at(ident.data.range, &_0_REDECLARED_IN_THIS_BLOCK, &[&ident.text]);
            return existing;
        }
        let id = self.new_symbol(ident.name, ident.text.clone(), kind, ident.data.id);
        if let Some(scope) = &mut self.current_scope {
            scope.locals.set(ident.name, id);
        }
        self.defs.insert(ident.data.id, id);
        id
    }

    fn push_scope(&mut self, kind: ScopeKind) {
        let parent = self.current_scope.take();
        self.current_scope = Some(Box::new(Scope::new(parent, kind)));
        self.scope_depth += 1;
    }

    fn pop_scope(&mut self) {
        if let Some(scope) = self.current_scope.take() {
            self.current_scope = scope.parent;
            if self.scope_depth > 0 {
                self.scope_depth -= 1;
            }
        }
    }

    fn error_at(&mut self, range: TextRange, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.add(Diagnostic::with_location(
            self.file_name.clone(),
            range,
            message,
            args,
        ));
    }
}

/// The name an import is referred to by when the spec gives none: the last
/// path element, skipping a trailing major-version element and dropping a
/// `.vN` suffix or a `go-` prefix.
pub fn guess_package_name(path: &str) -> String {
    let mut elements = path.rsplit('/');
    let mut last = elements.next().unwrap_or(path);
    let is_major_version = |s: &str| {
        s.len() > 1 && s.starts_with('v') && s[1..].bytes().all(|b| b.is_ascii_digit())
    };
    if is_major_version(last) {
        if let Some(prev) = elements.next() {
            last = prev;
        }
    }
    if let Some((stem, suffix)) = last.rsplit_once('.') {
        if is_major_version(suffix) {
            last = stem;
        }
    }
    let last = last.strip_prefix("go-").unwrap_or(last);
    last.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}
