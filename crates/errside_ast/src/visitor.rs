//! AST visitor trait for traversing the syntax tree.
//!
//! Provides a read-only `AstVisitor` trait for customizable traversal and
//! [`walk_stmt_lists_mut`], which hands every statement list of a file to a
//! closure for in-place rewriting.

use crate::node::*;

/// A visitor that traverses the AST. Implement this trait to perform
/// operations on each node kind. Default implementations walk into children.
pub trait AstVisitor {
    fn visit_source_file(&mut self, file: &SourceFile) {
        self.visit_ident(&file.package);
        for decl in &file.decls {
            self.visit_decl(decl);
        }
    }

    fn visit_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Func(n) => self.visit_func_decl(n),
            Decl::Gen(n) => self.visit_gen_decl(n),
        }
    }

    fn visit_func_decl(&mut self, node: &FuncDecl) {
        if let Some(ref recv) = node.recv {
            self.visit_field_list(recv);
        }
        self.visit_ident(&node.name);
        self.visit_func_type(&node.ty);
        if let Some(ref body) = node.body {
            self.visit_block(body);
        }
    }

    fn visit_gen_decl(&mut self, node: &GenDecl) {
        for spec in &node.specs {
            self.visit_spec(spec);
        }
    }

    fn visit_spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Import(n) => {
                if let Some(ref name) = n.name {
                    self.visit_ident(name);
                }
            }
            Spec::Value(n) => {
                for name in &n.names {
                    self.visit_ident(name);
                }
                if let Some(ref ty) = n.ty {
                    self.visit_expr(ty);
                }
                for value in &n.values {
                    self.visit_expr(value);
                }
            }
            Spec::Type(n) => {
                self.visit_ident(&n.name);
                self.visit_expr(&n.ty);
            }
        }
    }

    // -- Statements --

    fn visit_block(&mut self, block: &Block) {
        self.visit_stmt_list(&block.stmts);
    }

    fn visit_stmt_list(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(n) => self.visit_gen_decl(n),
            Stmt::Labeled(n) => {
                self.visit_ident(&n.label);
                self.visit_stmt(&n.stmt);
            }
            Stmt::Expr(n) => self.visit_expr(&n.x),
            Stmt::Send(n) => {
                self.visit_expr(&n.chan);
                self.visit_expr(&n.value);
            }
            Stmt::IncDec(n) => self.visit_expr(&n.x),
            Stmt::Assign(n) => self.visit_assign_stmt(n),
            Stmt::Go(n) => self.visit_expr(&n.call),
            Stmt::Defer(n) => self.visit_expr(&n.call),
            Stmt::Return(n) => {
                for result in &n.results {
                    self.visit_expr(result);
                }
            }
            Stmt::Branch(n) => {
                if let Some(ref label) = n.label {
                    self.visit_ident(label);
                }
            }
            Stmt::Block(n) => self.visit_block(n),
            Stmt::If(n) => self.visit_if_stmt(n),
            Stmt::Switch(n) => {
                if let Some(ref init) = n.init {
                    self.visit_stmt(init);
                }
                if let Some(ref tag) = n.tag {
                    self.visit_expr(tag);
                }
                for clause in &n.clauses {
                    self.visit_case_clause(clause);
                }
            }
            Stmt::TypeSwitch(n) => {
                if let Some(ref init) = n.init {
                    self.visit_stmt(init);
                }
                if let Some(ref binding) = n.binding {
                    self.visit_ident(binding);
                }
                self.visit_expr(&n.x);
                for clause in &n.clauses {
                    self.visit_case_clause(clause);
                }
            }
            Stmt::Select(n) => {
                for clause in &n.clauses {
                    if let Some(ref comm) = clause.comm {
                        self.visit_stmt(comm);
                    }
                    self.visit_stmt_list(&clause.body);
                }
            }
            Stmt::For(n) => {
                if let Some(ref init) = n.init {
                    self.visit_stmt(init);
                }
                if let Some(ref cond) = n.cond {
                    self.visit_expr(cond);
                }
                if let Some(ref post) = n.post {
                    self.visit_stmt(post);
                }
                self.visit_block(&n.body);
            }
            Stmt::Range(n) => {
                if let Some(ref key) = n.key {
                    self.visit_expr(key);
                }
                if let Some(ref value) = n.value {
                    self.visit_expr(value);
                }
                self.visit_expr(&n.x);
                self.visit_block(&n.body);
            }
            Stmt::Empty(_) => {}
            Stmt::AssignIfErr(n) => {
                self.visit_stmt(&n.leading);
                self.visit_if_stmt(&n.cond);
            }
        }
    }

    fn visit_assign_stmt(&mut self, node: &AssignStmt) {
        for lhs in &node.lhs {
            self.visit_expr(lhs);
        }
        for rhs in &node.rhs {
            self.visit_expr(rhs);
        }
    }

    fn visit_if_stmt(&mut self, node: &IfStmt) {
        if let Some(ref init) = node.init {
            self.visit_stmt(init);
        }
        self.visit_expr(&node.cond);
        self.visit_block(&node.body);
        if let Some(ref else_) = node.else_ {
            self.visit_stmt(else_);
        }
    }

    fn visit_case_clause(&mut self, clause: &CaseClause) {
        if let Some(ref list) = clause.list {
            for expr in list {
                self.visit_expr(expr);
            }
        }
        self.visit_stmt_list(&clause.body);
    }

    // -- Expressions --

    fn visit_ident(&mut self, _ident: &Ident) {}

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(n) => self.visit_ident(n),
            Expr::BasicLit(_) => {}
            Expr::CompositeLit(n) => {
                if let Some(ref ty) = n.ty {
                    self.visit_expr(ty);
                }
                for elt in &n.elts {
                    self.visit_expr(elt);
                }
            }
            Expr::FuncLit(n) => {
                self.visit_func_type(&n.ty);
                self.visit_block(&n.body);
            }
            Expr::Paren(n) => self.visit_expr(&n.x),
            Expr::Selector(n) => {
                self.visit_expr(&n.x);
                self.visit_ident(&n.sel);
            }
            Expr::Index(n) => {
                self.visit_expr(&n.x);
                self.visit_expr(&n.index);
            }
            Expr::Slice(n) => {
                self.visit_expr(&n.x);
                for part in [&n.low, &n.high, &n.max].into_iter().flatten() {
                    self.visit_expr(part);
                }
            }
            Expr::TypeAssert(n) => {
                self.visit_expr(&n.x);
                if let Some(ref ty) = n.ty {
                    self.visit_expr(ty);
                }
            }
            Expr::Call(n) => {
                self.visit_expr(&n.fun);
                for arg in &n.args {
                    self.visit_expr(arg);
                }
            }
            Expr::Star(n) => self.visit_expr(&n.x),
            Expr::Unary(n) => self.visit_expr(&n.x),
            Expr::Binary(n) => {
                self.visit_expr(&n.x);
                self.visit_expr(&n.y);
            }
            Expr::KeyValue(n) => {
                self.visit_expr(&n.key);
                self.visit_expr(&n.value);
            }
            Expr::ArrayType(n) => {
                if let Some(ref len) = n.len {
                    self.visit_expr(len);
                }
                self.visit_expr(&n.elt);
            }
            Expr::MapType(n) => {
                self.visit_expr(&n.key);
                self.visit_expr(&n.value);
            }
            Expr::ChanType(n) => self.visit_expr(&n.value),
            Expr::FuncType(n) => self.visit_func_type(n),
            Expr::StructType(n) => self.visit_field_list(&n.fields),
            Expr::InterfaceType(n) => self.visit_field_list(&n.methods),
            Expr::Ellipsis(n) => {
                if let Some(ref elt) = n.elt {
                    self.visit_expr(elt);
                }
            }
        }
    }

    fn visit_func_type(&mut self, node: &FuncType) {
        self.visit_field_list(&node.params);
        if let Some(ref results) = node.results {
            self.visit_field_list(results);
        }
    }

    fn visit_field_list(&mut self, list: &FieldList) {
        for field in &list.list {
            for name in &field.names {
                self.visit_ident(name);
            }
            self.visit_expr(&field.ty);
        }
    }
}

// ============================================================================
// Mutable statement-list walk
// ============================================================================

/// Call `f` once for every statement list in `file`: function bodies, nested
/// blocks, `case` and `select` clause bodies, and function literal bodies.
///
/// Lists are visited innermost first, so `f` sees a list only after every list
/// nested inside it has been handled. The walk descends into statements that
/// `f` produced on an earlier call, never into ones it produces on this call.
pub fn walk_stmt_lists_mut<E, F>(file: &mut SourceFile, f: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Vec<Stmt>) -> Result<(), E>,
{
    for decl in &mut file.decls {
        match decl {
            Decl::Func(func) => {
                if let Some(ref mut body) = func.body {
                    walk_block_mut(body, f)?;
                }
            }
            Decl::Gen(gen) => walk_gen_decl_mut(gen, f)?,
        }
    }
    Ok(())
}

fn walk_block_mut<E, F>(block: &mut Block, f: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Vec<Stmt>) -> Result<(), E>,
{
    walk_list_mut(&mut block.stmts, f)
}

fn walk_list_mut<E, F>(stmts: &mut Vec<Stmt>, f: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Vec<Stmt>) -> Result<(), E>,
{
    for stmt in stmts.iter_mut() {
        walk_stmt_mut(stmt, f)?;
    }
    f(stmts)
}

fn walk_gen_decl_mut<E, F>(decl: &mut GenDecl, f: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Vec<Stmt>) -> Result<(), E>,
{
    for spec in &mut decl.specs {
        if let Spec::Value(value) = spec {
            for expr in &mut value.values {
                walk_expr_mut(expr, f)?;
            }
        }
    }
    Ok(())
}

fn walk_opt_stmt_mut<E, F>(stmt: &mut Option<Stmt>, f: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Vec<Stmt>) -> Result<(), E>,
{
    match stmt {
        Some(stmt) => walk_stmt_mut(stmt, f),
        None => Ok(()),
    }
}

fn walk_stmt_mut<E, F>(stmt: &mut Stmt, f: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Vec<Stmt>) -> Result<(), E>,
{
    match stmt {
        Stmt::Decl(n) => walk_gen_decl_mut(n, f),
        Stmt::Labeled(n) => walk_stmt_mut(&mut n.stmt, f),
        Stmt::Expr(n) => walk_expr_mut(&mut n.x, f),
        Stmt::Send(n) => {
            walk_expr_mut(&mut n.chan, f)?;
            walk_expr_mut(&mut n.value, f)
        }
        Stmt::IncDec(_) | Stmt::Branch(_) | Stmt::Empty(_) => Ok(()),
        Stmt::Assign(n) => {
            for expr in n.lhs.iter_mut().chain(n.rhs.iter_mut()) {
                walk_expr_mut(expr, f)?;
            }
            Ok(())
        }
        Stmt::Go(n) => walk_expr_mut(&mut n.call, f),
        Stmt::Defer(n) => walk_expr_mut(&mut n.call, f),
        Stmt::Return(n) => {
            for expr in &mut n.results {
                walk_expr_mut(expr, f)?;
            }
            Ok(())
        }
        Stmt::Block(n) => walk_block_mut(n, f),
        Stmt::If(n) => walk_if_mut(n, f),
        Stmt::Switch(n) => {
            walk_opt_stmt_mut(&mut n.init, f)?;
            if let Some(ref mut tag) = n.tag {
                walk_expr_mut(tag, f)?;
            }
            for clause in &mut n.clauses {
                walk_list_mut(&mut clause.body, f)?;
            }
            Ok(())
        }
        Stmt::TypeSwitch(n) => {
            walk_opt_stmt_mut(&mut n.init, f)?;
            walk_expr_mut(&mut n.x, f)?;
            for clause in &mut n.clauses {
                walk_list_mut(&mut clause.body, f)?;
            }
            Ok(())
        }
        Stmt::Select(n) => {
            for clause in &mut n.clauses {
                walk_opt_stmt_mut(&mut clause.comm, f)?;
                walk_list_mut(&mut clause.body, f)?;
            }
            Ok(())
        }
        Stmt::For(n) => {
            walk_opt_stmt_mut(&mut n.init, f)?;
            if let Some(ref mut cond) = n.cond {
                walk_expr_mut(cond, f)?;
            }
            walk_opt_stmt_mut(&mut n.post, f)?;
            walk_block_mut(&mut n.body, f)
        }
        Stmt::Range(n) => {
            walk_expr_mut(&mut n.x, f)?;
            walk_block_mut(&mut n.body, f)
        }
        Stmt::AssignIfErr(n) => {
            walk_stmt_mut(&mut n.leading, f)?;
            walk_if_mut(&mut n.cond, f)
        }
    }
}

fn walk_if_mut<E, F>(node: &mut IfStmt, f: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Vec<Stmt>) -> Result<(), E>,
{
    walk_opt_stmt_mut(&mut node.init, f)?;
    walk_expr_mut(&mut node.cond, f)?;
    walk_block_mut(&mut node.body, f)?;
    walk_opt_stmt_mut(&mut node.else_, f)
}

/// Expressions only matter here for the bodies of function literals.
fn walk_expr_mut<E, F>(expr: &mut Expr, f: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Vec<Stmt>) -> Result<(), E>,
{
    match expr {
        Expr::FuncLit(n) => walk_block_mut(&mut n.body, f),
        Expr::CompositeLit(n) => {
            for elt in &mut n.elts {
                walk_expr_mut(elt, f)?;
            }
            Ok(())
        }
        Expr::Paren(n) => walk_expr_mut(&mut n.x, f),
        Expr::Selector(n) => walk_expr_mut(&mut n.x, f),
        Expr::Index(n) => {
            walk_expr_mut(&mut n.x, f)?;
            walk_expr_mut(&mut n.index, f)
        }
        Expr::Slice(n) => {
            walk_expr_mut(&mut n.x, f)?;
            for part in [&mut n.low, &mut n.high, &mut n.max].into_iter().flatten() {
                walk_expr_mut(part, f)?;
            }
            Ok(())
        }
        Expr::TypeAssert(n) => walk_expr_mut(&mut n.x, f),
        Expr::Call(n) => {
            walk_expr_mut(&mut n.fun, f)?;
            for arg in &mut n.args {
                walk_expr_mut(arg, f)?;
            }
            Ok(())
        }
        Expr::Star(n) => walk_expr_mut(&mut n.x, f),
        Expr::Unary(n) => walk_expr_mut(&mut n.x, f),
        Expr::Binary(n) => {
            walk_expr_mut(&mut n.x, f)?;
            walk_expr_mut(&mut n.y, f)
        }
        Expr::KeyValue(n) => {
            walk_expr_mut(&mut n.key, f)?;
            walk_expr_mut(&mut n.value, f)
        }
        Expr::Ident(_)
        | Expr::BasicLit(_)
        | Expr::ArrayType(_)
        | Expr::MapType(_)
        | Expr::ChanType(_)
        | Expr::FuncType(_)
        | Expr::StructType(_)
        | Expr::InterfaceType(_)
        | Expr::Ellipsis(_) => Ok(()),
    }
}
