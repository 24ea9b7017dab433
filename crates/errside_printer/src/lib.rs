//! errside_printer: AST to Go source text.
//!
//! Prints a parsed Go file in gofmt's layout (tab indentation, `{` on the
//! header line, one space around binary operators) with the file's comments
//! and at most one blank line between statements. An
//! [`AssignIfErrStmt`] prints its leading part in place and its `if` at a
//! fixed visual column, so the error handling of a function reads down a
//! second column on the right.

use errside_ast::node::*;
use errside_ast::syntax_kind::SyntaxKind;
use errside_ast::types::ChanDir;
use errside_core::{TextPos, TextRange};

/// Layout of the side column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Visual column, counted from 0, at which merged conditionals start.
    pub column: usize,
    /// Width of a tab stop when computing visual columns.
    pub tab_width: usize,
    /// Pad to the column with spaces only.
    pub use_spaces: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            column: 40,
            tab_width: 8,
            use_spaces: false,
        }
    }
}

/// Render a file, merged or not, to text.
pub fn render(file: &SourceFile, config: &RenderConfig) -> String {
    let mut printer = Printer::new(file, *config);
    printer.print_source_file();
    printer.finish()
}

/// The visual width of `text`, with tabs advancing to the next multiple of
/// `tab_width`.
pub fn visual_width(text: &str, tab_width: usize) -> usize {
    text.chars().fold(0, |col, c| advance(col, c, tab_width))
}

fn advance(col: usize, c: char, tab_width: usize) -> usize {
    match c {
        '\n' => 0,
        '\t' => next_tab_stop(col, tab_width),
        _ => col + 1,
    }
}

fn next_tab_stop(col: usize, tab_width: usize) -> usize {
    (col / tab_width + 1) * tab_width
}

/// Where the continuation lines of a side-column conditional start.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    column: usize,
    /// Indentation level of the statement the conditional belongs to.
    indent: usize,
}

/// The printer converts one file to text.
pub struct Printer<'f> {
    file: &'f SourceFile,
    config: RenderConfig,
    out: String,
    /// Visual column of the end of `out`.
    col: usize,
    indent: usize,
    anchor: Option<Anchor>,
    comments: &'f [Comment],
    consumed: Vec<bool>,
    next_comment: usize,
    /// Source line of the last thing printed, for blank line preservation.
    last_line: Option<u32>,
    /// Inside the continuation of a broken binary expression.
    continued: bool,
}

impl<'f> Printer<'f> {
    pub fn new(file: &'f SourceFile, config: RenderConfig) -> Self {
        let tab_width = config.tab_width.max(1);
        Self {
            file,
            config: RenderConfig { tab_width, ..config },
            out: String::with_capacity(file.text.len() + file.text.len() / 4),
            col: 0,
            indent: 0,
            anchor: None,
            comments: &file.comments,
            consumed: vec![false; file.comments.len()],
            next_comment: 0,
            last_line: None,
            continued: false,
        }
    }

    pub fn finish(mut self) -> String {
        while self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out.push('\n');
        self.out
    }

    pub fn print_source_file(&mut self) {
        let file = self.file;
        let package = &file.package;
        self.flush_comments_before(package.data.range.pos);
        self.line(Some(package.data.range.pos));
        self.write("package ");
        self.write(&package.text);
        self.last_line = Some(self.line_of(package.data.range.end));
        self.trailing_comments(package.data.range.end);

        for decl in &file.decls {
            let range = decl.range();
            self.flush_comments_before(range.pos);
            self.line(Some(range.pos));
            self.print_decl(decl);
            self.last_line = Some(self.line_of(range.end));
            self.trailing_comments(range.end);
        }
        self.flush_comments_before(TextPos::MAX);
    }

    // ========================================================================
    // Output primitives
    // ========================================================================

    fn line_of(&self, pos: TextPos) -> u32 {
        self.file.line_map.line_of(pos)
    }

    fn write(&mut self, s: &str) {
        let tab_width = self.config.tab_width;
        self.col = s.chars().fold(self.col, |col, c| advance(col, c, tab_width));
        self.out.push_str(s);
    }

    /// Start a new line. With a source position, keeps one blank line when
    /// the source had any between the last printed line and `pos`.
    fn line(&mut self, pos: Option<TextPos>) {
        if !self.out.is_empty() {
            if let (Some(pos), Some(last)) = (pos, self.last_line) {
                if self.line_of(pos) > last + 1 {
                    self.out.push('\n');
                }
            }
            self.out.push('\n');
            self.col = 0;
        }
        self.write_line_start();
    }

    fn write_line_start(&mut self) {
        match self.anchor {
            Some(anchor) => {
                self.pad_to(anchor.column);
                let levels = self.indent.saturating_sub(anchor.indent);
                self.write_indent(levels);
            }
            None => self.write_indent(self.indent),
        }
    }

    fn write_indent(&mut self, levels: usize) {
        for _ in 0..levels {
            if self.col % self.config.tab_width == 0 {
                self.out.push('\t');
                self.col += self.config.tab_width;
            } else {
                let target = next_tab_stop(self.col, self.config.tab_width);
                self.pad_spaces(target);
            }
        }
    }

    /// Pad the current line to visual column `target`: tabs while the next
    /// tab stop does not pass it, then spaces.
    fn pad_to(&mut self, target: usize) {
        if !self.config.use_spaces {
            loop {
                let stop = next_tab_stop(self.col, self.config.tab_width);
                if stop > target {
                    break;
                }
                self.out.push('\t');
                self.col = stop;
            }
        }
        self.pad_spaces(target);
    }

    fn pad_spaces(&mut self, target: usize) {
        while self.col < target {
            self.out.push(' ');
            self.col += 1;
        }
    }

    // ========================================================================
    // Comments
    // ========================================================================

    fn peek_comment(&mut self) -> Option<&'f Comment> {
        while self.next_comment < self.comments.len() && self.consumed[self.next_comment] {
            self.next_comment += 1;
        }
        self.comments.get(self.next_comment)
    }

    fn has_comment_before(&mut self, pos: TextPos) -> bool {
        self.peek_comment().is_some_and(|c| c.range.pos < pos)
    }

    fn consume(&mut self, comment: &Comment) {
        if let Some(index) = self.comments.iter().position(|c| c.range == comment.range) {
            self.consumed[index] = true;
        }
    }

    /// Print every pending comment that starts before `pos` on its own line.
    fn flush_comments_before(&mut self, pos: TextPos) {
        while let Some(comment) = self.peek_comment() {
            if comment.range.pos >= pos {
                break;
            }
            self.consumed[self.next_comment] = true;
            self.own_line_comment(comment);
        }
    }

    fn own_line_comment(&mut self, comment: &Comment) {
        self.line(Some(comment.range.pos));
        self.write(&comment.text);
        self.last_line = Some(self.line_of(comment.range.end));
    }

    /// Append the comments that follow `end` on the same source line.
    fn trailing_comments(&mut self, end: TextPos) {
        let line = self.line_of(end);
        while let Some(comment) = self.peek_comment() {
            if comment.range.pos < end || self.line_of(comment.range.pos) != line {
                break;
            }
            self.consumed[self.next_comment] = true;
            self.write(" ");
            self.write(&comment.text);
            self.last_line = Some(self.line_of(comment.range.end));
        }
    }

    /// Write the block comments in `from..pos`, each followed by a space.
    fn leading_inline_comments(&mut self, from: TextPos, pos: TextPos) {
        while let Some(comment) = self.peek_comment() {
            if comment.range.pos < from || comment.range.pos >= pos || !comment.is_block() {
                break;
            }
            self.consumed[self.next_comment] = true;
            self.write(&comment.text);
            self.write(" ");
        }
    }

    /// Write the block comments in `open..close`, separated by spaces.
    fn empty_list_comments(&mut self, open: TextPos, close: TextPos) {
        let mut first = true;
        while let Some(comment) = self.peek_comment() {
            if comment.range.pos < open || comment.range.pos >= close || !comment.is_block() {
                break;
            }
            self.consumed[self.next_comment] = true;
            if !first {
                self.write(" ");
            }
            self.write(&comment.text);
            first = false;
        }
    }

    /// Write the block comments between `end` and the separator that follows
    /// it, each preceded by a space.
    fn inline_comments_after(&mut self, end: TextPos, next: TextPos) {
        let line = self.line_of(end);
        while let Some(comment) = self.peek_comment() {
            let start = comment.range.pos;
            if start < end || start >= next || !comment.is_block() || self.line_of(start) != line {
                break;
            }
            let gap = self.file.text.get(end as usize..start as usize);
            if gap.map_or(true, |gap| gap.contains(',')) {
                break;
            }
            self.consumed[self.next_comment] = true;
            self.write(" ");
            self.write(&comment.text);
        }
    }

    /// Print the comments in `from..to` on their own lines, now.
    fn hoist_comments(&mut self, from: TextPos, to: TextPos) {
        let comments = self.comments;
        for comment in comments.iter().filter(|c| from <= c.range.pos && c.range.pos < to) {
            self.consume(comment);
            self.own_line_comment(comment);
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn print_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Func(n) => self.print_func_decl(n),
            Decl::Gen(n) => self.print_gen_decl(n),
        }
    }

    fn print_func_decl(&mut self, node: &FuncDecl) {
        let header = self.col;
        self.write("func ");
        if let Some(ref recv) = node.recv {
            self.print_params(recv);
            self.write(" ");
        }
        self.write(&node.name.text);
        self.print_signature(&node.ty);
        if let Some(ref body) = node.body {
            self.write(" ");
            self.print_func_body(body, header);
        }
    }

    fn print_gen_decl(&mut self, node: &GenDecl) {
        self.write(token_text(node.tok));
        if node.lparen.is_none() {
            self.write(" ");
            if let Some(spec) = node.specs.first() {
                self.print_spec(spec);
            }
            return;
        }

        let close = node.rparen.unwrap_or(node.data.range.end);
        if node.specs.is_empty() && !self.has_comment_before(close) {
            self.write(" ()");
            return;
        }
        self.write(" (");
        self.indent += 1;
        self.last_line = None;
        for spec in &node.specs {
            let range = spec.range();
            self.flush_comments_before(range.pos);
            self.line(Some(range.pos));
            self.print_spec(spec);
            self.last_line = Some(self.line_of(range.end));
            self.trailing_comments(range.end);
        }
        self.flush_comments_before(close);
        self.indent -= 1;
        self.line(None);
        self.write(")");
    }

    fn print_spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Import(n) => {
                if let Some(ref name) = n.name {
                    self.write(&name.text);
                    self.write(" ");
                }
                self.write(&n.path.value);
            }
            Spec::Value(n) => {
                self.print_idents(&n.names);
                if let Some(ref ty) = n.ty {
                    self.write(" ");
                    self.print_expr(ty);
                }
                if !n.values.is_empty() {
                    self.write(" = ");
                    self.print_expr_list(&n.values);
                }
            }
            Spec::Type(n) => {
                self.write(&n.name.text);
                self.write(if n.alias { " = " } else { " " });
                self.print_expr(&n.ty);
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn print_block(&mut self, block: &Block) {
        self.write("{");
        let empty = block.stmts.iter().all(|s| matches!(s, Stmt::Empty(_)));
        if empty
            && !self.has_comment_before(block.rbrace)
            && self.line_of(block.data.range.pos) == self.line_of(block.rbrace)
        {
            self.write("}");
            return;
        }
        self.print_stmt_list(&block.stmts, block.rbrace);
        self.line(None);
        self.write("}");
    }

    /// A function body written on one source line stays on one line when it
    /// holds a few simple statements, no comments, and the whole function
    /// from `header` fits in [`ONE_LINE_FUNC_WIDTH`] columns.
    fn print_func_body(&mut self, body: &Block, header: usize) {
        if !self.is_one_line_body(body, header) {
            self.print_block(body);
            return;
        }
        self.write("{ ");
        let stmts = body.stmts.iter().filter(|s| !matches!(s, Stmt::Empty(_)));
        for (i, stmt) in stmts.enumerate() {
            if i > 0 {
                self.write("; ");
            }
            self.print_stmt(stmt);
        }
        self.write(" }");
    }

    fn is_one_line_body(&self, body: &Block, header: usize) -> bool {
        let lbrace = body.data.range.pos;
        if self.line_of(lbrace) != self.line_of(body.rbrace) {
            return false;
        }
        if self.comments.iter().any(|c| lbrace < c.range.pos && c.range.pos < body.rbrace) {
            return false;
        }
        let mut count = 0;
        for stmt in body.stmts.iter().filter(|s| !matches!(s, Stmt::Empty(_))) {
            if !is_simple_stmt(stmt) {
                return false;
            }
            count += 1;
        }
        let width = self.col.saturating_sub(header) + (body.rbrace + 1 - lbrace) as usize;
        count > 0 && count <= ONE_LINE_FUNC_STMTS && width <= ONE_LINE_FUNC_WIDTH
    }

    /// Print `stmts` one level deeper, each on its own line, along with the
    /// comments up to `close`.
    fn print_stmt_list(&mut self, stmts: &[Stmt], close: TextPos) {
        self.indent += 1;
        self.last_line = None;
        for stmt in stmts {
            if matches!(stmt, Stmt::Empty(_)) {
                continue;
            }
            let range = stmt.range();
            self.flush_comments_before(range.pos);
            if let Stmt::AssignIfErr(composite) = stmt {
                self.hoist_comments(composite.leading.range().end, composite.cond.data.range.pos);
            }
            self.line(Some(range.pos));
            self.print_stmt(stmt);
            self.last_line = Some(self.line_of(range.end));
            self.trailing_comments(range.end);
        }
        self.flush_comments_before(close);
        self.indent -= 1;
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(n) => self.print_gen_decl(n),
            Stmt::Labeled(n) => {
                self.write(&n.label.text);
                self.write(":");
                if !matches!(n.stmt, Stmt::Empty(_)) {
                    self.line(None);
                    self.print_stmt(&n.stmt);
                }
            }
            Stmt::Expr(n) => self.print_expr(&n.x),
            Stmt::Send(n) => {
                self.print_expr(&n.chan);
                self.write(" <- ");
                self.print_expr(&n.value);
            }
            Stmt::IncDec(n) => {
                self.print_expr(&n.x);
                self.write(token_text(n.tok));
            }
            Stmt::Assign(n) => self.print_assign(n),
            Stmt::Go(n) => {
                self.write("go ");
                self.print_expr(&n.call);
            }
            Stmt::Defer(n) => {
                self.write("defer ");
                self.print_expr(&n.call);
            }
            Stmt::Return(n) => {
                self.write("return");
                if !n.results.is_empty() {
                    self.write(" ");
                    self.print_expr_list(&n.results);
                }
            }
            Stmt::Branch(n) => {
                self.write(token_text(n.tok));
                if let Some(ref label) = n.label {
                    self.write(" ");
                    self.write(&label.text);
                }
            }
            Stmt::Block(n) => self.print_block(n),
            Stmt::If(n) => self.print_if(n),
            Stmt::Switch(n) => self.print_switch(n),
            Stmt::TypeSwitch(n) => self.print_type_switch(n),
            Stmt::Select(n) => self.print_select(n),
            Stmt::For(n) => self.print_for(n),
            Stmt::Range(n) => self.print_range(n),
            Stmt::Empty(_) => {}
            Stmt::AssignIfErr(n) => self.print_assign_if_err(n),
        }
    }

    fn print_assign(&mut self, node: &AssignStmt) {
        self.print_expr_list(&node.lhs);
        self.write(" ");
        self.write(token_text(node.tok));
        self.write(" ");
        self.print_expr_list(&node.rhs);
    }

    /// The leading part in place, the conditional in the side column.
    ///
    /// When the line is already indented to the column the conditional goes
    /// on the next line at normal indentation; when only the leading text
    /// reaches it, the conditional starts a new line padded to the column.
    fn print_assign_if_err(&mut self, node: &AssignIfErrStmt) {
        let start = self.col;
        self.print_stmt(&node.leading);

        let column = self.config.column;
        if start >= column {
            self.line(None);
            self.print_if(&node.cond);
            return;
        }
        if self.col >= column {
            self.out.push('\n');
            self.col = 0;
        }
        self.pad_to(column);
        let outer = self.anchor.replace(Anchor {
            column,
            indent: self.indent,
        });
        self.print_if(&node.cond);
        self.anchor = outer;
    }

    fn print_if(&mut self, node: &IfStmt) {
        self.write("if ");
        if let Some(ref init) = node.init {
            self.print_stmt(init);
            self.write("; ");
        }
        self.print_expr(&node.cond);
        self.write(" ");
        self.print_block(&node.body);
        if let Some(ref else_) = node.else_ {
            self.write(" else ");
            self.print_stmt(else_);
        }
    }

    fn print_switch(&mut self, node: &SwitchStmt) {
        self.write("switch ");
        if let Some(ref init) = node.init {
            self.print_stmt(init);
            self.write("; ");
        }
        if let Some(ref tag) = node.tag {
            self.print_expr(tag);
            self.write(" ");
        }
        self.write("{");
        self.print_case_clauses(&node.clauses, node.rbrace);
        self.line(None);
        self.write("}");
    }

    fn print_type_switch(&mut self, node: &TypeSwitchStmt) {
        self.write("switch ");
        if let Some(ref init) = node.init {
            self.print_stmt(init);
            self.write("; ");
        }
        if let Some(ref binding) = node.binding {
            self.write(&binding.text);
            self.write(" := ");
        }
        self.print_expr(&node.x);
        self.write(".(type) {");
        self.print_case_clauses(&node.clauses, node.rbrace);
        self.line(None);
        self.write("}");
    }

    fn print_case_clauses(&mut self, clauses: &[CaseClause], rbrace: TextPos) {
        self.last_line = None;
        for (i, clause) in clauses.iter().enumerate() {
            let pos = clause.data.range.pos;
            self.flush_comments_before(pos);
            self.line(Some(pos));
            match clause.list {
                Some(ref list) => {
                    self.write("case ");
                    self.print_expr_list(list);
                    self.write(":");
                }
                None => self.write("default:"),
            }
            self.last_line = Some(self.line_of(clause.colon));
            self.trailing_comments(clause.colon + 1);
            let end = clauses.get(i + 1).map_or(rbrace, |next| next.data.range.pos);
            self.print_stmt_list(&clause.body, end);
        }
        self.flush_comments_before(rbrace);
    }

    fn print_select(&mut self, node: &SelectStmt) {
        self.write("select {");
        self.last_line = None;
        for (i, clause) in node.clauses.iter().enumerate() {
            let pos = clause.data.range.pos;
            self.flush_comments_before(pos);
            self.line(Some(pos));
            match clause.comm {
                Some(ref comm) => {
                    self.write("case ");
                    self.print_stmt(comm);
                    self.write(":");
                }
                None => self.write("default:"),
            }
            self.last_line = Some(self.line_of(clause.colon));
            self.trailing_comments(clause.colon + 1);
            let end = node.clauses.get(i + 1).map_or(node.rbrace, |next| next.data.range.pos);
            self.print_stmt_list(&clause.body, end);
        }
        self.flush_comments_before(node.rbrace);
        self.line(None);
        self.write("}");
    }

    fn print_for(&mut self, node: &ForStmt) {
        self.write("for ");
        match (&node.init, &node.cond, &node.post) {
            (None, None, None) => {}
            (None, Some(cond), None) => {
                self.print_expr(cond);
                self.write(" ");
            }
            (init, cond, post) => {
                if let Some(init) = init {
                    self.print_stmt(init);
                }
                self.write("; ");
                if let Some(cond) = cond {
                    self.print_expr(cond);
                }
                self.write(";");
                if let Some(post) = post {
                    self.write(" ");
                    self.print_stmt(post);
                }
                self.write(" ");
            }
        }
        self.print_block(&node.body);
    }

    fn print_range(&mut self, node: &RangeStmt) {
        self.write("for ");
        if let Some(ref key) = node.key {
            self.print_expr(key);
            if let Some(ref value) = node.value {
                self.write(", ");
                self.print_expr(value);
            }
            self.write(" ");
            self.write(token_text(node.tok.unwrap_or(SyntaxKind::ColonEqualsToken)));
            self.write(" ");
        }
        self.write("range ");
        self.print_expr(&node.x);
        self.write(" ");
        self.print_block(&node.body);
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn print_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(n) => self.write(&n.text),
            Expr::BasicLit(n) => self.write(&n.value),
            Expr::CompositeLit(n) => {
                if let Some(ref ty) = n.ty {
                    self.print_expr(ty);
                }
                self.write("{");
                self.print_list(&n.elts, n.lbrace, n.rbrace, "", Expr::range, Self::print_expr);
                self.write("}");
            }
            Expr::FuncLit(n) => {
                let header = self.col;
                self.write("func");
                self.print_signature(&n.ty);
                self.write(" ");
                self.print_func_body(&n.body, header);
            }
            Expr::Paren(n) => {
                self.write("(");
                self.print_expr(&n.x);
                self.write(")");
            }
            Expr::Selector(n) => {
                self.print_expr(&n.x);
                self.write(".");
                self.write(&n.sel.text);
            }
            Expr::Index(n) => {
                self.print_expr(&n.x);
                self.write("[");
                self.print_expr(&n.index);
                self.write("]");
            }
            Expr::Slice(n) => {
                self.print_expr(&n.x);
                self.write("[");
                if let Some(ref low) = n.low {
                    self.print_expr(low);
                }
                self.write(":");
                if let Some(ref high) = n.high {
                    self.print_expr(high);
                }
                if n.slice3 {
                    self.write(":");
                    if let Some(ref max) = n.max {
                        self.print_expr(max);
                    }
                }
                self.write("]");
            }
            Expr::TypeAssert(n) => {
                self.print_expr(&n.x);
                self.write(".(");
                match n.ty {
                    Some(ref ty) => self.print_expr(ty),
                    None => self.write("type"),
                }
                self.write(")");
            }
            Expr::Call(n) => {
                self.print_expr(&n.fun);
                self.write("(");
                let suffix = if n.ellipsis { "..." } else { "" };
                self.print_list(&n.args, n.fun.range().end, n.rparen, suffix, Expr::range, Self::print_expr);
                self.write(")");
            }
            Expr::Star(n) => {
                self.write("*");
                self.print_expr(&n.x);
            }
            Expr::Unary(n) => {
                self.write(token_text(n.op));
                self.print_expr(&n.x);
            }
            Expr::Binary(n) => self.print_binary(n),
            Expr::KeyValue(n) => {
                self.print_expr(&n.key);
                self.write(": ");
                self.print_expr(&n.value);
            }
            Expr::ArrayType(n) => {
                self.write("[");
                if let Some(ref len) = n.len {
                    self.print_expr(len);
                }
                self.write("]");
                self.print_expr(&n.elt);
            }
            Expr::MapType(n) => {
                self.write("map[");
                self.print_expr(&n.key);
                self.write("]");
                self.print_expr(&n.value);
            }
            Expr::ChanType(n) => {
                if n.dir == ChanDir::RECV {
                    self.write("<-chan ");
                } else if n.dir == ChanDir::SEND {
                    self.write("chan<- ");
                } else {
                    self.write("chan ");
                }
                self.print_expr(&n.value);
            }
            Expr::FuncType(n) => {
                self.write("func");
                self.print_signature(n);
            }
            Expr::StructType(n) => {
                self.write("struct");
                self.print_field_block(&n.fields, n.data.range, false);
            }
            Expr::InterfaceType(n) => {
                self.write("interface");
                self.print_field_block(&n.methods, n.data.range, true);
            }
            Expr::Ellipsis(n) => {
                self.write("...");
                if let Some(ref elt) = n.elt {
                    self.print_expr(elt);
                }
            }
        }
    }

    /// Operands the source split over two lines stay split, with the
    /// continuation indented once.
    fn print_binary(&mut self, node: &BinaryExpr) {
        self.print_expr(&node.x);
        self.write(" ");
        self.write(token_text(node.op));
        if self.line_of(node.y.range().pos) > self.line_of(node.x.range().end) {
            let bump = !self.continued;
            if bump {
                self.indent += 1;
                self.continued = true;
            }
            self.line(None);
            self.print_expr(&node.y);
            if bump {
                self.indent -= 1;
                self.continued = false;
            }
        } else {
            self.write(" ");
            self.print_expr(&node.y);
        }
    }

    fn print_expr_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_expr(expr);
        }
    }

    /// Elements of a call, composite literal, or parameter list. Line breaks
    /// of the source are kept; a list whose closing token sits on its own
    /// line gets a trailing comma. Comments between elements stay where they
    /// were written.
    fn print_list<T>(
        &mut self,
        items: &[T],
        open: TextPos,
        close: TextPos,
        last_suffix: &str,
        range_of: impl Fn(&T) -> TextRange,
        mut print: impl FnMut(&mut Self, &T),
    ) {
        let close_line = self.line_of(close);
        let mut prev_line = self.line_of(open);
        let mut prev_end = open;
        let mut broken = false;
        for (i, item) in items.iter().enumerate() {
            let range = range_of(item);
            if self.line_of(range.pos) > prev_line {
                if !broken {
                    broken = true;
                    self.indent += 1;
                    self.last_line = None;
                }
                if i == 0 {
                    self.trailing_comments(open);
                }
                self.flush_comments_before(range.pos);
                self.line(Some(range.pos));
            } else if i > 0 {
                self.write(" ");
            }
            self.leading_inline_comments(prev_end, range.pos);
            print(self, item);

            let end_line = self.line_of(range.end);
            let next_pos = items.get(i + 1).map_or(close, |next| range_of(next).pos);
            self.inline_comments_after(range.end, next_pos);
            let next_line = self.line_of(next_pos);
            let is_last = i + 1 == items.len();
            if is_last {
                self.write(last_suffix);
            }
            if !is_last || next_line > end_line {
                self.write(",");
            }
            if next_line > end_line {
                self.last_line = Some(end_line);
                self.trailing_comments(range.end);
            }
            prev_line = end_line;
            prev_end = range.end;
        }

        if items.is_empty() {
            self.empty_list_comments(open, close);
        } else if close_line > prev_line {
            if broken {
                self.flush_comments_before(close);
                self.indent -= 1;
            }
            self.line(None);
        } else if broken {
            self.indent -= 1;
        }
    }

    fn print_signature(&mut self, ty: &FuncType) {
        self.print_params(&ty.params);
        let Some(ref results) = ty.results else {
            return;
        };
        match results.list.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                self.write(" ");
                self.print_expr(&single.ty);
            }
            _ => {
                self.write(" ");
                self.print_params(results);
            }
        }
    }

    fn print_params(&mut self, list: &FieldList) {
        let TextRange { pos, end } = list.data.range;
        self.write("(");
        self.print_list(&list.list, pos, end.saturating_sub(1), "", |f| f.data.range, |p, field| {
            if !field.names.is_empty() {
                p.print_idents(&field.names);
                p.write(" ");
            }
            p.print_expr(&field.ty);
        });
        self.write(")");
    }

    /// The braces of a struct or interface type.
    fn print_field_block(&mut self, fields: &FieldList, range: TextRange, interface: bool) {
        let TextRange { pos, end } = range;
        if fields.list.is_empty() && !self.has_comment_before(end) {
            self.write("{}");
            return;
        }
        if self.line_of(pos) == self.line_of(end) {
            self.write("{ ");
            for (i, field) in fields.list.iter().enumerate() {
                if i > 0 {
                    self.write("; ");
                }
                self.print_field(field, interface);
            }
            self.write(" }");
            return;
        }

        self.write(" {");
        self.indent += 1;
        self.last_line = None;
        for field in &fields.list {
            let range = field.data.range;
            self.flush_comments_before(range.pos);
            self.line(Some(range.pos));
            self.print_field(field, interface);
            self.last_line = Some(self.line_of(range.end));
            self.trailing_comments(range.end);
        }
        self.flush_comments_before(end);
        self.indent -= 1;
        self.line(None);
        self.write("}");
    }

    fn print_field(&mut self, field: &Field, interface: bool) {
        match (field.names.as_slice(), &field.ty) {
            ([name], Expr::FuncType(sig)) if interface => {
                self.write(&name.text);
                self.print_signature(sig);
            }
            ([], ty) => self.print_expr(ty),
            (names, ty) => {
                self.print_idents(names);
                self.write(" ");
                self.print_expr(ty);
            }
        }
        if let Some(ref tag) = field.tag {
            self.write(" ");
            self.write(&tag.value);
        }
    }

    fn print_idents(&mut self, idents: &[Ident]) {
        for (i, ident) in idents.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&ident.text);
        }
    }
}

/// Most statements a one-line function body may hold.
const ONE_LINE_FUNC_STMTS: usize = 5;
/// Widest a one-line function may be, from `func` to the closing brace.
const ONE_LINE_FUNC_WIDTH: usize = 100;

/// Statements that never print a block of their own.
fn is_simple_stmt(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Expr(_)
        | Stmt::Send(_)
        | Stmt::IncDec(_)
        | Stmt::Assign(_)
        | Stmt::Go(_)
        | Stmt::Defer(_)
        | Stmt::Return(_)
        | Stmt::Branch(_) => true,
        Stmt::Decl(decl) => decl.lparen.is_none(),
        _ => false,
    }
}

/// The source text of an operator or keyword token.
fn token_text(kind: SyntaxKind) -> &'static str {
    kind.punctuation_text()
        .or_else(|| kind.keyword_text())
        .unwrap_or("")
}
