//! Parser integration tests.
//!
//! Verifies that the parser correctly builds AST structures from Go source.

use errside_ast::node::*;
use errside_ast::syntax_kind::SyntaxKind;
use errside_ast::types::NodeIdAllocator;
use errside_core::intern::StringInterner;
use errside_parser::{parse_file, ParsedFile};

/// Helper: parse a complete file, panicking on errors.
fn parse(source: &str) -> SourceFile {
    try_parse(source)
        .unwrap_or_else(|diags| panic!("parse failed for {:?}: {}", source, diags))
        .file
}

fn try_parse(source: &str) -> Result<ParsedFile, errside_diagnostics::DiagnosticCollection> {
    let interner = StringInterner::new();
    parse_file("test.go", source, &interner, NodeIdAllocator::new())
}

/// Helper: parse statements wrapped in a function body and return them.
fn parse_body(body: &str) -> Vec<Stmt> {
    let source = format!("package p\n\nfunc f() {{\n{}\n}}\n", body);
    let file = parse(&source);
    match file.decls.into_iter().next() {
        Some(Decl::Func(func)) => func.body.expect("body").stmts,
        other => panic!("expected func decl, got {:?}", other),
    }
}

/// Helper: the message of the first error.
fn first_error(source: &str) -> String {
    match try_parse(source) {
        Ok(_) => panic!("expected a parse error for {:?}", source),
        Err(diags) => diags.first_error().expect("error").to_string(),
    }
}

// ============================================================================
// Files and Declarations
// ============================================================================

#[test]
fn test_parse_package_clause() {
    let file = parse("package main\n");
    assert_eq!(file.package.text, "main");
    assert!(file.decls.is_empty());
}

#[test]
fn test_parse_imports() {
    let file = parse("package p\n\nimport \"fmt\"\nimport (\n\tio \"io\"\n\t. \"strings\"\n\t_ \"embed\"\n)\n");
    let paths: Vec<&str> = file.imports().map(|i| i.path_value()).collect();
    assert_eq!(paths, vec!["fmt", "io", "strings", "embed"]);
    let names: Vec<Option<&str>> = file
        .imports()
        .map(|i| i.name.as_ref().map(|n| n.text.as_str()))
        .collect();
    assert_eq!(names, vec![None, Some("io"), Some("."), Some("_")]);
}

#[test]
fn test_parse_const_group_records_iota() {
    let file = parse("package p\n\nconst (\n\tA = iota\n\tB\n\tC\n)\n");
    let Decl::Gen(gen) = &file.decls[0] else { panic!("expected gen decl") };
    assert_eq!(gen.tok, SyntaxKind::ConstKeyword);
    assert!(gen.lparen.is_some());
    let iotas: Vec<u32> = gen
        .specs
        .iter()
        .map(|s| match s {
            Spec::Value(v) => v.iota,
            _ => panic!("expected value spec"),
        })
        .collect();
    assert_eq!(iotas, vec![0, 1, 2]);
}

#[test]
fn test_parse_type_declarations() {
    let file = parse(
        "package p\n\ntype (\n\tID int\n\tAlias = ID\n\tPair struct {\n\t\tA, B int `json:\"a\"`\n\t\t*Embedded\n\t}\n\tReader interface {\n\t\tRead(p []byte) (n int, err error)\n\t\tio.Closer\n\t}\n)\n",
    );
    let Decl::Gen(gen) = &file.decls[0] else { panic!("expected gen decl") };
    assert_eq!(gen.specs.len(), 4);
    let Spec::Type(alias) = &gen.specs[1] else { panic!() };
    assert!(alias.alias);
    let Spec::Type(pair) = &gen.specs[2] else { panic!() };
    let Expr::StructType(st) = &pair.ty else { panic!("expected struct") };
    assert_eq!(st.fields.list.len(), 2);
    assert_eq!(st.fields.list[0].names.len(), 2);
    assert!(st.fields.list[0].tag.is_some());
    assert!(st.fields.list[1].names.is_empty());
    let Spec::Type(reader) = &gen.specs[3] else { panic!() };
    let Expr::InterfaceType(it) = &reader.ty else { panic!("expected interface") };
    assert_eq!(it.methods.list.len(), 2);
    assert!(matches!(it.methods.list[0].ty, Expr::FuncType(_)));
    assert!(matches!(it.methods.list[1].ty, Expr::Selector(_)));
}

#[test]
fn test_parse_function_signatures() {
    let file = parse(
        "package p\n\nfunc (s *S) M(a, b int, rest ...string) (int, error) { return 0, nil }\nfunc g(int, string) error\n",
    );
    let Decl::Func(m) = &file.decls[0] else { panic!() };
    assert!(m.recv.is_some());
    assert_eq!(m.ty.params.list.len(), 2);
    assert_eq!(m.ty.params.arity(), 3);
    assert!(matches!(m.ty.params.list[1].ty, Expr::Ellipsis(_)));
    assert_eq!(m.ty.results.as_ref().map(|r| r.arity()), Some(2));

    let Decl::Func(g) = &file.decls[1] else { panic!() };
    assert!(g.body.is_none());
    assert!(g.ty.params.list.iter().all(|f| f.names.is_empty()));
    let results = g.ty.results.as_ref().expect("results");
    assert!(!results.delimited);
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_parse_assign_then_if() {
    let stmts = parse_body("\tf, err := open(name)\n\tif err != nil {\n\t\treturn err\n\t}");
    assert_eq!(stmts.len(), 2);
    let Stmt::Assign(assign) = &stmts[0] else { panic!("expected assignment") };
    assert!(assign.is_define());
    assert_eq!(assign.lhs.len(), 2);
    assert_eq!(assign.rhs.len(), 1);
    let Stmt::If(if_stmt) = &stmts[1] else { panic!("expected if") };
    let Expr::Binary(cond) = &if_stmt.cond else { panic!("expected binary") };
    assert_eq!(cond.op, SyntaxKind::ExclamationEqualsToken);
    assert_eq!(if_stmt.body.stmts.len(), 1);
}

#[test]
fn test_parse_if_with_init_and_else_chain() {
    let stmts = parse_body("\tif x := f(); x > 0 {\n\t} else if x < 0 {\n\t} else {\n\t}");
    let Stmt::If(if_stmt) = &stmts[0] else { panic!() };
    assert!(if_stmt.init.is_some());
    let Some(Stmt::If(chained)) = &if_stmt.else_ else { panic!("expected else if") };
    assert!(matches!(chained.else_, Some(Stmt::Block(_))));
}

#[test]
fn test_parse_for_forms() {
    let stmts = parse_body(
        "\tfor i := 0; i < 10; i++ {\n\t}\n\tfor cond {\n\t}\n\tfor {\n\t}\n\tfor k, v := range m {\n\t}\n\tfor range ch {\n\t}",
    );
    assert_eq!(stmts.len(), 5);
    let Stmt::For(three) = &stmts[0] else { panic!() };
    assert!(three.init.is_some() && three.cond.is_some() && three.post.is_some());
    let Stmt::For(cond_only) = &stmts[1] else { panic!() };
    assert!(cond_only.init.is_none() && cond_only.cond.is_some());
    let Stmt::For(forever) = &stmts[2] else { panic!() };
    assert!(forever.cond.is_none());
    let Stmt::Range(kv) = &stmts[3] else { panic!() };
    assert_eq!(kv.tok, Some(SyntaxKind::ColonEqualsToken));
    assert!(kv.key.is_some() && kv.value.is_some());
    let Stmt::Range(bare) = &stmts[4] else { panic!() };
    assert!(bare.key.is_none() && bare.tok.is_none());
}

#[test]
fn test_parse_switch_and_type_switch() {
    let stmts = parse_body(
        "\tswitch x := f(); x {\n\tcase 1, 2:\n\t\tg()\n\tdefault:\n\t}\n\tswitch v := y.(type) {\n\tcase int, string:\n\tcase nil:\n\t}",
    );
    let Stmt::Switch(sw) = &stmts[0] else { panic!() };
    assert!(sw.init.is_some() && sw.tag.is_some());
    assert_eq!(sw.clauses.len(), 2);
    assert_eq!(sw.clauses[0].list.as_ref().map(Vec::len), Some(2));
    assert!(sw.clauses[1].list.is_none());
    let Stmt::TypeSwitch(ts) = &stmts[1] else { panic!("expected type switch") };
    assert_eq!(ts.binding.as_ref().map(|b| b.text.as_str()), Some("v"));
    assert_eq!(ts.clauses.len(), 2);
}

#[test]
fn test_parse_select() {
    let stmts = parse_body("\tselect {\n\tcase v := <-in:\n\t\tuse(v)\n\tcase out <- 1:\n\tdefault:\n\t}");
    let Stmt::Select(sel) = &stmts[0] else { panic!() };
    assert_eq!(sel.clauses.len(), 3);
    assert!(matches!(sel.clauses[0].comm, Some(Stmt::Assign(_))));
    assert!(matches!(sel.clauses[1].comm, Some(Stmt::Send(_))));
    assert!(sel.clauses[2].comm.is_none());
}

#[test]
fn test_parse_simple_statements() {
    let stmts = parse_body(
        "\tx++\n\ty -= 2\n\tch <- v\n\tgo run()\n\tdefer close(ch)\n\tgoto end\nend:\n\tvar z, w int = 1, 2\n\tconst c = 3\n\ttype T struct{}",
    );
    let kinds: Vec<&str> = stmts
        .iter()
        .map(|s| match s {
            Stmt::IncDec(_) => "incdec",
            Stmt::Assign(_) => "assign",
            Stmt::Send(_) => "send",
            Stmt::Go(_) => "go",
            Stmt::Defer(_) => "defer",
            Stmt::Branch(_) => "branch",
            Stmt::Labeled(_) => "labeled",
            Stmt::Decl(_) => "decl",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["incdec", "assign", "send", "go", "defer", "branch", "labeled", "decl", "decl"]
    );
}

#[test]
fn test_empty_statements_are_dropped() {
    let stmts = parse_body("\ta();;\n\t;\n\tb()");
    assert_eq!(stmts.len(), 2);
}

// ============================================================================
// Expressions
// ============================================================================

/// Helper: parse a single expression statement.
fn parse_expr(expr: &str) -> Expr {
    let mut stmts = parse_body(&format!("\t_ = {}", expr));
    let Some(Stmt::Assign(assign)) = stmts.pop() else { panic!("expected assignment") };
    assign.rhs.into_iter().next().expect("rhs")
}

#[test]
fn test_binary_precedence() {
    let Expr::Binary(or) = parse_expr("a || b && c == d + e*f") else { panic!() };
    assert_eq!(or.op, SyntaxKind::BarBarToken);
    let Expr::Binary(and) = &or.y else { panic!() };
    assert_eq!(and.op, SyntaxKind::AmpersandAmpersandToken);
    let Expr::Binary(eq) = &and.y else { panic!() };
    assert_eq!(eq.op, SyntaxKind::EqualsEqualsToken);
    let Expr::Binary(add) = &eq.y else { panic!() };
    assert_eq!(add.op, SyntaxKind::PlusToken);
    assert!(matches!(&add.y, Expr::Binary(mul) if mul.op == SyntaxKind::AsteriskToken));
}

#[test]
fn test_binary_operators_are_left_associative() {
    let Expr::Binary(outer) = parse_expr("a - b - c") else { panic!() };
    assert!(matches!(outer.x, Expr::Binary(_)));
    assert!(matches!(outer.y, Expr::Ident(_)));

    let Expr::Binary(outer) = parse_expr("a * b / c") else { panic!() };
    assert_eq!(outer.op, SyntaxKind::SlashToken);
    assert!(matches!(outer.x, Expr::Binary(_)));
}

#[test]
fn test_unary_and_receive() {
    assert!(matches!(parse_expr("!ok"), Expr::Unary(u) if u.op == SyntaxKind::ExclamationToken));
    assert!(matches!(parse_expr("<-ch"), Expr::Unary(u) if u.op == SyntaxKind::ArrowToken));
    assert!(matches!(parse_expr("*p"), Expr::Star(_)));
    assert!(matches!(parse_expr("&T{}"), Expr::Unary(u) if u.op == SyntaxKind::AmpersandToken));
}

#[test]
fn test_primary_expressions() {
    let Expr::Call(call) = parse_expr("fmt.Sprintf(\"%d\", xs...)") else { panic!() };
    assert!(call.ellipsis);
    assert!(matches!(call.fun, Expr::Selector(_)));

    let Expr::Slice(slice) = parse_expr("b[1:n:cap(b)]") else { panic!() };
    assert!(slice.slice3);

    assert!(matches!(parse_expr("m[k]"), Expr::Index(_)));
    assert!(matches!(parse_expr("v.(io.Reader)"), Expr::TypeAssert(t) if t.ty.is_some()));
    assert!(matches!(parse_expr("(*T)(p)"), Expr::Call(_)));
}

#[test]
fn test_composite_literals() {
    let Expr::CompositeLit(lit) = parse_expr("map[string][]int{\"a\": {1, 2}, \"b\": nil}") else {
        panic!()
    };
    assert_eq!(lit.elts.len(), 2);
    let Expr::KeyValue(kv) = &lit.elts[0] else { panic!() };
    assert!(matches!(&kv.value, Expr::CompositeLit(inner) if inner.ty.is_none()));

    assert!(matches!(parse_expr("[...]string{\"x\"}"), Expr::CompositeLit(_)));
    assert!(matches!(parse_expr("struct{ A int }{A: 1}"), Expr::CompositeLit(_)));
}

#[test]
fn test_composite_literal_in_control_clause_needs_parens() {
    // `T{` in an if header opens the body, not a literal.
    let stmts = parse_body("\tif x == (T{}) {\n\t}");
    assert_eq!(stmts.len(), 1);
    let stmts = parse_body("\tfor _, v := range []int{1, 2} {\n\t\tuse(v)\n\t}");
    assert_eq!(stmts.len(), 1);
}

#[test]
fn test_func_literal() {
    let Expr::FuncLit(lit) = parse_expr("func(x int) error {\n\t\treturn nil\n\t}") else {
        panic!()
    };
    assert_eq!(lit.body.stmts.len(), 1);
}

#[test]
fn test_channel_types() {
    let file = parse("package p\n\nvar a chan int\nvar b <-chan int\nvar c chan<- int\n");
    let dirs: Vec<_> = file
        .decls
        .iter()
        .map(|d| match d {
            Decl::Gen(gen) => match &gen.specs[0] {
                Spec::Value(v) => match &v.ty {
                    Some(Expr::ChanType(c)) => c.dir,
                    other => panic!("expected chan type, got {:?}", other),
                },
                _ => panic!(),
            },
            _ => panic!(),
        })
        .collect();
    use errside_ast::types::ChanDir;
    assert_eq!(dirs, vec![ChanDir::BOTH, ChanDir::RECV, ChanDir::SEND]);
}

// ============================================================================
// Ranges and ids
// ============================================================================

#[test]
fn test_statement_ranges() {
    let source = "package p\n\nfunc f() {\n\tx, err := g()\n\tif err != nil {\n\t\treturn\n\t}\n}\n";
    let file = parse(source);
    let Decl::Func(func) = &file.decls[0] else { panic!() };
    let stmts = &func.body.as_ref().expect("body").stmts;
    assert_eq!(&source[stmts[0].range().to_range()], "x, err := g()");
    assert_eq!(&source[stmts[1].range().to_range()], "if err != nil {\n\t\treturn\n\t}");
}

#[test]
fn test_node_ids_continue_across_files() {
    let interner = StringInterner::new();
    let first = parse_file("a.go", "package p\n\nvar x = 1\n", &interner, NodeIdAllocator::new())
        .expect("parse a.go");
    let start = first.ids.count();
    let second = parse_file("b.go", "package p\n\nvar y = 2\n", &interner, first.ids)
        .expect("parse b.go");
    assert!(second.file.package.data.id.0 >= start);
    assert_eq!(interner.get("p"), Some(first.file.package.name));
}

#[test]
fn test_comments_are_attached_to_file() {
    let file = parse("// Package p.\npackage p\n\n// f does things.\nfunc f() {} // trailing\n");
    assert_eq!(file.comments.len(), 3);
    assert_eq!(file.comments[2].text, "// trailing");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_package_clause() {
    assert_eq!(first_error("func f() {}\n"), "test.go:1:1: expected 'package', found 'func'");
}

#[test]
fn test_unexpected_token_reports_position() {
    let message = first_error("package p\n\nfunc f() {\n\tx := \n}\n");
    assert!(message.starts_with("test.go:5:1:"), "{}", message);
    assert!(message.contains("expected operand"), "{}", message);
}

#[test]
fn test_non_name_on_left_of_define() {
    let message = first_error("package p\n\nfunc f() {\n\ta.b := 1\n}\n");
    assert!(message.contains("non-name a.b on left side of :="), "{}", message);
}

#[test]
fn test_type_parameters_rejected() {
    let message = first_error("package p\n\nfunc Map[T any](x T) T { return x }\n");
    assert!(message.contains("type parameters are not supported"), "{}", message);
}

#[test]
fn test_mixed_parameters_rejected() {
    let message = first_error("package p\n\nfunc f(a int, string) {}\n");
    assert!(message.contains("mixed named and unnamed parameters"), "{}", message);
}

#[test]
fn test_scanner_errors_fail_the_parse() {
    let message = first_error("package p\n\nvar s = \"open\n");
    assert!(message.contains("newline in string"), "{}", message);
}

#[test]
fn test_deep_nesting_is_rejected() {
    let source = format!("package p\n\nvar x = {}1{}\n", "(".repeat(400), ")".repeat(400));
    let message = first_error(&source);
    assert!(message.contains("nested too deeply"), "{}", message);
}
