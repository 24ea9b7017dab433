//! Binder integration tests.
//!
//! Tests the parse -> bind pipeline and verifies which identifier occurrences
//! declare symbols and which refer to them.

use errside_ast::node::*;
use errside_ast::types::{NodeId, NodeIdAllocator, SymbolId};
use errside_ast::visitor::AstVisitor;
use errside_binder::{Binder, Bindings, SymbolKind};
use errside_core::intern::StringInterner;
use errside_diagnostics::DiagnosticCollection;

struct Bound {
    files: Vec<SourceFile>,
    bindings: Bindings,
    diagnostics: DiagnosticCollection,
}

/// Helper: parse and bind one or more files of the same package.
fn bind_files(sources: &[&str]) -> Bound {
    let interner = StringInterner::new();
    let mut ids = NodeIdAllocator::new();
    let mut files = Vec::new();
    for (i, source) in sources.iter().enumerate() {
        let name = format!("f{}.go", i);
        let parsed = errside_parser::parse_file(&name, source, &interner, ids)
            .unwrap_or_else(|d| panic!("parse failed: {}", d));
        ids = parsed.ids;
        files.push(parsed.file);
    }
    let mut binder = Binder::new(interner);
    binder.bind_package(&files);
    let diagnostics = binder.take_diagnostics();
    let bindings = binder.finish("p");
    Bound {
        files,
        bindings,
        diagnostics,
    }
}

fn bind(source: &str) -> Bound {
    bind_files(&[source])
}

/// Collects every identifier with its position.
#[derive(Default)]
struct IdentCollector {
    idents: Vec<(u32, NodeId, String)>,
}

impl AstVisitor for IdentCollector {
    fn visit_ident(&mut self, ident: &Ident) {
        self.idents.push((ident.data.range.pos, ident.data.id, ident.text.clone()));
    }
}

impl Bound {
    /// The node id of the `nth` (zero-based) identifier spelled `name`, in
    /// source order.
    fn ident(&self, name: &str, nth: usize) -> NodeId {
        let mut collector = IdentCollector::default();
        collector.visit_source_file(&self.files[0]);
        collector.idents.sort_by_key(|(pos, _, _)| *pos);
        collector
            .idents
            .iter()
            .filter(|(_, _, text)| text == name)
            .nth(nth)
            .map(|(_, id, _)| *id)
            .unwrap_or_else(|| panic!("no occurrence {} of {}", nth, name))
    }

    /// The symbol an occurrence declares or refers to.
    fn resolved(&self, name: &str, nth: usize) -> SymbolId {
        let id = self.ident(name, nth);
        self.bindings
            .def_of(id)
            .or_else(|| self.bindings.use_of(id))
            .unwrap_or_else(|| panic!("occurrence {} of {} is unbound", nth, name))
    }

    fn is_def(&self, name: &str, nth: usize) -> bool {
        self.bindings.def_of(self.ident(name, nth)).is_some()
    }

    fn is_use(&self, name: &str, nth: usize) -> bool {
        self.bindings.use_of(self.ident(name, nth)).is_some()
    }

    fn messages(&self) -> Vec<String> {
        self.diagnostics
            .diagnostics()
            .iter()
            .map(|d| d.message_text.clone())
            .collect()
    }
}

// ============================================================================
// Declarations and Uses
// ============================================================================

#[test]
fn test_short_var_decl_defines_then_uses() {
    let b = bind("package p\n\nfunc f() error {\n\tx, err := g()\n\tif err != nil {\n\t\treturn err\n\t}\n\t_ = x\n\treturn nil\n}\n\nfunc g() (int, error) { return 0, nil }\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    assert!(b.is_def("err", 0));
    assert!(b.is_use("err", 1));
    assert_eq!(b.resolved("err", 0), b.resolved("err", 1));
    assert_eq!(b.resolved("err", 0), b.resolved("err", 2));
    assert!(b.is_use("g", 0));
    assert!(b.is_def("g", 1));
}

#[test]
fn test_redeclaration_reuses_existing_variable() {
    let b = bind("package p\n\nfunc f() {\n\ta, err := g()\n\tc, err := g()\n\t_, _ = a, c\n\t_ = err\n}\n\nfunc g() (int, error) { return 0, nil }\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    assert!(b.is_def("err", 0));
    // The second `:=` reuses err and only declares c.
    assert!(b.is_use("err", 1));
    assert!(!b.is_def("err", 1));
    assert!(b.is_def("c", 0));
    assert_eq!(b.resolved("err", 0), b.resolved("err", 1));
}

#[test]
fn test_shadowing_in_inner_scope_creates_new_symbol() {
    let b = bind("package p\n\nfunc f() error {\n\terr := h()\n\tif true {\n\t\terr := h()\n\t\t_ = err\n\t}\n\treturn err\n}\n\nfunc h() error { return nil }\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    assert!(b.is_def("err", 1));
    assert_ne!(b.resolved("err", 0), b.resolved("err", 1));
    assert_eq!(b.resolved("err", 1), b.resolved("err", 2));
    assert_eq!(b.resolved("err", 0), b.resolved("err", 3));
}

#[test]
fn test_named_results_are_in_function_scope() {
    let b = bind("package p\n\nfunc f() (n int, err error) {\n\tn, err = 1, nil\n\treturn\n}\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    assert!(b.is_def("err", 0));
    assert!(b.is_use("err", 1));
}

#[test]
fn test_no_new_variables_is_an_error() {
    let b = bind("package p\n\nfunc f() {\n\tx := 1\n\tx := 2\n\t_ = x\n}\n");
    assert_eq!(b.messages(), vec!["no new variables on left side of :="]);
}

#[test]
fn test_undefined_name_is_an_error() {
    let b = bind("package p\n\nfunc f() {\n\tmissing()\n}\n");
    assert_eq!(b.messages(), vec!["undefined: missing"]);
    let diag = &b.diagnostics.diagnostics()[0];
    assert_eq!(diag.to_string(), "f0.go:4:2: undefined: missing");
}

#[test]
fn test_redeclared_in_block() {
    let b = bind("package p\n\nfunc f() {\n\tvar a int\n\tvar a string\n}\n");
    assert_eq!(b.messages(), vec!["a redeclared in this block"]);
}

// ============================================================================
// Package Scope
// ============================================================================

#[test]
fn test_package_level_names_visible_across_files() {
    let b = bind_files(&[
        "package p\n\nfunc f() error {\n\treturn helper()\n}\n",
        "package p\n\nfunc helper() error { return nil }\n",
    ]);
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    let helper = b.resolved("helper", 0);
    let symbol = b.bindings.symbol(helper).expect("symbol");
    assert_eq!(symbol.kind, SymbolKind::Func);
    assert!(symbol.package_level);
}

#[test]
fn test_package_vars_visible_before_declaration() {
    let b = bind("package p\n\nvar a = b\nvar b = 1\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    assert_eq!(b.resolved("b", 0), b.resolved("b", 1));
}

#[test]
fn test_methods_are_not_in_package_scope() {
    let b = bind("package p\n\ntype T struct{}\n\nfunc (t T) Close() error { return nil }\n\nfunc f() {\n\tClose()\n}\n");
    assert_eq!(b.messages(), vec!["undefined: Close"]);
}

#[test]
fn test_imports_bind_package_names() {
    let b = bind("package p\n\nimport (\n\t\"fmt\"\n\tstr \"strings\"\n)\n\nfunc f() {\n\tfmt.Println(str.ToUpper(\"x\"))\n}\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    let fmt = b.bindings.symbol(b.resolved("fmt", 0)).expect("fmt");
    assert_eq!(fmt.kind, SymbolKind::PkgName);
    assert_eq!(fmt.import_path.as_deref(), Some("fmt"));
    let strs = b.bindings.symbol(b.resolved("str", 1)).expect("str");
    assert_eq!(strs.import_path.as_deref(), Some("strings"));
    // Selected names are left for the checker.
    assert!(b.bindings.use_of(b.ident("Println", 0)).is_none());
}

#[test]
fn test_package_without_selector_is_an_error() {
    let b = bind("package p\n\nimport \"fmt\"\n\nvar x = fmt\n");
    assert_eq!(b.messages(), vec!["use of package fmt without selector"]);
}

#[test]
fn test_dot_import_defers_unresolved_names() {
    let b = bind("package p\n\nimport . \"strings\"\n\nvar x = ToUpper(\"a\")\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    let candidates = b
        .bindings
        .dot_import_candidates(b.ident("ToUpper", 0))
        .expect("deferred");
    assert_eq!(candidates, ["strings".to_string()]);
}

// ============================================================================
// Statement Scopes
// ============================================================================

#[test]
fn test_if_init_scope() {
    let b = bind("package p\n\nfunc f() {\n\tif err := g(); err != nil {\n\t\t_ = err\n\t} else {\n\t\t_ = err\n\t}\n}\n\nfunc g() error { return nil }\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    let def = b.resolved("err", 0);
    assert_eq!(def, b.resolved("err", 1));
    assert_eq!(def, b.resolved("err", 2));
    assert_eq!(def, b.resolved("err", 3));
}

#[test]
fn test_if_init_does_not_leak() {
    let b = bind("package p\n\nfunc f() {\n\tif v := 1; v > 0 {\n\t}\n\t_ = v\n}\n");
    assert_eq!(b.messages(), vec!["undefined: v"]);
}

#[test]
fn test_range_expression_resolves_outside_loop_scope() {
    let b = bind("package p\n\nfunc f(x []int) {\n\tfor _, x := range x {\n\t\t_ = x\n\t}\n}\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    let param = b.resolved("x", 0);
    let loop_var = b.resolved("x", 1);
    assert_ne!(param, loop_var);
    assert_eq!(b.resolved("x", 2), param);
    assert_eq!(b.resolved("x", 3), loop_var);
}

#[test]
fn test_type_switch_clause_variables() {
    let b = bind("package p\n\nfunc f(v interface{}) {\n\tswitch t := v.(type) {\n\tcase int:\n\t\t_ = t\n\tcase string:\n\t\t_ = t\n\t}\n}\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    // The guard binding declares nothing itself.
    assert!(!b.is_def("t", 0));
    let first = b.resolved("t", 1);
    let second = b.resolved("t", 2);
    assert_ne!(first, second);

    let Decl::Func(func) = &b.files[0].decls[0] else { panic!() };
    let Stmt::TypeSwitch(ts) = &func.body.as_ref().expect("body").stmts[0] else { panic!() };
    assert_eq!(b.bindings.implicit_of(ts.clauses[0].data.id), Some(first));
    assert_eq!(b.bindings.implicit_of(ts.clauses[1].data.id), Some(second));
}

#[test]
fn test_select_clause_scope() {
    let b = bind("package p\n\nfunc f(ch chan int) {\n\tselect {\n\tcase v := <-ch:\n\t\t_ = v\n\t}\n}\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    assert_eq!(b.resolved("v", 0), b.resolved("v", 1));
}

#[test]
fn test_func_literal_captures_outer_variable() {
    let b = bind("package p\n\nfunc f() {\n\tvar err error\n\tdo := func() {\n\t\t_ = err\n\t}\n\tdo()\n}\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    assert_eq!(b.resolved("err", 0), b.resolved("err", 1));
}

#[test]
fn test_struct_fields_and_composite_keys_are_not_bound() {
    let b = bind("package p\n\ntype T struct{ Name string }\n\nvar t = T{Name: \"x\"}\nvar m = map[string]int{key: 1}\n\nconst key = \"k\"\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    assert!(b.bindings.def_of(b.ident("Name", 0)).is_none());
    assert!(b.bindings.use_of(b.ident("Name", 1)).is_none());
    // A key that names a constant in scope is a use.
    assert_eq!(b.resolved("key", 0), b.resolved("key", 1));
}

#[test]
fn test_labels_are_not_bound() {
    let b = bind("package p\n\nfunc f() {\nouter:\n\tfor {\n\t\tbreak outer\n\t}\n}\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
}

#[test]
fn test_universe_names_resolve() {
    let b = bind("package p\n\nfunc f() error {\n\tvar s []string\n\ts = append(s, \"x\")\n\t_ = len(s)\n\treturn nil\n}\n");
    assert!(b.diagnostics.is_empty(), "{:?}", b.messages());
    let nil = b.bindings.symbol(b.resolved("nil", 0)).expect("nil");
    assert_eq!(nil.kind, SymbolKind::Nil);
    let error = b.bindings.symbol(b.resolved("error", 0)).expect("error");
    assert!(error.is_error_type());
}

#[test]
fn test_blank_identifier_as_value() {
    let b = bind("package p\n\nfunc f() {\n\tx := _\n\t_ = x\n}\n");
    assert_eq!(b.messages(), vec!["cannot use _ as value"]);
}
