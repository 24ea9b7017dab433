//! Checker integration tests.
//!
//! Tests the full parse -> bind -> check pipeline and verifies diagnostics
//! and the types recorded for identifiers.

use errside_ast::node::*;
use errside_ast::types::{NodeId, NodeIdAllocator};
use errside_ast::visitor::AstVisitor;
use errside_binder::Binder;
use errside_checker::{check_package, TypeInfo};
use errside_core::intern::StringInterner;
use errside_diagnostics::DiagnosticCollection;
use errside_idiom::BindingOracle;

struct Checked {
    files: Vec<SourceFile>,
    info: TypeInfo,
    diagnostics: DiagnosticCollection,
}

/// Helper: run the full pipeline (parse -> bind -> check) over the files of
/// one package.
fn check_files(sources: &[&str]) -> Checked {
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
    let mut binder = Binder::new(interner.clone());
    binder.bind_package(&files);
    let bind_errors = binder.take_diagnostics();
    assert!(!bind_errors.has_errors(), "bind failed: {}", bind_errors);
    let bindings = binder.finish("p");
    let (info, diagnostics) = check_package(&files, bindings, &interner);
    Checked {
        files,
        info,
        diagnostics,
    }
}

fn check(source: &str) -> Checked {
    check_files(&[source])
}

/// Helper: error messages only.
fn check_source(source: &str) -> Vec<String> {
    check(source)
        .diagnostics
        .diagnostics()
        .iter()
        .filter(|d| d.is_error())
        .map(|d| d.message_text.clone())
        .collect()
}

#[derive(Default)]
struct IdentCollector {
    idents: Vec<(u32, NodeId, String)>,
}

impl AstVisitor for IdentCollector {
    fn visit_ident(&mut self, ident: &Ident) {
        self.idents.push((ident.data.range.pos, ident.data.id, ident.text.clone()));
    }
}

impl Checked {
    /// The type of the `nth` (zero-based) occurrence of `name` in the first
    /// file, as Go would print it.
    fn type_of(&self, name: &str, nth: usize) -> String {
        let mut collector = IdentCollector::default();
        collector.visit_source_file(&self.files[0]);
        collector.idents.sort_by_key(|(pos, _, _)| *pos);
        let id = collector
            .idents
            .iter()
            .filter(|(_, _, text)| text == name)
            .nth(nth)
            .map(|(_, id, _)| *id)
            .unwrap_or_else(|| panic!("no occurrence {} of {}", nth, name));
        self.info
            .type_string(id)
            .unwrap_or_else(|| panic!("occurrence {} of {} has no type", nth, name))
    }

    fn messages(&self) -> Vec<String> {
        self.diagnostics
            .diagnostics()
            .iter()
            .map(|d| d.to_string())
            .collect()
    }
}

// ============================================================================
// Valid Code (No Diagnostics Expected)
// ============================================================================

#[test]
fn test_valid_program() {
    let src = r#"package p

import (
	"fmt"
	"os"
)

func run(name string) error {
	f, err := os.Open(name)
	if err != nil {
		return fmt.Errorf("open %s: %w", name, err)
	}
	defer f.Close()
	return nil
}
"#;
    let checked = check(src);
    assert!(checked.diagnostics.is_empty(), "{:?}", checked.messages());
    assert_eq!(checked.type_of("f", 0), "*os.File");
    assert_eq!(checked.type_of("err", 0), "error");
    assert_eq!(checked.type_of("err", 1), "error");
    assert_eq!(checked.type_of("nil", 0), "untyped nil");
}

#[test]
fn test_valid_declarations() {
    let src = r#"package p

type Color int

const (
	Red Color = iota
	Green
	Blue
)

var palette = map[string]Color{"red": Red, "green": Green}

type point struct {
	x, y int
}

func (p *point) move(dx int) {
	p.x += dx
}
"#;
    let checked = check(src);
    assert!(checked.diagnostics.is_empty(), "{:?}", checked.messages());
    assert_eq!(checked.type_of("Green", 0), "p.Color");
    assert_eq!(checked.type_of("palette", 0), "map[string]p.Color");
}

// ============================================================================
// Inferred Variable Types
// ============================================================================

#[test]
fn test_multi_value_call_results() {
    let src = r#"package p

import "strconv"

func parse(s string) (int, error) {
	n, err := strconv.Atoi(s)
	return n, err
}

func use() {
	v, e := parse("1")
	_, _ = v, e
}
"#;
    let checked = check(src);
    assert!(checked.diagnostics.is_empty(), "{:?}", checked.messages());
    assert_eq!(checked.type_of("n", 0), "int");
    assert_eq!(checked.type_of("v", 0), "int");
    assert_eq!(checked.type_of("e", 0), "error");
}

#[test]
fn test_method_results() {
    let src = r#"package p

type store struct{}

func (s *store) load(key string) ([]byte, error) {
	return nil, nil
}

func get(s *store) {
	data, err := s.load("k")
	_, _ = data, err
}
"#;
    let checked = check(src);
    assert_eq!(checked.type_of("data", 0), "[]uint8");
    assert_eq!(checked.type_of("err", 0), "error");
}

#[test]
fn test_embedded_interface_methods() {
    let src = r#"package p

import "io"

func closeAll(rc io.ReadCloser) {
	err := rc.Close()
	_ = err
}
"#;
    let checked = check(src);
    assert_eq!(checked.type_of("err", 0), "error");
}

#[test]
fn test_struct_fields_through_pointers() {
    let src = r#"package p

import "os"

func cause(e *os.PathError) {
	inner := e.Err
	op := e.Op
	_, _ = inner, op
}
"#;
    let checked = check(src);
    assert_eq!(checked.type_of("inner", 0), "error");
    assert_eq!(checked.type_of("op", 0), "string");
}

#[test]
fn test_user_error_type_is_not_error() {
    let src = r#"package p

type failure struct{}

func (failure) Error() string { return "failed" }

func inspect() {
	var f failure
	err := f
	_ = err
}
"#;
    let checked = check(src);
    assert_eq!(checked.type_of("err", 0), "p.failure");
}

#[test]
fn test_range_variables() {
    let src = r#"package p

func walk(lines []string, counts map[string]int, ch chan bool, s string) {
	for i, line := range lines {
		_, _ = i, line
	}
	for k, v := range counts {
		_, _ = k, v
	}
	for b := range ch {
		_ = b
	}
	for j, r := range s {
		_, _ = j, r
	}
}
"#;
    let checked = check(src);
    assert_eq!(checked.type_of("i", 0), "int");
    assert_eq!(checked.type_of("line", 0), "string");
    assert_eq!(checked.type_of("k", 0), "string");
    assert_eq!(checked.type_of("v", 0), "int");
    assert_eq!(checked.type_of("b", 0), "bool");
    assert_eq!(checked.type_of("r", 0), "int32");
}

#[test]
fn test_comma_ok_forms() {
    let src = r#"package p

func probe(m map[string]int, x any, ch chan string) {
	n, ok := m["k"]
	s, isString := x.(string)
	msg, open := <-ch
	_, _, _, _, _, _ = n, ok, s, isString, msg, open
}
"#;
    let checked = check(src);
    assert!(checked.diagnostics.is_empty(), "{:?}", checked.messages());
    assert_eq!(checked.type_of("n", 0), "int");
    assert_eq!(checked.type_of("ok", 0), "bool");
    assert_eq!(checked.type_of("s", 0), "string");
    assert_eq!(checked.type_of("msg", 0), "string");
}

#[test]
fn test_type_switch_clause_variables() {
    let src = r#"package p

func describe(x any) {
	switch v := x.(type) {
	case int:
		_ = v
	case string, bool:
		_ = v
	}
}
"#;
    let checked = check(src);
    assert_eq!(checked.type_of("v", 1), "int");
    assert_eq!(checked.type_of("v", 2), "interface{}");
}

#[test]
fn test_builtins_and_conversions() {
    let src = r#"package p

type ids []int

func build(s string) {
	n := len(s)
	m := make(map[string]int)
	ptr := new(int)
	b := []byte(s)
	list := append(ids(nil), 1)
	_, _, _, _, _ = n, m, ptr, b, list
}
"#;
    let checked = check(src);
    assert!(checked.diagnostics.is_empty(), "{:?}", checked.messages());
    assert_eq!(checked.type_of("n", 0), "int");
    assert_eq!(checked.type_of("m", 0), "map[string]int");
    assert_eq!(checked.type_of("ptr", 0), "*int");
    assert_eq!(checked.type_of("b", 0), "[]uint8");
    assert_eq!(checked.type_of("list", 0), "p.ids");
}

#[test]
fn test_func_literal_parameters() {
    let src = r#"package p

func apply() {
	f := func(path string, err error) error {
		return err
	}
	_ = f
}
"#;
    let checked = check(src);
    assert_eq!(checked.type_of("path", 0), "string");
    assert_eq!(checked.type_of("err", 1), "error");
    assert_eq!(checked.type_of("f", 0), "func(string, error) error");
}

#[test]
fn test_package_vars_across_files() {
    let checked = check_files(&[
        "package p\n\nfunc f() {\n\tx := limit\n\t_ = x\n}\n",
        "package p\n\nvar limit = 2.5\n",
    ]);
    assert!(checked.diagnostics.is_empty(), "{:?}", checked.messages());
    assert_eq!(checked.type_of("x", 0), "float64");
}

#[test]
fn test_dot_import() {
    let src = "package p\n\nimport . \"strings\"\n\nfunc f() {\n\ts := ToUpper(\"x\")\n\t_ = s\n}\n";
    let checked = check(src);
    assert_eq!(checked.type_of("s", 0), "string");
}

#[test]
fn test_oracle_predicates() {
    let src = "package p\n\nimport \"errors\"\n\nfunc f() {\n\terr := errors.New(\"x\")\n\t_ = err != nil\n}\n";
    let checked = check(src);
    let mut collector = IdentCollector::default();
    collector.visit_source_file(&checked.files[0]);
    let id_of = |name: &str| {
        collector
            .idents
            .iter()
            .filter(|(_, _, text)| text == name)
            .map(|(_, id, _)| *id)
            .last()
            .unwrap()
    };
    let err_type = checked.info.type_of(id_of("err")).unwrap();
    let nil_type = checked.info.type_of(id_of("nil")).unwrap();
    assert!(checked.info.is_error_type(err_type));
    assert!(!checked.info.is_untyped_nil(err_type));
    assert!(checked.info.is_untyped_nil(nil_type));
    assert!(checked.info.use_of(id_of("err")).is_some());
}

// ============================================================================
// Type Errors
// ============================================================================

#[test]
fn test_untyped_nil_in_short_declaration() {
    let diags = check_source("package p\n\nfunc f() {\n\tx := nil\n\t_ = x\n}\n");
    assert_eq!(diags, vec!["use of untyped nil in assignment"]);
}

#[test]
fn test_untyped_nil_in_var_declaration() {
    let diags = check_source("package p\n\nvar x = nil\n");
    assert_eq!(diags, vec!["use of untyped nil in assignment"]);
}

#[test]
fn test_assignment_mismatch() {
    let src = "package p\n\nfunc one() int { return 1 }\n\nfunc f() {\n\ta, b := one()\n\t_, _ = a, b\n}\n";
    assert_eq!(check_source(src), vec!["assignment mismatch: 2 variables but 1 values"]);
}

#[test]
fn test_assignment_mismatch_position() {
    let src = "package p\n\nfunc two() (int, int) { return 1, 2 }\n\nfunc f() {\n\tx := two()\n\t_ = x\n}\n";
    let checked = check(src);
    assert_eq!(
        checked.messages(),
        vec!["f0.go:6:2: assignment mismatch: 1 variables but 2 values"]
    );
}

#[test]
fn test_call_of_non_function() {
    let src = "package p\n\nfunc f() {\n\tcount := 1\n\tcount()\n}\n";
    assert_eq!(check_source(src), vec!["invalid operation: cannot call non-function count"]);
}

#[test]
fn test_unexported_package_member() {
    let src = "package p\n\nimport \"fmt\"\n\nfunc f() {\n\tfmt.println(\"x\")\n}\n";
    assert_eq!(check_source(src), vec!["undefined: fmt.println"]);
}

#[test]
fn test_undescribed_exported_member_is_not_an_error() {
    let src = "package p\n\nimport \"fmt\"\n\nfunc f() {\n\tfmt.Append(nil, 1)\n}\n";
    assert!(check_source(src).is_empty());
}

#[test]
fn test_not_a_type() {
    let src = "package p\n\nvar size int\n\nvar buf size\n";
    assert_eq!(check_source(src), vec!["size is not a type"]);
}

#[test]
fn test_invalid_recursive_type() {
    let src = "package p\n\ntype A B\n\ntype B A\n";
    let diags = check_source(src);
    assert_eq!(diags.len(), 1, "{:?}", diags);
    assert!(diags[0].starts_with("invalid recursive type"));
}

#[test]
fn test_recursive_pointer_type_is_valid() {
    let src = "package p\n\ntype node struct {\n\tnext *node\n}\n\nfunc f(n *node) {\n\tm := n.next.next\n\t_ = m\n}\n";
    let checked = check(src);
    assert!(checked.diagnostics.is_empty(), "{:?}", checked.messages());
    assert_eq!(checked.type_of("m", 0), "*p.node");
}

#[test]
fn test_initialization_cycle() {
    let diags = check_source("package p\n\nvar a = b\n\nvar b = a\n");
    assert_eq!(diags.len(), 1, "{:?}", diags);
    assert!(diags[0].starts_with("initialization cycle"));
}

// ============================================================================
// Imports
// ============================================================================

#[test]
fn test_unknown_import_is_a_warning() {
    let src = r#"package p

import "github.com/acme/widgets"

func f() {
	w, err := widgets.Make()
	_, _ = w, err
}
"#;
    let checked = check(src);
    assert!(!checked.diagnostics.has_errors());
    assert_eq!(
        checked.messages(),
        vec!["f0.go:3:8: warning: could not import \"github.com/acme/widgets\" (no type information available)"]
    );
    assert_eq!(checked.type_of("err", 0), "invalid type");
}
