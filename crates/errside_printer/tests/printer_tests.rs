//! Printer tests.
//!
//! Unmerged files must come back exactly as gofmt would leave them; merged
//! files get their conditionals in the side column.

use errside_ast::types::NodeIdAllocator;
use errside_binder::Binder;
use errside_core::intern::StringInterner;
use errside_printer::{render, visual_width, RenderConfig};

/// Parse and print without merging.
fn format(source: &str) -> String {
    let interner = StringInterner::new();
    let parsed = errside_parser::parse_file("main.go", source, &interner, NodeIdAllocator::new())
        .unwrap_or_else(|d| panic!("parse failed: {}", d));
    render(&parsed.file, &RenderConfig::default())
}

/// Parse, resolve, merge, and print.
fn render_merged(source: &str, config: RenderConfig) -> String {
    let interner = StringInterner::new();
    let parsed = errside_parser::parse_file("main.go", source, &interner, NodeIdAllocator::new())
        .unwrap_or_else(|d| panic!("parse failed: {}", d));
    let mut ids = parsed.ids;
    let mut files = vec![parsed.file];

    let mut binder = Binder::new(interner.clone());
    binder.bind_package(&files);
    let diagnostics = binder.take_diagnostics();
    assert!(!diagnostics.has_errors(), "{}", diagnostics);
    let bindings = binder.finish(files[0].package.text.clone());
    let (info, diagnostics) = errside_checker::check_package(&files, bindings, &interner);
    assert!(!diagnostics.has_errors(), "{}", diagnostics);

    errside_idiom::merge_file(&mut files[0], &info, &mut ids).expect("no conflict");
    render(&files[0], &config)
}

fn with_column(column: usize) -> RenderConfig {
    RenderConfig {
        column,
        ..RenderConfig::default()
    }
}

const OPEN: &str = "package main

import \"os\"

func run(name string) error {
\tf, err := os.Open(name)
\tif err != nil {
\t\treturn err
\t}
\tdefer f.Close()
\treturn nil
}
";

// ============================================================================
// Plain formatting
// ============================================================================

#[test]
fn test_gofmt_source_is_unchanged() {
    let source = "// Package shapes computes areas.
package shapes

import (
\t\"fmt\"
\t\"strings\"
)

const (
\tA = iota
\tB
)

var names = map[string]int{
\t\"a\": 1,
\t\"b\": 2,
}

type Shape interface {
\tArea() float64
\tName() string
}

type Rect struct {
\tW, H float64
}

func (r *Rect) Area() float64 {
\treturn r.W * r.H
}

// Describe lists shapes.
func Describe(shapes []Shape) string {
\tvar parts []string
\tfor i, s := range shapes {
\t\t// Skip empty names.
\t\tif s.Name() == \"\" {
\t\t\tcontinue
\t\t}

\t\tparts = append(parts, fmt.Sprintf(\"%d: %s\", i, s.Name())) // one per shape
\t}
\tswitch len(parts) {
\tcase 0:
\t\treturn \"none\"
\tdefault:
\t\treturn strings.Join(parts, \", \")
\t}
}

func wait(ch chan int, done <-chan struct{}) int {
\tselect {
\tcase v := <-ch:
\t\treturn v
\tcase <-done:
\t\treturn 0
\t}
}

func kind(x interface{}) string {
\tswitch v := x.(type) {
\tcase int, int64:
\t\treturn \"int\"
\tcase string:
\t\t_ = v
\t\treturn \"string\"
\t}
\tfor i := 0; i < 3; i++ {
\t\tfmt.Println(\"a\",
\t\t\t\"b\")
\t}
\treturn \"other\"
}
";
    assert_eq!(format(source), source);
}

#[test]
fn test_blank_lines_collapse_to_one() {
    let source = "package p\n\nfunc f() {\n\ta := 1\n\n\n\n\tb := a\n\t_ = b\n}\n";
    let expected = "package p\n\nfunc f() {\n\ta := 1\n\n\tb := a\n\t_ = b\n}\n";
    assert_eq!(format(source), expected);
}

#[test]
fn test_unmerged_file_is_unchanged() {
    let source = "package main

func run(err error) error {
\tif err != nil {
\t\treturn err
\t}
\treturn nil
}
";
    assert_eq!(render_merged(source, RenderConfig::default()), source);
}

#[test]
fn test_one_line_function_bodies_stay() {
    let source = "package p

func call(a, b int) int { return a + b }

func pair() (int, error) { x := 1; return x, nil }

var noop = func() error { return nil }

func empty() {}
";
    assert_eq!(format(source), source);
}

#[test]
fn test_one_line_body_with_a_block_expands() {
    let source = "package p\n\nfunc abs(x int) int { if x < 0 { return -x }; return x }\n";
    let expected = "package p

func abs(x int) int {
\tif x < 0 {
\t\treturn -x
\t}
\treturn x
}
";
    assert_eq!(format(source), expected);
}

#[test]
fn test_wide_one_line_body_expands() {
    let source = "package p\n\nfunc describe(name string) string { return name + \" is a rather long description that goes past the limit\" }\n";
    let expected = "package p

func describe(name string) string {
\treturn name + \" is a rather long description that goes past the limit\"
}
";
    assert_eq!(format(source), expected);
}

#[test]
fn test_comment_inside_parameters_stays() {
    let source = "package p

func add(a int /* inline */, b int) int {
\treturn a + b
}

func none(/* nothing */) {
\tadd(/* first */ 1, 2 /* second */)
}
";
    assert_eq!(format(source), source);
}

#[test]
fn test_comment_after_argument_stays() {
    let source = "package p

import \"fmt\"

func show() {
\tfmt.Println(\"a\", // first
\t\t\"b\")
\tfmt.Println( // heading
\t\t\"c\",
\t)
}
";
    assert_eq!(format(source), source);
}

#[test]
fn test_broken_parameter_list_is_kept() {
    let source = "package p

func open(
\tname string, // file to read
\tflag int,
) error {
\treturn nil
}
";
    assert_eq!(format(source), source);
}

// ============================================================================
// Side column
// ============================================================================

#[test]
fn test_conditional_moves_to_column() {
    let expected = "package main

import \"os\"

func run(name string) error {
\tf := os.Open(name)\t\tif err != nil {
\t\t\t\t\t\treturn err
\t\t\t\t\t}
\tdefer f.Close()
\treturn nil
}
";
    let out = render_merged(OPEN, RenderConfig::default());
    assert_eq!(out, expected);

    let line = out.lines().find(|l| l.contains("if err")).expect("merged line");
    let at = line.find("if err").expect("if");
    assert_eq!(visual_width(&line[..at], 8), 40);
}

#[test]
fn test_single_target_keeps_only_the_call() {
    let source = "package main

import \"os\"

func clean(name string) error {
\terr := os.Remove(name)
\tif err != nil {
\t\treturn err
\t}
\treturn nil
}
";
    let out = render_merged(source, RenderConfig::default());
    assert!(out.contains("\tos.Remove(name)\t\t\tif err != nil {\n"), "{}", out);
    assert!(!out.contains("err :="), "{}", out);
}

#[test]
fn test_other_column() {
    let out = render_merged(OPEN, with_column(60));
    assert!(out.contains("\tf := os.Open(name)\t\t\t\t    if err != nil {\n"), "{}", out);
    assert!(out.contains("\n\t\t\t\t\t\t\t        return err\n"), "{}", out);
    assert!(out.contains("\n\t\t\t\t\t\t\t    }\n"), "{}", out);
}

#[test]
fn test_column_changes_only_merged_lines() {
    let a = render_merged(OPEN, with_column(40));
    let b = render_merged(OPEN, with_column(56));
    assert_ne!(a, b);
    let a_lines: Vec<&str> = a.lines().collect();
    let b_lines: Vec<&str> = b.lines().collect();
    assert_eq!(a_lines.len(), b_lines.len());
    for (x, y) in a_lines.iter().zip(&b_lines) {
        let x_words: Vec<&str> = x.split_whitespace().collect();
        let y_words: Vec<&str> = y.split_whitespace().collect();
        assert_eq!(x_words, y_words);
    }
    for line in ["package main", "import \"os\"", "\tdefer f.Close()", "\treturn nil"] {
        assert!(a_lines.contains(&line) && b_lines.contains(&line), "{}", line);
    }
}

#[test]
fn test_use_spaces() {
    let config = RenderConfig {
        use_spaces: true,
        ..RenderConfig::default()
    };
    let out = render_merged(OPEN, config);
    let pad = " ".repeat(14);
    assert!(out.contains(&format!("\tf := os.Open(name){}if err != nil {{\n", pad)), "{}", out);
    assert!(out.contains(&format!("\n{}\treturn err\n", " ".repeat(40))), "{}", out);
    assert!(out.contains(&format!("\n{}}}\n", " ".repeat(40))), "{}", out);
}

#[test]
fn test_long_leading_part_breaks_the_line() {
    let out = render_merged(OPEN, with_column(16));
    assert!(out.contains("\tf := os.Open(name)\n\t\tif err != nil {\n\t\t\treturn err\n\t\t}\n"), "{}", out);
}

#[test]
fn test_deep_indentation_falls_back() {
    let out = render_merged(OPEN, with_column(8));
    assert!(out.contains("\tf := os.Open(name)\n\tif err != nil {\n\t\treturn err\n\t}\n"), "{}", out);
}

#[test]
fn test_else_branch_follows_the_anchor() {
    let source = "package main

import \"strconv\"

func parse(s string) int {
\tn, err := strconv.Atoi(s)
\tif err != nil {
\t\treturn 0
\t} else {
\t\tn++
\t}
\treturn n
}
";
    let out = render_merged(source, RenderConfig::default());
    let expected = "\tn := strconv.Atoi(s)\t\tif err != nil {
\t\t\t\t\t\treturn 0
\t\t\t\t\t} else {
\t\t\t\t\t\tn++
\t\t\t\t\t}
\treturn n
";
    assert!(out.contains(expected), "{}", out);
}

#[test]
fn test_nested_composite_inside_side_column() {
    let source = "package main

import \"os\"

func run(name string) error {
\tf, err := os.Open(name)
\tif err != nil {
\t\terr2 := os.Remove(name)
\t\tif err2 != nil {
\t\t\treturn err2
\t\t}
\t\treturn err
\t}
\treturn f.Close()
}
";
    let out = render_merged(source, RenderConfig::default());
    let expected = "\tf := os.Open(name)\t\tif err != nil {
\t\t\t\t\t\tos.Remove(name)
\t\t\t\t\t\tif err2 != nil {
\t\t\t\t\t\t\treturn err2
\t\t\t\t\t\t}
\t\t\t\t\t\treturn err
\t\t\t\t\t}
\treturn f.Close()
";
    assert!(out.contains(expected), "{}", out);
}

#[test]
fn test_comments_survive_merging() {
    let source = "package main

import \"os\"

func run(name string) error {
\t// open the file
\tf, err := os.Open(name) // may fail
\tif err != nil {
\t\treturn err // give up
\t}
\treturn f.Close()
}
";
    let out = render_merged(source, RenderConfig::default());
    let expected = "\t// open the file
\t// may fail
\tf := os.Open(name)\t\tif err != nil {
\t\t\t\t\t\treturn err // give up
\t\t\t\t\t}
\treturn f.Close()
";
    assert!(out.contains(expected), "{}", out);
}

#[test]
fn test_reassignment_keeps_its_operator() {
    let source = "package main

import \"os\"

func run(name string) (err error) {
\tvar f *os.File
\tf, err = os.Create(name)
\tif err != nil {
\t\treturn
\t}
\treturn f.Close()
}
";
    let out = render_merged(source, RenderConfig::default());
    assert!(out.contains("\tf = os.Create(name)\t\tif err != nil {\n"), "{}", out);
}
