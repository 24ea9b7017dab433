//! Driver integration tests.
//!
//! Runs whole directories under `testdata/` through discovery, resolution,
//! merging, and rendering.

use errside_compiler::{discover_go_files, process_dir, render_source, DirReport, DriverError};
use errside_printer::RenderConfig;
use std::fs;
use std::path::{Path, PathBuf};

fn testdata(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
}

/// Process a directory with the default configuration, returning the
/// report and everything written.
fn run(dir: &Path) -> Result<(DirReport, String), DriverError> {
    let mut out = Vec::new();
    let report = process_dir(dir, &RenderConfig::default(), &mut out)?;
    Ok((report, String::from_utf8(out).expect("utf-8 output")))
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn test_discovery_is_sorted_and_filtered() {
    let files = discover_go_files(&testdata("multi")).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["lib.go", "lib_test.go"]);
}

#[test]
fn test_directory_without_go_files() {
    let dir = std::env::temp_dir().join(format!("errside_empty_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("notes.txt"), "nothing here").unwrap();

    let err = run(&dir).unwrap_err();
    assert!(matches!(err, DriverError::NoGoFiles(_)));
    assert!(err.to_string().starts_with("no buildable Go source files in "));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_directory() {
    let err = run(&testdata("does_not_exist")).unwrap_err();
    assert!(matches!(err, DriverError::Io { .. }));
    assert!(!err.is_fatal());
}

// ============================================================================
// Whole directories
// ============================================================================

#[test]
fn test_example_directory() {
    let dir = testdata("example");
    let (report, out) = run(&dir).unwrap();
    assert_eq!(report, DirReport { files: 1, composites: 4 });

    let header = format!("== file {} ==\n", dir.join("example.go").display());
    assert!(out.starts_with(&header), "{}", out);

    // Short leading parts pad out to column 40.
    assert!(out.contains("\tf := os.Open(fname)\t\tif err != nil {\n"), "{}", out);
    assert!(out.contains("\tbs := ioutil.ReadAll(res.Body)\tif err != nil {\n"), "{}", out);
    // Long ones break the line.
    assert!(
        out.contains("\treq := http.NewRequest(\"GET\", urlStr, nil)\n\t\t\t\t\tif err != nil {\n"),
        "{}",
        out
    );
    assert!(out.contains("\tres := http.DefaultClient.Do(req)\n\t\t\t\t\tif err != nil {\n"), "{}", out);

    // Checks that are not `err != nil` right after the assignment stay put.
    assert!(out.contains("\tbytes, err := ioutil.ReadAll(f)\n\tif err == io.EOF {\n"), "{}", out);
    assert!(out.contains("\tif !(err == nil) {\n"), "{}", out);
    assert!(out.contains("\tif err := f.Close(); err != nil {\n"), "{}", out);
    assert!(out.contains("\t\treq.Header.Add(\"X-User-IP\", \"0.0.0.0\") // hack\n"), "{}", out);
}

#[test]
fn test_package_spread_over_files() {
    let dir = testdata("fetch");
    let (report, out) = run(&dir).unwrap();
    assert_eq!(report, DirReport { files: 2, composites: 1 });

    let first = out.find("fetch.go ==").expect("fetch.go header");
    let second = out.find("folders.go ==").expect("folders.go header");
    assert!(first < second);
    assert!(out.contains("\tdirs := getContentFolders(to)\tif err != nil {\n"), "{}", out);
    assert!(out.contains("\tif err := cloneRepo(to, from); err != nil {\n"), "{}", out);
}

#[test]
fn test_two_packages_in_one_directory() {
    let (report, out) = run(&testdata("multi")).unwrap();
    assert_eq!(report, DirReport { files: 2, composites: 2 });
    assert!(out.contains("\tn := strconv.Atoi(s)\t\tif err != nil {\n"), "{}", out);
    assert!(out.contains("\terrors.New(\"boom\")\t\tif err != nil {\n"), "{}", out);
}

#[test]
fn test_os_exec_and_regexp_are_resolved() {
    let (report, out) = run(&testdata("shell")).unwrap();
    assert_eq!(report, DirReport { files: 1, composites: 3 });
    assert!(
        out.contains("\tout := exec.Command(tool, \"--version\").Output()\n\t\t\t\t\tif err != nil {\n"),
        "{}",
        out
    );
    assert!(out.contains("\tre := regexp.Compile(\"[0-9]+\")\tif err != nil {\n"), "{}", out);
    assert!(out.contains("\tout := exec.Command(\"ls\").Output()\n\t\t\t\t\tif err != nil {\n"), "{}", out);
}

#[test]
fn test_type_error_writes_nothing() {
    let mut out = Vec::new();
    let err = process_dir(&testdata("broken"), &RenderConfig::default(), &mut out).unwrap_err();
    assert!(matches!(err, DriverError::Check(_)));
    assert!(err.to_string().ends_with("undefined: undefinedCall"), "{}", err);
    assert!(out.is_empty());
}

#[test]
fn test_directories_are_independent() {
    let mut out = Vec::new();
    let config = RenderConfig::default();
    let results: Vec<bool> = ["broken", "fetch"]
        .iter()
        .map(|name| process_dir(&testdata(name), &config, &mut out).is_ok())
        .collect();
    assert_eq!(results, [false, true]);
    assert!(String::from_utf8(out).unwrap().contains("fetch.go =="));
}

// ============================================================================
// In-memory sources
// ============================================================================

#[test]
fn test_render_source_merges() {
    let source = "package main

import \"os\"

func main() {
\terr := os.Chdir(\"/\")
\tif err != nil {
\t\tpanic(err)
\t}
}
";
    let out = render_source("main.go", source, &RenderConfig::default()).unwrap();
    assert!(out.contains("\tos.Chdir(\"/\")\t\t\tif err != nil {\n\t\t\t\t\t\tpanic(err)\n\t\t\t\t\t}\n"), "{}", out);
}

#[test]
fn test_render_source_parse_error() {
    let err = render_source("main.go", "package main\n\nfunc main( {\n", &RenderConfig::default()).unwrap_err();
    assert!(matches!(err, DriverError::Parse(_)));
    assert!(err.to_string().starts_with("main.go:3:"), "{}", err);
}
