//! errside_compiler: Directory driver.
//!
//! Discovers the Go files of a directory, parses them into packages, resolves
//! every package, then merges and re-renders each file in name order.

mod program;

pub use program::{Package, Program, RenderedFile};

use errside_diagnostics::DiagnosticCollection;
use errside_idiom::BindingConflict;
use errside_printer::RenderConfig;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Why a directory could not be processed.
///
/// Everything except [`DriverError::Fatal`] is scoped to one directory; a
/// fatal error means the resolved bindings contradict themselves and the run
/// must stop.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no buildable Go source files in {}", .0.display())]
    NoGoFiles(PathBuf),
    #[error("{0}")]
    Parse(DiagnosticCollection),
    #[error("{0}")]
    Check(DiagnosticCollection),
    #[error("writing output: {0}")]
    Output(#[source] std::io::Error),
    #[error(transparent)]
    Fatal(#[from] BindingConflict),
}

impl DriverError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, DriverError::Fatal(_))
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        DriverError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What processing one directory produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirReport {
    pub files: usize,
    pub composites: usize,
}

/// The `*.go` regular files directly inside `dir`, sorted by name.
pub fn discover_go_files(dir: &Path) -> Result<Vec<PathBuf>, DriverError> {
    let entries = std::fs::read_dir(dir).map_err(|e| DriverError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DriverError::io(dir, e))?;
        let path = entry.path();
        let is_file = entry.file_type().map_err(|e| DriverError::io(&path, e))?.is_file();
        if is_file && path.extension().is_some_and(|ext| ext == "go") {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(DriverError::NoGoFiles(dir.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

/// Read a source file, rejecting invalid UTF-8.
fn read_source(path: &Path) -> Result<String, DriverError> {
    let bytes = std::fs::read(path).map_err(|e| DriverError::io(path, e))?;
    match simdutf8::basic::from_utf8(&bytes) {
        Ok(text) => Ok(text.to_owned()),
        Err(e) => Err(DriverError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )),
    }
}

/// Parse every Go file of `dir`.
pub fn load_dir(dir: &Path) -> Result<Program, DriverError> {
    let mut program = Program::new();
    for path in discover_go_files(dir)? {
        let text = read_source(&path)?;
        program.add_source(&path.display().to_string(), &text)?;
    }
    Ok(program)
}

/// Process one directory, writing a `== file <path> ==` header and the
/// re-rendered text of every file to `out`.
///
/// Nothing is written unless every package of the directory resolves.
pub fn process_dir(
    dir: &Path,
    config: &RenderConfig,
    out: &mut dyn Write,
) -> Result<DirReport, DriverError> {
    let program = load_dir(dir)?;
    info!(dir = %dir.display(), files = program.file_count(), packages = program.packages().len(), "processing");

    let rendered = program.render(config)?;
    let mut report = DirReport::default();
    for file in &rendered {
        writeln!(out, "== file {} ==", file.file_name).map_err(DriverError::Output)?;
        out.write_all(file.text.as_bytes()).map_err(DriverError::Output)?;
        report.files += 1;
        report.composites += file.ranges.len();
    }
    info!(dir = %dir.display(), composites = report.composites, "done");
    Ok(report)
}

/// Merge and render a single in-memory file.
pub fn render_source(
    file_name: &str,
    source_text: &str,
    config: &RenderConfig,
) -> Result<String, DriverError> {
    let mut program = Program::new();
    program.add_source(file_name, source_text)?;
    let mut rendered = program.render(config)?;
    Ok(rendered.pop().map(|file| file.text).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_source_without_checks() {
        let source = "package p\n\nfunc f() int {\n\treturn 1\n}\n";
        assert_eq!(render_source("p.go", source, &RenderConfig::default()).unwrap(), source);
    }

    #[test]
    fn test_check_error() {
        let source = "package p\n\nfunc f() int {\n\treturn missing\n}\n";
        let err = render_source("p.go", source, &RenderConfig::default()).unwrap_err();
        assert!(matches!(err, DriverError::Check(_)));
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "p.go:4:9: undefined: missing");
    }

    #[test]
    fn test_no_go_files_message() {
        let err = DriverError::NoGoFiles(PathBuf::from("empty"));
        assert_eq!(err.to_string(), "no buildable Go source files in empty");
    }
}
