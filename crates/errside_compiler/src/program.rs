//! The files of one directory, grouped into packages.

use crate::DriverError;
use errside_ast::node::SourceFile;
use errside_ast::types::NodeIdAllocator;
use errside_binder::Binder;
use errside_checker::TypeInfo;
use errside_core::intern::StringInterner;
use errside_idiom::ErrRange;
use errside_printer::{render, RenderConfig};
use tracing::{debug, warn};

/// The files that share one package clause.
#[derive(Debug)]
pub struct Package {
    pub name: String,
    pub files: Vec<SourceFile>,
}

/// One re-rendered file.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub file_name: String,
    pub text: String,
    pub ranges: Vec<ErrRange>,
}

/// All parsed files of one directory. Node ids are unique across the whole
/// program, so merged statements drawn from the same allocator never collide
/// with parsed ones.
pub struct Program {
    interner: StringInterner,
    ids: NodeIdAllocator,
    /// Sorted by package name.
    packages: Vec<Package>,
}

impl Program {
    pub fn new() -> Self {
        Self {
            interner: StringInterner::new(),
            ids: NodeIdAllocator::new(),
            packages: Vec::new(),
        }
    }

    /// Parse a file and add it to the package named by its package clause.
    pub fn add_source(&mut self, file_name: &str, source_text: &str) -> Result<(), DriverError> {
        let parsed = errside_parser::parse_file(file_name, source_text, &self.interner, self.ids)
            .map_err(DriverError::Parse)?;
        self.ids = parsed.ids;

        let file = parsed.file;
        let name = file.package.text.clone();
        match self.packages.binary_search_by(|p| p.name.as_str().cmp(&name)) {
            Ok(index) => self.packages[index].files.push(file),
            Err(index) => self.packages.insert(index, Package { name, files: vec![file] }),
        }
        Ok(())
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn file_count(&self) -> usize {
        self.packages.iter().map(|p| p.files.len()).sum()
    }

    /// Resolve every package, then merge and print every file.
    ///
    /// All packages are checked before the first file is rendered, so a type
    /// error anywhere yields no output at all.
    pub fn render(mut self, config: &RenderConfig) -> Result<Vec<RenderedFile>, DriverError> {
        let mut infos = Vec::with_capacity(self.packages.len());
        for package in &self.packages {
            infos.push(check(package, &self.interner)?);
        }

        let mut rendered = Vec::with_capacity(self.file_count());
        for (package, info) in self.packages.iter_mut().zip(&infos) {
            for file in &mut package.files {
                let ranges = errside_idiom::merge_file(file, info, &mut self.ids)?;
                for range in &ranges {
                    debug!(file = %range.file, start = range.start_line, end = range.end_line, "composite");
                }
                rendered.push(RenderedFile {
                    file_name: file.file_name.clone(),
                    text: render(file, config),
                    ranges,
                });
            }
        }
        Ok(rendered)
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

/// Bind and type-check one package. Warnings are logged and dropped.
fn check(package: &Package, interner: &StringInterner) -> Result<TypeInfo, DriverError> {
    let mut binder = Binder::new(interner.clone());
    binder.bind_package(&package.files);
    let mut diagnostics = binder.take_diagnostics();
    if diagnostics.has_errors() {
        diagnostics.sort();
        return Err(DriverError::Check(diagnostics));
    }
    let bindings = binder.finish(package.name.clone());

    let (info, checked) = errside_checker::check_package(&package.files, bindings, interner);
    diagnostics.extend(checked);
    diagnostics.sort();
    if diagnostics.has_errors() {
        return Err(DriverError::Check(diagnostics));
    }
    for warning in diagnostics.diagnostics() {
        warn!("{}", warning);
    }
    debug!(package = %package.name, files = package.files.len(), "resolved package");
    Ok(info)
}
