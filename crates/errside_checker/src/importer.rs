//! Type information for imported packages.
//!
//! Standard library packages are described by Go sources holding only
//! declarations, embedded in the binary. They go through the same parser,
//! binder, and checker as user code, into the importing package's
//! [`TypeTable`]. Any other import path yields an opaque package whose
//! members all have the invalid type.

use crate::checker::Checker;
use crate::types::TypeTable;
use errside_ast::types::{NodeIdAllocator, TypeId};
use errside_binder::{guess_package_name, Binder, SymbolKind};
use errside_core::intern::StringInterner;
use errside_core::{FxMap, FxSet};
use errside_parser::parse_file;
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Import path -> declaration-only source.
const STUBS: &[(&str, &str)] = &[
    ("bufio", include_str!("../stubs/bufio.go")),
    ("bytes", include_str!("../stubs/bytes.go")),
    ("compress/gzip", include_str!("../stubs/compress_gzip.go")),
    ("context", include_str!("../stubs/context.go")),
    ("crypto/rand", include_str!("../stubs/crypto_rand.go")),
    ("database/sql", include_str!("../stubs/database_sql.go")),
    ("encoding/base64", include_str!("../stubs/encoding_base64.go")),
    ("encoding/csv", include_str!("../stubs/encoding_csv.go")),
    ("encoding/hex", include_str!("../stubs/encoding_hex.go")),
    ("encoding/json", include_str!("../stubs/encoding_json.go")),
    ("encoding/xml", include_str!("../stubs/encoding_xml.go")),
    ("errors", include_str!("../stubs/errors.go")),
    ("fmt", include_str!("../stubs/fmt.go")),
    ("io", include_str!("../stubs/io.go")),
    ("io/fs", include_str!("../stubs/io_fs.go")),
    ("io/ioutil", include_str!("../stubs/io_ioutil.go")),
    ("log", include_str!("../stubs/log.go")),
    ("net", include_str!("../stubs/net.go")),
    ("net/http", include_str!("../stubs/net_http.go")),
    ("net/url", include_str!("../stubs/net_url.go")),
    ("os", include_str!("../stubs/os.go")),
    ("os/exec", include_str!("../stubs/os_exec.go")),
    ("path/filepath", include_str!("../stubs/path_filepath.go")),
    ("regexp", include_str!("../stubs/regexp.go")),
    ("sort", include_str!("../stubs/sort.go")),
    ("strconv", include_str!("../stubs/strconv.go")),
    ("strings", include_str!("../stubs/strings.go")),
    ("sync", include_str!("../stubs/sync.go")),
    ("text/template", include_str!("../stubs/text_template.go")),
    ("time", include_str!("../stubs/time.go")),
];

/// An exported name of an imported package.
#[derive(Debug, Clone, Copy)]
pub struct Member {
    pub kind: SymbolKind,
    /// For type names, the type itself.
    pub ty: TypeId,
}

#[derive(Debug)]
pub struct Package {
    pub path: String,
    pub name: String,
    pub members: IndexMap<String, Member>,
    /// No type information is available.
    pub opaque: bool,
}

impl Package {
    fn opaque(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: guess_package_name(path),
            members: IndexMap::new(),
            opaque: true,
        }
    }
}

/// Whether an import path has an embedded description.
pub fn has_stub(path: &str) -> bool {
    STUBS.iter().any(|(stub, _)| *stub == path)
}

/// Loads and caches imported packages.
pub struct Importer {
    interner: StringInterner,
    packages: FxMap<String, Package>,
    /// Paths being loaded, to cut import cycles between descriptions.
    loading: FxSet<String>,
}

impl Importer {
    pub fn new(interner: StringInterner) -> Self {
        Self {
            interner,
            packages: FxMap::default(),
            loading: FxSet::default(),
        }
    }

    /// The package for an import path, loading it on first use.
    pub fn import(&mut self, path: &str, table: &mut TypeTable) -> &Package {
        if !self.packages.contains_key(path) {
            let package = self.load(path, table);
            self.packages.insert(path.to_string(), package);
        }
        &self.packages[path]
    }

    pub fn loaded_count(&self) -> usize {
        self.packages.len()
    }

    fn load(&mut self, path: &str, table: &mut TypeTable) -> Package {
        let Some(&(_, source)) = STUBS.iter().find(|(stub, _)| *stub == path) else {
            warn!(path, "no type information for package");
            return Package::opaque(path);
        };
        if !self.loading.insert(path.to_string()) {
            debug!(path, "import cycle between package descriptions");
            return Package::opaque(path);
        }
        let package = self.load_stub(path, source, table);
        self.loading.remove(path);
        package
    }

    fn load_stub(&mut self, path: &str, source: &str, table: &mut TypeTable) -> Package {
        let file_name = format!("{}.go", path);
        let parsed = match parse_file(&file_name, source, &self.interner, NodeIdAllocator::new()) {
            Ok(parsed) => parsed,
            Err(diagnostics) => {
                warn!(path, %diagnostics, "package description does not parse");
                return Package::opaque(path);
            }
        };
        let files = vec![parsed.file];
        let name = files[0].package.text.clone();

        let mut binder = Binder::new(self.interner.clone());
        binder.bind_package(&files);
        let diagnostics = binder.take_diagnostics();
        if diagnostics.has_errors() {
            warn!(path, %diagnostics, "package description does not bind");
            return Package::opaque(path);
        }
        let bindings = binder.finish(name.clone());

        let mut checker = Checker::new(table, self, &bindings, &files, path);
        checker.check_package();
        let diagnostics = checker.take_diagnostics();
        if diagnostics.has_errors() {
            debug!(path, %diagnostics, "package description has type errors");
        }

        let mut members = IndexMap::new();
        let exported: Vec<_> = bindings
            .package_members()
            .filter_map(|sym| bindings.symbol(sym))
            .filter(|symbol| symbol.name_text.starts_with(|c: char| c.is_uppercase()))
            .collect();
        for symbol in exported {
            let ty = checker.type_of_symbol(symbol.id);
            members.insert(
                symbol.name_text.clone(),
                Member {
                    kind: symbol.kind,
                    ty,
                },
            );
        }
        members.sort_keys();
        debug!(path, members = members.len(), "loaded package description");

        Package {
            path: path.to_string(),
            name,
            members,
            opaque: false,
        }
    }
}
