//! errside_parser: Recursive descent parser for Go.
//!
//! Parses token streams from the scanner into an owned AST. Node ids are
//! drawn from a caller-provided allocator so that every file of a package
//! gets distinct ids.

mod parser;
mod precedence;
mod utilities;

pub use parser::{ParsedFile, Parser};

use errside_ast::types::NodeIdAllocator;
use errside_core::intern::StringInterner;
use errside_diagnostics::DiagnosticCollection;

/// Parse one file.
pub fn parse_file(
    file_name: &str,
    source_text: &str,
    interner: &StringInterner,
    ids: NodeIdAllocator,
) -> Result<ParsedFile, DiagnosticCollection> {
    Parser::new(file_name, source_text, interner.clone(), ids).parse_source_file()
}
