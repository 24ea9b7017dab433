//! Token information produced by the scanner.

use errside_ast::syntax_kind::SyntaxKind;
use errside_core::text::TextRange;

/// Information about a scanned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    /// The kind of token.
    pub kind: SyntaxKind,
    /// Start position in the source text.
    pub pos: u32,
    /// End position in the source text (exclusive).
    pub end: u32,
    /// The text of identifiers and literals. An automatically inserted
    /// semicolon carries `"\n"`.
    pub text: String,
}

impl TokenInfo {
    pub fn new(kind: SyntaxKind, pos: u32, end: u32) -> Self {
        Self {
            kind,
            pos,
            end,
            text: String::new(),
        }
    }

    pub fn with_text(mut self, text: String) -> Self {
        self.text = text;
        self
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.pos, self.end)
    }

    /// Whether this is a semicolon the scanner inserted at a line end.
    pub fn is_implicit_semicolon(&self) -> bool {
        self.kind == SyntaxKind::SemicolonToken && self.text == "\n"
    }
}
