//! The Go scanner.
//!
//! Converts source text into the token stream the parser consumes,
//! inserting semicolons at line ends the way the Go specification requires
//! and collecting comments on the side.

use crate::char_codes::*;
use crate::token::TokenInfo;
use errside_ast::node::Comment;
use errside_ast::syntax_kind::SyntaxKind;
use errside_core::text::TextRange;
use errside_diagnostics::messages::*;
use errside_diagnostics::{Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// The scanner converts Go source text into tokens.
pub struct Scanner<'t> {
    /// The source text being scanned.
    text: &'t str,
    bytes: &'t [u8],
    /// File name used for diagnostics.
    file_name: String,
    /// Current position in the text.
    pos: usize,
    /// Start of the current token.
    token_start: usize,
    /// End of the current token. Differs from `pos` only for inserted
    /// semicolons, which are empty.
    token_end: usize,
    /// The current token kind.
    token: SyntaxKind,
    /// The text of the current token (for identifiers, literals, etc.).
    token_value: String,
    /// Whether a newline at this point ends a statement.
    insert_semi: bool,
    comments: Vec<Comment>,
    /// Accumulated diagnostics.
    diagnostics: DiagnosticCollection,
}

impl<'t> Scanner<'t> {
    /// Create a new scanner for the given source text.
    pub fn new(text: &'t str, file_name: &str) -> Self {
        let pos = if text.starts_with('\u{FEFF}') { 3 } else { 0 };
        Self {
            text,
            bytes: text.as_bytes(),
            file_name: file_name.to_string(),
            pos,
            token_start: pos,
            token_end: pos,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
            insert_semi: false,
            comments: Vec::new(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Get the current token kind.
    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Get the current token's text value.
    #[inline]
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    #[inline]
    pub fn token_start(&self) -> u32 {
        self.token_start as u32
    }

    #[inline]
    pub fn token_end(&self) -> u32 {
        self.token_end as u32
    }

    pub fn token_range(&self) -> TextRange {
        TextRange::new(self.token_start(), self.token_end())
    }

    /// Get a TokenInfo for the current token.
    pub fn token_info(&self) -> TokenInfo {
        TokenInfo::new(self.token, self.token_start(), self.token_end())
            .with_text(self.token_value.clone())
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    /// Get the accumulated diagnostics.
    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Take the comments seen so far.
    pub fn take_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.comments)
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn error(&mut self, start: usize, end: usize, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.add(Diagnostic::with_location(
            self.file_name.clone(),
            TextRange::new(start as u32, end as u32),
            message,
            args,
        ));
    }

    /// Scan the next token.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_value.clear();
        loop {
            while !self.is_eof() && is_white_space_single_line(self.bytes[self.pos]) {
                self.pos += 1;
            }
            self.token_start = self.pos;

            if self.is_eof() {
                if self.insert_semi {
                    return self.implicit_semicolon(self.pos);
                }
                self.token_end = self.pos;
                self.token = SyntaxKind::EndOfFileToken;
                return self.token;
            }

            match (self.bytes[self.pos], self.byte_at(1)) {
                (b'\n', _) => {
                    let newline = self.pos;
                    self.pos += 1;
                    if self.insert_semi {
                        return self.implicit_semicolon(newline);
                    }
                }
                (b'/', Some(b'/')) => self.scan_line_comment(),
                (b'/', Some(b'*')) => {
                    let start = self.pos;
                    if self.scan_block_comment() && self.insert_semi {
                        return self.implicit_semicolon(start);
                    }
                }
                _ => break,
            }
        }

        let kind = self.scan_token();
        self.token_end = self.pos;
        self.token = kind;
        self.insert_semi = matches!(
            kind,
            SyntaxKind::Identifier
                | SyntaxKind::IntLiteral
                | SyntaxKind::FloatLiteral
                | SyntaxKind::ImaginaryLiteral
                | SyntaxKind::RuneLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::BreakKeyword
                | SyntaxKind::ContinueKeyword
                | SyntaxKind::FallthroughKeyword
                | SyntaxKind::ReturnKeyword
                | SyntaxKind::PlusPlusToken
                | SyntaxKind::MinusMinusToken
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken
        );
        kind
    }

    fn implicit_semicolon(&mut self, at: usize) -> SyntaxKind {
        self.insert_semi = false;
        self.token_start = at;
        self.token_end = at;
        self.token_value.push('\n');
        self.token = SyntaxKind::SemicolonToken;
        self.token
    }

    fn scan_line_comment(&mut self) {
        let start = self.pos;
        let end = match memchr::memchr(b'\n', &self.bytes[start..]) {
            Some(offset) => start + offset,
            None => self.bytes.len(),
        };
        let text = self.text[start..end].trim_end_matches('\r');
        self.comments.push(Comment {
            range: TextRange::new(start as u32, (start + text.len()) as u32),
            text: text.to_string(),
        });
        self.pos = end;
    }

    /// Returns whether the comment spans a line break.
    fn scan_block_comment(&mut self) -> bool {
        let start = self.pos;
        let body = start + 2;
        let end = match memchr::memmem::find(&self.bytes[body..], b"*/") {
            Some(offset) => body + offset + 2,
            None => {
                self.error(start, self.bytes.len(), &COMMENT_NOT_TERMINATED, &[]);
                self.bytes.len()
            }
        };
        self.comments.push(Comment {
            range: TextRange::new(start as u32, end as u32),
            text: self.text[start..end].to_string(),
        });
        self.pos = end;
        memchr::memchr(b'\n', &self.bytes[start..end]).is_some()
    }

    fn scan_token(&mut self) -> SyntaxKind {
        let b = self.bytes[self.pos];
        match b {
            b'0'..=b'9' => return self.scan_number(),
            b'.' if self.byte_at(1).is_some_and(is_decimal_digit) => return self.scan_number(),
            b'"' => return self.scan_string(),
            b'`' => return self.scan_raw_string(),
            b'\'' => return self.scan_rune(),
            _ => {}
        }

        if let Some(kind) = self.scan_operator(b) {
            return kind;
        }

        let Some(ch) = self.current_char() else {
            self.pos += 1;
            return SyntaxKind::Unknown;
        };
        if is_identifier_start(ch) {
            return self.scan_identifier();
        }

        let start = self.pos;
        self.pos += ch.len_utf8();
        let shown = format!("U+{:04X} '{}'", ch as u32, ch);
        self.error(start, self.pos, &INVALID_CHARACTER, &[&shown]);
        SyntaxKind::Unknown
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        let start = self.pos;
        while let Some(ch) = self.current_char() {
            if !is_identifier_part(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        let text = &self.text[start..self.pos];
        self.token_value.push_str(text);
        SyntaxKind::from_keyword(text).unwrap_or(SyntaxKind::Identifier)
    }

    /// Longest-match operator scan. Returns `None` if `b` starts no operator.
    fn scan_operator(&mut self, b: u8) -> Option<SyntaxKind> {
        let next = self.byte_at(1);
        let third = self.byte_at(2);
        let (kind, len) = match (b, next, third) {
            (b'+', Some(b'+'), _) => (SyntaxKind::PlusPlusToken, 2),
            (b'+', Some(b'='), _) => (SyntaxKind::PlusEqualsToken, 2),
            (b'+', _, _) => (SyntaxKind::PlusToken, 1),
            (b'-', Some(b'-'), _) => (SyntaxKind::MinusMinusToken, 2),
            (b'-', Some(b'='), _) => (SyntaxKind::MinusEqualsToken, 2),
            (b'-', _, _) => (SyntaxKind::MinusToken, 1),
            (b'*', Some(b'='), _) => (SyntaxKind::AsteriskEqualsToken, 2),
            (b'*', _, _) => (SyntaxKind::AsteriskToken, 1),
            (b'/', Some(b'='), _) => (SyntaxKind::SlashEqualsToken, 2),
            (b'/', _, _) => (SyntaxKind::SlashToken, 1),
            (b'%', Some(b'='), _) => (SyntaxKind::PercentEqualsToken, 2),
            (b'%', _, _) => (SyntaxKind::PercentToken, 1),
            (b'&', Some(b'&'), _) => (SyntaxKind::AmpersandAmpersandToken, 2),
            (b'&', Some(b'^'), Some(b'=')) => (SyntaxKind::AmpersandCaretEqualsToken, 3),
            (b'&', Some(b'^'), _) => (SyntaxKind::AmpersandCaretToken, 2),
            (b'&', Some(b'='), _) => (SyntaxKind::AmpersandEqualsToken, 2),
            (b'&', _, _) => (SyntaxKind::AmpersandToken, 1),
            (b'|', Some(b'|'), _) => (SyntaxKind::BarBarToken, 2),
            (b'|', Some(b'='), _) => (SyntaxKind::BarEqualsToken, 2),
            (b'|', _, _) => (SyntaxKind::BarToken, 1),
            (b'^', Some(b'='), _) => (SyntaxKind::CaretEqualsToken, 2),
            (b'^', _, _) => (SyntaxKind::CaretToken, 1),
            (b'<', Some(b'<'), Some(b'=')) => (SyntaxKind::LessThanLessThanEqualsToken, 3),
            (b'<', Some(b'<'), _) => (SyntaxKind::LessThanLessThanToken, 2),
            (b'<', Some(b'='), _) => (SyntaxKind::LessThanEqualsToken, 2),
            (b'<', Some(b'-'), _) => (SyntaxKind::ArrowToken, 2),
            (b'<', _, _) => (SyntaxKind::LessThanToken, 1),
            (b'>', Some(b'>'), Some(b'=')) => (SyntaxKind::GreaterThanGreaterThanEqualsToken, 3),
            (b'>', Some(b'>'), _) => (SyntaxKind::GreaterThanGreaterThanToken, 2),
            (b'>', Some(b'='), _) => (SyntaxKind::GreaterThanEqualsToken, 2),
            (b'>', _, _) => (SyntaxKind::GreaterThanToken, 1),
            (b'=', Some(b'='), _) => (SyntaxKind::EqualsEqualsToken, 2),
            (b'=', _, _) => (SyntaxKind::EqualsToken, 1),
            (b'!', Some(b'='), _) => (SyntaxKind::ExclamationEqualsToken, 2),
            (b'!', _, _) => (SyntaxKind::ExclamationToken, 1),
            (b':', Some(b'='), _) => (SyntaxKind::ColonEqualsToken, 2),
            (b':', _, _) => (SyntaxKind::ColonToken, 1),
            (b'.', Some(b'.'), Some(b'.')) => (SyntaxKind::DotDotDotToken, 3),
            (b'.', _, _) => (SyntaxKind::DotToken, 1),
            (b'~', _, _) => (SyntaxKind::TildeToken, 1),
            (b'(', _, _) => (SyntaxKind::OpenParenToken, 1),
            (b')', _, _) => (SyntaxKind::CloseParenToken, 1),
            (b'[', _, _) => (SyntaxKind::OpenBracketToken, 1),
            (b']', _, _) => (SyntaxKind::CloseBracketToken, 1),
            (b'{', _, _) => (SyntaxKind::OpenBraceToken, 1),
            (b'}', _, _) => (SyntaxKind::CloseBraceToken, 1),
            (b',', _, _) => (SyntaxKind::CommaToken, 1),
            (b';', _, _) => (SyntaxKind::SemicolonToken, 1),
            _ => return None,
        };
        self.pos += len;
        if kind == SyntaxKind::SemicolonToken {
            self.token_value.push(';');
        }
        Some(kind)
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        let mut kind = SyntaxKind::IntLiteral;
        let mut base = 10;
        let mut valid = true;

        if self.bytes[self.pos] == b'0' {
            base = match self.byte_at(1) {
                Some(b'x' | b'X') => 16,
                Some(b'b' | b'B') => 2,
                Some(b'o' | b'O') => 8,
                _ => 10,
            };
            if base != 10 {
                self.pos += 2;
                valid = self.scan_digits(base) > 0;
            }
        }
        if base == 10 {
            self.scan_digits(10);
        }

        if (base == 10 || base == 16) && self.byte_at(0) == Some(b'.') {
            kind = SyntaxKind::FloatLiteral;
            self.pos += 1;
            self.scan_digits(base);
        }

        let exponent = match self.byte_at(0) {
            Some(b'e' | b'E') if base == 10 => true,
            Some(b'p' | b'P') if base == 16 => true,
            _ => false,
        };
        if exponent {
            kind = SyntaxKind::FloatLiteral;
            self.pos += 1;
            if matches!(self.byte_at(0), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            valid &= self.scan_digits(10) > 0;
        }

        if self.byte_at(0) == Some(b'i') {
            kind = SyntaxKind::ImaginaryLiteral;
            self.pos += 1;
        }

        let text = &self.text[start..self.pos];
        if !valid {
            self.error(start, self.pos, &INVALID_NUMERIC_LITERAL, &[text]);
        }
        self.token_value.push_str(text);
        kind
    }

    /// Scan digits (and `_` separators) of a base; returns the digit count.
    fn scan_digits(&mut self, base: u32) -> usize {
        let mut count = 0;
        while let Some(b) = self.byte_at(0) {
            if b == b'_' {
                self.pos += 1;
            } else if is_digit_in_base(b, base) {
                count += 1;
                self.pos += 1;
            } else {
                break;
            }
        }
        count
    }

    /// Scan an interpreted string or rune body up to `quote`.
    fn scan_quoted(&mut self, quote: u8, unterminated: &DiagnosticMessage) {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.byte_at(0) {
                None => {
                    self.error(start, self.pos, unterminated, &[]);
                    break;
                }
                Some(b'\n') => {
                    let message = if quote == b'"' { &NEWLINE_IN_STRING } else { unterminated };
                    self.error(start, self.pos, message, &[]);
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    if let Some(ch) = self.current_char() {
                        if ch != '\n' {
                            self.pos += ch.len_utf8();
                        }
                    }
                }
                Some(b) if b == quote => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        self.token_value.push_str(&self.text[start..self.pos]);
    }

    fn scan_string(&mut self) -> SyntaxKind {
        self.scan_quoted(b'"', &STRING_LITERAL_NOT_TERMINATED);
        SyntaxKind::StringLiteral
    }

    fn scan_rune(&mut self) -> SyntaxKind {
        self.scan_quoted(b'\'', &RUNE_LITERAL_NOT_TERMINATED);
        SyntaxKind::RuneLiteral
    }

    fn scan_raw_string(&mut self) -> SyntaxKind {
        let start = self.pos;
        let body = start + 1;
        self.pos = match memchr::memchr(b'`', &self.bytes[body..]) {
            Some(offset) => body + offset + 1,
            None => {
                self.error(start, self.bytes.len(), &RAW_STRING_LITERAL_NOT_TERMINATED, &[]);
                self.bytes.len()
            }
        };
        self.token_value.push_str(&self.text[start..self.pos]);
        SyntaxKind::StringLiteral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_positions() {
        let mut scanner = Scanner::new("x := 1", "t.go");
        assert_eq!(scanner.scan(), SyntaxKind::Identifier);
        assert_eq!(scanner.token_range(), TextRange::new(0, 1));
        assert_eq!(scanner.scan(), SyntaxKind::ColonEqualsToken);
        assert_eq!(scanner.token_range(), TextRange::new(2, 4));
        assert_eq!(scanner.scan(), SyntaxKind::IntLiteral);
        assert_eq!(scanner.token_value(), "1");
        // Semicolon inserted at end of input.
        assert_eq!(scanner.scan(), SyntaxKind::SemicolonToken);
        assert_eq!(scanner.token_range(), TextRange::empty(6));
        assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let mut scanner = Scanner::new("\u{FEFF}package p", "t.go");
        assert_eq!(scanner.scan(), SyntaxKind::PackageKeyword);
        assert_eq!(scanner.token_start(), 3);
    }
}
