//! errside_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Scanner, parser, binder, and checker errors are all reported as
//! [`Diagnostic`]s built from the numbered templates in [`messages`].

use errside_core::text::{LineAndColumn, LineMap, TextRange};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    /// The message template. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub range: Option<TextRange>,
    /// Line and column of `range.pos`, filled in once a line map is known.
    pub position: Option<LineAndColumn>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// A diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            range: None,
            position: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn with_location(
        file: impl Into<String>,
        range: TextRange,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file.into()),
            range: Some(range),
            ..Self::new(message, args)
        }
    }

    /// Resolve the line/column of this diagnostic against a file's line map.
    pub fn locate(&mut self, line_map: &LineMap) {
        if let Some(range) = self.range {
            self.position = Some(line_map.line_and_column_of(range.pos));
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

/// `file:line:col: message`, the way Go tools print errors. Falls back to the
/// byte offset when no line map was applied.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            match (self.position, self.range) {
                (Some(pos), _) => write!(f, ":{}", pos)?,
                (None, Some(range)) => write!(f, ":#{}", range.pos)?,
                (None, None) => {}
            }
            write!(f, ": ")?;
        }
        if self.category == DiagnosticCategory::Warning {
            write!(f, "warning: ")?;
        }
        write!(f, "{}", self.message_text)
    }
}

/// Replace `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Diagnostics accumulated while processing one package.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// The first error in source order (call [`sort`](Self::sort) first).
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.is_error())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Attach line/column information to every diagnostic for `file`.
    pub fn locate(&mut self, file: &str, line_map: &LineMap) {
        for diag in self
            .diagnostics
            .iter_mut()
            .filter(|d| d.file.as_deref() == Some(file))
        {
            diag.locate(line_map);
        }
    }

    /// Sort diagnostics by file and position.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| {
                    let a_pos = a.range.map(|r| r.pos).unwrap_or(0);
                    let b_pos = b.range.map(|r| r.pos).unwrap_or(0);
                    a_pos.cmp(&b_pos)
                })
        });
    }
}

impl fmt::Display for DiagnosticCollection {
    /// Go reports the first few errors of a package on separate lines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diag) in self.diagnostics.iter().filter(|d| d.is_error()).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diag)?;
        }
        Ok(())
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Scanner errors (1000-1099)
    // ========================================================================
    pub const STRING_LITERAL_NOT_TERMINATED: DiagnosticMessage = diag!(1001, Error, "string literal not terminated");
    pub const RAW_STRING_LITERAL_NOT_TERMINATED: DiagnosticMessage = diag!(1002, Error, "raw string literal not terminated");
    pub const RUNE_LITERAL_NOT_TERMINATED: DiagnosticMessage = diag!(1003, Error, "rune literal not terminated");
    pub const COMMENT_NOT_TERMINATED: DiagnosticMessage = diag!(1004, Error, "comment not terminated");
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1005, Error, "invalid character {0} in source");
    pub const INVALID_NUMERIC_LITERAL: DiagnosticMessage = diag!(1006, Error, "invalid numeric literal {0}");
    pub const NEWLINE_IN_STRING: DiagnosticMessage = diag!(1007, Error, "newline in string");

    // ========================================================================
    // Parser errors (1100-1199)
    // ========================================================================
    pub const EXPECTED_0_FOUND_1: DiagnosticMessage = diag!(1100, Error, "expected {0}, found {1}");
    pub const EXPECTED_PACKAGE_CLAUSE: DiagnosticMessage = diag!(1101, Error, "expected 'package', found {0}");
    pub const EXPECTED_DECLARATION: DiagnosticMessage = diag!(1102, Error, "expected declaration, found {0}");
    pub const EXPECTED_OPERAND: DiagnosticMessage = diag!(1103, Error, "expected operand, found {0}");
    pub const EXPECTED_TYPE: DiagnosticMessage = diag!(1104, Error, "expected type, found {0}");
    pub const EXPECTED_STATEMENT: DiagnosticMessage = diag!(1105, Error, "expected statement, found {0}");
    pub const MIXED_NAMED_AND_UNNAMED_PARAMETERS: DiagnosticMessage = diag!(1106, Error, "mixed named and unnamed parameters");
    pub const EXPECTED_IDENTIFIER_ON_LEFT_SIDE: DiagnosticMessage = diag!(1107, Error, "non-name {0} on left side of :=");
    pub const TYPE_PARAMETERS_NOT_SUPPORTED: DiagnosticMessage = diag!(1108, Error, "type parameters are not supported");
    pub const EXPECTED_SELECTOR_OR_TYPE_ASSERTION: DiagnosticMessage = diag!(1109, Error, "expected selector or type assertion, found {0}");
    pub const VARIADIC_PARAMETER_MUST_BE_LAST: DiagnosticMessage = diag!(1110, Error, "can only use ... with final parameter in list");
    pub const EXPRESSION_NESTED_TOO_DEEPLY: DiagnosticMessage = diag!(1111, Error, "expression nested too deeply");
    pub const EXPECTED_IF_STATEMENT_OR_BLOCK: DiagnosticMessage = diag!(1112, Error, "expected if statement or block, found {0}");
    pub const MISSING_CONDITION_IN_IF: DiagnosticMessage = diag!(1113, Error, "missing condition in if statement");
    pub const RANGE_REQUIRES_ASSIGNMENT: DiagnosticMessage = diag!(1114, Error, "range clause requires = or := with at most two variables");

    // ========================================================================
    // Binder errors (2000-2099)
    // ========================================================================
    pub const UNDEFINED_0: DiagnosticMessage = diag!(2001, Error, "undefined: {0}");
    pub const _0_REDECLARED_IN_THIS_BLOCK: DiagnosticMessage = diag!(2002, Error, "{0} redeclared in this block");
    pub const NO_NEW_VARIABLES_ON_LEFT_SIDE: DiagnosticMessage = diag!(2003, Error, "no new variables on left side of :=");
    pub const USE_OF_PACKAGE_0_WITHOUT_SELECTOR: DiagnosticMessage = diag!(2004, Error, "use of package {0} without selector");
    pub const CANNOT_USE_BLANK_AS_VALUE: DiagnosticMessage = diag!(2006, Error, "cannot use _ as value");

    // ========================================================================
    // Checker errors (2100-2199)
    // ========================================================================
    pub const ASSIGNMENT_MISMATCH: DiagnosticMessage = diag!(2100, Error, "assignment mismatch: {0} variables but {1} values");
    pub const INVALID_OPERATION_CANNOT_CALL_NON_FUNCTION_0: DiagnosticMessage = diag!(2101, Error, "invalid operation: cannot call non-function {0}");
    pub const UNDEFINED_0_1: DiagnosticMessage = diag!(2102, Error, "undefined: {0}.{1}");
    pub const USE_OF_UNTYPED_NIL: DiagnosticMessage = diag!(2103, Error, "use of untyped nil in assignment");
    pub const _0_IS_NOT_A_TYPE: DiagnosticMessage = diag!(2104, Error, "{0} is not a type");
    pub const INVALID_RECURSIVE_TYPE_0: DiagnosticMessage = diag!(2105, Error, "invalid recursive type {0}");
    pub const INITIALIZATION_CYCLE_0: DiagnosticMessage = diag!(2106, Error, "initialization cycle or invalid reference to {0}");
    pub const COULD_NOT_IMPORT_0: DiagnosticMessage = diag!(2107, Warning, "could not import {0} (no type information available)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        assert_eq!(format_message("undefined: {0}", &["x"]), "undefined: x");
        assert_eq!(
            format_message("expected {0}, found {1}", &["';'", "'}'"]),
            "expected ';', found '}'"
        );
    }

    #[test]
    fn test_display_with_position() {
        let text = "package p\n\nvar x = y\n";
        let map = LineMap::new(text);
        let mut diag = Diagnostic::with_location(
            "p.go",
            TextRange::new(19, 20),
            &messages::UNDEFINED_0,
            &["y"],
        );
        assert_eq!(diag.to_string(), "p.go:#19: undefined: y");
        diag.locate(&map);
        assert_eq!(diag.to_string(), "p.go:3:9: undefined: y");
    }

    #[test]
    fn test_collection_first_error_skips_warnings() {
        let mut diags = DiagnosticCollection::new();
        diags.add(Diagnostic::new(&messages::COULD_NOT_IMPORT_0, &["\"example.com/x\""]));
        assert!(!diags.has_errors());
        diags.add(Diagnostic::new(&messages::UNDEFINED_0, &["z"]));
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.first_error().map(|d| d.message_text.as_str()), Some("undefined: z"));
    }
}
