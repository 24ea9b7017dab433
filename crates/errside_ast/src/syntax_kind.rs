//! SyntaxKind enum - all token kinds of the Go language.

/// The kind of a token produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SyntaxKind {
    // ========================================================================
    // Special
    // ========================================================================
    Unknown,
    EndOfFileToken,

    // ========================================================================
    // Literals
    // ========================================================================
    Identifier,
    IntLiteral,
    FloatLiteral,
    ImaginaryLiteral,
    RuneLiteral,
    StringLiteral,

    // ========================================================================
    // Operators and punctuation
    // ========================================================================
    PlusToken,                     // +
    MinusToken,                    // -
    AsteriskToken,                 // *
    SlashToken,                    // /
    PercentToken,                  // %
    AmpersandToken,                // &
    BarToken,                      // |
    CaretToken,                    // ^
    LessThanLessThanToken,         // <<
    GreaterThanGreaterThanToken,   // >>
    AmpersandCaretToken,           // &^

    PlusEqualsToken,                     // +=
    MinusEqualsToken,                    // -=
    AsteriskEqualsToken,                 // *=
    SlashEqualsToken,                    // /=
    PercentEqualsToken,                  // %=
    AmpersandEqualsToken,                // &=
    BarEqualsToken,                      // |=
    CaretEqualsToken,                    // ^=
    LessThanLessThanEqualsToken,         // <<=
    GreaterThanGreaterThanEqualsToken,   // >>=
    AmpersandCaretEqualsToken,           // &^=

    AmpersandAmpersandToken,  // &&
    BarBarToken,              // ||
    ArrowToken,               // <-
    PlusPlusToken,            // ++
    MinusMinusToken,          // --

    EqualsEqualsToken,        // ==
    LessThanToken,            // <
    GreaterThanToken,         // >
    EqualsToken,              // =
    ExclamationToken,         // !
    TildeToken,               // ~

    ExclamationEqualsToken,   // !=
    LessThanEqualsToken,      // <=
    GreaterThanEqualsToken,   // >=
    ColonEqualsToken,         // :=
    DotDotDotToken,           // ...

    OpenParenToken,           // (
    OpenBracketToken,         // [
    OpenBraceToken,           // {
    CommaToken,               // ,
    DotToken,                 // .
    CloseParenToken,          // )
    CloseBracketToken,        // ]
    CloseBraceToken,          // }
    SemicolonToken,           // ;
    ColonToken,               // :

    // ========================================================================
    // Keywords
    // ========================================================================
    BreakKeyword,
    CaseKeyword,
    ChanKeyword,
    ConstKeyword,
    ContinueKeyword,
    DefaultKeyword,
    DeferKeyword,
    ElseKeyword,
    FallthroughKeyword,
    ForKeyword,
    FuncKeyword,
    GoKeyword,
    GotoKeyword,
    IfKeyword,
    ImportKeyword,
    InterfaceKeyword,
    MapKeyword,
    PackageKeyword,
    RangeKeyword,
    ReturnKeyword,
    SelectKeyword,
    StructKeyword,
    SwitchKeyword,
    TypeKeyword,
    VarKeyword,
}

impl SyntaxKind {
    /// Map identifier text to a keyword kind.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        let kind = match text {
            "break" => SyntaxKind::BreakKeyword,
            "case" => SyntaxKind::CaseKeyword,
            "chan" => SyntaxKind::ChanKeyword,
            "const" => SyntaxKind::ConstKeyword,
            "continue" => SyntaxKind::ContinueKeyword,
            "default" => SyntaxKind::DefaultKeyword,
            "defer" => SyntaxKind::DeferKeyword,
            "else" => SyntaxKind::ElseKeyword,
            "fallthrough" => SyntaxKind::FallthroughKeyword,
            "for" => SyntaxKind::ForKeyword,
            "func" => SyntaxKind::FuncKeyword,
            "go" => SyntaxKind::GoKeyword,
            "goto" => SyntaxKind::GotoKeyword,
            "if" => SyntaxKind::IfKeyword,
            "import" => SyntaxKind::ImportKeyword,
            "interface" => SyntaxKind::InterfaceKeyword,
            "map" => SyntaxKind::MapKeyword,
            "package" => SyntaxKind::PackageKeyword,
            "range" => SyntaxKind::RangeKeyword,
            "return" => SyntaxKind::ReturnKeyword,
            "select" => SyntaxKind::SelectKeyword,
            "struct" => SyntaxKind::StructKeyword,
            "switch" => SyntaxKind::SwitchKeyword,
            "type" => SyntaxKind::TypeKeyword,
            "var" => SyntaxKind::VarKeyword,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(self) -> bool {
        self >= SyntaxKind::BreakKeyword
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::IntLiteral
                | SyntaxKind::FloatLiteral
                | SyntaxKind::ImaginaryLiteral
                | SyntaxKind::RuneLiteral
                | SyntaxKind::StringLiteral
        )
    }

    /// Assignment operators, including plain `=` but not `:=`.
    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::EqualsToken
                | SyntaxKind::PlusEqualsToken
                | SyntaxKind::MinusEqualsToken
                | SyntaxKind::AsteriskEqualsToken
                | SyntaxKind::SlashEqualsToken
                | SyntaxKind::PercentEqualsToken
                | SyntaxKind::AmpersandEqualsToken
                | SyntaxKind::BarEqualsToken
                | SyntaxKind::CaretEqualsToken
                | SyntaxKind::LessThanLessThanEqualsToken
                | SyntaxKind::GreaterThanGreaterThanEqualsToken
                | SyntaxKind::AmpersandCaretEqualsToken
        )
    }

    /// Comparison operators; their result is an untyped boolean.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            SyntaxKind::EqualsEqualsToken
                | SyntaxKind::ExclamationEqualsToken
                | SyntaxKind::LessThanToken
                | SyntaxKind::LessThanEqualsToken
                | SyntaxKind::GreaterThanToken
                | SyntaxKind::GreaterThanEqualsToken
        )
    }

    pub fn punctuation_text(self) -> Option<&'static str> {
        let text = match self {
            SyntaxKind::PlusToken => "+",
            SyntaxKind::MinusToken => "-",
            SyntaxKind::AsteriskToken => "*",
            SyntaxKind::SlashToken => "/",
            SyntaxKind::PercentToken => "%",
            SyntaxKind::AmpersandToken => "&",
            SyntaxKind::BarToken => "|",
            SyntaxKind::CaretToken => "^",
            SyntaxKind::LessThanLessThanToken => "<<",
            SyntaxKind::GreaterThanGreaterThanToken => ">>",
            SyntaxKind::AmpersandCaretToken => "&^",
            SyntaxKind::PlusEqualsToken => "+=",
            SyntaxKind::MinusEqualsToken => "-=",
            SyntaxKind::AsteriskEqualsToken => "*=",
            SyntaxKind::SlashEqualsToken => "/=",
            SyntaxKind::PercentEqualsToken => "%=",
            SyntaxKind::AmpersandEqualsToken => "&=",
            SyntaxKind::BarEqualsToken => "|=",
            SyntaxKind::CaretEqualsToken => "^=",
            SyntaxKind::LessThanLessThanEqualsToken => "<<=",
            SyntaxKind::GreaterThanGreaterThanEqualsToken => ">>=",
            SyntaxKind::AmpersandCaretEqualsToken => "&^=",
            SyntaxKind::AmpersandAmpersandToken => "&&",
            SyntaxKind::BarBarToken => "||",
            SyntaxKind::ArrowToken => "<-",
            SyntaxKind::PlusPlusToken => "++",
            SyntaxKind::MinusMinusToken => "--",
            SyntaxKind::EqualsEqualsToken => "==",
            SyntaxKind::LessThanToken => "<",
            SyntaxKind::GreaterThanToken => ">",
            SyntaxKind::EqualsToken => "=",
            SyntaxKind::ExclamationToken => "!",
            SyntaxKind::TildeToken => "~",
            SyntaxKind::ExclamationEqualsToken => "!=",
            SyntaxKind::LessThanEqualsToken => "<=",
            SyntaxKind::GreaterThanEqualsToken => ">=",
            SyntaxKind::ColonEqualsToken => ":=",
            SyntaxKind::DotDotDotToken => "...",
            SyntaxKind::OpenParenToken => "(",
            SyntaxKind::OpenBracketToken => "[",
            SyntaxKind::OpenBraceToken => "{",
            SyntaxKind::CommaToken => ",",
            SyntaxKind::DotToken => ".",
            SyntaxKind::CloseParenToken => ")",
            SyntaxKind::CloseBracketToken => "]",
            SyntaxKind::CloseBraceToken => "}",
            SyntaxKind::SemicolonToken => ";",
            SyntaxKind::ColonToken => ":",
            _ => return None,
        };
        Some(text)
    }

    pub fn keyword_text(self) -> Option<&'static str> {
        let text = match self {
            SyntaxKind::BreakKeyword => "break",
            SyntaxKind::CaseKeyword => "case",
            SyntaxKind::ChanKeyword => "chan",
            SyntaxKind::ConstKeyword => "const",
            SyntaxKind::ContinueKeyword => "continue",
            SyntaxKind::DefaultKeyword => "default",
            SyntaxKind::DeferKeyword => "defer",
            SyntaxKind::ElseKeyword => "else",
            SyntaxKind::FallthroughKeyword => "fallthrough",
            SyntaxKind::ForKeyword => "for",
            SyntaxKind::FuncKeyword => "func",
            SyntaxKind::GoKeyword => "go",
            SyntaxKind::GotoKeyword => "goto",
            SyntaxKind::IfKeyword => "if",
            SyntaxKind::ImportKeyword => "import",
            SyntaxKind::InterfaceKeyword => "interface",
            SyntaxKind::MapKeyword => "map",
            SyntaxKind::PackageKeyword => "package",
            SyntaxKind::RangeKeyword => "range",
            SyntaxKind::ReturnKeyword => "return",
            SyntaxKind::SelectKeyword => "select",
            SyntaxKind::StructKeyword => "struct",
            SyntaxKind::SwitchKeyword => "switch",
            SyntaxKind::TypeKeyword => "type",
            SyntaxKind::VarKeyword => "var",
            _ => return None,
        };
        Some(text)
    }

    /// A short description for error messages, e.g. `'{'` or `identifier`.
    pub fn describe(self) -> &'static str {
        match self {
            SyntaxKind::Unknown => "illegal token",
            SyntaxKind::EndOfFileToken => "EOF",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::IntLiteral
            | SyntaxKind::FloatLiteral
            | SyntaxKind::ImaginaryLiteral
            | SyntaxKind::RuneLiteral
            | SyntaxKind::StringLiteral => "literal",
            other => other
                .punctuation_text()
                .or_else(|| other.keyword_text())
                .unwrap_or("token"),
        }
    }
}
