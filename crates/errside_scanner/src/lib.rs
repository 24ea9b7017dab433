//! errside_scanner: Lexer/tokenizer for Go source code.
//!
//! Produces tokens from source text with support for:
//! - All Go operators, keywords, and literal forms
//! - Automatic semicolon insertion at line ends
//! - Unicode identifiers
//! - Comment collection for the printer

mod char_codes;
mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::TokenInfo;
