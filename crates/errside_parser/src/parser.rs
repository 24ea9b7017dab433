//! The Go parser implementation.
//!
//! A recursive descent parser over the scanner's token stream, following the
//! grammar of the Go specification (without type parameters). Parsing stops
//! at the first error; the file is then reported as unparseable.

use errside_ast::node::*;
use errside_ast::syntax_kind::SyntaxKind;
use errside_ast::types::*;
use errside_core::intern::StringInterner;
use errside_core::text::{LineMap, TextPos, TextRange};
use errside_diagnostics::messages::*;
use errside_diagnostics::{Diagnostic, DiagnosticCollection, DiagnosticMessage};
use errside_scanner::Scanner;

use crate::precedence::{get_binary_operator_precedence, OperatorPrecedence};
use crate::utilities::*;

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
const MAX_RECURSION_DEPTH: u32 = 200;

/// Marker for "a diagnostic was recorded, unwind".
#[derive(Debug)]
struct ParseAbort;

type PResult<T> = Result<T, ParseAbort>;

/// A parsed file together with the id allocator to hand to the next file of
/// the same package.
#[derive(Debug)]
pub struct ParsedFile {
    pub file: SourceFile,
    pub ids: NodeIdAllocator,
}

/// How much a simple statement may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimpleMode {
    Basic,
    LabelOk,
    RangeOk,
}

/// The `[k, v :=] range x` part of a `for` header.
struct RangeClause {
    pos: TextPos,
    key: Option<Expr>,
    value: Option<Expr>,
    tok: Option<SyntaxKind>,
    x: Expr,
}

enum Simple {
    Stmt(Stmt),
    Range(RangeClause),
}

/// The parser produces a SourceFile AST from Go source text.
pub struct Parser<'t> {
    scanner: Scanner<'t>,
    file_name: String,
    interner: StringInterner,
    ids: NodeIdAllocator,
    diagnostics: DiagnosticCollection,
    /// End of the previously consumed token.
    prev_end: TextPos,
    /// `< 0` inside control clause headers, where `T{` does not start a
    /// composite literal; `>= 0` elsewhere.
    expr_lev: i32,
    /// Tracks recursion depth to prevent stack overflow on deeply nested input.
    recursion_depth: u32,
}

impl<'t> Parser<'t> {
    pub fn new(
        file_name: &str,
        source_text: &'t str,
        interner: StringInterner,
        ids: NodeIdAllocator,
    ) -> Self {
        Self {
            scanner: Scanner::new(source_text, file_name),
            file_name: file_name.to_string(),
            interner,
            ids,
            diagnostics: DiagnosticCollection::new(),
            prev_end: 0,
            expr_lev: 0,
            recursion_depth: 0,
        }
    }

    /// Parse the whole file. On failure, returns every diagnostic collected
    /// (scanner and parser), sorted and located.
    pub fn parse_source_file(mut self) -> Result<ParsedFile, DiagnosticCollection> {
        self.next();
        let result = self.parse_file_contents();

        let text = self.scanner.text();
        let mut diagnostics = self.diagnostics;
        diagnostics.extend(self.scanner.take_diagnostics());

        match result {
            Ok(decls_and_package) if !diagnostics.has_errors() => {
                let (package, decls) = decls_and_package;
                let file = SourceFile {
                    data: NodeData::new(self.ids.next_id(), 0, text.len() as TextPos),
                    package,
                    decls,
                    comments: self.scanner.take_comments(),
                    file_name: self.file_name,
                    text: text.to_string(),
                    line_map: LineMap::new(text),
                };
                Ok(ParsedFile {
                    file,
                    ids: self.ids,
                })
            }
            _ => {
                diagnostics.sort();
                diagnostics.locate(&self.file_name, &LineMap::new(text));
                Err(diagnostics)
            }
        }
    }

    fn parse_file_contents(&mut self) -> PResult<(Ident, Vec<Decl>)> {
        if self.tok() != SyntaxKind::PackageKeyword {
            let found = self.found_text();
            return self.error(&EXPECTED_PACKAGE_CLAUSE, &[&found]);
        }
        self.next();
        let package = self.parse_ident()?;
        self.expect_semi()?;

        let mut decls = Vec::new();
        while self.tok() == SyntaxKind::ImportKeyword {
            let decl = self.parse_gen_decl(SyntaxKind::ImportKeyword)?;
            decls.push(Decl::Gen(Box::new(decl)));
            self.expect_semi()?;
        }

        while self.tok() != SyntaxKind::EndOfFileToken {
            let decl = match self.tok() {
                SyntaxKind::FuncKeyword => Decl::Func(Box::new(self.parse_func_decl()?)),
                kind @ (SyntaxKind::VarKeyword
                | SyntaxKind::ConstKeyword
                | SyntaxKind::TypeKeyword
                | SyntaxKind::ImportKeyword) => Decl::Gen(Box::new(self.parse_gen_decl(kind)?)),
                _ => {
                    let found = self.found_text();
                    return self.error(&EXPECTED_DECLARATION, &[&found]);
                }
            };
            decls.push(decl);
            self.expect_semi()?;
        }
        Ok((package, decls))
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn tok(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    fn next(&mut self) -> SyntaxKind {
        self.prev_end = self.scanner.token_end();
        self.scanner.scan()
    }

    #[inline]
    fn pos(&self) -> TextPos {
        self.scanner.token_start()
    }

    fn node(&mut self, pos: TextPos) -> NodeData {
        let end = self.prev_end.max(pos);
        NodeData::new(self.ids.next_id(), pos, end)
    }

    fn got(&mut self, kind: SyntaxKind) -> bool {
        if self.tok() == kind {
            self.next();
            true
        } else {
            false
        }
    }

    /// Consume `kind` and return its start position.
    fn expect(&mut self, kind: SyntaxKind) -> PResult<TextPos> {
        let pos = self.pos();
        if self.tok() == kind {
            self.next();
            Ok(pos)
        } else {
            self.error_expected(&format!("'{}'", kind.describe()))
        }
    }

    /// Statements end in `;`, which may be omitted before `)` or `}`.
    fn expect_semi(&mut self) -> PResult<()> {
        match self.tok() {
            SyntaxKind::CloseParenToken | SyntaxKind::CloseBraceToken => Ok(()),
            SyntaxKind::SemicolonToken => {
                self.next();
                Ok(())
            }
            _ => self.error_expected("';'"),
        }
    }

    /// How the current token is shown in "found ..." messages.
    fn found_text(&self) -> String {
        match self.tok() {
            SyntaxKind::SemicolonToken if self.scanner.token_value() == "\n" => "newline".to_string(),
            SyntaxKind::EndOfFileToken => "EOF".to_string(),
            kind if kind == SyntaxKind::Identifier || kind.is_literal() => {
                self.scanner.token_value().to_string()
            }
            kind => format!("'{}'", kind.describe()),
        }
    }

    fn error<T>(&mut self, message: &DiagnosticMessage, args: &[&str]) -> PResult<T> {
        let range = self.scanner.token_range();
        self.error_at(range, message, args)
    }

    fn error_at<T>(&mut self, range: TextRange, message: &DiagnosticMessage, args: &[&str]) -> PResult<T> {
        self.diagnostics.add(Diagnostic::with_location(
            self.file_name.clone(),
            range,
            message,
            args,
        ));
        Err(ParseAbort)
    }

    fn error_expected<T>(&mut self, expected: &str) -> PResult<T> {
        let found = self.found_text();
        self.error(&EXPECTED_0_FOUND_1, &[expected, &found])
    }

    fn enter(&mut self) -> PResult<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            return self.error(&EXPRESSION_NESTED_TOO_DEEPLY, &[]);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.recursion_depth -= 1;
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn parse_ident(&mut self) -> PResult<Ident> {
        if self.tok() != SyntaxKind::Identifier {
            return self.error_expected("identifier");
        }
        let pos = self.pos();
        let text = self.scanner.token_value().to_string();
        self.next();
        Ok(Ident {
            data: self.node(pos),
            name: self.interner.intern(&text),
            text,
        })
    }

    fn parse_ident_list(&mut self) -> PResult<Vec<Ident>> {
        let mut list = vec![self.parse_ident()?];
        while self.got(SyntaxKind::CommaToken) {
            list.push(self.parse_ident()?);
        }
        Ok(list)
    }

    fn parse_basic_lit(&mut self) -> PResult<BasicLit> {
        let kind = match self.tok() {
            SyntaxKind::IntLiteral => LitKind::Int,
            SyntaxKind::FloatLiteral => LitKind::Float,
            SyntaxKind::ImaginaryLiteral => LitKind::Imag,
            SyntaxKind::RuneLiteral => LitKind::Char,
            SyntaxKind::StringLiteral => LitKind::String,
            _ => return self.error_expected("literal"),
        };
        let pos = self.pos();
        let value = self.scanner.token_value().to_string();
        self.next();
        Ok(BasicLit {
            data: self.node(pos),
            kind,
            value,
        })
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_gen_decl(&mut self, keyword: SyntaxKind) -> PResult<GenDecl> {
        let pos = self.expect(keyword)?;
        let mut specs = Vec::new();
        let (lparen, rparen) = if self.tok() == SyntaxKind::OpenParenToken {
            let lparen = self.pos();
            self.next();
            let mut index = 0;
            while self.tok() != SyntaxKind::CloseParenToken
                && self.tok() != SyntaxKind::EndOfFileToken
            {
                specs.push(self.parse_spec(keyword, index)?);
                self.expect_semi()?;
                index += 1;
            }
            let rparen = self.expect(SyntaxKind::CloseParenToken)?;
            (Some(lparen), Some(rparen))
        } else {
            specs.push(self.parse_spec(keyword, 0)?);
            (None, None)
        };
        Ok(GenDecl {
            data: self.node(pos),
            tok: keyword,
            lparen,
            specs,
            rparen,
        })
    }

    fn parse_spec(&mut self, keyword: SyntaxKind, index: u32) -> PResult<Spec> {
        match keyword {
            SyntaxKind::ImportKeyword => self.parse_import_spec().map(Spec::Import),
            SyntaxKind::TypeKeyword => self.parse_type_spec().map(Spec::Type),
            _ => self.parse_value_spec(keyword, index).map(Spec::Value),
        }
    }

    fn parse_import_spec(&mut self) -> PResult<ImportSpec> {
        let pos = self.pos();
        let name = match self.tok() {
            SyntaxKind::Identifier => Some(self.parse_ident()?),
            SyntaxKind::DotToken => {
                let dot = self.pos();
                self.next();
                Some(Ident {
                    data: self.node(dot),
                    name: self.interner.intern("."),
                    text: ".".to_string(),
                })
            }
            _ => None,
        };
        if self.tok() != SyntaxKind::StringLiteral {
            return self.error_expected("import path");
        }
        let path = self.parse_basic_lit()?;
        Ok(ImportSpec {
            data: self.node(pos),
            name,
            path,
        })
    }

    fn parse_type_spec(&mut self) -> PResult<TypeSpec> {
        let pos = self.pos();
        let name = self.parse_ident()?;
        let alias = self.got(SyntaxKind::EqualsToken);
        let ty = self.parse_type()?;
        Ok(TypeSpec {
            data: self.node(pos),
            name,
            alias,
            ty,
        })
    }

    fn parse_value_spec(&mut self, keyword: SyntaxKind, index: u32) -> PResult<ValueSpec> {
        let pos = self.pos();
        let names = self.parse_ident_list()?;
        let mut ty = None;
        let mut values = Vec::new();
        if self.tok() != SyntaxKind::EqualsToken
            && self.tok() != SyntaxKind::SemicolonToken
            && self.tok() != SyntaxKind::CloseParenToken
        {
            ty = Some(self.parse_type()?);
        }
        if self.got(SyntaxKind::EqualsToken) {
            values = self.parse_expr_list()?;
        }
        if keyword == SyntaxKind::VarKeyword && ty.is_none() && values.is_empty() {
            let found = self.found_text();
            return self.error(&EXPECTED_TYPE, &[&found]);
        }
        Ok(ValueSpec {
            data: self.node(pos),
            names,
            ty,
            values,
            iota: index,
        })
    }

    fn parse_func_decl(&mut self) -> PResult<FuncDecl> {
        let pos = self.expect(SyntaxKind::FuncKeyword)?;
        let recv = if self.tok() == SyntaxKind::OpenParenToken {
            Some(self.parse_parameters()?)
        } else {
            None
        };
        let name = self.parse_ident()?;
        if self.tok() == SyntaxKind::OpenBracketToken {
            return self.error(&TYPE_PARAMETERS_NOT_SUPPORTED, &[]);
        }
        let ty = self.parse_signature(pos)?;
        let body = if self.tok() == SyntaxKind::OpenBraceToken {
            let old = self.expr_lev;
            self.expr_lev = 0;
            let body = self.parse_block()?;
            self.expr_lev = old;
            Some(body)
        } else {
            None
        };
        Ok(FuncDecl {
            data: self.node(pos),
            recv,
            name,
            ty,
            body,
        })
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn parse_type(&mut self) -> PResult<Expr> {
        match self.try_type()? {
            Some(ty) => Ok(ty),
            None => {
                let found = self.found_text();
                self.error(&EXPECTED_TYPE, &[&found])
            }
        }
    }

    fn try_type(&mut self) -> PResult<Option<Expr>> {
        self.enter()?;
        let result = self.try_type_inner();
        self.leave();
        result
    }

    fn try_type_inner(&mut self) -> PResult<Option<Expr>> {
        let pos = self.pos();
        let ty = match self.tok() {
            SyntaxKind::Identifier => self.parse_type_name()?,
            SyntaxKind::OpenBracketToken => self.parse_array_type()?,
            SyntaxKind::StructKeyword => self.parse_struct_type()?,
            SyntaxKind::AsteriskToken => {
                self.next();
                let x = self.parse_type()?;
                Expr::Star(Box::new(StarExpr {
                    data: self.node(pos),
                    x,
                }))
            }
            SyntaxKind::FuncKeyword => {
                self.next();
                Expr::FuncType(Box::new(self.parse_signature(pos)?))
            }
            SyntaxKind::InterfaceKeyword => self.parse_interface_type()?,
            SyntaxKind::MapKeyword => self.parse_map_type()?,
            SyntaxKind::ChanKeyword | SyntaxKind::ArrowToken => self.parse_chan_type()?,
            SyntaxKind::OpenParenToken => {
                self.next();
                let x = self.parse_type()?;
                self.expect(SyntaxKind::CloseParenToken)?;
                Expr::Paren(Box::new(ParenExpr {
                    data: self.node(pos),
                    x,
                }))
            }
            _ => return Ok(None),
        };
        Ok(Some(ty))
    }

    fn parse_type_name(&mut self) -> PResult<Expr> {
        let pos = self.pos();
        let ident = self.parse_ident()?;
        if self.tok() != SyntaxKind::DotToken {
            return Ok(Expr::Ident(ident));
        }
        self.next();
        let sel = self.parse_ident()?;
        Ok(Expr::Selector(Box::new(SelectorExpr {
            data: self.node(pos),
            x: Expr::Ident(ident),
            sel,
        })))
    }

    fn parse_array_type(&mut self) -> PResult<Expr> {
        let pos = self.expect(SyntaxKind::OpenBracketToken)?;
        let len = match self.tok() {
            SyntaxKind::CloseBracketToken => None,
            SyntaxKind::DotDotDotToken => {
                let dots = self.pos();
                self.next();
                Some(Expr::Ellipsis(Box::new(Ellipsis {
                    data: self.node(dots),
                    elt: None,
                })))
            }
            _ => {
                self.expr_lev += 1;
                let len = self.parse_expr()?;
                self.expr_lev -= 1;
                Some(len)
            }
        };
        if self.tok() == SyntaxKind::CommaToken {
            return self.error(&TYPE_PARAMETERS_NOT_SUPPORTED, &[]);
        }
        self.expect(SyntaxKind::CloseBracketToken)?;
        let elt = self.parse_type()?;
        Ok(Expr::ArrayType(Box::new(ArrayType {
            data: self.node(pos),
            len,
            elt,
        })))
    }

    fn parse_map_type(&mut self) -> PResult<Expr> {
        let pos = self.expect(SyntaxKind::MapKeyword)?;
        self.expect(SyntaxKind::OpenBracketToken)?;
        let key = self.parse_type()?;
        self.expect(SyntaxKind::CloseBracketToken)?;
        let value = self.parse_type()?;
        Ok(Expr::MapType(Box::new(MapType {
            data: self.node(pos),
            key,
            value,
        })))
    }

    fn parse_chan_type(&mut self) -> PResult<Expr> {
        let pos = self.pos();
        let dir = if self.tok() == SyntaxKind::ChanKeyword {
            self.next();
            if self.got(SyntaxKind::ArrowToken) {
                ChanDir::SEND
            } else {
                ChanDir::BOTH
            }
        } else {
            self.expect(SyntaxKind::ArrowToken)?;
            self.expect(SyntaxKind::ChanKeyword)?;
            ChanDir::RECV
        };
        let value = self.parse_type()?;
        Ok(Expr::ChanType(Box::new(ChanType {
            data: self.node(pos),
            dir,
            value,
        })))
    }

    fn parse_struct_type(&mut self) -> PResult<Expr> {
        let pos = self.expect(SyntaxKind::StructKeyword)?;
        let lbrace = self.expect(SyntaxKind::OpenBraceToken)?;
        let mut list = Vec::new();
        while self.tok() != SyntaxKind::CloseBraceToken && self.tok() != SyntaxKind::EndOfFileToken {
            list.push(self.parse_field_decl()?);
            self.expect_semi()?;
        }
        self.expect(SyntaxKind::CloseBraceToken)?;
        let fields = FieldList {
            data: self.node(lbrace),
            list,
            delimited: true,
        };
        Ok(Expr::StructType(Box::new(StructType {
            data: self.node(pos),
            fields,
        })))
    }

    fn parse_field_decl(&mut self) -> PResult<Field> {
        let pos = self.pos();
        let (names, ty) = if self.tok() == SyntaxKind::AsteriskToken {
            (Vec::new(), self.parse_type()?)
        } else {
            let first = self.parse_ident()?;
            match self.tok() {
                SyntaxKind::DotToken => {
                    self.next();
                    let sel = self.parse_ident()?;
                    let ty = Expr::Selector(Box::new(SelectorExpr {
                        data: self.node(pos),
                        x: Expr::Ident(first),
                        sel,
                    }));
                    (Vec::new(), ty)
                }
                SyntaxKind::StringLiteral
                | SyntaxKind::SemicolonToken
                | SyntaxKind::CloseBraceToken => (Vec::new(), Expr::Ident(first)),
                _ => {
                    let mut names = vec![first];
                    while self.got(SyntaxKind::CommaToken) {
                        names.push(self.parse_ident()?);
                    }
                    (names, self.parse_type()?)
                }
            }
        };
        let tag = if self.tok() == SyntaxKind::StringLiteral {
            Some(self.parse_basic_lit()?)
        } else {
            None
        };
        Ok(Field {
            data: self.node(pos),
            names,
            ty,
            tag,
        })
    }

    fn parse_interface_type(&mut self) -> PResult<Expr> {
        let pos = self.expect(SyntaxKind::InterfaceKeyword)?;
        let lbrace = self.expect(SyntaxKind::OpenBraceToken)?;
        let mut list = Vec::new();
        while self.tok() != SyntaxKind::CloseBraceToken && self.tok() != SyntaxKind::EndOfFileToken {
            let field_pos = self.pos();
            if self.tok() != SyntaxKind::Identifier {
                return self.error(&TYPE_PARAMETERS_NOT_SUPPORTED, &[]);
            }
            let field = if self.ident_followed_by_paren() {
                let name = self.parse_ident()?;
                let sig_pos = self.pos();
                let sig = self.parse_signature(sig_pos)?;
                Field {
                    data: self.node(field_pos),
                    names: vec![name],
                    ty: Expr::FuncType(Box::new(sig)),
                    tag: None,
                }
            } else {
                let ty = self.parse_type_name()?;
                Field {
                    data: self.node(field_pos),
                    names: Vec::new(),
                    ty,
                    tag: None,
                }
            };
            list.push(field);
            self.expect_semi()?;
        }
        self.expect(SyntaxKind::CloseBraceToken)?;
        let methods = FieldList {
            data: self.node(lbrace),
            list,
            delimited: true,
        };
        Ok(Expr::InterfaceType(Box::new(InterfaceType {
            data: self.node(pos),
            methods,
        })))
    }

    /// Whether the identifier at the cursor is followed by `(`. Identifiers
    /// never span lines, so the byte after the name decides it.
    fn ident_followed_by_paren(&self) -> bool {
        let text = self.scanner.text();
        let after = self.scanner.token_end() as usize;
        text[after..].trim_start_matches([' ', '\t']).starts_with('(')
    }

    /// `(params) results` for a function starting at `pos`.
    fn parse_signature(&mut self, pos: TextPos) -> PResult<FuncType> {
        let params = self.parse_parameters()?;
        let results = if self.tok() == SyntaxKind::OpenParenToken {
            Some(self.parse_parameters()?)
        } else if can_start_type(self.tok()) {
            let ty_pos = self.pos();
            let ty = self.parse_type()?;
            let data = self.node(ty_pos);
            Some(FieldList {
                data,
                list: vec![Field {
                    data: self.node(ty_pos),
                    names: Vec::new(),
                    ty,
                    tag: None,
                }],
                delimited: false,
            })
        } else {
            None
        };
        Ok(FuncType {
            data: self.node(pos),
            params,
            results,
        })
    }

    /// A parenthesized parameter, result, or receiver list.
    ///
    /// Entries are first read as "name", "name Type", or "Type", then grouped:
    /// if any entry has both a name and a type, every entry is named and bare
    /// names take the type that follows them.
    fn parse_parameters(&mut self) -> PResult<FieldList> {
        let lparen = self.expect(SyntaxKind::OpenParenToken)?;
        let mut entries: Vec<(Option<Ident>, Option<Expr>, TextPos)> = Vec::new();
        while self.tok() != SyntaxKind::CloseParenToken && self.tok() != SyntaxKind::EndOfFileToken {
            let pos = self.pos();
            if self.tok() == SyntaxKind::Identifier {
                let ident = self.parse_ident()?;
                match self.tok() {
                    SyntaxKind::DotToken => {
                        self.next();
                        let sel = self.parse_ident()?;
                        let ty = Expr::Selector(Box::new(SelectorExpr {
                            data: self.node(pos),
                            x: Expr::Ident(ident),
                            sel,
                        }));
                        entries.push((None, Some(ty), pos));
                    }
                    SyntaxKind::DotDotDotToken => {
                        let ty = self.parse_variadic()?;
                        entries.push((Some(ident), Some(ty), pos));
                    }
                    kind if can_start_type(kind) => {
                        let ty = self.parse_type()?;
                        entries.push((Some(ident), Some(ty), pos));
                    }
                    _ => entries.push((Some(ident), None, pos)),
                }
            } else if self.tok() == SyntaxKind::DotDotDotToken {
                let ty = self.parse_variadic()?;
                entries.push((None, Some(ty), pos));
            } else {
                let ty = self.parse_type()?;
                entries.push((None, Some(ty), pos));
            }
            if !self.got(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect(SyntaxKind::CloseParenToken)?;

        let named = entries.iter().any(|(name, ty, _)| name.is_some() && ty.is_some());
        let mut list = Vec::new();
        if named {
            let mut names = Vec::new();
            let mut group_pos = None;
            for (name, ty, pos) in entries {
                let Some(name) = name else {
                    return self.error(&MIXED_NAMED_AND_UNNAMED_PARAMETERS, &[]);
                };
                group_pos.get_or_insert(pos);
                names.push(name);
                if let Some(ty) = ty {
                    let start = group_pos.take().unwrap_or(pos);
                    let end = ty.range().end;
                    list.push(Field {
                        data: NodeData::new(self.ids.next_id(), start, end),
                        names: std::mem::take(&mut names),
                        ty,
                        tag: None,
                    });
                }
            }
            if !names.is_empty() {
                return self.error(&MIXED_NAMED_AND_UNNAMED_PARAMETERS, &[]);
            }
        } else {
            for (name, ty, pos) in entries {
                let ty = match (name, ty) {
                    (_, Some(ty)) => ty,
                    (Some(name), None) => Expr::Ident(name),
                    (None, None) => continue,
                };
                let end = ty.range().end;
                list.push(Field {
                    data: NodeData::new(self.ids.next_id(), pos, end),
                    names: Vec::new(),
                    ty,
                    tag: None,
                });
            }
        }

        if let Some(index) = list.iter().position(|f| matches!(f.ty, Expr::Ellipsis(_))) {
            if index + 1 != list.len() || list[index].names.len() > 1 {
                let range = list[index].data.range;
                return self.error_at(range, &VARIADIC_PARAMETER_MUST_BE_LAST, &[]);
            }
        }

        Ok(FieldList {
            data: self.node(lparen),
            list,
            delimited: true,
        })
    }

    fn parse_variadic(&mut self) -> PResult<Expr> {
        let pos = self.expect(SyntaxKind::DotDotDotToken)?;
        let elt = self.parse_type()?;
        Ok(Expr::Ellipsis(Box::new(Ellipsis {
            data: self.node(pos),
            elt: Some(elt),
        })))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_block(&mut self) -> PResult<Block> {
        let pos = self.expect(SyntaxKind::OpenBraceToken)?;
        let stmts = self.parse_stmt_list()?;
        let rbrace = self.expect(SyntaxKind::CloseBraceToken)?;
        Ok(Block {
            data: self.node(pos),
            stmts,
            rbrace,
        })
    }

    fn parse_stmt_list(&mut self) -> PResult<Vec<Stmt>> {
        let mut list = Vec::new();
        while !matches!(
            self.tok(),
            SyntaxKind::CaseKeyword
                | SyntaxKind::DefaultKeyword
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::EndOfFileToken
        ) {
            if let Some(stmt) = self.parse_stmt()? {
                list.push(stmt);
            }
        }
        Ok(list)
    }

    /// Parse one statement and its terminating semicolon. Empty statements
    /// yield `None`.
    fn parse_stmt(&mut self) -> PResult<Option<Stmt>> {
        self.enter()?;
        let result = self.parse_stmt_inner();
        self.leave();
        result
    }

    fn parse_stmt_inner(&mut self) -> PResult<Option<Stmt>> {
        let pos = self.pos();
        let stmt = match self.tok() {
            SyntaxKind::SemicolonToken => {
                self.next();
                return Ok(None);
            }
            kind @ (SyntaxKind::VarKeyword | SyntaxKind::ConstKeyword | SyntaxKind::TypeKeyword) => {
                let decl = self.parse_gen_decl(kind)?;
                Stmt::Decl(Box::new(decl))
            }
            SyntaxKind::GoKeyword | SyntaxKind::DeferKeyword => {
                let keyword = self.tok();
                self.next();
                let call = self.parse_expr()?;
                if !matches!(call.unparen(), Expr::Call(_)) {
                    return self.error_expected("function call");
                }
                let data = self.node(pos);
                if keyword == SyntaxKind::GoKeyword {
                    Stmt::Go(Box::new(GoStmt { data, call }))
                } else {
                    Stmt::Defer(Box::new(DeferStmt { data, call }))
                }
            }
            SyntaxKind::ReturnKeyword => {
                self.next();
                let results = if self.tok() != SyntaxKind::SemicolonToken
                    && self.tok() != SyntaxKind::CloseBraceToken
                {
                    self.parse_expr_list()?
                } else {
                    Vec::new()
                };
                Stmt::Return(Box::new(ReturnStmt {
                    data: self.node(pos),
                    results,
                }))
            }
            tok @ (SyntaxKind::BreakKeyword
            | SyntaxKind::ContinueKeyword
            | SyntaxKind::GotoKeyword
            | SyntaxKind::FallthroughKeyword) => {
                self.next();
                let label = if tok != SyntaxKind::FallthroughKeyword
                    && self.tok() == SyntaxKind::Identifier
                {
                    Some(self.parse_ident()?)
                } else {
                    None
                };
                Stmt::Branch(Box::new(BranchStmt {
                    data: self.node(pos),
                    tok,
                    label,
                }))
            }
            SyntaxKind::OpenBraceToken => Stmt::Block(Box::new(self.parse_block()?)),
            SyntaxKind::IfKeyword => Stmt::If(Box::new(self.parse_if_stmt()?)),
            SyntaxKind::SwitchKeyword => self.parse_switch_stmt()?,
            SyntaxKind::SelectKeyword => Stmt::Select(Box::new(self.parse_select_stmt()?)),
            SyntaxKind::ForKeyword => self.parse_for_stmt()?,
            _ => match self.parse_simple_stmt(SimpleMode::LabelOk)? {
                Simple::Stmt(stmt @ Stmt::Labeled(_)) => return Ok(Some(stmt)),
                Simple::Stmt(stmt) => stmt,
                Simple::Range(_) => return self.error(&RANGE_REQUIRES_ASSIGNMENT, &[]),
            },
        };
        self.expect_semi()?;
        Ok(Some(stmt))
    }

    fn parse_simple_stmt(&mut self, mode: SimpleMode) -> PResult<Simple> {
        let pos = self.pos();
        if mode == SimpleMode::RangeOk && self.tok() == SyntaxKind::RangeKeyword {
            self.next();
            let x = self.parse_expr()?;
            return Ok(Simple::Range(RangeClause {
                pos,
                key: None,
                value: None,
                tok: None,
                x,
            }));
        }

        if !self.can_start_expr() {
            let found = self.found_text();
            return self.error(&EXPECTED_STATEMENT, &[&found]);
        }
        let mut lhs = self.parse_expr_list()?;

        match self.tok() {
            SyntaxKind::ColonEqualsToken => {
                if let Some(bad) = lhs.iter().find(|e| !matches!(e, Expr::Ident(_))) {
                    let range = bad.range();
                    let shown = self.scanner.text()[range.to_range()].to_string();
                    return self.error_at(range, &EXPECTED_IDENTIFIER_ON_LEFT_SIDE, &[&shown]);
                }
                self.parse_assign_tail(pos, lhs, mode)
            }
            kind if kind.is_assignment_operator() => self.parse_assign_tail(pos, lhs, mode),
            _ if lhs.len() > 1 => self.error_expected("':=' or '=' or ','"),
            SyntaxKind::ColonToken if mode == SimpleMode::LabelOk && matches!(lhs[0], Expr::Ident(_)) => {
                self.next();
                let Some(Expr::Ident(label)) = lhs.pop() else {
                    return self.error_expected("label");
                };
                let stmt = if self.tok() == SyntaxKind::CloseBraceToken {
                    None
                } else {
                    self.parse_stmt()?
                };
                let stmt = stmt.unwrap_or_else(|| {
                    let at = self.prev_end;
                    Stmt::Empty(EmptyStmt {
                        data: NodeData::new(self.ids.next_id(), at, at),
                    })
                });
                Ok(Simple::Stmt(Stmt::Labeled(Box::new(LabeledStmt {
                    data: self.node(pos),
                    label,
                    stmt,
                }))))
            }
            SyntaxKind::ArrowToken => {
                self.next();
                let value = self.parse_expr()?;
                let chan = lhs.remove(0);
                Ok(Simple::Stmt(Stmt::Send(Box::new(SendStmt {
                    data: self.node(pos),
                    chan,
                    value,
                }))))
            }
            tok @ (SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken) => {
                self.next();
                let x = lhs.remove(0);
                Ok(Simple::Stmt(Stmt::IncDec(Box::new(IncDecStmt {
                    data: self.node(pos),
                    x,
                    tok,
                }))))
            }
            _ => {
                let x = lhs.remove(0);
                Ok(Simple::Stmt(Stmt::Expr(Box::new(ExprStmt {
                    data: self.node(pos),
                    x,
                }))))
            }
        }
    }

    fn parse_assign_tail(&mut self, pos: TextPos, lhs: Vec<Expr>, mode: SimpleMode) -> PResult<Simple> {
        let tok = self.tok();
        self.next();
        let is_plain = tok == SyntaxKind::ColonEqualsToken || tok == SyntaxKind::EqualsToken;
        if mode == SimpleMode::RangeOk && is_plain && self.tok() == SyntaxKind::RangeKeyword {
            self.next();
            let x = self.parse_expr()?;
            if lhs.len() > 2 {
                return self.error_at(TextRange::new(pos, self.prev_end), &RANGE_REQUIRES_ASSIGNMENT, &[]);
            }
            let mut targets = lhs.into_iter();
            return Ok(Simple::Range(RangeClause {
                pos,
                key: targets.next(),
                value: targets.next(),
                tok: Some(tok),
                x,
            }));
        }
        let rhs = self.parse_expr_list()?;
        Ok(Simple::Stmt(Stmt::Assign(Box::new(AssignStmt {
            data: self.node(pos),
            lhs,
            tok,
            rhs,
        }))))
    }

    /// Run `f` with composite literals of bare type names disabled.
    fn in_control_clause<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let old = self.expr_lev;
        self.expr_lev = -1;
        let result = f(self);
        self.expr_lev = old;
        result
    }

    fn stmt_to_expr(&mut self, stmt: Stmt) -> PResult<Expr> {
        match stmt {
            Stmt::Expr(expr) => Ok(expr.x),
            other => {
                let range = other.range();
                self.error_at(range, &EXPECTED_0_FOUND_1, &["boolean expression", "simple statement"])
            }
        }
    }

    fn parse_if_stmt(&mut self) -> PResult<IfStmt> {
        let pos = self.expect(SyntaxKind::IfKeyword)?;
        let (init, cond) = self.in_control_clause(|p| {
            if p.tok() == SyntaxKind::OpenBraceToken {
                return p.error(&MISSING_CONDITION_IN_IF, &[]);
            }
            let mut init = None;
            if p.tok() != SyntaxKind::SemicolonToken {
                match p.parse_simple_stmt(SimpleMode::Basic)? {
                    Simple::Stmt(stmt) => init = Some(stmt),
                    Simple::Range(_) => return p.error(&RANGE_REQUIRES_ASSIGNMENT, &[]),
                }
            }
            let cond = if p.tok() == SyntaxKind::SemicolonToken {
                p.next();
                if p.tok() == SyntaxKind::OpenBraceToken {
                    return p.error(&MISSING_CONDITION_IN_IF, &[]);
                }
                match p.parse_simple_stmt(SimpleMode::Basic)? {
                    Simple::Stmt(stmt) => p.stmt_to_expr(stmt)?,
                    Simple::Range(_) => return p.error(&RANGE_REQUIRES_ASSIGNMENT, &[]),
                }
            } else {
                match init.take() {
                    Some(stmt) => p.stmt_to_expr(stmt)?,
                    None => return p.error(&MISSING_CONDITION_IN_IF, &[]),
                }
            };
            Ok((init, cond))
        })?;

        let body = self.parse_block()?;
        let else_ = if self.got(SyntaxKind::ElseKeyword) {
            match self.tok() {
                SyntaxKind::IfKeyword => Some(Stmt::If(Box::new(self.parse_if_stmt()?))),
                SyntaxKind::OpenBraceToken => Some(Stmt::Block(Box::new(self.parse_block()?))),
                _ => {
                    let found = self.found_text();
                    return self.error(&EXPECTED_IF_STATEMENT_OR_BLOCK, &[&found]);
                }
            }
        } else {
            None
        };
        Ok(IfStmt {
            data: self.node(pos),
            init,
            cond,
            body,
            else_,
        })
    }

    fn parse_case_clause(&mut self) -> PResult<CaseClause> {
        let pos = self.pos();
        let list = if self.got(SyntaxKind::CaseKeyword) {
            Some(self.parse_expr_list()?)
        } else {
            self.expect(SyntaxKind::DefaultKeyword)?;
            None
        };
        let colon = self.expect(SyntaxKind::ColonToken)?;
        let body = self.parse_stmt_list()?;
        Ok(CaseClause {
            data: self.node(pos),
            list,
            colon,
            body,
        })
    }

    fn parse_switch_stmt(&mut self) -> PResult<Stmt> {
        let pos = self.expect(SyntaxKind::SwitchKeyword)?;
        let (init, guard) = self.in_control_clause(|p| {
            let mut init = None;
            let mut guard = None;
            if p.tok() != SyntaxKind::OpenBraceToken {
                if p.tok() != SyntaxKind::SemicolonToken {
                    guard = Some(p.parse_switch_header_stmt()?);
                }
                if p.tok() == SyntaxKind::SemicolonToken {
                    p.next();
                    init = guard.take();
                    if p.tok() != SyntaxKind::OpenBraceToken {
                        guard = Some(p.parse_switch_header_stmt()?);
                    }
                }
            }
            Ok((init, guard))
        })?;

        self.expect(SyntaxKind::OpenBraceToken)?;
        let mut clauses = Vec::new();
        while matches!(self.tok(), SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword) {
            clauses.push(self.parse_case_clause()?);
        }
        let rbrace = self.expect(SyntaxKind::CloseBraceToken)?;

        let type_switch = match guard {
            Some(Stmt::Expr(expr)) if is_type_switch_guard(&expr.x) => Some((None, expr.x)),
            Some(Stmt::Assign(assign))
                if assign.is_define()
                    && assign.lhs.len() == 1
                    && assign.rhs.len() == 1
                    && is_type_switch_guard(&assign.rhs[0]) =>
            {
                let AssignStmt { lhs, rhs, .. } = *assign;
                let binding = lhs.into_iter().next().and_then(|e| match e {
                    Expr::Ident(ident) => Some(ident),
                    _ => None,
                });
                let guard = rhs.into_iter().next();
                guard.map(|g| (binding, g))
            }
            other => {
                let tag = match other {
                    Some(stmt) => Some(self.stmt_to_expr(stmt)?),
                    None => None,
                };
                return Ok(Stmt::Switch(Box::new(SwitchStmt {
                    data: self.node(pos),
                    init,
                    tag,
                    clauses,
                    rbrace,
                })));
            }
        };

        let Some((binding, Expr::TypeAssert(assert))) = type_switch else {
            return self.error_expected("type switch guard");
        };
        Ok(Stmt::TypeSwitch(Box::new(TypeSwitchStmt {
            data: self.node(pos),
            init,
            binding,
            x: assert.x,
            clauses,
            rbrace,
        })))
    }

    fn parse_switch_header_stmt(&mut self) -> PResult<Stmt> {
        match self.parse_simple_stmt(SimpleMode::Basic)? {
            Simple::Stmt(stmt) => Ok(stmt),
            Simple::Range(_) => self.error(&RANGE_REQUIRES_ASSIGNMENT, &[]),
        }
    }

    fn parse_select_stmt(&mut self) -> PResult<SelectStmt> {
        let pos = self.expect(SyntaxKind::SelectKeyword)?;
        self.expect(SyntaxKind::OpenBraceToken)?;
        let mut clauses = Vec::new();
        while matches!(self.tok(), SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword) {
            let clause_pos = self.pos();
            let comm = if self.got(SyntaxKind::CaseKeyword) {
                Some(self.parse_switch_header_stmt()?)
            } else {
                self.expect(SyntaxKind::DefaultKeyword)?;
                None
            };
            let colon = self.expect(SyntaxKind::ColonToken)?;
            let body = self.parse_stmt_list()?;
            clauses.push(CommClause {
                data: self.node(clause_pos),
                comm,
                colon,
                body,
            });
        }
        let rbrace = self.expect(SyntaxKind::CloseBraceToken)?;
        Ok(SelectStmt {
            data: self.node(pos),
            clauses,
            rbrace,
        })
    }

    fn parse_for_stmt(&mut self) -> PResult<Stmt> {
        let pos = self.expect(SyntaxKind::ForKeyword)?;
        let (init, cond, post) = self.in_control_clause(|p| {
            let mut init = None;
            let mut cond = None;
            let mut post = None;
            if p.tok() != SyntaxKind::OpenBraceToken {
                if p.tok() != SyntaxKind::SemicolonToken {
                    cond = Some(p.parse_simple_stmt(SimpleMode::RangeOk)?);
                }
                let is_range = matches!(cond, Some(Simple::Range(_)));
                if !is_range && p.tok() == SyntaxKind::SemicolonToken {
                    p.next();
                    init = cond.take();
                    if p.tok() != SyntaxKind::SemicolonToken {
                        cond = Some(p.parse_simple_stmt(SimpleMode::Basic)?);
                    }
                    p.expect(SyntaxKind::SemicolonToken)?;
                    if p.tok() != SyntaxKind::OpenBraceToken {
                        post = Some(p.parse_switch_header_stmt()?);
                    }
                }
            }
            Ok((init, cond, post))
        })?;
        let body = self.parse_block()?;

        if let Some(Simple::Range(clause)) = cond {
            let RangeClause { pos: _, key, value, tok, x } = clause;
            return Ok(Stmt::Range(Box::new(RangeStmt {
                data: self.node(pos),
                key,
                value,
                tok,
                x,
                body,
            })));
        }

        let init = match init {
            Some(Simple::Stmt(stmt)) => Some(stmt),
            Some(Simple::Range(clause)) => {
                let range = TextRange::new(clause.pos, clause.x.range().end);
                return self.error_at(range, &RANGE_REQUIRES_ASSIGNMENT, &[]);
            }
            None => None,
        };
        let cond = match cond {
            Some(Simple::Stmt(stmt)) => Some(self.stmt_to_expr(stmt)?),
            _ => None,
        };
        Ok(Stmt::For(Box::new(ForStmt {
            data: self.node(pos),
            init,
            cond,
            post,
            body,
        })))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn can_start_expr(&self) -> bool {
        let tok = self.tok();
        can_start_type(tok)
            || tok.is_literal()
            || is_unary_operator(tok)
            || tok == SyntaxKind::FuncKeyword
    }

    fn parse_expr_list(&mut self) -> PResult<Vec<Expr>> {
        let mut list = vec![self.parse_expr()?];
        while self.got(SyntaxKind::CommaToken) {
            list.push(self.parse_expr()?);
        }
        Ok(list)
    }

    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        self.enter()?;
        let result = self.parse_binary_expr(OperatorPrecedence::LogicalOr as u8);
        self.leave();
        result
    }

    /// Binary operators are left-associative: the right operand only takes
    /// operators that bind tighter.
    fn parse_binary_expr(&mut self, min_prec: u8) -> PResult<Expr> {
        let pos = self.pos();
        let mut x = self.parse_unary_expr()?;
        loop {
            let op = self.tok();
            let Some(prec) = get_binary_operator_precedence(op) else {
                return Ok(x);
            };
            if (prec as u8) < min_prec {
                return Ok(x);
            }
            self.next();
            let y = self.parse_binary_expr(prec as u8 + 1)?;
            x = Expr::Binary(Box::new(BinaryExpr {
                data: self.node(pos),
                x,
                op,
                y,
            }));
        }
    }

    fn parse_unary_expr(&mut self) -> PResult<Expr> {
        self.enter()?;
        let result = self.parse_unary_expr_inner();
        self.leave();
        result
    }

    fn parse_unary_expr_inner(&mut self) -> PResult<Expr> {
        let pos = self.pos();
        match self.tok() {
            op if is_unary_operator(op) => {
                self.next();
                let x = self.parse_unary_expr()?;
                Ok(Expr::Unary(Box::new(UnaryExpr {
                    data: self.node(pos),
                    op,
                    x,
                })))
            }
            SyntaxKind::ArrowToken => {
                self.next();
                if self.tok() == SyntaxKind::ChanKeyword {
                    // <-chan T
                    self.next();
                    let value = self.parse_type()?;
                    return Ok(Expr::ChanType(Box::new(ChanType {
                        data: self.node(pos),
                        dir: ChanDir::RECV,
                        value,
                    })));
                }
                let x = self.parse_unary_expr()?;
                Ok(Expr::Unary(Box::new(UnaryExpr {
                    data: self.node(pos),
                    op: SyntaxKind::ArrowToken,
                    x,
                })))
            }
            SyntaxKind::AsteriskToken => {
                self.next();
                let x = self.parse_unary_expr()?;
                Ok(Expr::Star(Box::new(StarExpr {
                    data: self.node(pos),
                    x,
                })))
            }
            _ => self.parse_primary_expr(),
        }
    }

    fn parse_operand(&mut self) -> PResult<Expr> {
        let pos = self.pos();
        match self.tok() {
            SyntaxKind::Identifier => Ok(Expr::Ident(self.parse_ident()?)),
            kind if kind.is_literal() => Ok(Expr::BasicLit(self.parse_basic_lit()?)),
            SyntaxKind::OpenParenToken => {
                self.next();
                self.expr_lev += 1;
                let x = self.parse_expr_or_type()?;
                self.expr_lev -= 1;
                self.expect(SyntaxKind::CloseParenToken)?;
                Ok(Expr::Paren(Box::new(ParenExpr {
                    data: self.node(pos),
                    x,
                })))
            }
            SyntaxKind::FuncKeyword => {
                self.next();
                let ty = self.parse_signature(pos)?;
                if self.tok() != SyntaxKind::OpenBraceToken {
                    return Ok(Expr::FuncType(Box::new(ty)));
                }
                self.expr_lev += 1;
                let body = self.parse_block()?;
                self.expr_lev -= 1;
                Ok(Expr::FuncLit(Box::new(FuncLit {
                    data: self.node(pos),
                    ty,
                    body,
                })))
            }
            _ => match self.try_type()? {
                Some(ty) => Ok(ty),
                None => {
                    let found = self.found_text();
                    self.error(&EXPECTED_OPERAND, &[&found])
                }
            },
        }
    }

    /// Inside parentheses and argument lists a type may stand where an
    /// expression is expected (`(*T)(x)`, `make([]int, n)`).
    fn parse_expr_or_type(&mut self) -> PResult<Expr> {
        self.parse_expr()
    }

    fn parse_primary_expr(&mut self) -> PResult<Expr> {
        let pos = self.pos();
        let mut x = self.parse_operand()?;
        loop {
            match self.tok() {
                SyntaxKind::DotToken => {
                    self.next();
                    match self.tok() {
                        SyntaxKind::Identifier => {
                            let sel = self.parse_ident()?;
                            x = Expr::Selector(Box::new(SelectorExpr {
                                data: self.node(pos),
                                x,
                                sel,
                            }));
                        }
                        SyntaxKind::OpenParenToken => {
                            self.next();
                            let ty = if self.got(SyntaxKind::TypeKeyword) {
                                None
                            } else {
                                Some(self.parse_type()?)
                            };
                            self.expect(SyntaxKind::CloseParenToken)?;
                            x = Expr::TypeAssert(Box::new(TypeAssertExpr {
                                data: self.node(pos),
                                x,
                                ty,
                            }));
                        }
                        _ => {
                            let found = self.found_text();
                            return self.error(&EXPECTED_SELECTOR_OR_TYPE_ASSERTION, &[&found]);
                        }
                    }
                }
                SyntaxKind::OpenBracketToken => {
                    x = self.parse_index_or_slice(pos, x)?;
                }
                SyntaxKind::OpenParenToken => {
                    x = self.parse_call(pos, x)?;
                }
                SyntaxKind::OpenBraceToken
                    if is_literal_type(&x) && (self.expr_lev >= 0 || !is_type_name(&x)) =>
                {
                    x = self.parse_composite_lit(pos, Some(x))?;
                }
                _ => return Ok(x),
            }
        }
    }

    fn parse_index_or_slice(&mut self, pos: TextPos, x: Expr) -> PResult<Expr> {
        self.expect(SyntaxKind::OpenBracketToken)?;
        self.expr_lev += 1;
        let mut index: [Option<Expr>; 3] = [None, None, None];
        let mut colons = 0;
        if self.tok() != SyntaxKind::ColonToken {
            index[0] = Some(self.parse_expr_or_type()?);
        }
        while colons < 2 && self.got(SyntaxKind::ColonToken) {
            colons += 1;
            if !matches!(self.tok(), SyntaxKind::ColonToken | SyntaxKind::CloseBracketToken) {
                index[colons] = Some(self.parse_expr()?);
            }
        }
        if self.tok() == SyntaxKind::CommaToken {
            return self.error(&TYPE_PARAMETERS_NOT_SUPPORTED, &[]);
        }
        self.expr_lev -= 1;
        self.expect(SyntaxKind::CloseBracketToken)?;

        let [low, high, max] = index;
        if colons == 0 {
            let Some(index) = low else {
                return self.error(&EXPECTED_OPERAND, &["']'"]);
            };
            return Ok(Expr::Index(Box::new(IndexExpr {
                data: self.node(pos),
                x,
                index,
            })));
        }
        let slice3 = colons == 2;
        if slice3 && (high.is_none() || max.is_none()) {
            return self.error_at(
                TextRange::new(pos, self.prev_end),
                &EXPECTED_OPERAND,
                &["':'"],
            );
        }
        Ok(Expr::Slice(Box::new(SliceExpr {
            data: self.node(pos),
            x,
            low,
            high,
            max,
            slice3,
        })))
    }

    fn parse_call(&mut self, pos: TextPos, fun: Expr) -> PResult<Expr> {
        self.expect(SyntaxKind::OpenParenToken)?;
        self.expr_lev += 1;
        let mut args = Vec::new();
        let mut ellipsis = false;
        while self.tok() != SyntaxKind::CloseParenToken && self.tok() != SyntaxKind::EndOfFileToken {
            args.push(self.parse_expr_or_type()?);
            if self.got(SyntaxKind::DotDotDotToken) {
                ellipsis = true;
            }
            if !self.got(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expr_lev -= 1;
        let rparen = self.expect(SyntaxKind::CloseParenToken)?;
        Ok(Expr::Call(Box::new(CallExpr {
            data: self.node(pos),
            fun,
            args,
            ellipsis,
            rparen,
        })))
    }

    fn parse_composite_lit(&mut self, pos: TextPos, ty: Option<Expr>) -> PResult<Expr> {
        let lbrace = self.expect(SyntaxKind::OpenBraceToken)?;
        self.expr_lev += 1;
        let mut elts = Vec::new();
        while self.tok() != SyntaxKind::CloseBraceToken && self.tok() != SyntaxKind::EndOfFileToken {
            elts.push(self.parse_element()?);
            if !self.got(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expr_lev -= 1;
        let rbrace = self.expect(SyntaxKind::CloseBraceToken)?;
        Ok(Expr::CompositeLit(Box::new(CompositeLit {
            data: self.node(pos),
            ty,
            lbrace,
            elts,
            rbrace,
        })))
    }

    fn parse_element(&mut self) -> PResult<Expr> {
        let pos = self.pos();
        let x = self.parse_element_value()?;
        if !self.got(SyntaxKind::ColonToken) {
            return Ok(x);
        }
        let value = self.parse_element_value()?;
        Ok(Expr::KeyValue(Box::new(KeyValueExpr {
            data: self.node(pos),
            key: x,
            value,
        })))
    }

    /// An element value, where `{...}` is a literal with an elided type.
    fn parse_element_value(&mut self) -> PResult<Expr> {
        if self.tok() == SyntaxKind::OpenBraceToken {
            let pos = self.pos();
            return self.parse_composite_lit(pos, None);
        }
        self.parse_expr()
    }
}

fn is_type_switch_guard(x: &Expr) -> bool {
    matches!(x, Expr::TypeAssert(assert) if assert.ty.is_none())
}
