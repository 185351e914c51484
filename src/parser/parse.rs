//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, scopes, and the main parse entry
//! point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, scopes and comment attachment
//! - `declarations`: declaration specifiers, declarators, initializers
//! - `statements`: statements and labels
//! - `expressions`: expressions with precedence climbing
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state. Nodes are pushed into a
//! [`ProgramBuilder`] as they are recognised; a failed parse discards the
//! builder, so no partial program ever escapes.

use crate::parser::lexer::{Comment, LexError, Lexer, Token, TokenKind};
use crate::syntax::{DeclId, Program, ProgramBuilder, SourceLocation, Span, TypeId};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Parser error type
#[derive(Debug, Error)]
#[error("{file}: parse error at line {}, column {}: {message}", location.line, location.column)]
pub struct ParseError {
    pub file: String,
    pub message: String,
    pub location: SourceLocation,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            file: String::new(),
            message: err.message,
            location: err.location,
        }
    }
}

/// What an ordinary identifier means in a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameKind {
    Typedef,
    Object,
}

/// One block of name and tag bindings.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    pub(crate) names: FxHashMap<String, NameKind>,
    pub(crate) tags: FxHashMap<String, TypeId>,
}

/// Recursive descent parser for C
pub struct Parser {
    pub(crate) file: String,
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) builder: ProgramBuilder,
    pub(crate) scopes: Vec<Scope>,
    comments: Vec<Comment>,
    next_comment: usize,
}

impl Parser {
    pub fn new(file: &str, source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize().map_err(|err| ParseError {
            file: file.to_string(),
            ..ParseError::from(err)
        })?;
        log::debug!("{}: {} tokens", file, tokens.len());
        Ok(Self {
            file: file.to_string(),
            tokens,
            position: 0,
            builder: ProgramBuilder::new(),
            scopes: vec![Scope::default()],
            comments: lexer.take_comments(),
            next_comment: 0,
        })
    }

    /// Parse the entire translation unit
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut decls: Vec<DeclId> = Vec::new();

        while !self.is_at_end() {
            let before = self.comments_before(self.current_location());
            let group = self.parse_external_declaration()?;
            let suffix = self.comments_on_line(self.previous().end);

            if let (Some(&first), Some(&last)) = (group.first(), group.last()) {
                self.builder.decl_mut(first).comments.before = before;
                self.builder.decl_mut(last).comments.suffix = suffix;
            }
            decls.extend(group);
        }

        let after: Vec<String> = self.comments[self.next_comment..]
            .iter()
            .map(|c| c.text.clone())
            .collect();
        self.next_comment = self.comments.len();
        if let Some(&last) = decls.last() {
            self.builder.decl_mut(last).comments.after = after;
        }

        log::debug!("{}: {} top-level declarations", self.file, decls.len());
        let builder = std::mem::take(&mut self.builder);
        Ok(builder.finish(self.file.clone(), decls))
    }

    // ===== Comment attachment =====

    /// Comments not yet claimed that start before `loc`.
    fn comments_before(&mut self, loc: SourceLocation) -> Vec<String> {
        let mut found = Vec::new();
        while let Some(comment) = self.comments.get(self.next_comment) {
            if comment.location >= loc {
                break;
            }
            found.push(comment.text.clone());
            self.next_comment += 1;
        }
        found
    }

    /// Comments after `end` on the same line. Comments inside the
    /// declaration just parsed are skipped.
    fn comments_on_line(&mut self, end: SourceLocation) -> Vec<String> {
        while let Some(comment) = self.comments.get(self.next_comment) {
            if comment.location >= end {
                break;
            }
            self.next_comment += 1;
        }
        let mut found = Vec::new();
        while let Some(comment) = self.comments.get(self.next_comment) {
            if comment.location.line != end.line {
                break;
            }
            found.push(comment.text.clone());
            self.next_comment += 1;
        }
        found
    }

    // ===== Scopes =====

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub(crate) fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "popping the file scope");
        self.scopes.pop();
    }

    pub(crate) fn declare_name(&mut self, name: &str, kind: NameKind) {
        if name.is_empty() {
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.names.insert(name.to_string(), kind);
        }
    }

    pub(crate) fn is_typedef_name(&self, name: &str) -> bool {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.names.get(name))
            .is_some_and(|&kind| kind == NameKind::Typedef)
    }

    pub(crate) fn lookup_tag(&self, tag: &str) -> Option<TypeId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.tags.get(tag).copied())
    }

    pub(crate) fn local_tag(&self, tag: &str) -> Option<TypeId> {
        self.scopes.last().and_then(|scope| scope.tags.get(tag).copied())
    }

    pub(crate) fn declare_tag(&mut self, tag: &str, ty: TypeId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.tags.insert(tag.to_string(), ty);
        }
    }

    // ===== Helper methods =====

    /// True if `kind` can begin a declaration (storage class, qualifier or
    /// type specifier).
    pub(crate) fn starts_declaration(&self, kind: &TokenKind) -> bool {
        match kind {
            TokenKind::Auto
            | TokenKind::Register
            | TokenKind::Static
            | TokenKind::Extern
            | TokenKind::Typedef
            | TokenKind::Inline => true,
            other => self.starts_type_name(other),
        }
    }

    /// True if `kind` can begin a type name.
    pub(crate) fn starts_type_name(&self, kind: &TokenKind) -> bool {
        match kind {
            TokenKind::Void
            | TokenKind::Bool
            | TokenKind::Char
            | TokenKind::Short
            | TokenKind::Int
            | TokenKind::Long
            | TokenKind::Float
            | TokenKind::Double
            | TokenKind::Signed
            | TokenKind::Unsigned
            | TokenKind::Struct
            | TokenKind::Union
            | TokenKind::Enum
            | TokenKind::Const
            | TokenKind::Volatile
            | TokenKind::Restrict => true,
            TokenKind::Ident(name) => self.is_typedef_name(name),
            _ => false,
        }
    }

    pub(crate) fn is_declaration_start(&self) -> bool {
        self.starts_declaration(&self.peek().kind)
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn check_ahead(&self, n: usize, kind: &TokenKind) -> bool {
        self.peek_ahead(n)
            .is_some_and(|t| std::mem::discriminant(&t.kind) == std::mem::discriminant(kind))
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: SourceLocation) -> Span {
        Span::new(start, self.previous().end.max(start))
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            file: self.file.clone(),
            message: message.into(),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect_token(&mut self, kind: &TokenKind, message: &str) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("{}, found {}", message, self.peek())))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::LParen, &format!("Expected '(' {ctx}"))
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::RParen, &format!("Expected ')' {ctx}"))
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::RBrace, &format!("Expected '}}' {ctx}"))
    }

    pub(crate) fn expect_rbracket(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::RBracket, &format!("Expected ']' {ctx}"))
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::Semicolon, &format!("Expected ';' {ctx}"))
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error(format!("Expected identifier, found {}", self.peek())))
        }
    }
}
