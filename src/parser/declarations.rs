//! Declaration parsing implementation
//!
//! This module handles parsing of C declarations:
//!
//! - Declaration specifiers: storage class, qualifiers, basic type words,
//!   `struct`/`union`/`enum` specifiers and typedef names
//! - Declarators: pointers, arrays, function parameters, parenthesised and
//!   abstract declarators
//! - Function definitions and init-declarator lists
//! - Initializers, including braced lists with designators
//!
//! # Grammar
//!
//! ```text
//! declaration     ::= specifiers (init_declarator ("," init_declarator)*)? ";"
//! function_def    ::= specifiers declarator compound_statement
//! init_declarator ::= declarator ("=" initializer)?
//! declarator      ::= ("*" qualifier*)* direct_declarator
//! direct_declarator ::= (identifier | "(" declarator ")")? suffix*
//! suffix          ::= "[" expr? "]" | "(" parameters ")"
//! initializer     ::= assignment_expr | "{" (designation? initializer ","?)* "}"
//! designation     ::= ("." identifier | "[" expr "]")+ "="
//! ```
//!
//! All specifiers of a declaration produce one type node, which every
//! declarator of that declaration builds on, so `int a, b;` shares its `int`.
//! A `struct S` reference resolves through the tag scopes to the one node of
//! that tag.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::lexer::TokenKind;
use crate::parser::parse::{NameKind, ParseError, Parser};
use crate::syntax::{
    Decl, DeclId, ExprId, Init, InitId, Prefix, SourceLocation, Span, Storage, Type, TypeId,
    TypeKind, TypeQual,
};

/// Storage class and type shared by every declarator of one declaration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Specifiers {
    pub(crate) storage: Storage,
    pub(crate) is_inline: bool,
    pub(crate) ty: TypeId,
}

/// Name and full type produced by one declarator.
#[derive(Debug, Clone)]
pub(crate) struct Declarator {
    pub(crate) name: Option<String>,
    pub(crate) ty: TypeId,
}

enum Suffix {
    Array(Option<ExprId>, Span),
    Func(Vec<DeclId>, bool, Span),
}

/// Basic type keywords seen in one specifier list.
#[derive(Debug, Default)]
struct TypeWords {
    void: bool,
    bool: bool,
    char: bool,
    short: bool,
    int: bool,
    long: u8,
    float: bool,
    double: bool,
    signed: bool,
    unsigned: bool,
}

impl TypeWords {
    fn is_empty(&self) -> bool {
        !(self.void
            || self.bool
            || self.char
            || self.short
            || self.int
            || self.long > 0
            || self.float
            || self.double
            || self.signed
            || self.unsigned)
    }

    /// Resolve the keyword combination, or `None` if it is not a valid C type.
    fn kind(&self) -> Option<TypeKind> {
        let sized = self.short || self.long > 0;
        let signedness = self.signed || self.unsigned;

        if (self.signed && self.unsigned) || (self.short && self.long > 0) || self.long > 2 {
            return None;
        }

        let primaries = [self.void, self.bool, self.char, self.float, self.double]
            .iter()
            .filter(|&&seen| seen)
            .count();
        if primaries > 1 {
            return None;
        }

        let kind = if self.void || self.bool || self.float {
            if sized || signedness || self.int {
                return None;
            }
            if self.void {
                TypeKind::Void
            } else if self.bool {
                TypeKind::Bool
            } else {
                TypeKind::Float
            }
        } else if self.char {
            if sized || self.int {
                return None;
            }
            if self.signed {
                TypeKind::Schar
            } else if self.unsigned {
                TypeKind::Uchar
            } else {
                TypeKind::Char
            }
        } else if self.double {
            if self.short || self.int || signedness || self.long > 1 {
                return None;
            }
            if self.long == 1 {
                TypeKind::LongDouble
            } else {
                TypeKind::Double
            }
        } else if self.short {
            if self.unsigned {
                TypeKind::Ushort
            } else {
                TypeKind::Short
            }
        } else if self.long == 2 {
            if self.unsigned {
                TypeKind::Ulonglong
            } else {
                TypeKind::Longlong
            }
        } else if self.long == 1 {
            if self.unsigned {
                TypeKind::Ulong
            } else {
                TypeKind::Long
            }
        } else if self.unsigned {
            TypeKind::Uint
        } else {
            TypeKind::Int
        };

        Some(kind)
    }
}

impl Parser {
    /// Parse a file-scope declaration or function definition. Returns the
    /// declarations in source order.
    pub(crate) fn parse_external_declaration(&mut self) -> Result<Vec<DeclId>, ParseError> {
        self.parse_declaration(true)
    }

    /// Parse a declaration. Function definitions are accepted only when
    /// `allow_definition` is set (file scope).
    pub(crate) fn parse_declaration(
        &mut self,
        allow_definition: bool,
    ) -> Result<Vec<DeclId>, ParseError> {
        let start = self.current_location();
        let specs = self.parse_specifiers()?;

        // Tag-only declaration: struct S { ... };
        if self.match_token(&TokenKind::Semicolon) {
            let decl = Decl::new("", specs.ty, self.span_from(start)).with_storage(specs.storage);
            return Ok(vec![self.builder.decl(decl)]);
        }

        let first = self.parse_declarator(specs.ty, false)?;

        if self.check(&TokenKind::LBrace)
            && self.builder.get_type(first.ty).kind == TypeKind::Func
        {
            if !allow_definition {
                return Err(self.error("Function definition is not allowed here"));
            }
            return Ok(vec![self.parse_function_definition(start, specs, first)?]);
        }

        let mut decls = Vec::new();
        let mut declarator = first;
        loop {
            decls.push(self.finish_init_declarator(start, specs, declarator)?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
            declarator = self.parse_declarator(specs.ty, false)?;
        }

        self.expect_semicolon("after declaration")?;
        Ok(decls)
    }

    /// Parse a function body and produce the function declaration.
    fn parse_function_definition(
        &mut self,
        start: SourceLocation,
        specs: Specifiers,
        declarator: Declarator,
    ) -> Result<DeclId, ParseError> {
        let name = declarator
            .name
            .ok_or_else(|| self.error("Expected function name"))?;
        log::debug!("function definition '{}'", name);

        self.declare_name(&name, NameKind::Object);
        self.push_scope();
        let params = self.builder.get_type(declarator.ty).decls.clone();
        for param in params {
            let param_name = self.builder.get_decl(param).name.clone();
            self.declare_name(&param_name, NameKind::Object);
        }
        let body = self.parse_compound_statement();
        self.pop_scope();
        let body = body?;

        let mut decl = Decl::new(name, declarator.ty, self.span_from(start))
            .with_storage(specs.storage)
            .with_body(body);
        decl.is_inline = specs.is_inline;
        Ok(self.builder.decl(decl))
    }

    pub(crate) fn finish_init_declarator(
        &mut self,
        start: SourceLocation,
        specs: Specifiers,
        declarator: Declarator,
    ) -> Result<DeclId, ParseError> {
        let name = declarator
            .name
            .ok_or_else(|| self.error("Expected declarator name"))?;

        let kind = if specs.storage == Storage::Typedef {
            NameKind::Typedef
        } else {
            NameKind::Object
        };
        self.declare_name(&name, kind);
        log::trace!("declare '{}' ({:?})", name, kind);

        let init = if self.match_token(&TokenKind::Eq) {
            if kind == NameKind::Typedef {
                return Err(self.error(format!("Typedef '{}' cannot be initialized", name)));
            }
            Some(self.parse_initializer()?)
        } else {
            None
        };

        let mut decl =
            Decl::new(name, declarator.ty, self.span_from(start)).with_storage(specs.storage);
        decl.is_inline = specs.is_inline;
        if let Some(init) = init {
            decl = decl.with_init(init);
        }
        Ok(self.builder.decl(decl))
    }

    // ===== Specifiers =====

    /// Parse declaration specifiers into one type node.
    pub(crate) fn parse_specifiers(&mut self) -> Result<Specifiers, ParseError> {
        let start = self.current_location();
        let mut storage = Storage::None;
        let mut is_inline = false;
        let mut qual = TypeQual::default();
        let mut words = TypeWords::default();
        let mut tagged: Option<TypeId> = None;
        let mut typedef_name: Option<String> = None;

        loop {
            let class = match &self.peek().kind {
                TokenKind::Auto => Some(Storage::Auto),
                TokenKind::Register => Some(Storage::Register),
                TokenKind::Static => Some(Storage::Static),
                TokenKind::Extern => Some(Storage::Extern),
                TokenKind::Typedef => Some(Storage::Typedef),
                _ => None,
            };
            if let Some(class) = class {
                if storage != Storage::None {
                    return Err(self.error("Multiple storage classes in declaration"));
                }
                storage = class;
                self.advance();
                continue;
            }

            let named = tagged.is_some() || typedef_name.is_some();
            match self.peek().kind.clone() {
                TokenKind::Inline => is_inline = true,
                TokenKind::Const => qual.is_const = true,
                TokenKind::Volatile => qual.is_volatile = true,
                TokenKind::Restrict => {}
                TokenKind::Void => words.void = true,
                TokenKind::Bool => words.bool = true,
                TokenKind::Char => words.char = true,
                TokenKind::Short => words.short = true,
                TokenKind::Int => words.int = true,
                TokenKind::Long => words.long += 1,
                TokenKind::Float => words.float = true,
                TokenKind::Double => words.double = true,
                TokenKind::Signed => words.signed = true,
                TokenKind::Unsigned => words.unsigned = true,
                TokenKind::Struct | TokenKind::Union | TokenKind::Enum => {
                    if named || !words.is_empty() {
                        return Err(self.error("Multiple types in declaration"));
                    }
                    tagged = Some(self.parse_tagged_specifier()?);
                    continue;
                }
                TokenKind::Ident(name) if !named && words.is_empty() && self.is_typedef_name(&name) => {
                    typedef_name = Some(name);
                }
                _ => break,
            }
            self.advance();
        }

        let span = self.span_from(start);
        let ty = match (tagged, typedef_name) {
            (Some(ty), _) => ty,
            (None, Some(name)) => self
                .builder
                .ty(Type::typedef_name(name, span).qualified(qual)),
            (None, None) => {
                if words.is_empty() {
                    return Err(self.error(format!("Expected type specifier, found {}", self.peek())));
                }
                let kind = words
                    .kind()
                    .ok_or_else(|| self.error("Invalid combination of type specifiers"))?;
                self.builder.ty(Type::basic(kind, span).qualified(qual))
            }
        };

        Ok(Specifiers {
            storage,
            is_inline,
            ty,
        })
    }

    /// Parse `struct`, `union` or `enum` with an optional tag and body.
    fn parse_tagged_specifier(&mut self) -> Result<TypeId, ParseError> {
        let start = self.current_location();
        let kind = match self.advance().kind {
            TokenKind::Struct => TypeKind::Struct,
            TokenKind::Union => TypeKind::Union,
            _ => TypeKind::Enum,
        };

        let tag = if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Some(name)
        } else {
            None
        };

        if !self.check(&TokenKind::LBrace) {
            let tag = tag.ok_or_else(|| self.error(format!("Expected '{{' or tag after {}", kind)))?;
            // `struct S;` declares the tag in the current scope
            let found = if self.check(&TokenKind::Semicolon) {
                self.local_tag(&tag)
            } else {
                self.lookup_tag(&tag)
            };
            if let Some(id) = found {
                return self.check_tag_kind(id, kind, &tag);
            }
            let id = self.new_tagged(kind, Some(tag.clone()), start);
            self.declare_tag(&tag, id);
            return Ok(id);
        }

        // Definition: complete a forward declaration from this scope or start
        // a new type. The tag is visible inside its own body.
        let id = match tag.as_deref().and_then(|t| self.local_tag(t)) {
            Some(id) => {
                let tag = tag.clone().unwrap_or_default();
                self.check_tag_kind(id, kind, &tag)?;
                if !self.builder.get_type(id).decls.is_empty() {
                    return Err(self.error(format!("Redefinition of {} {}", kind, tag)));
                }
                id
            }
            None => {
                let id = self.new_tagged(kind, tag.clone(), start);
                if let Some(tag) = &tag {
                    self.declare_tag(tag, id);
                }
                id
            }
        };

        self.advance(); // consume '{'
        let members = if kind == TypeKind::Enum {
            self.parse_enumerators()?
        } else {
            self.parse_record_members()?
        };
        log::trace!("{} {:?}: {} members", kind, tag, members.len());
        self.builder.complete_type(id, members);
        Ok(id)
    }

    fn new_tagged(&mut self, kind: TypeKind, tag: Option<String>, start: SourceLocation) -> TypeId {
        let span = self.span_from(start);
        if kind == TypeKind::Enum {
            self.builder.ty(Type::enumeration(tag, Vec::new(), span))
        } else {
            self.builder.ty(Type::record(kind, tag, Vec::new(), span))
        }
    }

    fn check_tag_kind(&self, id: TypeId, kind: TypeKind, tag: &str) -> Result<TypeId, ParseError> {
        let found = self.builder.get_type(id).kind;
        if found == kind {
            Ok(id)
        } else {
            Err(self.error(format!("'{}' was declared as {}, not {}", tag, found, kind)))
        }
    }

    /// Parse struct or union members up to and including the closing brace.
    fn parse_record_members(&mut self) -> Result<Vec<DeclId>, ParseError> {
        let mut members = Vec::new();

        while !self.check(&TokenKind::RBrace) {
            if self.is_at_end() {
                return Err(self.error("Expected '}' after struct members"));
            }
            let start = self.current_location();
            let specs = self.parse_specifiers()?;

            // Anonymous struct or union member
            if self.match_token(&TokenKind::Semicolon) {
                let span = self.span_from(start);
                members.push(self.builder.decl(Decl::new("", specs.ty, span)));
                continue;
            }

            loop {
                let declarator = if self.check(&TokenKind::Colon) {
                    Declarator {
                        name: None,
                        ty: specs.ty,
                    }
                } else {
                    self.parse_declarator(specs.ty, false)?
                };

                let ty = if self.match_token(&TokenKind::Colon) {
                    let width = self.parse_conditional()?;
                    self.bit_field(declarator.ty, width)?
                } else {
                    declarator.ty
                };

                let name = declarator.name.unwrap_or_default();
                let span = self.span_from(start);
                members.push(self.builder.decl(Decl::new(name, ty, span)));

                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect_semicolon("after struct member")?;
        }

        self.expect_rbrace("after struct members")?;
        Ok(members)
    }

    /// A copy of integer type `ty` carrying a bit width.
    fn bit_field(&mut self, ty: TypeId, width: ExprId) -> Result<TypeId, ParseError> {
        let base = self.builder.get_type(ty);
        if !base.kind.is_integer() {
            return Err(self.error(format!("Bit-field has non-integer type {}", base.kind)));
        }
        let mut field = if base.kind.is_basic() {
            Type::bit_field(base.kind, width, base.span).qualified(base.qual)
        } else {
            base.clone()
        };
        field.width = Some(width);
        field.decls.clear();
        Ok(self.builder.ty(field))
    }

    /// Parse enumerators up to and including the closing brace. Each
    /// enumerator is a declaration of a shared `int` type, initialised with
    /// its explicit value if one is written.
    fn parse_enumerators(&mut self) -> Result<Vec<DeclId>, ParseError> {
        let here = Span::at(self.current_location());
        let int = self.builder.ty(Type::basic(TypeKind::Int, here));
        let mut enumerators = Vec::new();

        while !self.check(&TokenKind::RBrace) {
            let start = self.current_location();
            let name = self.expect_identifier()?;

            let init = if self.match_token(&TokenKind::Eq) {
                let value_start = self.current_location();
                let value = self.parse_conditional()?;
                let span = self.span_from(value_start);
                Some(self.builder.init(Init::expr(Vec::new(), value, span)))
            } else {
                None
            };

            self.declare_name(&name, NameKind::Object);
            let mut decl = Decl::new(name, int, self.span_from(start));
            if let Some(init) = init {
                decl = decl.with_init(init);
            }
            enumerators.push(self.builder.decl(decl));

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_rbrace("after enumerators")?;
        Ok(enumerators)
    }

    fn parse_qualifiers(&mut self) -> TypeQual {
        let mut qual = TypeQual::default();
        loop {
            match self.peek().kind {
                TokenKind::Const => qual.is_const = true,
                TokenKind::Volatile => qual.is_volatile = true,
                TokenKind::Restrict => {}
                _ => return qual,
            }
            self.advance();
        }
    }

    // ===== Declarators =====

    /// Parse a declarator on top of `base`. With `abstract_ok` the name may
    /// be omitted (parameters and type names).
    pub(crate) fn parse_declarator(
        &mut self,
        base: TypeId,
        abstract_ok: bool,
    ) -> Result<Declarator, ParseError> {
        let mut ty = base;
        while self.match_token(&TokenKind::Star) {
            let star = self.previous().location;
            let qual = self.parse_qualifiers();
            let span = self.span_from(star);
            ty = self.builder.ty(Type::pointer(ty, span).qualified(qual));
        }

        if self.check(&TokenKind::LParen) && self.is_nested_declarator() {
            // Suffixes after the parentheses bind tighter than the
            // declarator inside them: build those first, then come back.
            let inner = self.position + 1;
            self.skip_parenthesized()?;
            let outer = self.parse_declarator_suffixes(ty)?;
            let resume = self.position;

            self.position = inner;
            let declarator = self.parse_declarator(outer, abstract_ok)?;
            self.expect_rparen("to close declarator")?;
            self.position = resume;
            return Ok(declarator);
        }

        let name = if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Some(name)
        } else if abstract_ok {
            None
        } else {
            return Err(self.error(format!("Expected identifier, found {}", self.peek())));
        };

        let ty = self.parse_declarator_suffixes(ty)?;
        Ok(Declarator { name, ty })
    }

    /// At `(`: true if it opens a nested declarator rather than a
    /// parameter list.
    fn is_nested_declarator(&self) -> bool {
        match self.peek_ahead(1).map(|t| &t.kind) {
            Some(TokenKind::Star) | Some(TokenKind::LParen) => true,
            Some(TokenKind::Ident(name)) => !self.is_typedef_name(name),
            _ => false,
        }
    }

    /// Skip from `(` past its matching `)`.
    fn skip_parenthesized(&mut self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return Ok(());
                    }
                }
                TokenKind::Eof => return Err(self.error("Expected ')' to close declarator")),
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_declarator_suffixes(&mut self, base: TypeId) -> Result<TypeId, ParseError> {
        let mut suffixes = Vec::new();

        loop {
            let start = self.current_location();
            if self.match_token(&TokenKind::LBracket) {
                self.parse_qualifiers();
                self.match_token(&TokenKind::Static);
                let width = if self.check(&TokenKind::RBracket) {
                    None
                } else {
                    Some(self.parse_assignment()?)
                };
                self.expect_rbracket("after array size")?;
                suffixes.push(Suffix::Array(width, self.span_from(start)));
            } else if self.match_token(&TokenKind::LParen) {
                let (params, variadic) = self.parse_parameters()?;
                suffixes.push(Suffix::Func(params, variadic, self.span_from(start)));
            } else {
                break;
            }
        }

        // int a[2][3]: the first suffix is the outermost type
        let mut ty = base;
        for suffix in suffixes.into_iter().rev() {
            ty = match suffix {
                Suffix::Array(width, span) => self.builder.ty(Type::array(ty, width, span)),
                Suffix::Func(params, variadic, span) => {
                    self.builder.ty(Type::function(ty, params, variadic, span))
                }
            };
        }
        Ok(ty)
    }

    /// Parse a parameter list after `(`, including the closing `)`.
    fn parse_parameters(&mut self) -> Result<(Vec<DeclId>, bool), ParseError> {
        let mut params = Vec::new();
        let mut variadic = false;

        if self.match_token(&TokenKind::RParen) {
            return Ok((params, variadic));
        }
        if self.check(&TokenKind::Void) && self.check_ahead(1, &TokenKind::RParen) {
            self.advance(); // void
            self.advance(); // )
            return Ok((params, variadic));
        }

        loop {
            if self.match_token(&TokenKind::Ellipsis) {
                variadic = true;
                break;
            }
            let start = self.current_location();
            let specs = self.parse_specifiers()?;
            let declarator = self.parse_declarator(specs.ty, true)?;
            let name = declarator.name.unwrap_or_default();
            let param =
                Decl::new(name, declarator.ty, self.span_from(start)).with_storage(specs.storage);
            params.push(self.builder.decl(param));

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_rparen("after parameters")?;
        Ok((params, variadic))
    }

    /// Parse a type name: specifiers and an abstract declarator.
    pub(crate) fn parse_type_name(&mut self) -> Result<TypeId, ParseError> {
        let specs = self.parse_specifiers()?;
        if specs.storage != Storage::None {
            return Err(self.error("Storage class in type name"));
        }
        let declarator = self.parse_declarator(specs.ty, true)?;
        if let Some(name) = declarator.name {
            return Err(self.error(format!("Unexpected name '{}' in type name", name)));
        }
        Ok(declarator.ty)
    }

    // ===== Initializers =====

    pub(crate) fn parse_initializer(&mut self) -> Result<InitId, ParseError> {
        let start = self.current_location();
        if self.match_token(&TokenKind::LBrace) {
            let items = self.parse_initializer_list()?;
            let span = self.span_from(start);
            return Ok(self.builder.init(Init::braced(Vec::new(), items, span)));
        }
        let value = self.parse_assignment()?;
        let span = self.span_from(start);
        Ok(self.builder.init(Init::expr(Vec::new(), value, span)))
    }

    /// Parse braced initializer items after `{`, including the closing `}`.
    pub(crate) fn parse_initializer_list(&mut self) -> Result<Vec<InitId>, ParseError> {
        let mut items = Vec::new();

        while !self.check(&TokenKind::RBrace) {
            let start = self.current_location();
            let prefixes = self.parse_designation()?;
            let item = if self.match_token(&TokenKind::LBrace) {
                let nested = self.parse_initializer_list()?;
                Init::braced(prefixes, nested, self.span_from(start))
            } else {
                let value = self.parse_assignment()?;
                Init::expr(prefixes, value, self.span_from(start))
            };
            items.push(self.builder.init(item));

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_rbrace("after initializer list")?;
        Ok(items)
    }

    fn parse_designation(&mut self) -> Result<Vec<Prefix>, ParseError> {
        let mut prefixes = Vec::new();
        loop {
            let start = self.current_location();
            if self.match_token(&TokenKind::Dot) {
                let name = self.expect_identifier()?;
                prefixes.push(Prefix::field(name, self.span_from(start)));
            } else if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_conditional()?;
                self.expect_rbracket("after designator index")?;
                prefixes.push(Prefix::index(index, self.span_from(start)));
            } else {
                break;
            }
        }
        if !prefixes.is_empty() {
            self.expect_token(&TokenKind::Eq, "Expected '=' after designator")?;
        }
        Ok(prefixes)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse::Parser;
    use crate::syntax::{Designator, Program, Storage, TypeKind};

    fn parse(source: &str) -> Program {
        Parser::new("test.c", source)
            .unwrap()
            .parse_program()
            .unwrap()
    }

    fn type_kinds(program: &Program, name: &str) -> Vec<TypeKind> {
        let mut kinds = Vec::new();
        let mut ty = Some(program.decl(program.lookup(name).unwrap()).ty);
        while let Some(id) = ty {
            kinds.push(program.ty(id).kind);
            ty = program.ty(id).base;
        }
        kinds
    }

    #[test]
    fn test_declarators_share_specifier_type() {
        let program = parse("int a, *b, c[4];");

        assert_eq!(program.decls.len(), 3);
        let a = program.decl(program.decls[0]);
        let b = program.decl(program.decls[1]);
        let c = program.decl(program.decls[2]);
        assert_eq!(program.ty(b.ty).base, Some(a.ty));
        assert_eq!(program.ty(c.ty).base, Some(a.ty));
        assert!(program.ty(c.ty).width.is_some());
    }

    #[test]
    fn test_basic_type_words() {
        let program = parse(
            "unsigned char a; long long b; unsigned c; long double d; short int e; signed char f;",
        );

        assert_eq!(type_kinds(&program, "a"), vec![TypeKind::Uchar]);
        assert_eq!(type_kinds(&program, "b"), vec![TypeKind::Longlong]);
        assert_eq!(type_kinds(&program, "c"), vec![TypeKind::Uint]);
        assert_eq!(type_kinds(&program, "d"), vec![TypeKind::LongDouble]);
        assert_eq!(type_kinds(&program, "e"), vec![TypeKind::Short]);
        assert_eq!(type_kinds(&program, "f"), vec![TypeKind::Schar]);
    }

    #[test]
    fn test_invalid_type_words() {
        let result = Parser::new("t.c", "unsigned float x;")
            .unwrap()
            .parse_program();
        assert!(result.is_err());
    }

    #[test]
    fn test_function_pointer_declarator() {
        let program = parse("int (*handler)(int, char *);");

        assert_eq!(
            type_kinds(&program, "handler"),
            vec![TypeKind::Ptr, TypeKind::Func, TypeKind::Int]
        );
        let ptr = program.ty(program.decl(program.decls[0]).ty);
        let func = program.ty(ptr.base.unwrap());
        assert_eq!(func.decls.len(), 2);
        assert_eq!(program.decl(func.decls[0]).name, "");
    }

    #[test]
    fn test_array_of_pointers_vs_pointer_to_array() {
        let program = parse("char *a[3]; char (*b)[3];");

        assert_eq!(
            type_kinds(&program, "a"),
            vec![TypeKind::Array, TypeKind::Ptr, TypeKind::Char]
        );
        assert_eq!(
            type_kinds(&program, "b"),
            vec![TypeKind::Ptr, TypeKind::Array, TypeKind::Char]
        );
    }

    #[test]
    fn test_void_and_variadic_parameters() {
        let program = parse("int f(void); int printf(char *fmt, ...);");

        let f = program.ty(program.decl(program.decls[0]).ty);
        assert!(f.decls.is_empty());
        assert!(!f.variadic);

        let printf = program.ty(program.decl(program.decls[1]).ty);
        assert_eq!(printf.decls.len(), 1);
        assert_eq!(program.decl(printf.decls[0]).name, "fmt");
        assert!(printf.variadic);
    }

    #[test]
    fn test_struct_references_share_one_type() {
        let program = parse("struct S { int a; int b; }; struct S v1, v2; struct S *p;");

        let def = program.decl(program.decls[0]).ty;
        assert_eq!(program.decl(program.decls[1]).ty, def);
        assert_eq!(program.decl(program.decls[2]).ty, def);
        let p = program.decl(program.decls[3]).ty;
        assert_eq!(program.ty(p).base, Some(def));
    }

    #[test]
    fn test_forward_declared_struct_is_completed() {
        let program = parse("struct node; struct node *head; struct node { struct node *next; int v; };");

        let forward = program.decl(program.decls[0]).ty;
        let head = program.decl(program.decls[1]).ty;
        assert_eq!(program.ty(head).base, Some(forward));
        assert_eq!(program.decl(program.decls[2]).ty, forward);
        assert_eq!(program.ty(forward).decls.len(), 2);

        let next = program.decl(program.ty(forward).decls[0]);
        assert_eq!(program.ty(next.ty).base, Some(forward));
    }

    #[test]
    fn test_typedef_names_become_types() {
        let program = parse("typedef unsigned long size_t; size_t n; typedef struct P { int x; } P; P origin;");

        let size_t = program.decl(program.decls[0]);
        assert_eq!(size_t.storage, Storage::Typedef);
        assert!(size_t.is_typedef());

        let n = program.ty(program.decl(program.decls[1]).ty);
        assert_eq!(n.kind, TypeKind::Typedef);
        assert_eq!(n.name.as_deref(), Some("size_t"));

        let origin = program.ty(program.decl(program.decls[3]).ty);
        assert_eq!(origin.name.as_deref(), Some("P"));
    }

    #[test]
    fn test_enum_and_bit_fields() {
        let program = parse("enum Color { RED, GREEN = 5 }; struct F { unsigned a : 3; int : 2; };");

        let color = program.ty(program.decl(program.decls[0]).ty);
        assert_eq!(color.kind, TypeKind::Enum);
        assert_eq!(color.decls.len(), 2);
        assert!(program.decl(color.decls[0]).init.is_none());
        assert!(program.decl(color.decls[1]).init.is_some());

        let f = program.ty(program.decl(program.decls[1]).ty);
        let a = program.ty(program.decl(f.decls[0]).ty);
        assert_eq!(a.kind, TypeKind::Uint);
        assert!(a.width.is_some());
        assert_eq!(program.decl(f.decls[1]).name, "");
    }

    #[test]
    fn test_designated_initializer() {
        let program = parse("int a[3] = { [1] = 2, 3 }; struct P { int x, y; } p = { .y = 1, .x = 2 };");

        let a = program.decl(program.decls[0]);
        let items = program.init(a.init.unwrap()).braced_items();
        assert_eq!(items.len(), 2);
        assert!(matches!(
            program.init(items[0]).prefixes[0].designator,
            Designator::Index(_)
        ));
        assert!(program.init(items[1]).prefixes.is_empty());

        let p = program.decl(program.lookup("p").unwrap());
        let items = program.init(p.init.unwrap()).braced_items();
        assert!(matches!(
            &program.init(items[0]).prefixes[0].designator,
            Designator::Field { name, .. } if name == "y"
        ));
    }

    #[test]
    fn test_struct_redefinition_is_an_error() {
        let result = Parser::new("t.c", "struct S { int a; }; struct S { int b; };")
            .unwrap()
            .parse_program();
        assert!(result.is_err());
    }
}
