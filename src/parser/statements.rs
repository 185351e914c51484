//! Statement parsing implementation
//!
//! This module handles parsing of all C statement types:
//!
//! - Block-scope declarations: `int x = 42, y;` (one statement per declarator)
//! - Control flow: `if`, `while`, `for`, `do-while`, `switch`
//! - Jump statements: `return`, `break`, `continue`, `goto`
//! - Compound statements: `{ ... }`
//! - Expression and empty statements
//! - Labels: `name:`, `case expr:`, `default:`, attached to the statement
//!   they precede
//!
//! # Grammar
//!
//! ```text
//! statement  ::= label* unlabeled
//! label      ::= identifier ":" | "case" expr ":" | "default" ":"
//! unlabeled  ::= if_stmt | while_stmt | do_while_stmt | for_stmt
//!              | switch_stmt | return_stmt | "break" ";" | "continue" ";"
//!              | "goto" identifier ";" | block | expr? ";"
//! block      ::= "{" (declaration | statement)* "}"
//! for_stmt   ::= "for" "(" (declaration | expr? ";") expr? ";" expr? ")" statement
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use crate::syntax::{Label, LabelId, LabelKind, Stmt, StmtId, StmtKind};

impl Parser {
    /// Parse `{ ... }` as a block statement (function bodies).
    pub(crate) fn parse_compound_statement(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_location();
        let kind = self.parse_block()?;
        let span = self.span_from(start);
        Ok(self.builder.stmt(Stmt::new(kind, span)))
    }

    /// Parse braces and the block items between them in a fresh scope.
    fn parse_block(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_token(&TokenKind::LBrace, "Expected '{' to open block")?;
        self.push_scope();
        let items = self.parse_block_items();
        self.pop_scope();
        let items = items?;
        self.expect_rbrace("after block")?;
        Ok(StmtKind::Block(items))
    }

    /// Parse block items up to (not including) the closing brace.
    fn parse_block_items(&mut self) -> Result<Vec<StmtId>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.is_declaration_start() && !self.check_ahead(1, &TokenKind::Colon) {
                statements.extend(self.parse_declaration_statement()?);
            } else {
                statements.push(self.parse_statement()?);
            }
        }

        Ok(statements)
    }

    /// `int a = 1, b;` in a block: one declaration statement per declarator.
    fn parse_declaration_statement(&mut self) -> Result<Vec<StmtId>, ParseError> {
        let decls = self.parse_declaration(false)?;
        let mut statements = Vec::with_capacity(decls.len());
        for decl in decls {
            let span = self.builder.get_decl(decl).span;
            statements.push(self.builder.stmt(Stmt::new(StmtKind::Decl(decl), span)));
        }
        Ok(statements)
    }

    /// Parse a statement with any labels in front of it
    pub(crate) fn parse_statement(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_location();
        let labels = self.parse_labels()?;
        let kind = self.parse_unlabeled_statement()?;
        let span = self.span_from(start);
        Ok(self.builder.stmt(Stmt::new(kind, span).with_labels(labels)))
    }

    fn parse_labels(&mut self) -> Result<Vec<LabelId>, ParseError> {
        let mut labels = Vec::new();

        loop {
            let start = self.current_location();
            let kind = match self.peek().kind.clone() {
                TokenKind::Ident(name) if self.check_ahead(1, &TokenKind::Colon) => {
                    self.advance(); // name
                    self.advance(); // ':'
                    LabelKind::Named(name)
                }
                TokenKind::Case => {
                    self.advance();
                    let value = self.parse_conditional()?;
                    self.expect_token(&TokenKind::Colon, "Expected ':' after case value")?;
                    LabelKind::Case(value)
                }
                TokenKind::Default => {
                    self.advance();
                    self.expect_token(&TokenKind::Colon, "Expected ':' after 'default'")?;
                    LabelKind::Default
                }
                _ => return Ok(labels),
            };
            let span = self.span_from(start);
            labels.push(self.builder.label(Label::new(kind, span)));
        }
    }

    fn parse_unlabeled_statement(&mut self) -> Result<StmtKind, ParseError> {
        match self.peek().kind {
            TokenKind::LBrace => self.parse_block(),
            TokenKind::If => {
                self.advance();
                self.parse_if_statement()
            }
            TokenKind::While => {
                self.advance();
                self.parse_while_statement()
            }
            TokenKind::Do => {
                self.advance();
                self.parse_do_while_statement()
            }
            TokenKind::For => {
                self.advance();
                self.parse_for_statement()
            }
            TokenKind::Switch => {
                self.advance();
                self.parse_switch_statement()
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect_semicolon("after return")?;
                Ok(StmtKind::Return(value))
            }
            TokenKind::Break => {
                self.advance();
                self.expect_semicolon("after 'break'")?;
                Ok(StmtKind::Break)
            }
            TokenKind::Continue => {
                self.advance();
                self.expect_semicolon("after 'continue'")?;
                Ok(StmtKind::Continue)
            }
            TokenKind::Goto => {
                self.advance();
                let label = self.expect_identifier()?;
                self.expect_semicolon("after 'goto'")?;
                Ok(StmtKind::Goto(label))
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(StmtKind::Empty)
            }
            _ => {
                let expr = self.parse_expression()?;
                self.expect_semicolon("after expression")?;
                Ok(StmtKind::Expr(expr))
            }
        }
    }

    /// Parse if statement (after 'if' keyword)
    fn parse_if_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_lparen("after 'if'")?;
        let cond = self.parse_expression()?;
        self.expect_rparen("after if condition")?;

        let then = self.parse_statement()?;
        let otherwise = if self.match_token(&TokenKind::Else) {
            Some(self.parse_statement()?)
        } else {
            None
        };

        Ok(StmtKind::If {
            cond,
            then,
            otherwise,
        })
    }

    /// Parse while statement (after 'while' keyword)
    fn parse_while_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_lparen("after 'while'")?;
        let cond = self.parse_expression()?;
        self.expect_rparen("after while condition")?;
        let body = self.parse_statement()?;

        Ok(StmtKind::While { cond, body })
    }

    /// Parse do-while statement (after 'do' keyword)
    fn parse_do_while_statement(&mut self) -> Result<StmtKind, ParseError> {
        let body = self.parse_statement()?;
        self.expect_token(&TokenKind::While, "Expected 'while' after do body")?;
        self.expect_lparen("after 'while'")?;
        let cond = self.parse_expression()?;
        self.expect_rparen("after do-while condition")?;
        self.expect_semicolon("after do-while")?;

        Ok(StmtKind::Do { body, cond })
    }

    /// Parse for statement (after 'for' keyword)
    fn parse_for_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_lparen("after 'for'")?;
        self.push_scope();
        let kind = self.parse_for_clauses();
        self.pop_scope();
        kind
    }

    fn parse_for_clauses(&mut self) -> Result<StmtKind, ParseError> {
        let mut pre = None;
        let mut decl = None;

        if self.is_declaration_start() {
            let start = self.current_location();
            let specs = self.parse_specifiers()?;
            let declarator = self.parse_declarator(specs.ty, false)?;
            decl = Some(self.finish_init_declarator(start, specs, declarator)?);
            if self.check(&TokenKind::Comma) {
                return Err(self.error("Only one declaration is allowed in a for initializer"));
            }
            self.expect_semicolon("after for initializer")?;
        } else if !self.match_token(&TokenKind::Semicolon) {
            pre = Some(self.parse_expression()?);
            self.expect_semicolon("after for initializer")?;
        }

        let cond = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_semicolon("after for condition")?;

        let post = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_rparen("after for clauses")?;

        let body = self.parse_statement()?;

        Ok(StmtKind::For {
            pre,
            cond,
            post,
            decl,
            body,
        })
    }

    /// Parse switch statement (after 'switch' keyword)
    fn parse_switch_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_lparen("after 'switch'")?;
        let cond = self.parse_expression()?;
        self.expect_rparen("after switch expression")?;
        let body = self.parse_statement()?;

        Ok(StmtKind::Switch { cond, body })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse::Parser;
    use crate::syntax::{LabelKind, Program, Stmt, StmtOp};

    fn body_of(program: &Program, name: &str) -> Vec<StmtOp> {
        let f = program.decl(program.lookup(name).unwrap());
        let body = program.stmt(f.body.unwrap());
        body.block().iter().map(|&s| program.stmt(s).op()).collect()
    }

    fn parse(source: &str) -> Program {
        Parser::new("test.c", source)
            .unwrap()
            .parse_program()
            .unwrap()
    }

    fn first_stmt<'a>(program: &'a Program, name: &str) -> &'a Stmt {
        let f = program.decl(program.lookup(name).unwrap());
        let body = program.stmt(f.body.unwrap());
        program.stmt(body.block()[0])
    }

    #[test]
    fn test_block_declarations_split_per_declarator() {
        let program = parse("void f() { int a = 1, b; a = b; }");

        assert_eq!(
            body_of(&program, "f"),
            vec![StmtOp::StmtDecl, StmtOp::StmtDecl, StmtOp::StmtExpr]
        );
    }

    #[test]
    fn test_control_flow() {
        let program = parse(
            "void f() { if (x) y(); else z(); while (x) ; do x--; while (x); \
             switch (x) { case 1: break; default: ; } return; }",
        );

        assert_eq!(
            body_of(&program, "f"),
            vec![
                StmtOp::If,
                StmtOp::While,
                StmtOp::Do,
                StmtOp::Switch,
                StmtOp::Return
            ]
        );

        let if_stmt = first_stmt(&program, "f");
        assert!(if_stmt.otherwise().is_some());
    }

    #[test]
    fn test_for_with_declaration() {
        let program = parse("void f() { for (int i = 0; i < 10; i++) continue; }");

        let for_stmt = first_stmt(&program, "f");
        assert_eq!(for_stmt.op(), StmtOp::For);
        assert!(for_stmt.pre().is_none());
        assert!(for_stmt.decl().is_some());
        assert!(for_stmt.expr().is_some());
        assert!(for_stmt.post().is_some());
        assert_eq!(program.stmt(for_stmt.body().unwrap()).op(), StmtOp::Continue);
    }

    #[test]
    fn test_for_with_empty_clauses() {
        let program = parse("void f() { for (;;) break; }");

        let for_stmt = first_stmt(&program, "f");
        assert!(for_stmt.pre().is_none());
        assert!(for_stmt.decl().is_none());
        assert!(for_stmt.expr().is_none());
        assert!(for_stmt.post().is_none());
    }

    #[test]
    fn test_labels_attach_to_statement() {
        let program = parse("void f() { again: x++; goto again; }");

        let labelled = first_stmt(&program, "f");
        assert_eq!(labelled.labels.len(), 1);
        assert_eq!(program.label(labelled.labels[0]).name(), Some("again"));
        assert_eq!(body_of(&program, "f"), vec![StmtOp::StmtExpr, StmtOp::Goto]);
    }

    #[test]
    fn test_case_labels() {
        let program = parse("void f() { switch (x) { case 1: case 2: y(); default: z(); } }");

        let switch = first_stmt(&program, "f");
        let block = program.stmt(switch.body().unwrap());
        let first = program.stmt(block.block()[0]);
        assert_eq!(first.labels.len(), 2);
        assert!(matches!(program.label(first.labels[0]).kind, LabelKind::Case(_)));
        let second = program.stmt(block.block()[1]);
        assert_eq!(program.label(second.labels[0]).kind, LabelKind::Default);
    }

    #[test]
    fn test_typedef_scoping() {
        // T is a type at file scope and a variable inside g
        let program = parse("typedef int T; void g() { int T; T = 1; } void h() { T x; }");

        assert_eq!(body_of(&program, "g"), vec![StmtOp::StmtDecl, StmtOp::StmtExpr]);
        assert_eq!(body_of(&program, "h"), vec![StmtOp::StmtDecl]);
    }

    #[test]
    fn test_missing_semicolon() {
        let err = Parser::new("t.c", "void f() { return 0 }")
            .unwrap()
            .parse_program()
            .unwrap_err();
        assert!(err.message.contains("Expected ';' after return"));
    }
}
