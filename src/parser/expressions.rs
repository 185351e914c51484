//! Expression parsing implementation
//!
//! This module handles parsing of C expressions using precedence climbing
//! for binary operators and recursive descent for other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: numbers, characters (kept as number text), adjacent strings
//! - Identifiers
//! - Binary operators: arithmetic, comparison, logical, bitwise
//! - Assignment and every compound assignment
//! - Unary operators: `-`, `+`, `!`, `~`, `&`, `*`, `++`, `--`, `sizeof`
//! - Postfix: `[]`, `.`, `->`, `()`, `++`, `--`
//! - Ternary `? :` and the comma operator
//! - Casts `(type)expr` and compound literals `(type){...}`
//! - `offsetof(type, member)` and `va_arg(ap, type)`
//!
//! Parentheses are kept as explicit `Paren` nodes so a printer can reproduce
//! the source grouping.
//!
//! # Precedence
//!
//! Binary operators follow C precedence rules using a precedence climbing
//! algorithm for efficient and correct parsing.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use crate::syntax::{BinaryOp, Expr, ExprId, Init, MemberOp, Span, UnaryOp};

impl Parser {
    /// Parse expression, including the comma operator (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_location();
        let first = self.parse_assignment()?;

        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }

        let mut list = vec![first];
        while self.match_token(&TokenKind::Comma) {
            list.push(self.parse_assignment()?);
        }
        let span = self.span_from(start);
        Ok(self.builder.expr(Expr::comma(list, span)))
    }

    /// Parse assignment or ternary (right-associative)
    pub(crate) fn parse_assignment(&mut self) -> Result<ExprId, ParseError> {
        let lhs = self.parse_conditional()?;

        let op = match self.peek().kind {
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::PlusEq => BinaryOp::AddEq,
            TokenKind::MinusEq => BinaryOp::SubEq,
            TokenKind::StarEq => BinaryOp::MulEq,
            TokenKind::SlashEq => BinaryOp::DivEq,
            TokenKind::PercentEq => BinaryOp::ModEq,
            TokenKind::AmpEq => BinaryOp::AndEq,
            TokenKind::PipeEq => BinaryOp::OrEq,
            TokenKind::CaretEq => BinaryOp::XorEq,
            TokenKind::LtLtEq => BinaryOp::LshEq,
            TokenKind::GtGtEq => BinaryOp::RshEq,
            _ => return Ok(lhs),
        };
        self.advance();

        let rhs = self.parse_assignment()?;
        Ok(self.push_binary(op, lhs, rhs))
    }

    /// Parse ternary: condition ? true_expr : false_expr
    pub(crate) fn parse_conditional(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_location();
        let cond = self.parse_logical_or()?;

        if self.match_token(&TokenKind::Question) {
            let then = self.parse_expression()?;
            self.expect_token(&TokenKind::Colon, "Expected ':' in ternary expression")?;
            let otherwise = self.parse_conditional()?;
            let span = self.span_from(start);
            return Ok(self.builder.expr(Expr::cond(cond, then, otherwise, span)));
        }

        Ok(cond)
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.match_token(&TokenKind::OrOr) {
            let right = self.parse_logical_and()?;
            left = self.push_binary(BinaryOp::OrOr, left, right);
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_bitwise_or()?;

        while self.match_token(&TokenKind::AndAnd) {
            let right = self.parse_bitwise_or()?;
            left = self.push_binary(BinaryOp::AndAnd, left, right);
        }

        Ok(left)
    }

    /// Parse bitwise OR (|)
    fn parse_bitwise_or(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_bitwise_xor()?;

        while self.match_token(&TokenKind::Pipe) {
            let right = self.parse_bitwise_xor()?;
            left = self.push_binary(BinaryOp::Or, left, right);
        }

        Ok(left)
    }

    /// Parse bitwise XOR (^)
    fn parse_bitwise_xor(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_bitwise_and()?;

        while self.match_token(&TokenKind::Caret) {
            let right = self.parse_bitwise_and()?;
            left = self.push_binary(BinaryOp::Xor, left, right);
        }

        Ok(left)
    }

    /// Parse bitwise AND (&)
    fn parse_bitwise_and(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_equality()?;

        while self.match_token(&TokenKind::Amp) {
            let right = self.parse_equality()?;
            left = self.push_binary(BinaryOp::And, left, right);
        }

        Ok(left)
    }

    /// Parse equality (== !=)
    fn parse_equality(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_relational()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinaryOp::EqEq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();

            let right = self.parse_relational()?;
            left = self.push_binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_shift()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();

            let right = self.parse_shift()?;
            left = self.push_binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse bitwise shift (<< >>)
    fn parse_shift(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::LtLt => BinaryOp::Lsh,
                TokenKind::GtGt => BinaryOp::Rsh,
                _ => break,
            };
            self.advance();

            let right = self.parse_additive()?;
            left = self.push_binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();

            let right = self.parse_multiplicative()?;
            left = self.push_binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_cast()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();

            let right = self.parse_cast()?;
            left = self.push_binary(op, left, right);
        }

        Ok(left)
    }

    /// True at `(` followed by the start of a type name.
    fn at_parenthesized_type(&self) -> bool {
        self.check(&TokenKind::LParen)
            && self
                .peek_ahead(1)
                .is_some_and(|t| self.starts_type_name(&t.kind))
    }

    /// Parse cast `(type)expr` or compound literal `(type){...}`
    fn parse_cast(&mut self) -> Result<ExprId, ParseError> {
        if !self.at_parenthesized_type() {
            return self.parse_unary();
        }

        let start = self.current_location();
        self.advance(); // consume '('
        let ty = self.parse_type_name()?;
        self.expect_rparen("after cast type")?;

        if self.check(&TokenKind::LBrace) {
            let init_start = self.current_location();
            self.advance(); // consume '{'
            let items = self.parse_initializer_list()?;
            let init_span = self.span_from(init_start);
            let init = self
                .builder
                .init(Init::braced(Vec::new(), items, init_span));
            let span = self.span_from(start);
            let literal = self.builder.expr(Expr::cast_init(ty, init, span));
            return self.parse_postfix_operators(literal);
        }

        let operand = self.parse_cast()?;
        let span = self.span_from(start);
        Ok(self.builder.expr(Expr::cast(ty, operand, span)))
    }

    /// Parse unary (! ~ - + & * ++ -- sizeof)
    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_location();

        let op = match self.peek().kind {
            TokenKind::PlusPlus => Some(UnaryOp::PreInc),
            TokenKind::MinusMinus => Some(UnaryOp::PreDec),
            TokenKind::Amp => Some(UnaryOp::Addr),
            TokenKind::Star => Some(UnaryOp::Indir),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::Twid),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let operand = match op {
                UnaryOp::PreInc | UnaryOp::PreDec => self.parse_unary()?,
                _ => self.parse_cast()?,
            };
            let span = self.span_from(start);
            return Ok(self.builder.expr(Expr::unary(op, operand, span)));
        }

        if self.match_token(&TokenKind::Sizeof) {
            if self.at_parenthesized_type() {
                self.advance(); // consume '('
                let ty = self.parse_type_name()?;
                self.expect_rparen("after sizeof type")?;
                let span = self.span_from(start);
                return Ok(self.builder.expr(Expr::sizeof_type(ty, span)));
            }
            let operand = self.parse_unary()?;
            let span = self.span_from(start);
            return Ok(self
                .builder
                .expr(Expr::unary(UnaryOp::SizeofExpr, operand, span)));
        }

        self.parse_postfix()
    }

    /// Parse postfix operators ([] () . -> ++ --)
    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let primary = self.parse_primary()?;
        self.parse_postfix_operators(primary)
    }

    fn parse_postfix_operators(&mut self, mut expr: ExprId) -> Result<ExprId, ParseError> {
        let start = self.builder.get_expr(expr).span.start;

        loop {
            if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect_rbracket("after array index")?;
                let span = self.span_from(start);
                expr = self
                    .builder
                    .expr(Expr::binary(BinaryOp::Index, expr, index, span));
            } else if self.match_token(&TokenKind::LParen) {
                let args = self.parse_arguments()?;
                let span = self.span_from(start);
                expr = self.builder.expr(Expr::call(expr, args, span));
            } else if self.match_token(&TokenKind::Dot) {
                let field = self.expect_identifier()?;
                let span = self.span_from(start);
                expr = self
                    .builder
                    .expr(Expr::member(MemberOp::Dot, expr, field, span));
            } else if self.match_token(&TokenKind::Arrow) {
                let field = self.expect_identifier()?;
                let span = self.span_from(start);
                expr = self
                    .builder
                    .expr(Expr::member(MemberOp::Arrow, expr, field, span));
            } else if self.match_token(&TokenKind::PlusPlus) {
                let span = self.span_from(start);
                expr = self.builder.expr(Expr::unary(UnaryOp::PostInc, expr, span));
            } else if self.match_token(&TokenKind::MinusMinus) {
                let span = self.span_from(start);
                expr = self.builder.expr(Expr::unary(UnaryOp::PostDec, expr, span));
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse call arguments after `(`, including the closing `)`.
    fn parse_arguments(&mut self) -> Result<Vec<ExprId>, ParseError> {
        let mut args = Vec::new();

        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_assignment()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect_rparen("after function arguments")?;
        Ok(args)
    }

    /// Parse primary expression (literals, identifiers, parenthesized)
    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_location();

        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                self.advance();
                let span = self.span_from(start);
                Ok(self.builder.expr(Expr::name(name, span)))
            }
            TokenKind::Number(text) | TokenKind::CharLiteral(text) => {
                self.advance();
                let span = self.span_from(start);
                Ok(self.builder.expr(Expr::number(text, span)))
            }
            TokenKind::StringLiteral(_) => {
                let mut pieces = Vec::new();
                while let TokenKind::StringLiteral(text) = &self.peek().kind {
                    pieces.push(text.clone());
                    self.advance();
                }
                let span = self.span_from(start);
                Ok(self.builder.expr(Expr::string(pieces, span)))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                let span = self.span_from(start);
                Ok(self.builder.expr(Expr::unary(UnaryOp::Paren, inner, span)))
            }
            TokenKind::Offsetof => {
                self.advance();
                self.expect_lparen("after offsetof")?;
                let ty = self.parse_type_name()?;
                self.expect_token(&TokenKind::Comma, "Expected ',' in offsetof")?;
                let member = self.parse_member_designator()?;
                self.expect_rparen("after offsetof member")?;
                let span = self.span_from(start);
                Ok(self.builder.expr(Expr::offsetof(ty, member, span)))
            }
            TokenKind::VaArg => {
                self.advance();
                self.expect_lparen("after va_arg")?;
                let ap = self.parse_assignment()?;
                self.expect_token(&TokenKind::Comma, "Expected ',' in va_arg")?;
                let ty = self.parse_type_name()?;
                self.expect_rparen("after va_arg type")?;
                let span = self.span_from(start);
                Ok(self.builder.expr(Expr::va_arg(ap, ty, span)))
            }
            _ => Err(self.error(format!("Expected expression, found {}", self.peek()))),
        }
    }

    /// Parse the member path of `offsetof`: `a`, `a.b`, `a[2].c`.
    fn parse_member_designator(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_location();
        let name = self.expect_identifier()?;
        let span = self.span_from(start);
        let mut path = self.builder.expr(Expr::name(name, span));

        loop {
            if self.match_token(&TokenKind::Dot) {
                let field = self.expect_identifier()?;
                let span = self.span_from(start);
                path = self
                    .builder
                    .expr(Expr::member(MemberOp::Dot, path, field, span));
            } else if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect_rbracket("after offsetof index")?;
                let span = self.span_from(start);
                path = self
                    .builder
                    .expr(Expr::binary(BinaryOp::Index, path, index, span));
            } else {
                break;
            }
        }

        Ok(path)
    }

    fn push_binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let span: Span = self
            .builder
            .get_expr(left)
            .span
            .to(self.builder.get_expr(right).span);
        self.builder.expr(Expr::binary(op, left, right, span))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse::Parser;
    use crate::syntax::{ExprId, ExprOp, Program, StmtOp};

    /// Parse `source` as the body of a function and return the expression
    /// of its first statement.
    fn parse_expr(source: &str) -> (Program, ExprId) {
        let src = format!("typedef int T; void f() {{ {}; }}", source);
        let program = Parser::new("test.c", &src)
            .unwrap()
            .parse_program()
            .unwrap();
        let f = program.decl(program.lookup("f").unwrap());
        let body = program.stmt(f.body.unwrap());
        let stmt = program.stmt(body.block()[0]);
        assert_eq!(stmt.op(), StmtOp::StmtExpr);
        let expr = stmt.expr().unwrap();
        (program, expr)
    }

    fn op_of(source: &str) -> ExprOp {
        let (program, expr) = parse_expr(source);
        program.expr(expr).op()
    }

    #[test]
    fn test_precedence() {
        let (program, expr) = parse_expr("a + b * c");
        let add = program.expr(expr);
        assert_eq!(add.op(), ExprOp::Add);
        assert_eq!(program.expr(add.left().unwrap()).op(), ExprOp::Name);
        assert_eq!(program.expr(add.right().unwrap()).op(), ExprOp::Mul);
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let (program, expr) = parse_expr("a = b += 1");
        let assign = program.expr(expr);
        assert_eq!(assign.op(), ExprOp::Eq);
        assert_eq!(program.expr(assign.right().unwrap()).op(), ExprOp::AddEq);
    }

    #[test]
    fn test_compound_assignments() {
        assert_eq!(op_of("a <<= 1"), ExprOp::LshEq);
        assert_eq!(op_of("a >>= 1"), ExprOp::RshEq);
        assert_eq!(op_of("a &= 1"), ExprOp::AndEq);
        assert_eq!(op_of("a |= 1"), ExprOp::OrEq);
        assert_eq!(op_of("a ^= 1"), ExprOp::XorEq);
        assert_eq!(op_of("a %= 1"), ExprOp::ModEq);
    }

    #[test]
    fn test_unary_and_postfix() {
        assert_eq!(op_of("-x"), ExprOp::Minus);
        assert_eq!(op_of("~x"), ExprOp::Twid);
        assert_eq!(op_of("*p"), ExprOp::Indir);
        assert_eq!(op_of("&x"), ExprOp::Addr);
        assert_eq!(op_of("++x"), ExprOp::PreInc);
        assert_eq!(op_of("x--"), ExprOp::PostDec);
        assert_eq!(op_of("a[1]"), ExprOp::Index);
        assert_eq!(op_of("s.f"), ExprOp::Dot);
        assert_eq!(op_of("p->f"), ExprOp::Arrow);
        assert_eq!(op_of("f(1, 2)"), ExprOp::Call);
    }

    #[test]
    fn test_parentheses_are_kept() {
        let (program, expr) = parse_expr("(a + b) * c");
        let mul = program.expr(expr);
        assert_eq!(mul.op(), ExprOp::Mul);
        let paren = program.expr(mul.left().unwrap());
        assert_eq!(paren.op(), ExprOp::Paren);
        assert_eq!(program.expr(paren.left().unwrap()).op(), ExprOp::Add);
    }

    #[test]
    fn test_cast_versus_parenthesized_name() {
        assert_eq!(op_of("(T)x"), ExprOp::Cast);
        assert_eq!(op_of("(char *)p"), ExprOp::Cast);
        assert_eq!(op_of("(x)"), ExprOp::Paren);
    }

    #[test]
    fn test_compound_literal() {
        let (program, expr) = parse_expr("(int[]){1, 2}");
        let literal = program.expr(expr);
        assert_eq!(literal.op(), ExprOp::CastInit);
        let init = program.init(literal.init().unwrap());
        assert_eq!(init.braced_items().len(), 2);
    }

    #[test]
    fn test_sizeof_forms() {
        assert_eq!(op_of("sizeof(int)"), ExprOp::SizeofType);
        assert_eq!(op_of("sizeof(T *)"), ExprOp::SizeofType);
        assert_eq!(op_of("sizeof x"), ExprOp::SizeofExpr);
        assert_eq!(op_of("sizeof(x)"), ExprOp::SizeofExpr);
    }

    #[test]
    fn test_offsetof_and_va_arg() {
        let (program, expr) = parse_expr("offsetof(struct S, a.b)");
        let offsetof = program.expr(expr);
        assert_eq!(offsetof.op(), ExprOp::Offsetof);
        assert_eq!(program.expr(offsetof.left().unwrap()).op(), ExprOp::Dot);
        assert!(offsetof.type_operand().is_some());

        let (program, expr) = parse_expr("va_arg(ap, char *)");
        let va_arg = program.expr(expr);
        assert_eq!(va_arg.op(), ExprOp::VaArg);
        assert_eq!(program.expr(va_arg.left().unwrap()).text(), Some("ap"));
    }

    #[test]
    fn test_ternary_and_comma() {
        let (program, expr) = parse_expr("a ? b : c ? d : e");
        let cond = program.expr(expr);
        assert_eq!(cond.op(), ExprOp::Cond);
        assert_eq!(cond.list().len(), 3);
        assert_eq!(program.expr(cond.list()[2]).op(), ExprOp::Cond);

        let (program, expr) = parse_expr("a = 1, b = 2, c");
        let comma = program.expr(expr);
        assert_eq!(comma.op(), ExprOp::Comma);
        assert_eq!(comma.list().len(), 3);
    }

    #[test]
    fn test_literals() {
        let (program, expr) = parse_expr(r#""hello, " "world""#);
        let string = program.expr(expr);
        assert_eq!(string.op(), ExprOp::String);
        assert!(matches!(
            &string.kind,
            crate::syntax::ExprKind::String(pieces) if pieces.len() == 2
        ));

        let (program, expr) = parse_expr("'a'");
        assert_eq!(program.expr(expr).op(), ExprOp::Number);
        assert_eq!(program.expr(expr).text(), Some("'a'"));
    }

    #[test]
    fn test_binary_span_covers_operands() {
        let (program, expr) = parse_expr("aa + bb");
        let span = program.expr(expr).span;
        assert_eq!(span.end.column - span.start.column, 7);
    }

    #[test]
    fn test_missing_operand_is_an_error() {
        let result = Parser::new("t.c", "void f() { a + ; }")
            .unwrap()
            .parse_program();
        assert!(result.is_err());
    }
}
