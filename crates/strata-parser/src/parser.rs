// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation: recursive descent for statements,
//! precedence climbing for binary expressions.

use strata_ast::decl::{FnDecl, Param};
use strata_ast::expr::{BinOp, Expr, ExprKind, Literal, UnaryOp};
use strata_ast::stmt::{Stmt, StmtKind};
use strata_ast::token::{Keyword, Token, TokenKind};
use strata_ast::ty::{Primitive, TypeDef};
use strata_ast::{Location, NodeId, Span};

/// The parser for Strata source code.
///
/// Stops at the first error; there is no recovery.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Counter for generating unique NodeIds
    next_node_id: u32,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            let location = tokens.last().map(|t| t.location.clone()).unwrap_or_default();
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                span: Span::new(end, end),
                location,
            });
        }
        Self { tokens, pos: 0, next_node_id: 0 }
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Parse the whole token stream into top-level statements.
    pub fn parse_program(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while !self.at_end() {
            stmts.push(self.parse_stmt()?);
            self.match_token(&TokenKind::Semi);
        }
        tracing::trace!(count = stmts.len(), "parsed program");
        Ok(stmts)
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.tokens.get(self.pos + n).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        if !self.at_end() {
            self.pos += 1;
        }
        &self.tokens[self.pos.saturating_sub(1)]
    }

    /// End offset of the most recently consumed token.
    fn prev_end(&self) -> usize {
        self.tokens[self.pos.saturating_sub(1)].span.end
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn check_keyword(&self, kw: Keyword) -> bool {
        *self.current_kind() == TokenKind::Keyword(kw)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<&Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(&kind.display_name(), self.current()))
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(kw) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::expected(&format!("`{}`", kw.as_str()), self.current()))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::expected("a name", self.current())),
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.current_kind() {
            TokenKind::Keyword(Keyword::Let | Keyword::Const | Keyword::Var) => self.parse_let(),
            TokenKind::Keyword(Keyword::Func) => self.parse_func(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::Return) => self.parse_return(),
            TokenKind::Keyword(Keyword::Break) => self.parse_jump(StmtKind::Break),
            TokenKind::Keyword(Keyword::Continue) => self.parse_jump(StmtKind::Continue),
            TokenKind::Keyword(Keyword::Import) => self.parse_import(),
            _ => self.parse_expr_stmt(),
        }
    }

    fn finish_stmt(&mut self, kind: StmtKind, start: usize) -> Stmt {
        let span = Span::new(start, self.prev_end());
        Stmt::new(self.next_id(), kind, span)
    }

    /// `{ stmt* }`
    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            stmts.push(self.parse_stmt()?);
            self.match_token(&TokenKind::Semi);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(stmts)
    }

    /// `let|const|var NAME : TYPE = EXPR`
    fn parse_let(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;
        let mutable = self.check_keyword(Keyword::Var);
        self.advance();

        let name = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expr()?;

        Ok(self.finish_stmt(StmtKind::Let { name, ty, value, mutable }, start))
    }

    /// A type name with any number of trailing `?`.
    fn parse_type(&mut self) -> Result<TypeDef, ParseError> {
        let token = self.current().clone();
        let TokenKind::Ident(name) = &token.kind else {
            return Err(ParseError::expected("type", &token));
        };
        let prim = Primitive::from_name(name).ok_or_else(|| ParseError::unknown_type(&token))?;
        self.advance();

        let mut ty = TypeDef::Primitive(prim);
        while self.match_token(&TokenKind::Question) {
            ty = TypeDef::optional(ty);
        }
        Ok(ty)
    }

    /// `func NAME(NAME: TYPE, ...) => TYPE { STMT* }`
    fn parse_func(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;
        self.advance();
        let name = self.expect_ident()?;

        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let param_start = self.current().span.start;
                let param_name = self.expect_ident()?;
                self.expect(&TokenKind::Colon)?;
                let ty = self.parse_type()?;
                params.push(Param {
                    name: param_name,
                    ty,
                    span: Span::new(param_start, self.prev_end()),
                });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;

        let ret_ty = if self.match_token(&TokenKind::FatArrow) {
            self.parse_type()?
        } else {
            TypeDef::VOID
        };
        let body = self.parse_block()?;

        let decl = FnDecl { name, params, ret_ty, body };
        Ok(self.finish_stmt(StmtKind::Func(decl), start))
    }

    /// `if (EXPR) { ... } [else if ... | else { ... }]`
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;
        self.advance();
        let cond = self.parse_condition()?;
        let then_body = self.parse_block()?;

        let else_body = if self.check_keyword(Keyword::Else) {
            self.advance();
            if self.check_keyword(Keyword::If) {
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(self.finish_stmt(StmtKind::If { cond, then_body, else_body }, start))
    }

    fn parse_condition(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        Ok(cond)
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;
        self.advance();
        let cond = self.parse_condition()?;
        let body = self.parse_block()?;
        Ok(self.finish_stmt(StmtKind::While { cond, body }, start))
    }

    /// `for (STMT; EXPR; STMT) { ... }`
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;
        self.advance();
        self.expect(&TokenKind::LParen)?;
        let init = self.parse_stmt()?;
        self.expect(&TokenKind::Semi)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::Semi)?;
        let update = self.parse_stmt()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;

        Ok(self.finish_stmt(
            StmtKind::For {
                init: Box::new(init),
                cond,
                update: Box::new(update),
                body,
            },
            start,
        ))
    }

    /// `return EXPR?` - the value is absent before `}`, `;` or end of input.
    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;
        self.advance();
        let value = if self.check(&TokenKind::RBrace) || self.check(&TokenKind::Semi) || self.at_end() {
            None
        } else {
            Some(self.parse_expr()?)
        };
        Ok(self.finish_stmt(StmtKind::Return(value), start))
    }

    fn parse_jump(&mut self, kind: StmtKind) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;
        self.advance();
        Ok(self.finish_stmt(kind, start))
    }

    /// `import NAME from MODULE(::SEGMENT)*`
    fn parse_import(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;
        self.advance();
        let name = self.expect_ident()?;
        self.expect_keyword(Keyword::From)?;

        let mut module = self.expect_ident()?;
        while self.match_token(&TokenKind::ColonColon) {
            module.push_str("::");
            module.push_str(&self.expect_ident()?);
        }
        Ok(self.finish_stmt(StmtKind::Import { name, module }, start))
    }

    /// Assignment, `x++`/`x--`, or a bare expression.
    fn parse_expr_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;

        if let TokenKind::Ident(name) = self.current_kind().clone() {
            let op = match self.peek(1) {
                TokenKind::PlusPlus => Some(BinOp::Add),
                TokenKind::MinusMinus => Some(BinOp::Sub),
                _ => None,
            };
            if let Some(op) = op {
                return self.parse_step(name, op, start);
            }
        }

        let expr = self.parse_expr()?;
        if self.check(&TokenKind::Eq) {
            let eq = self.current().clone();
            let Some(target) = expr.as_ident().map(str::to_string) else {
                return Err(ParseError::invalid_assignment(&eq, expr.span));
            };
            self.advance();
            let value = self.parse_expr()?;
            return Ok(self.finish_stmt(StmtKind::Assign { target, value }, start));
        }

        Ok(self.finish_stmt(StmtKind::Expr(expr), start))
    }

    /// `x++` becomes `x = x + 1`.
    fn parse_step(&mut self, name: String, op: BinOp, start: usize) -> Result<Stmt, ParseError> {
        let target_span = self.advance().span;
        let op_span = self.advance().span;

        let left = Expr::new(self.next_id(), ExprKind::Ident(name.clone()), target_span);
        let one = Expr::new(self.next_id(), ExprKind::Literal(Literal::Int(1)), op_span);
        let value = Expr::new(
            self.next_id(),
            ExprKind::Binary { op, left: Box::new(left), right: Box::new(one) },
            target_span.to(op_span),
        );
        Ok(self.finish_stmt(StmtKind::Assign { target: name, value }, start))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(0)
    }

    /// Precedence climbing. An operator binds only if its precedence is
    /// strictly greater than `min_prec`, which makes every level left-associative.
    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some(op) = self.current_binop() {
            let prec = op.precedence();
            if prec <= min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec)?;
            let span = left.span.to(right.span);
            left = Expr::new(
                self.next_id(),
                ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
                span,
            );
        }

        Ok(left)
    }

    fn current_binop(&self) -> Option<BinOp> {
        Some(match self.current_kind() {
            TokenKind::PipePipe => BinOp::Or,
            TokenKind::AmpAmp => BinOp::And,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::BangEq => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::LtEq => BinOp::Le,
            TokenKind::GtEq => BinOp::Ge,
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Mod,
            _ => return None,
        })
    }

    /// Prefix operators bind tighter than any binary operator.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Tilde => UnaryOp::BitNot,
            _ => return self.parse_postfix(),
        };
        let start = self.advance().span.start;
        let operand = self.parse_unary()?;
        let span = Span::new(start, operand.span.end);
        Ok(Expr::new(self.next_id(), ExprKind::Unary { op, operand: Box::new(operand) }, span))
    }

    /// Primary expression followed by `.name`, `::name` and `(args)` suffixes.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&TokenKind::Dot) || self.check(&TokenKind::ColonColon) {
                self.advance();
                let property = self.expect_ident()?;
                let span = Span::new(expr.span.start, self.prev_end());
                expr = Expr::new(
                    self.next_id(),
                    ExprKind::Member { object: Box::new(expr), property },
                    span,
                );
            } else if self.check(&TokenKind::LParen) {
                self.advance();
                let args = self.parse_args()?;
                let span = Span::new(expr.span.start, self.prev_end());
                expr = Expr::new(self.next_id(), ExprKind::Call { callee: Box::new(expr), args }, span);
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Arguments after `(`, through the closing `)`.
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();
        let kind = match &token.kind {
            TokenKind::Number => ExprKind::Literal(parse_number(&token)?),
            TokenKind::Str(s) => ExprKind::Literal(Literal::Str(s.clone())),
            TokenKind::Keyword(Keyword::True) => ExprKind::Literal(Literal::Bool(true)),
            TokenKind::Keyword(Keyword::False) => ExprKind::Literal(Literal::Bool(false)),
            TokenKind::Ident(name) => ExprKind::Ident(name.clone()),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_binary(0)?;
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            _ => return Err(ParseError::expected("expression", &token)),
        };
        self.advance();
        Ok(Expr::new(self.next_id(), kind, token.span))
    }
}

/// A number token becomes a float literal iff its text has a `.`.
fn parse_number(token: &Token) -> Result<Literal, ParseError> {
    if token.text.contains('.') {
        token
            .text
            .parse::<f64>()
            .map(Literal::Float)
            .map_err(|_| ParseError::invalid_number(token))
    } else {
        token
            .text
            .parse::<i64>()
            .map(Literal::Int)
            .map_err(|_| ParseError::invalid_number(token))
    }
}

// =============================================================================
// Errors
// =============================================================================

/// What kind of syntax error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A different token was required here.
    Expected,
    UnknownType,
    InvalidNumber,
    InvalidAssignment,
}

/// A syntax error: where it happened and what was expected.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub location: Location,
    pub message: String,
    pub hint: Option<String>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    fn at(token: &Token, kind: ParseErrorKind, message: String) -> Self {
        Self {
            kind,
            span: token.span,
            location: token.location.clone(),
            message,
            hint: None,
        }
    }

    fn expected(expected: &str, found: &Token) -> Self {
        let mut err = Self::at(found, ParseErrorKind::Expected, format_expected_message(expected, &found.kind));
        err.hint = crate::hints::for_expected(expected, &found.kind).map(String::from);
        err
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    fn unknown_type(token: &Token) -> Self {
        Self::at(token, ParseErrorKind::UnknownType, format!("unknown type `{}`", token.text))
            .with_hint("built-in types are int, float, bool, char, string, any and void")
    }

    fn invalid_number(token: &Token) -> Self {
        Self::at(token, ParseErrorKind::InvalidNumber, format!("invalid number literal `{}`", token.text))
            .with_hint("integers must fit in 64 bits")
    }

    fn invalid_assignment(eq: &Token, target: Span) -> Self {
        let mut err = Self::at(eq, ParseErrorKind::InvalidAssignment, "invalid assignment target".to_string())
            .with_hint("only plain variable names can be assigned to");
        err.span = target;
        err
    }
}

/// Format a user-friendly "expected X, found Y" message.
fn format_expected_message(expected: &str, found: &TokenKind) -> String {
    match (expected, found) {
        ("`)`", TokenKind::Eof) => "unclosed '(' - missing ')'".to_string(),
        ("`}`", TokenKind::Eof) => "unclosed '{' - missing '}'".to_string(),
        ("`{`", _) => format!("expected '{{' to start block, found {}", found.display_name()),
        _ => format!("expected {}, found {}", expected, found.display_name()),
    }
}
