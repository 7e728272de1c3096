pub mod ast;
pub mod bp;

use crate::tokenizer::{self, strip_separators, Token, TokenKind};
use ast::expr::{
    Assign, AssignTarget, BinOp, BinOpKind, Binary, Call, Expr, Get, Ident, Index, LitAlgebra,
    LitBig, LitBool, LitConst, LitExp, LitFrac, LitInt, LitNil, LitNum, LitStr, MatrixLit,
    NativeCall, Paren, This, TupleLit, Unary, UnaryOp, VectorLit,
};
use ast::stmt::{
    Block, ClassDecl, ExprStmt, FnDecl, IfStmt, Param, PrintStmt, ReturnStmt, Stmt, VarDecl,
    WhileStmt,
};
use ast::NodeId;
use std::ops::Range;
use winnow_error::{ErrKind, Error};

/// A binding-power (Pratt) parser for Winnow.
///
/// The parser owns the complete token stream produced by
/// [`tokenize_complete`](crate::tokenizer::tokenize_complete) and walks it with a cursor. Every
/// token kind maps to a prefix rule (in [`Parser::prefix`]), an infix/postfix rule (in
/// [`Parser::infix`]), and a binding power (in [`bp`]); the expression loop
/// [`Parser::expr_bp`] combines them. The first error aborts the entire parse; there are no
/// recovery or synchronization points.
#[derive(Debug, Clone)]
pub struct Parser {
    /// The tokens that this parser is currently parsing.
    tokens: Vec<Token>,

    /// The index of the next token to be parsed.
    cursor: usize,

    /// The next [`NodeId`] to mint for a resolver-visible node.
    ids: NodeId,
}

impl Parser {
    /// Creates a parser for the given source. Fails with a lexical error if the source cannot
    /// be scanned.
    pub fn new(source: &str) -> Result<Self, Error> {
        Self::with_base_id(source, 0)
    }

    /// Creates a parser whose [`NodeId`]s start at `base`. Callers that keep resolver side
    /// tables alive across multiple parses use this to keep the ids disjoint.
    pub fn with_base_id(source: &str, base: NodeId) -> Result<Self, Error> {
        Ok(Self {
            tokens: tokenizer::tokenize_complete(source)?,
            cursor: 0,
            ids: base,
        })
    }

    /// One past the highest [`NodeId`] minted so far.
    pub fn id_watermark(&self) -> NodeId {
        self.ids
    }

    /// Parses the whole source as a program (a list of statements).
    pub fn parse_program(&mut self) -> Result<Vec<Stmt>, Error> {
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(self.declaration()?);
        }
        Ok(statements)
    }

    /// Parses the whole source as a single expression.
    pub fn parse_expr(&mut self) -> Result<Expr, Error> {
        let expr = self.expr_bp(bp::NONE)?;
        if self.at_end() {
            Ok(expr)
        } else {
            Err(self.error_here("expected end of input after the expression"))
        }
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = self.ids;
        self.ids += 1;
        id
    }

    fn at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    /// Consumes the next token if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Consumes the next token, requiring it to have the given kind.
    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, Error> {
        if self.check(kind) {
            let token = self.tokens[self.cursor].clone();
            self.cursor += 1;
            Ok(token)
        } else {
            Err(self.error_here(&format!("expected {}", what)))
        }
    }

    /// Returns the span of the current token, or the end of the source if the cursor is at the
    /// end of the stream.
    fn span_here(&self) -> Range<usize> {
        self.tokens.get(self.cursor).map_or_else(
            || self.tokens.last().map_or(0..0, |t| t.span.end..t.span.end),
            |t| t.span.clone(),
        )
    }

    fn line_here(&self) -> usize {
        self.tokens
            .get(self.cursor)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    /// Creates a syntax error pointing at the current token.
    fn error_here(&self, message: &str) -> Error {
        let message = match self.peek() {
            Some(token) => format!("{}, found '{}'", message, token.lexeme),
            None => format!("{}, found the end of input", message),
        };
        Error::new(self.span_here(), self.line_here(), ErrKind::Syntax, message)
    }

    // ------------------------------------------------------------------
    // statements
    // ------------------------------------------------------------------

    fn declaration(&mut self) -> Result<Stmt, Error> {
        match self.peek_kind() {
            Some(TokenKind::Var) => self.var_decl(true),
            Some(TokenKind::Let) => self.var_decl(false),
            Some(TokenKind::Fn) => self.fn_decl(),
            Some(TokenKind::Class) => self.class_decl(),
            _ => self.statement(),
        }
    }

    fn statement(&mut self) -> Result<Stmt, Error> {
        match self.peek_kind() {
            Some(TokenKind::Print) => self.print_stmt(),
            Some(TokenKind::Return) => self.return_stmt(),
            Some(TokenKind::If) => self.if_stmt(),
            Some(TokenKind::While) => self.while_stmt(),
            Some(TokenKind::For) => self.for_stmt(),
            Some(TokenKind::OpenBrace) => Ok(Stmt::Block(self.block()?)),
            _ => self.expr_stmt(),
        }
    }

    /// Consumes the statement terminator: an explicit `;`, or an implicit one at the end of the
    /// input or directly before a closing brace.
    fn terminator(&mut self) -> Result<(), Error> {
        if self.eat(TokenKind::Semicolon) {
            return Ok(());
        }
        match self.peek_kind() {
            None | Some(TokenKind::CloseBrace) => Ok(()),
            _ => Err(self.error_here("expected ';' after the statement")),
        }
    }

    fn var_decl(&mut self, mutable: bool) -> Result<Stmt, Error> {
        // the caller checked the keyword
        let keyword = self.advance().ok_or_else(|| self.error_here("expected a declaration"))?;
        let name = self.expect(TokenKind::Name, "a variable name")?;
        self.expect(TokenKind::Assign, "'=': declarations require an initializer")?;
        let init = self.expr_bp(bp::NONE)?;
        self.terminator()?;
        Ok(Stmt::Decl(VarDecl {
            name: name.lexeme,
            mutable,
            span: keyword.span.start..init.span().end,
            line: keyword.line,
            init,
        }))
    }

    fn fn_decl(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance().ok_or_else(|| self.error_here("expected 'fn'"))?;
        let decl = self.function(keyword.span.start, keyword.line)?;
        Ok(Stmt::Fn(decl))
    }

    /// Parses `name(params) { body }` or `name(params) = expr`, shared by function declarations
    /// and class methods.
    fn function(&mut self, start: usize, line: usize) -> Result<FnDecl, Error> {
        let name = self.expect(TokenKind::Name, "a function name")?;
        self.expect(TokenKind::OpenParen, "'(' after the function name")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::CloseParen) {
            loop {
                let param = self.expect(TokenKind::Name, "a parameter name")?;
                params.push(Param {
                    name: param.lexeme,
                    span: param.span,
                    line: param.line,
                });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseParen, "')' after the parameter list")?;

        let (body, end) = if self.eat(TokenKind::Assign) {
            // single-expression body: fn f(x) = x^2 desugars to { return x^2; }
            let value = self.expr_bp(bp::NONE)?;
            self.terminator()?;
            let span = value.span();
            let line = value.line();
            let end = span.end;
            (
                vec![Stmt::Return(ReturnStmt { value: Some(value), span, line })],
                end,
            )
        } else {
            let block = self.block()?;
            let end = block.span.end;
            (block.statements, end)
        };

        Ok(FnDecl {
            name: name.lexeme,
            params,
            body,
            span: start..end,
            line,
        })
    }

    fn class_decl(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance().ok_or_else(|| self.error_here("expected 'class'"))?;
        let name = self.expect(TokenKind::Name, "a class name")?;
        self.expect(TokenKind::OpenBrace, "'{' before the class body")?;

        let mut methods = Vec::new();
        while !self.check(TokenKind::CloseBrace) && !self.at_end() {
            let start = self.span_here().start;
            let line = self.line_here();
            methods.push(self.function(start, line)?);
        }
        let close = self.expect(TokenKind::CloseBrace, "'}' after the class body")?;

        Ok(Stmt::Class(ClassDecl {
            name: name.lexeme,
            methods,
            span: keyword.span.start..close.span.end,
            line: keyword.line,
        }))
    }

    fn print_stmt(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance().ok_or_else(|| self.error_here("expected 'print'"))?;
        let expr = self.expr_bp(bp::NONE)?;
        self.terminator()?;
        Ok(Stmt::Print(PrintStmt {
            span: keyword.span.start..expr.span().end,
            line: keyword.line,
            expr,
        }))
    }

    fn return_stmt(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance().ok_or_else(|| self.error_here("expected 'return'"))?;
        let value = if self.check(TokenKind::Semicolon)
            || self.check(TokenKind::CloseBrace)
            || self.at_end()
        {
            None
        } else {
            Some(self.expr_bp(bp::NONE)?)
        };
        self.terminator()?;
        let end = value.as_ref().map_or(keyword.span.end, |v| v.span().end);
        Ok(Stmt::Return(ReturnStmt {
            value,
            span: keyword.span.start..end,
            line: keyword.line,
        }))
    }

    fn if_stmt(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance().ok_or_else(|| self.error_here("expected 'if'"))?;
        let condition = self.expr_bp(bp::NONE)?;
        let then_branch = Stmt::Block(self.block()?);
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        let end = else_branch
            .as_ref()
            .map_or(then_branch.span().end, |stmt| stmt.span().end);
        Ok(Stmt::If(IfStmt {
            condition,
            then_branch: Box::new(then_branch),
            else_branch,
            span: keyword.span.start..end,
            line: keyword.line,
        }))
    }

    fn while_stmt(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance().ok_or_else(|| self.error_here("expected 'while'"))?;
        let condition = self.expr_bp(bp::NONE)?;
        let body = Stmt::Block(self.block()?);
        let span = keyword.span.start..body.span().end;
        Ok(Stmt::While(WhileStmt {
            condition,
            body: Box::new(body),
            span,
            line: keyword.line,
        }))
    }

    /// Parses a C-style `for(init; cond; tick) STATEMENT` and desugars it into
    /// `{ init; while cond { body; tick; } }`.
    fn for_stmt(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance().ok_or_else(|| self.error_here("expected 'for'"))?;
        self.expect(TokenKind::OpenParen, "'(' after 'for'")?;

        let init = if self.eat(TokenKind::Semicolon) {
            None
        } else if self.check(TokenKind::Var) || self.check(TokenKind::Let) {
            let mutable = self.check(TokenKind::Var);
            Some(self.var_decl(mutable)?)
        } else {
            let expr = self.expr_bp(bp::NONE)?;
            self.expect(TokenKind::Semicolon, "';' after the loop initializer")?;
            let span = expr.span();
            let line = expr.line();
            Some(Stmt::Expr(ExprStmt { expr, span, line }))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            Expr::Bool(LitBool {
                value: true,
                span: self.span_here(),
                line: self.line_here(),
            })
        } else {
            self.expr_bp(bp::NONE)?
        };
        self.expect(TokenKind::Semicolon, "';' after the loop condition")?;

        let tick = if self.check(TokenKind::CloseParen) {
            None
        } else {
            Some(self.expr_bp(bp::NONE)?)
        };
        self.expect(TokenKind::CloseParen, "')' after the 'for' clauses")?;

        let body = self.statement()?;
        let body_span = body.span();
        let body_line = body.line();

        let mut loop_body = vec![body];
        if let Some(tick) = tick {
            let span = tick.span();
            let line = tick.line();
            loop_body.push(Stmt::Expr(ExprStmt { expr: tick, span, line }));
        }

        let while_stmt = Stmt::While(WhileStmt {
            condition,
            body: Box::new(Stmt::Block(Block {
                statements: loop_body,
                span: body_span.clone(),
                line: body_line,
            })),
            span: keyword.span.start..body_span.end,
            line: keyword.line,
        });

        let statements = init.into_iter().chain([while_stmt]).collect();
        Ok(Stmt::Block(Block {
            statements,
            span: keyword.span.start..body_span.end,
            line: keyword.line,
        }))
    }

    fn block(&mut self) -> Result<Block, Error> {
        let open = self.expect(TokenKind::OpenBrace, "'{' to begin a block")?;
        let mut statements = Vec::new();
        while !self.check(TokenKind::CloseBrace) && !self.at_end() {
            statements.push(self.declaration()?);
        }
        let close = self.expect(TokenKind::CloseBrace, "'}' to close the block")?;
        Ok(Block {
            statements,
            span: open.span.start..close.span.end,
            line: open.line,
        })
    }

    fn expr_stmt(&mut self) -> Result<Stmt, Error> {
        let expr = self.expr_bp(bp::NONE)?;
        self.terminator()?;
        let span = expr.span();
        let line = expr.line();
        Ok(Stmt::Expr(ExprStmt { expr, span, line }))
    }

    // ------------------------------------------------------------------
    // expressions
    // ------------------------------------------------------------------

    /// The binding-power loop: parse one prefix term, then keep applying infix/postfix rules
    /// while the next operator binds tighter than `min_bp`.
    fn expr_bp(&mut self, min_bp: u8) -> Result<Expr, Error> {
        let mut lhs = self.prefix()?;

        loop {
            let Some(kind) = self.peek_kind() else { break };

            let power = bp::infix(kind);
            if power != bp::NONE && power > min_bp {
                let token = self
                    .advance()
                    .ok_or_else(|| self.error_here("expected an operator"))?;
                lhs = self.infix(lhs, token)?;
                continue;
            }

            // implicit multiplication: a term directly followed by a symbol, native-function
            // name, or numeric constant synthesizes a '*' at a tighter binding power, so
            // `2x + 1` groups as `(2*x) + 1`
            if bp::IMUL > min_bp
                && matches!(
                    kind,
                    TokenKind::Name | TokenKind::NativeFn | TokenKind::NumConst
                )
            {
                let rhs = self.expr_bp(bp::IMUL)?;
                lhs = implicit_mul(lhs, rhs);
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    /// Parses one prefix term: a literal, identifier, unary operation, native call, or
    /// delimited group.
    fn prefix(&mut self) -> Result<Expr, Error> {
        if self.at_end() {
            return Err(self.error_here("expected an expression"));
        }
        let token = self
            .advance()
            .ok_or_else(|| self.error_here("expected an expression"))?;
        let span = token.span.clone();
        let line = token.line;

        match token.kind {
            TokenKind::Int => {
                let value = parse_i64(&strip_separators(&token.lexeme), &token)?;
                Ok(Expr::Integer(LitInt { value, span, line }))
            }
            TokenKind::BinInt => self.radix_literal(&token, 2),
            TokenKind::OctInt => self.radix_literal(&token, 8),
            TokenKind::HexInt => self.radix_literal(&token, 16),
            TokenKind::Float => {
                let value = parse_f64(&strip_separators(&token.lexeme), &token)?;
                Ok(Expr::Number(LitNum { value, span, line }))
            }
            TokenKind::Sci => {
                let digits = strip_separators(&token.lexeme);
                let (mantissa, exponent) = digits
                    .split_once('E')
                    .ok_or_else(|| malformed(&token))?;
                Ok(Expr::Exponential(LitExp {
                    m: parse_f64(mantissa, &token)?,
                    e: parse_i64(exponent, &token)?,
                    span,
                    line,
                }))
            }
            TokenKind::Frac => {
                let digits = strip_separators(&token.lexeme);
                let (n, d) = digits.split_once('|').ok_or_else(|| malformed(&token))?;
                Ok(Expr::Fraction(LitFrac {
                    n: parse_i64(n, &token)?,
                    d: parse_i64(d, &token)?,
                    span,
                    line,
                }))
            }
            TokenKind::BigNum => Ok(Expr::Big(LitBig {
                digits: strip_separators(&token.lexeme[1..]),
                span,
                line,
            })),
            TokenKind::Str => Ok(Expr::Str(LitStr {
                value: token.lexeme[1..token.lexeme.len() - 1].to_string(),
                span,
                line,
            })),
            TokenKind::AlgebraStr => Ok(Expr::Algebra(LitAlgebra {
                id: self.fresh_id(),
                source: token.lexeme[1..token.lexeme.len() - 1].to_string(),
                span,
                line,
            })),
            TokenKind::True => Ok(Expr::Bool(LitBool { value: true, span, line })),
            TokenKind::False => Ok(Expr::Bool(LitBool { value: false, span, line })),
            TokenKind::Nil => Ok(Expr::Nil(LitNil { span, line })),
            TokenKind::NumConst => Ok(Expr::Constant(LitConst {
                name: token.lexeme,
                span,
                line,
            })),
            TokenKind::Name => Ok(Expr::Ident(Ident {
                name: token.lexeme,
                id: self.fresh_id(),
                span,
                line,
            })),
            TokenKind::This => Ok(Expr::This(This {
                id: self.fresh_id(),
                span,
                line,
            })),
            TokenKind::Sub => self.unary(UnaryOp::Neg, token),
            TokenKind::Add => self.unary(UnaryOp::Pos, token),
            TokenKind::Not => self.unary(UnaryOp::Not, token),
            TokenKind::NativeFn => {
                self.expect(TokenKind::OpenParen, "'(' after the native function name")?;
                let (args, close) = self.call_args()?;
                Ok(Expr::NativeCall(NativeCall {
                    name: token.lexeme,
                    args,
                    span: span.start..close.span.end,
                    line,
                }))
            }
            TokenKind::OpenParen => self.finish_paren(token),
            TokenKind::OpenBracket => self.bracket_literal(token),
            _ => Err(Error::new(
                span,
                line,
                ErrKind::Syntax,
                format!("expected an expression, found '{}'", token.lexeme),
            )),
        }
    }

    fn unary(&mut self, op: UnaryOp, token: Token) -> Result<Expr, Error> {
        let operand = self.expr_bp(bp::UNARY)?;
        let span = token.span.start..operand.span().end;
        Ok(Expr::Unary(Unary {
            op,
            operand: Box::new(operand),
            span,
            line: token.line,
        }))
    }

    fn radix_literal(&mut self, token: &Token, radix: u32) -> Result<Expr, Error> {
        let digits = strip_separators(&token.lexeme[2..]);
        let value = i64::from_str_radix(&digits, radix).map_err(|_| malformed(token))?;
        Ok(Expr::Integer(LitInt {
            value,
            span: token.span.clone(),
            line: token.line,
        }))
    }

    /// Finishes a parenthesized group whose `(` has been consumed: either a parenthesized
    /// expression or a tuple literal.
    fn finish_paren(&mut self, open: Token) -> Result<Expr, Error> {
        let first = self.expr_bp(bp::NONE)?;

        if self.eat(TokenKind::Comma) {
            let mut elements = vec![first];
            loop {
                elements.push(self.expr_bp(bp::NONE)?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            let close = self.expect(TokenKind::CloseParen, "')' to close the tuple")?;
            return Ok(Expr::Tuple(TupleLit {
                elements,
                span: open.span.start..close.span.end,
                line: open.line,
            }));
        }

        let close = self.expect(TokenKind::CloseParen, "')' to close the group")?;
        Ok(Expr::Paren(Paren {
            expr: Box::new(first),
            span: open.span.start..close.span.end,
            line: open.line,
        }))
    }

    /// Finishes a bracketed literal whose `[` has been consumed. A bracketed list whose
    /// elements are themselves vector literals is reinterpreted as a matrix, with each inner
    /// vector becoming a row.
    fn bracket_literal(&mut self, open: Token) -> Result<Expr, Error> {
        let mut elements = Vec::new();
        if !self.check(TokenKind::CloseBracket) {
            loop {
                elements.push(self.expr_bp(bp::NONE)?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::CloseBracket, "']' to close the literal")?;
        let span = open.span.start..close.span.end;

        if elements.iter().any(|e| matches!(e, Expr::Vector(_))) {
            let mut rows = Vec::new();
            let mut width = None;
            for element in elements {
                let Expr::Vector(row) = element else {
                    return Err(Error::new(
                        element.span(),
                        element.line(),
                        ErrKind::Syntax,
                        "a matrix literal may only contain row vectors".to_string(),
                    ));
                };
                let len = row.elements.len();
                if *width.get_or_insert(len) != len {
                    return Err(Error::new(
                        row.span,
                        row.line,
                        ErrKind::Syntax,
                        "jagged matrix: every row must have the same length".to_string(),
                    ));
                }
                rows.push(row.elements);
            }
            Ok(Expr::Matrix(MatrixLit { rows, span, line: open.line }))
        } else {
            Ok(Expr::Vector(VectorLit { elements, span, line: open.line }))
        }
    }

    /// Parses a comma-separated argument list whose `(` has been consumed, returning the
    /// arguments and the closing token.
    fn call_args(&mut self) -> Result<(Vec<Expr>, Token), Error> {
        let mut args = Vec::new();
        if !self.check(TokenKind::CloseParen) {
            loop {
                args.push(self.expr_bp(bp::NONE)?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::CloseParen, "')' after the arguments")?;
        Ok((args, close))
    }

    /// Applies the infix or postfix rule for the consumed operator token.
    fn infix(&mut self, lhs: Expr, token: Token) -> Result<Expr, Error> {
        match token.kind {
            TokenKind::Add => self.binary_or_compound(lhs, BinOpKind::Add, token),
            TokenKind::Sub => self.binary_or_compound(lhs, BinOpKind::Sub, token),
            TokenKind::Mul => self.binary_or_compound(lhs, BinOpKind::Mul, token),
            TokenKind::Div => self.binary_or_compound(lhs, BinOpKind::Div, token),
            TokenKind::Mod => self.binary_or_compound(lhs, BinOpKind::Mod, token),
            TokenKind::Caret => {
                // exponentiation is right-associative
                let rhs = self.expr_bp(bp::POWER - 1)?;
                Ok(binary(lhs, BinOpKind::Pow, rhs, &token))
            }
            TokenKind::Amp => {
                let rhs = self.expr_bp(bp::CONCAT)?;
                Ok(binary(lhs, BinOpKind::Concat, rhs, &token))
            }
            TokenKind::Eq => self.plain_binary(lhs, BinOpKind::Eq, token),
            TokenKind::NotEq => self.plain_binary(lhs, BinOpKind::NotEq, token),
            TokenKind::Less => self.plain_binary(lhs, BinOpKind::Less, token),
            TokenKind::LessEq => self.plain_binary(lhs, BinOpKind::LessEq, token),
            TokenKind::Greater => self.plain_binary(lhs, BinOpKind::Greater, token),
            TokenKind::GreaterEq => self.plain_binary(lhs, BinOpKind::GreaterEq, token),
            TokenKind::And => self.plain_binary(lhs, BinOpKind::And, token),
            TokenKind::Or => self.plain_binary(lhs, BinOpKind::Or, token),
            TokenKind::Assign => {
                // assignment is right-associative
                let rhs = self.expr_bp(bp::ASSIGN - 1)?;
                let target = assign_target(lhs)?;
                let span = target.span().start..rhs.span().end;
                Ok(Expr::Assign(Assign {
                    target,
                    value: Box::new(rhs),
                    span,
                    line: token.line,
                }))
            }
            TokenKind::Bang => {
                let span = lhs.span().start..token.span.end;
                Ok(Expr::Unary(Unary {
                    op: UnaryOp::Factorial,
                    operand: Box::new(lhs),
                    span,
                    line: token.line,
                }))
            }
            TokenKind::PlusPlus => self.postfix_update(lhs, BinOpKind::Add, token),
            TokenKind::MinusMinus => self.postfix_update(lhs, BinOpKind::Sub, token),
            TokenKind::StarStar => self.postfix_update(lhs, BinOpKind::Mul, token),
            TokenKind::OpenParen => self.call_or_adjacent_product(lhs, token),
            TokenKind::OpenBracket => {
                let index = self.expr_bp(bp::NONE)?;
                let close = self.expect(TokenKind::CloseBracket, "']' after the index")?;
                let span = lhs.span().start..close.span.end;
                Ok(Expr::Index(Index {
                    target: Box::new(lhs),
                    index: Box::new(index),
                    span,
                    line: token.line,
                }))
            }
            TokenKind::Dot => {
                let name = self.expect(TokenKind::Name, "a property name after '.'")?;
                let span = lhs.span().start..name.span.end;
                Ok(Expr::Get(Get {
                    object: Box::new(lhs),
                    name: name.lexeme,
                    span,
                    line: token.line,
                }))
            }
            _ => Err(Error::new(
                token.span.clone(),
                token.line,
                ErrKind::Syntax,
                format!("'{}' cannot be used as an infix operator", token.lexeme),
            )),
        }
    }

    fn plain_binary(&mut self, lhs: Expr, kind: BinOpKind, token: Token) -> Result<Expr, Error> {
        let rhs = self.expr_bp(bp::infix(token.kind))?;
        Ok(binary(lhs, kind, rhs, &token))
    }

    /// Parses the right-hand side of an arithmetic operator, first peeking for a following `=`
    /// that turns it into a compound assignment (`x += e` desugars to `x = x + e`).
    fn binary_or_compound(
        &mut self,
        lhs: Expr,
        kind: BinOpKind,
        token: Token,
    ) -> Result<Expr, Error> {
        if self.eat(TokenKind::Assign) {
            let rhs = self.expr_bp(bp::ASSIGN - 1)?;
            let target = assign_target(lhs.clone())?;
            let span = lhs.span().start..rhs.span().end;
            let value = binary(lhs, kind, rhs, &token);
            return Ok(Expr::Assign(Assign {
                target,
                value: Box::new(value),
                span,
                line: token.line,
            }));
        }
        self.plain_binary(lhs, kind, token)
    }

    /// Desugars postfix `x++` / `x--` / `x**` into `x = x + 1` / `x = x - 1` / `x = x * x`.
    /// The operand must be a bare variable name.
    fn postfix_update(
        &mut self,
        lhs: Expr,
        kind: BinOpKind,
        token: Token,
    ) -> Result<Expr, Error> {
        let Expr::Ident(ident) = lhs else {
            return Err(Error::new(
                lhs.span(),
                lhs.line(),
                ErrKind::Syntax,
                format!("postfix '{}' requires a variable name", token.lexeme),
            ));
        };

        let read = Expr::Ident(Ident {
            name: ident.name.clone(),
            id: self.fresh_id(),
            span: ident.span.clone(),
            line: ident.line,
        });
        let rhs = if token.kind == TokenKind::StarStar {
            Expr::Ident(Ident {
                name: ident.name.clone(),
                id: self.fresh_id(),
                span: ident.span.clone(),
                line: ident.line,
            })
        } else {
            Expr::Integer(LitInt {
                value: 1,
                span: token.span.clone(),
                line: token.line,
            })
        };

        let span = ident.span.start..token.span.end;
        let value = binary(read, kind, rhs, &token);
        Ok(Expr::Assign(Assign {
            target: AssignTarget::Var(ident),
            value: Box::new(value),
            span,
            line: token.line,
        }))
    }

    /// A `(` directly after an expression is a call when the callee can actually be called,
    /// and an implicit product when the left side is an adjacent value or parenthesized group,
    /// as in `(a + b)(c + d)`.
    fn call_or_adjacent_product(&mut self, lhs: Expr, open: Token) -> Result<Expr, Error> {
        match &lhs {
            Expr::Ident(_) | Expr::Get(_) | Expr::Call(_) | Expr::Index(_) | Expr::This(_) => {
                let (args, close) = self.call_args()?;
                let span = lhs.span().start..close.span.end;
                let line = lhs.line();
                Ok(Expr::Call(Call {
                    callee: Box::new(lhs),
                    args,
                    span,
                    line,
                }))
            }
            _ if lhs.is_implicit_mul_eligible() => {
                let group = self.finish_paren(open)?;
                Ok(implicit_mul(lhs, group))
            }
            _ => Err(Error::new(
                lhs.span(),
                lhs.line(),
                ErrKind::Syntax,
                format!("{} cannot be called", node_name(&lhs)),
            )),
        }
    }
}

/// Builds an explicit binary node from the operator token.
fn binary(lhs: Expr, kind: BinOpKind, rhs: Expr, token: &Token) -> Expr {
    let span = lhs.span().start..rhs.span().end;
    Expr::Binary(Binary {
        lhs: Box::new(lhs),
        op: BinOp {
            kind,
            implicit: false,
            span: token.span.clone(),
        },
        rhs: Box::new(rhs),
        span,
        line: token.line,
    })
}

/// Builds a multiplication node synthesized for an implicit-multiplication position.
fn implicit_mul(lhs: Expr, rhs: Expr) -> Expr {
    let span = lhs.span().start..rhs.span().end;
    let op_span = lhs.span().end..rhs.span().start;
    let line = lhs.line();
    Expr::Binary(Binary {
        lhs: Box::new(lhs),
        op: BinOp {
            kind: BinOpKind::Mul,
            implicit: true,
            span: op_span,
        },
        rhs: Box::new(rhs),
        span,
        line,
    })
}

/// Validates an assignment target: only a bare identifier or a field access is legal.
fn assign_target(expr: Expr) -> Result<AssignTarget, Error> {
    match expr {
        Expr::Ident(ident) => Ok(AssignTarget::Var(ident)),
        Expr::Get(get) => Ok(AssignTarget::Field {
            object: get.object,
            name: get.name,
            span: get.span,
            line: get.line,
        }),
        other => Err(Error::new(
            other.span(),
            other.line(),
            ErrKind::Syntax,
            format!("invalid assignment target: {}", node_name(&other)),
        )),
    }
}

/// The user-visible name of an expression node kind, for error messages.
fn node_name(expr: &Expr) -> &'static str {
    match expr {
        Expr::Integer(_)
        | Expr::Number(_)
        | Expr::Fraction(_)
        | Expr::Exponential(_)
        | Expr::Big(_)
        | Expr::Bool(_)
        | Expr::Str(_)
        | Expr::Nil(_)
        | Expr::Constant(_)
        | Expr::Algebra(_) => "a literal",
        Expr::Ident(_) => "a variable",
        Expr::Assign(_) => "an assignment",
        Expr::Unary(_) => "a unary operation",
        Expr::Binary(_) => "a binary operation",
        Expr::Call(_) => "a function call",
        Expr::NativeCall(_) => "a native function call",
        Expr::Tuple(_) => "a tuple literal",
        Expr::Vector(_) => "a vector literal",
        Expr::Matrix(_) => "a matrix literal",
        Expr::Index(_) => "an index expression",
        Expr::Get(_) => "a property access",
        Expr::This(_) => "'this'",
        Expr::Paren(_) => "a parenthesized expression",
    }
}

fn parse_i64(digits: &str, token: &Token) -> Result<i64, Error> {
    digits.parse::<i64>().map_err(|_| malformed(token))
}

fn parse_f64(digits: &str, token: &Token) -> Result<f64, Error> {
    digits.parse::<f64>().map_err(|_| malformed(token))
}

/// The tokenizer validates literal lexemes, so this error indicates a tokenizer/parser
/// disagreement rather than bad user input.
fn malformed(token: &Token) -> Error {
    Error::new(
        token.span.clone(),
        token.line,
        ErrKind::Syntax,
        format!("malformed literal '{}'", token.lexeme),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn parse(source: &str) -> Expr {
        Parser::new(source).unwrap().parse_expr().unwrap()
    }

    #[test]
    fn precedence() {
        // 2 + 3 * 4 groups as 2 + (3 * 4)
        let Expr::Binary(add) = parse("2 + 3 * 4") else { panic!("expected a binary node") };
        assert_eq!(add.op.kind, BinOpKind::Add);
        let Expr::Binary(mul) = *add.rhs else { panic!("expected rhs to be the product") };
        assert_eq!(mul.op.kind, BinOpKind::Mul);
    }

    #[test]
    fn power_is_right_associative() {
        let Expr::Binary(outer) = parse("2 ^ 3 ^ 4") else { panic!("expected a binary node") };
        assert_eq!(outer.op.kind, BinOpKind::Pow);
        assert!(matches!(*outer.lhs, Expr::Integer(LitInt { value: 2, .. })));
        assert!(matches!(*outer.rhs, Expr::Binary(_)));
    }

    #[test]
    fn radix_literals_carry_their_values() {
        assert!(matches!(parse("0xFF"), Expr::Integer(LitInt { value: 255, .. })));
        assert!(matches!(parse("0o17"), Expr::Integer(LitInt { value: 15, .. })));
        assert!(matches!(parse("0b101"), Expr::Integer(LitInt { value: 5, .. })));
    }

    #[test]
    fn scientific_literals_split_mantissa_and_exponent() {
        let Expr::Exponential(exp) = parse("2E5") else { panic!("expected an exponential") };
        assert_eq!((exp.m, exp.e), (2.0, 5));
        let Expr::Exponential(neg) = parse("1.5E-3") else { panic!("expected an exponential") };
        assert_eq!((neg.m, neg.e), (1.5, -3));
    }

    #[test]
    fn bignumber_literals_keep_their_digits() {
        let Expr::Big(big) = parse("#123456789012345678901234567890") else {
            panic!("expected a bignumber")
        };
        assert_eq!(big.digits, "123456789012345678901234567890");
    }

    #[test]
    fn implicit_multiplication() {
        let Expr::Binary(add) = parse("2x + 1") else { panic!("expected a binary node") };
        assert_eq!(add.op.kind, BinOpKind::Add);
        let Expr::Binary(mul) = *add.lhs else { panic!("expected lhs to be the product") };
        assert_eq!(mul.op.kind, BinOpKind::Mul);
        assert!(mul.op.implicit);
        assert!(matches!(*mul.rhs, Expr::Ident(_)));
    }

    #[test]
    fn implicit_multiplication_binds_tighter_than_division() {
        // 6 / 2x groups as 6 / (2x)
        let Expr::Binary(div) = parse("6 / 2x") else { panic!("expected a binary node") };
        assert_eq!(div.op.kind, BinOpKind::Div);
        let Expr::Binary(mul) = *div.rhs else { panic!("expected rhs to be the product") };
        assert!(mul.op.implicit);
    }

    #[test]
    fn native_call_with_coefficient() {
        let Expr::Binary(mul) = parse("3sin(x)") else { panic!("expected a binary node") };
        assert!(mul.op.implicit);
        assert!(matches!(*mul.rhs, Expr::NativeCall(_)));
    }

    #[test]
    fn adjacent_parens_are_a_product() {
        let Expr::Binary(mul) = parse("(x + 1)(x - 1)") else { panic!("expected a binary node") };
        assert_eq!(mul.op.kind, BinOpKind::Mul);
        assert!(mul.op.implicit);
        assert!(matches!(*mul.lhs, Expr::Paren(_)));
        assert!(matches!(*mul.rhs, Expr::Paren(_)));
    }

    #[test]
    fn call_on_identifier_is_a_call() {
        let expr = parse("f(x)(y)");
        let Expr::Call(outer) = expr else { panic!("expected a call") };
        assert!(matches!(*outer.callee, Expr::Call(_)));
    }

    #[test]
    fn compound_assignment_desugars() {
        let Expr::Assign(assign) = parse("x += 2") else { panic!("expected an assignment") };
        assert!(matches!(assign.target, AssignTarget::Var(_)));
        let Expr::Binary(add) = *assign.value else { panic!("expected the desugared sum") };
        assert_eq!(add.op.kind, BinOpKind::Add);
    }

    #[test]
    fn postfix_increment_desugars() {
        let Expr::Assign(assign) = parse("x++") else { panic!("expected an assignment") };
        let Expr::Binary(add) = *assign.value else { panic!("expected the desugared sum") };
        assert_eq!(add.op.kind, BinOpKind::Add);
        assert!(matches!(*add.rhs, Expr::Integer(LitInt { value: 1, .. })));
    }

    #[test]
    fn postfix_square_desugars() {
        let Expr::Assign(assign) = parse("x**") else { panic!("expected an assignment") };
        let Expr::Binary(mul) = *assign.value else { panic!("expected the desugared product") };
        assert_eq!(mul.op.kind, BinOpKind::Mul);
        assert!(matches!(*mul.rhs, Expr::Ident(_)));
    }

    #[test]
    fn postfix_update_requires_a_name() {
        let err = Parser::new("3++").unwrap().parse_expr().unwrap_err();
        assert_eq!(err.kind, ErrKind::Syntax);
    }

    #[test]
    fn invalid_assignment_target() {
        let err = Parser::new("1 + 2 = 3").unwrap().parse_expr().unwrap_err();
        assert!(err.message.contains("invalid assignment target"));
    }

    #[test]
    fn vector_literal() {
        let Expr::Vector(vector) = parse("[1, 2, 3]") else { panic!("expected a vector") };
        assert_eq!(vector.elements.len(), 3);
    }

    #[test]
    fn matrix_literal() {
        let Expr::Matrix(matrix) = parse("[[1, 2], [3, 4]]") else { panic!("expected a matrix") };
        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.rows[0].len(), 2);
    }

    #[test]
    fn jagged_matrix_is_rejected() {
        let err = Parser::new("[[1, 2], [3]]").unwrap().parse_expr().unwrap_err();
        assert!(err.message.contains("jagged"));
    }

    #[test]
    fn factorial_is_postfix() {
        let Expr::Unary(unary) = parse("5!") else { panic!("expected a unary node") };
        assert_eq!(unary.op, UnaryOp::Factorial);
    }

    #[test]
    fn statements_parse() {
        let stmts = Parser::new("var x = 5; x + 2;")
            .unwrap()
            .parse_program()
            .unwrap();
        assert_eq!(stmts.len(), 2);
        assert!(matches!(stmts[0], Stmt::Decl(VarDecl { mutable: true, .. })));
    }

    #[test]
    fn for_loop_desugars_to_while() {
        let stmts = Parser::new("for(var i = 0; i < 3; i++) { print i; }")
            .unwrap()
            .parse_program()
            .unwrap();
        let Stmt::Block(block) = &stmts[0] else { panic!("expected the desugared block") };
        assert!(matches!(block.statements[0], Stmt::Decl(_)));
        assert!(matches!(block.statements[1], Stmt::While(_)));
    }

    #[test]
    fn single_expression_function_body() {
        let stmts = Parser::new("fn sq(n) = n^2;").unwrap().parse_program().unwrap();
        let Stmt::Fn(decl) = &stmts[0] else { panic!("expected a function declaration") };
        assert_eq!(decl.params.len(), 1);
        assert!(matches!(decl.body[0], Stmt::Return(_)));
    }

    #[test]
    fn class_with_initializer() {
        let stmts = Parser::new("class C { def(n) { this.n = n; } }")
            .unwrap()
            .parse_program()
            .unwrap();
        let Stmt::Class(class) = &stmts[0] else { panic!("expected a class declaration") };
        assert_eq!(class.methods[0].name, "def");
    }

    #[test]
    fn declarations_require_initializers() {
        let err = Parser::new("var x;").unwrap().parse_program().unwrap_err();
        assert_eq!(err.kind, ErrKind::Syntax);
    }
}
