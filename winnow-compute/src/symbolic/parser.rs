//! The miniature expression parser for algebra-string literals like `'x^2 + 1'`.
//!
//! Algebra strings have their own token stream and a small recursive-descent grammar over it,
//! entirely separate from the main language parser. Parse failures are syntax errors; the
//! engine rewrites their position onto the literal's own source line.

use crate::primitive::int_from_str;
use logos::Logos;
use std::ops::Range;
use winnow_error::{ErrKind, Error};

use super::expr::{MathObj, RelOp, Relation};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum AlgToken {
    #[token("==")]
    Eq,

    #[token("!=")]
    NotEq,

    #[token("<=")]
    LessEq,

    #[token(">=")]
    GreaterEq,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("+")]
    Add,

    #[token("-")]
    Sub,

    #[token("*")]
    Mul,

    #[token("/")]
    Div,

    #[token("^")]
    Caret,

    #[token(",")]
    Comma,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    #[token("[")]
    OpenBracket,

    #[token("]")]
    CloseBracket,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    #[regex(r"[0-9]+")]
    Int,

    #[regex(r"[a-zA-Z_$\u{0370}-\u{03ff}\u{2200}-\u{22ff}][a-zA-Z0-9_$\u{0370}-\u{03ff}\u{2200}-\u{22ff}]*")]
    Name,
}

#[derive(Debug, Clone)]
struct Scanned {
    kind: AlgToken,
    lexeme: String,
    span: Range<usize>,
}

/// Parses an algebra-string source into an unsimplified expression tree.
pub fn parse_algebra(source: &str) -> Result<MathObj, Error> {
    let mut tokens = Vec::new();
    let mut lexer = AlgToken::lexer(source);
    while let Some(result) = lexer.next() {
        let kind = result.map_err(|()| {
            Error::new(
                lexer.span(),
                1,
                ErrKind::Syntax,
                format!("unrecognized character '{}' in algebra string", lexer.slice()),
            )
        })?;
        tokens.push(Scanned {
            kind,
            lexeme: lexer.slice().to_string(),
            span: lexer.span(),
        });
    }

    let mut parser = AlgParser { tokens, cursor: 0 };
    let expr = parser.relation()?;
    if parser.cursor < parser.tokens.len() {
        return Err(parser.error("expected the end of the algebra string"));
    }
    Ok(expr)
}

struct AlgParser {
    tokens: Vec<Scanned>,
    cursor: usize,
}

impl AlgParser {
    fn peek(&self) -> Option<AlgToken> {
        self.tokens.get(self.cursor).map(|t| t.kind)
    }

    fn eat(&mut self, kind: AlgToken) -> bool {
        if self.peek() == Some(kind) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> Error {
        let (span, found) = match self.tokens.get(self.cursor) {
            Some(token) => (token.span.clone(), format!("'{}'", token.lexeme)),
            None => {
                let end = self.tokens.last().map_or(0, |t| t.span.end);
                (end..end, "the end of the algebra string".to_string())
            }
        };
        Error::new(span, 1, ErrKind::Syntax, format!("{}, found {}", message, found))
    }

    fn relation(&mut self) -> Result<MathObj, Error> {
        let lhs = self.sum()?;
        let op = match self.peek() {
            Some(AlgToken::Eq) => RelOp::Eq,
            Some(AlgToken::NotEq) => RelOp::NotEq,
            Some(AlgToken::Less) => RelOp::Less,
            Some(AlgToken::LessEq) => RelOp::LessEq,
            Some(AlgToken::Greater) => RelOp::Greater,
            Some(AlgToken::GreaterEq) => RelOp::GreaterEq,
            _ => return Ok(lhs),
        };
        self.cursor += 1;
        let rhs = self.sum()?;
        Ok(MathObj::Relation(Box::new(Relation { op, lhs, rhs })))
    }

    fn sum(&mut self) -> Result<MathObj, Error> {
        let mut lhs = self.product()?;
        loop {
            if self.eat(AlgToken::Add) {
                let rhs = self.product()?;
                // keep sums flat as they chain
                lhs = match lhs {
                    MathObj::Sum(mut ops) => {
                        ops.push(rhs);
                        MathObj::Sum(ops)
                    }
                    other => MathObj::Sum(vec![other, rhs]),
                };
            } else if self.eat(AlgToken::Sub) {
                let rhs = self.product()?;
                lhs = MathObj::Difference(Box::new(lhs), Box::new(rhs));
            } else {
                return Ok(lhs);
            }
        }
    }

    fn product(&mut self) -> Result<MathObj, Error> {
        let mut lhs = self.unary()?;
        loop {
            if self.eat(AlgToken::Mul) {
                let rhs = self.unary()?;
                lhs = match lhs {
                    MathObj::Product(mut ops) => {
                        ops.push(rhs);
                        MathObj::Product(ops)
                    }
                    other => MathObj::Product(vec![other, rhs]),
                };
            } else if self.eat(AlgToken::Div) {
                let rhs = self.unary()?;
                lhs = MathObj::Quotient(Box::new(lhs), Box::new(rhs));
            } else if matches!(
                self.peek(),
                Some(AlgToken::Name | AlgToken::OpenParen)
            ) {
                // implicit multiplication: 2x, 3sin(x), (a)(b)
                let rhs = self.unary()?;
                lhs = match lhs {
                    MathObj::Product(mut ops) => {
                        ops.push(rhs);
                        MathObj::Product(ops)
                    }
                    other => MathObj::Product(vec![other, rhs]),
                };
            } else {
                return Ok(lhs);
            }
        }
    }

    fn unary(&mut self) -> Result<MathObj, Error> {
        if self.eat(AlgToken::Sub) {
            let operand = self.unary()?;
            return Ok(MathObj::Product(vec![MathObj::integer(-1), operand]));
        }
        if self.eat(AlgToken::Add) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<MathObj, Error> {
        let base = self.atom()?;
        if self.eat(AlgToken::Caret) {
            // right-associative
            let exp = self.unary()?;
            return Ok(MathObj::power(base, exp));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<MathObj, Error> {
        let Some(token) = self.tokens.get(self.cursor).cloned() else {
            return Err(self.error("expected an expression"));
        };
        self.cursor += 1;

        match token.kind {
            AlgToken::Int => Ok(MathObj::Int(int_from_str(&token.lexeme))),
            AlgToken::Float => {
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    Error::new(
                        token.span.clone(),
                        1,
                        ErrKind::Syntax,
                        format!("malformed number '{}' in algebra string", token.lexeme),
                    )
                })?;
                Ok(MathObj::Float(value))
            }
            AlgToken::Name => {
                if self.eat(AlgToken::OpenParen) {
                    let mut args = Vec::new();
                    if self.peek() != Some(AlgToken::CloseParen) {
                        loop {
                            args.push(self.relation()?);
                            if !self.eat(AlgToken::Comma) {
                                break;
                            }
                        }
                    }
                    if !self.eat(AlgToken::CloseParen) {
                        return Err(self.error("expected ')' after the arguments"));
                    }
                    return Ok(MathObj::Func(token.lexeme, args));
                }
                match token.lexeme.as_str() {
                    "true" => Ok(MathObj::Bool(true)),
                    "false" => Ok(MathObj::Bool(false)),
                    _ => Ok(MathObj::Sym(token.lexeme)),
                }
            }
            AlgToken::OpenParen => {
                let inner = self.relation()?;
                if !self.eat(AlgToken::CloseParen) {
                    return Err(self.error("expected ')' to close the group"));
                }
                Ok(inner)
            }
            AlgToken::OpenBracket => {
                let mut elements = Vec::new();
                if self.peek() != Some(AlgToken::CloseBracket) {
                    loop {
                        elements.push(self.relation()?);
                        if !self.eat(AlgToken::Comma) {
                            break;
                        }
                    }
                }
                if !self.eat(AlgToken::CloseBracket) {
                    return Err(self.error("expected ']' to close the list"));
                }
                Ok(MathObj::List(elements))
            }
            _ => Err(Error::new(
                token.span.clone(),
                1,
                ErrKind::Syntax,
                format!("expected an expression, found '{}'", token.lexeme),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn sym(s: &str) -> MathObj {
        MathObj::sym(s)
    }

    #[test]
    fn precedence_and_shapes() {
        assert_eq!(
            parse_algebra("x^2 + 1").unwrap(),
            MathObj::Sum(vec![
                MathObj::power(sym("x"), MathObj::integer(2)),
                MathObj::integer(1),
            ])
        );
    }

    #[test]
    fn sums_and_products_stay_flat() {
        assert_eq!(
            parse_algebra("a + b + c").unwrap(),
            MathObj::Sum(vec![sym("a"), sym("b"), sym("c")])
        );
        assert_eq!(
            parse_algebra("a*b*c").unwrap(),
            MathObj::Product(vec![sym("a"), sym("b"), sym("c")])
        );
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(
            parse_algebra("2x").unwrap(),
            MathObj::Product(vec![MathObj::integer(2), sym("x")])
        );
    }

    #[test]
    fn function_calls() {
        assert_eq!(
            parse_algebra("sin(x)").unwrap(),
            MathObj::Func("sin".to_string(), vec![sym("x")])
        );
    }

    #[test]
    fn subtraction_builds_differences() {
        assert_eq!(
            parse_algebra("x - y").unwrap(),
            MathObj::Difference(Box::new(sym("x")), Box::new(sym("y")))
        );
    }

    #[test]
    fn relations() {
        let MathObj::Relation(rel) = parse_algebra("x < 1").unwrap() else {
            panic!("expected a relation");
        };
        assert_eq!(rel.op, RelOp::Less);
    }

    #[test]
    fn parse_errors_are_syntax_errors() {
        let err = parse_algebra("x +").unwrap_err();
        assert_eq!(err.kind, ErrKind::Syntax);
        assert!(parse_algebra("(x").is_err());
    }
}
