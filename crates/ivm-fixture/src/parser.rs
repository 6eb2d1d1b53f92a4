//! Recursive-descent parser for fixture snippets.
//!
//! A snippet is a single expression, optionally followed by `;`.

use std::ops::Range;

use logos::Logos;
use tracing::trace;

use crate::error::{FixtureError, FixtureResult};
use crate::lexer::Token;

/// Parsed expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    String(String),
    Boolean(bool),
    Undefined,
    Null,
    This,
    Ident(String),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    RegExp { source: String, flags: String },
    New { constructor: String, args: Vec<Expr> },
    Function(FunctionLiteral),
    Member { object: Box<Expr>, property: String },
    Add(Box<Expr>, Box<Expr>),
    /// `%Name(args)`
    Runtime { name: String, args: Vec<Expr> },
}

/// `function name(params) { return body; }`; a missing body returns `undefined`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Option<Box<Expr>>,
}

/// Parse a complete snippet.
pub fn parse(source: &str) -> FixtureResult<Expr> {
    let mut tokens = Vec::new();
    for (token, span) in Token::lexer(source).spanned() {
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(FixtureError::Lex { span }),
        }
    }
    trace!(count = tokens.len(), "lexed snippet");

    let mut parser = Parser {
        tokens,
        pos: 0,
        end: source.len(),
    };
    let expr = parser.expression()?;
    parser.eat(&Token::Semicolon);
    if let Some((token, span)) = parser.tokens.get(parser.pos) {
        return Err(FixtureError::Parse {
            offset: span.start,
            message: format!("unexpected trailing {:?}", token),
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.end, |(_, span)| span.start)
    }

    fn next(&mut self) -> FixtureResult<Token> {
        let token = self
            .tokens
            .get(self.pos)
            .map(|(token, _)| token.clone())
            .ok_or_else(|| self.error("unexpected end of input"))?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> FixtureResult<()> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {:?}", expected)))
        }
    }

    fn ident(&mut self) -> FixtureResult<String> {
        match self.next()? {
            Token::Ident(name) => Ok(name),
            other => {
                self.pos -= 1;
                Err(self.error(&format!("expected identifier, found {:?}", other)))
            }
        }
    }

    fn error(&self, message: &str) -> FixtureError {
        FixtureError::Parse {
            offset: self.offset(),
            message: message.to_string(),
        }
    }

    fn expression(&mut self) -> FixtureResult<Expr> {
        let mut lhs = self.postfix()?;
        while self.eat(&Token::Plus) {
            let rhs = self.postfix()?;
            lhs = Expr::Add(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn postfix(&mut self) -> FixtureResult<Expr> {
        let mut expr = self.primary()?;
        while self.eat(&Token::Dot) {
            let property = self.ident()?;
            expr = Expr::Member {
                object: Box::new(expr),
                property,
            };
        }
        Ok(expr)
    }

    fn primary(&mut self) -> FixtureResult<Expr> {
        let start = self.pos;
        let expr = match self.next()? {
            Token::Number(n) => Expr::Number(n),
            Token::Minus => match self.next()? {
                Token::Number(n) => Expr::Number(-n),
                _ => {
                    self.pos = start;
                    return Err(FixtureError::Unsupported("unary minus on non-literal".into()));
                }
            },
            Token::String(s) => Expr::String(s),
            Token::True => Expr::Boolean(true),
            Token::False => Expr::Boolean(false),
            Token::Undefined => Expr::Undefined,
            Token::Null => Expr::Null,
            Token::This => Expr::This,
            Token::Ident(name) => Expr::Ident(name),
            Token::RegExp((source, flags)) => Expr::RegExp { source, flags },
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(Token::RParen)?;
                inner
            }
            Token::LBracket => Expr::Array(self.list(Token::RBracket)?),
            Token::LBrace => self.object()?,
            Token::Function => Expr::Function(self.function()?),
            Token::New => {
                let constructor = self.ident()?;
                let args = if self.eat(&Token::LParen) {
                    self.list(Token::RParen)?
                } else {
                    Vec::new()
                };
                Expr::New { constructor, args }
            }
            Token::Percent => {
                let name = self.ident()?;
                self.expect(Token::LParen)?;
                let args = self.list(Token::RParen)?;
                Expr::Runtime { name, args }
            }
            other => {
                self.pos = start;
                return Err(self.error(&format!("unexpected {:?}", other)));
            }
        };
        Ok(expr)
    }

    /// Comma-separated expressions up to `close`; the opener is consumed.
    fn list(&mut self, close: Token) -> FixtureResult<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.eat(&close) {
            items.push(self.expression()?);
            if !self.eat(&Token::Comma) {
                self.expect(close)?;
                break;
            }
        }
        Ok(items)
    }

    fn object(&mut self) -> FixtureResult<Expr> {
        let mut properties = Vec::new();
        while !self.eat(&Token::RBrace) {
            let key = match self.next()? {
                Token::Ident(name) | Token::String(name) => name,
                other => {
                    self.pos -= 1;
                    return Err(self.error(&format!("expected property key, found {:?}", other)));
                }
            };
            self.expect(Token::Colon)?;
            properties.push((key, self.expression()?));
            if !self.eat(&Token::Comma) {
                self.expect(Token::RBrace)?;
                break;
            }
        }
        Ok(Expr::Object(properties))
    }

    fn function(&mut self) -> FixtureResult<FunctionLiteral> {
        let name = match self.peek() {
            Some(Token::Ident(_)) => Some(self.ident()?),
            _ => None,
        };

        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        while !self.eat(&Token::RParen) {
            params.push(self.ident()?);
            if !self.eat(&Token::Comma) {
                self.expect(Token::RParen)?;
                break;
            }
        }

        self.expect(Token::LBrace)?;
        let body = if self.eat(&Token::Return) {
            let body = self.expression()?;
            self.eat(&Token::Semicolon);
            Some(Box::new(body))
        } else {
            None
        };
        self.expect(Token::RBrace)?;

        Ok(FunctionLiteral { name, params, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_literal() {
        assert_eq!(
            parse("({ x: 20, 'y': [1] })").expect("parse failed"),
            Expr::Object(vec![
                ("x".into(), Expr::Number(20.0)),
                ("y".into(), Expr::Array(vec![Expr::Number(1.0)])),
            ])
        );
    }

    #[test]
    fn parses_function_with_sum() {
        let expr = parse("(function(a, b, c) { return a + b + c; })").expect("parse failed");
        let Expr::Function(literal) = expr else {
            panic!("expected function");
        };
        assert_eq!(literal.params, vec!["a", "b", "c"]);
        assert_eq!(
            literal.body.as_deref(),
            Some(&Expr::Add(
                Box::new(Expr::Add(
                    Box::new(Expr::Ident("a".into())),
                    Box::new(Expr::Ident("b".into()))
                )),
                Box::new(Expr::Ident("c".into()))
            ))
        );
    }

    #[test]
    fn parses_member_on_this() {
        let expr = parse("function get() { return this.x }").expect("parse failed");
        let Expr::Function(literal) = expr else {
            panic!("expected function");
        };
        assert_eq!(literal.name.as_deref(), Some("get"));
        assert_eq!(
            literal.body.as_deref(),
            Some(&Expr::Member {
                object: Box::new(Expr::This),
                property: "x".into()
            })
        );
    }

    #[test]
    fn empty_function_body() {
        let expr = parse("(function() {})").expect("parse failed");
        assert!(matches!(expr, Expr::Function(FunctionLiteral { body: None, .. })));
    }

    #[test]
    fn new_without_arguments() {
        assert_eq!(
            parse("new Date").expect("parse failed"),
            Expr::New {
                constructor: "Date".into(),
                args: vec![]
            }
        );
    }

    #[test]
    fn trailing_tokens_are_an_error() {
        assert!(matches!(parse("1 2"), Err(FixtureError::Parse { offset: 2, .. })));
        assert!(matches!(parse("[1,"), Err(FixtureError::Parse { offset: 3, .. })));
        assert!(matches!(parse("#"), Err(FixtureError::Lex { .. })));
    }
}
