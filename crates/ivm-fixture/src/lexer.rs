//! Tokenizer for fixture snippets.
//!
//! Covers the literal and function syntax used to build test values:
//! `({ x: 20 })`, `([1])`, `/x/`, `new Date()`, `(function(a, b) { return a + b; })`.

use logos::Logos;

/// Snippet token
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[token("function")]
    Function,
    #[token("return")]
    Return,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("undefined")]
    Undefined,
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    /// Prefix of a runtime call, `%IsArray(x)`
    #[token("%")]
    Percent,

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r"'[^'\n]*'", unquote)]
    #[regex(r#""[^"\n]*""#, unquote)]
    String(String),

    /// `/source/flags`
    #[regex(r"/[^/\n]+/[a-z]*", regexp)]
    RegExp((String, String)),

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),
}

fn unquote(lex: &mut logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    slice[1..slice.len() - 1].to_string()
}

fn regexp(lex: &mut logos::Lexer<Token>) -> Option<(String, String)> {
    let slice = lex.slice();
    let close = slice.rfind('/')?;
    Some((slice[1..close].to_string(), slice[close + 1..].to_string()))
}
