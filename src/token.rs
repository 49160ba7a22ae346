//! Token definitions for Quill source text
//!
//! Quill programs are S-expressions, so the token set is tiny: list
//! delimiters, string literals and atoms.

use std::fmt;

/// Location in source code for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self { start, end, line, column }
    }
}

/// Token types in Quill
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]

    /// Double-quoted string literal, quotes stripped
    String(String),

    /// Any other run of non-delimiter characters: keywords, names,
    /// numbers, operators
    Atom(String),

    Eof,
}

impl TokenKind {
    /// The closing delimiter that matches an opening one
    pub fn closer(&self) -> Option<TokenKind> {
        match self {
            TokenKind::LeftParen => Some(TokenKind::RightParen),
            TokenKind::LeftBracket => Some(TokenKind::RightBracket),
            _ => None,
        }
    }

    pub fn is_closer(&self) -> bool {
        matches!(self, TokenKind::RightParen | TokenKind::RightBracket)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::LeftBracket => write!(f, "["),
            TokenKind::RightBracket => write!(f, "]"),
            TokenKind::String(s) => write!(f, "\"{}\"", s),
            TokenKind::Atom(s) => write!(f, "{}", s),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

/// A token with its kind and location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Reserved words that open a form or name a built-in value
pub const KEYWORDS: &[&str] = &[
    "class", "field", "method", "begin", "print", "inputi", "inputs", "call", "if",
    "while", "return", "set", "new", "true", "false", "null", "me",
];

/// Check whether an atom is a reserved word
pub fn is_keyword(atom: &str) -> bool {
    KEYWORDS.contains(&atom)
}
