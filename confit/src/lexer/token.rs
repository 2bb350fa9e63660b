//! Lexer token types

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// POSITIONS
// ============================================================================

/// Source location of a token or node.
///
/// Lines and columns are 1-based; columns count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub name: String,
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub fn new(name: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            name: name.into(),
            line,
            column,
        }
    }
}

impl Default for Pos {
    fn default() -> Self {
        Self {
            name: String::new(),
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.line, self.column)
    }
}

// ============================================================================
// TOKENS
// ============================================================================

/// Literal sub-types. The raw text is kept until decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LitKind {
    String,
    Int,
    Float,
    Bool,
    Duration,
    Size,
}

impl LitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LitKind::String => "string",
            LitKind::Int => "int",
            LitKind::Float => "float",
            LitKind::Bool => "bool",
            LitKind::Duration => "duration",
            LitKind::Size => "size",
        }
    }
}

impl fmt::Display for LitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token kinds for the configuration language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Name,
    Literal(LitKind),
    /// Statement terminator: `;` or a significant newline.
    Semi,
    Comma,
    LBrace,
    RBrace,
    LBrack,
    RBrack,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Eof => "eof",
            TokenKind::Name => "name",
            TokenKind::Literal(_) => "literal",
            TokenKind::Semi => "newline",
            TokenKind::Comma => "comma",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBrack => "[",
            TokenKind::RBrack => "]",
        };
        f.write_str(s)
    }
}

/// A token with its kind, literal text and source location.
///
/// `text` holds the identifier for names and the raw literal for literals
/// (string literals without their surrounding quotes). It is empty for
/// punctuation.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, pos: Pos) -> Self {
        Self {
            kind,
            text: text.into(),
            pos,
        }
    }

    pub fn lit_kind(&self) -> Option<LitKind> {
        match self.kind {
            TokenKind::Literal(kind) => Some(kind),
            _ => None,
        }
    }
}
