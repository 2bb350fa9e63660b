//! Abstract Syntax Tree types

use crate::lexer::{LitKind, Pos};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// NODE TRAIT
// ============================================================================

/// Behaviour shared by every AST node.
pub trait Node {
    fn pos(&self) -> &Pos;
}

// ============================================================================
// AST TYPES
// ============================================================================

/// An identifier: a parameter name or a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Name {
    pub pos: Pos,
    pub value: String,
}

/// A literal with its raw text. Conversion happens at decode time, when the
/// target type is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub pos: Pos,
    pub value: String,
    pub kind: LitKind,
}

/// `name [label] operand`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub pos: Pos,
    pub name: Name,
    pub label: Option<Name>,
    pub value: Operand,
}

/// `{ param; param; ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub pos: Pos,
    pub params: Vec<Parameter>,
}

/// `[ operand, operand, ... ]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Array {
    pub pos: Pos,
    pub items: Vec<Operand>,
}

/// Value of a parameter or item of an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Literal(Literal),
    Block(Block),
    Array(Array),
}

impl Name {
    pub fn new(value: impl Into<String>, pos: Pos) -> Self {
        Self {
            pos,
            value: value.into(),
        }
    }

    /// Whether this name is one of the boolean keywords.
    pub fn is_bool(&self) -> bool {
        self.value == "true" || self.value == "false"
    }
}

impl Literal {
    pub fn new(value: impl Into<String>, kind: LitKind, pos: Pos) -> Self {
        Self {
            pos,
            value: value.into(),
            kind,
        }
    }
}

impl Operand {
    /// Short description of the operand shape.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operand::Literal(lit) => lit.kind.as_str(),
            Operand::Block(_) => "block",
            Operand::Array(_) => "array",
        }
    }
}

macro_rules! impl_node {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Node for $ty {
                fn pos(&self) -> &Pos {
                    &self.pos
                }
            }
        )*
    };
}

impl_node!(Name, Literal, Parameter, Block, Array);

impl Node for Operand {
    fn pos(&self) -> &Pos {
        match self {
            Operand::Literal(n) => &n.pos,
            Operand::Block(n) => &n.pos,
            Operand::Array(n) => &n.pos,
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_positions() {
        let pos = Pos::new("server.conf", 3, 9);
        let lit = Literal::new("10", LitKind::Int, pos.clone());
        assert_eq!(lit.pos(), &pos);

        let operand = Operand::Literal(lit);
        assert_eq!(operand.pos().line, 3);
        assert_eq!(operand.kind_name(), "int");

        let block = Operand::Block(Block {
            pos: Pos::new("server.conf", 4, 7),
            params: Vec::new(),
        });
        assert_eq!(block.pos().column, 7);
        assert_eq!(block.kind_name(), "block");
    }
}
