//! Lexer module for the confit configuration language

pub mod scanner;
pub mod token;

pub use scanner::*;
pub use token::*;
