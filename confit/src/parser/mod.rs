//! Parser module for the confit configuration language

pub mod ast;
pub mod include;
pub mod parser;

pub use ast::*;
pub use include::IncludeRegistry;
pub use parser::*;
