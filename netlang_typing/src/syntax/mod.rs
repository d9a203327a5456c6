//! Everything the checker consumes from the parser: positions, the source files and the AST.

pub mod ast;
pub mod pos;
pub mod source;
