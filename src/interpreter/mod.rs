//! The minic language: parser, static checks, and tree-walking evaluator.

pub mod ast;
pub mod env;
pub mod errors;
pub mod eval;
pub mod parser;
pub mod stdlib;
pub mod validate;
pub mod values;

#[cfg(test)]
pub mod tests;

pub use errors::{RuntimeError, RuntimeResult};
pub use eval::{run_program, RunOptions};
pub use parser::{parse_program, ParseError};
pub use values::Value;
