//! minic: a small C-like scripting language with thread-backed coroutines.
//!
//! The interpreter walks the AST directly. Coroutines (`co_await` /
//! `suspend` / `resume`) each run on a dedicated carrier thread, with a
//! strict ping-pong handoff so only one thread executes script code at a
//! time.

pub mod cli;
pub mod config;
pub mod coroutine;
pub mod interpreter;

pub use coroutine::{CoroHandle, CoroState, Registry};
pub use interpreter::{parse_program, run_program, ParseError, RunOptions, RuntimeError, Value};
