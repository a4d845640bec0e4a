//! tinsh-kernel: the evaluation core of a miniature shell.
//!
//! This crate provides:
//!
//! - **Lexer**: Tokenizes shell source using logos
//! - **Parser**: Recursive descent parser producing the AST, plus the
//!   [`ScriptParser`](parser::ScriptParser) port
//! - **AST**: Scripts, commands, pipelines, subshells, logical expressions
//!   and words with expansion units
//! - **Interpreter**: Session state, word expansion and the tree evaluator
//! - **Tools**: Tool trait, registry, and builtin commands
//! - **Kernel**: Owns a session and evaluates source text against it

pub mod ast;
pub mod error;
pub mod interpreter;
pub mod kernel;
pub mod lexer;
pub mod parser;
pub mod tools;

pub use error::{ErrorReport, ShellError, ShellResult};
pub use kernel::{Kernel, KernelConfig};
