//! Abstract syntax tree for tinsh.
//!
//! Trees are produced by a [`ScriptParser`](crate::parser::ScriptParser) and
//! treated as immutable by the evaluator. Every node and expansion kind is a
//! closed enum with an `Unrecognized` variant that carries the parser's
//! original tag, so unknown shapes are reported instead of silently skipped.

mod types;

pub use types::*;
