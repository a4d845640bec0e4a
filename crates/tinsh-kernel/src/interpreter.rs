//! Interpreter module for tinsh.
//!
//! # Architecture
//!
//! The interpreter is built in layers:
//!
//! - **Session**: environment, alias table, `$?`, and the pipeline stage buffer
//! - **Expander**: resolves words (parameters, command substitution) to text
//! - **Evaluator**: walks the tree, sequencing commands, pipelines, subshells
//!   and `&&`/`||` chains, and falls back to aliases for unknown names
//!
//! # Example
//!
//! ```
//! use tinsh_kernel::ast::{Ast, Command, Node};
//! use tinsh_kernel::interpreter::{Evaluator, Session};
//! use tinsh_kernel::parser::ShellParser;
//! use tinsh_kernel::tools::{register_builtins, ToolRegistry};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut tools = ToolRegistry::new();
//! register_builtins(&mut tools);
//! let parser = ShellParser::new();
//! let mut session = Session::new();
//!
//! let ast = Ast::script(vec![Node::Command(Command::simple("echo", &["hi"]))]);
//! let out = Evaluator::new(&tools, &parser).run(&ast, &mut session).await.unwrap();
//! assert_eq!(out, "hi\n");
//! # });
//! ```

mod control;
mod eval;
mod expand;
mod result;
mod session;

pub use control::strip_control_sequences;
pub use eval::Evaluator;
pub use expand::{resolve_parameter, SessionResolvers};
pub use result::{ExecResult, ReturnCode};
pub use session::{AliasTable, Session};
