//! Tool system for tinsh.
//!
//! Every command name the evaluator can dispatch maps to a [`Tool`] in the
//! [`ToolRegistry`]. Names that are not registered fall back to the alias
//! table.
//!
//! # Architecture
//!
//! ```text
//! ToolRegistry
//! ├── Builtins (echo, true, false, cat, env, export, unset, alias)
//! └── Embedder tools (registered at kernel construction)
//! ```

mod builtin;
mod registry;
mod traits;

pub use builtin::register_builtins;
pub use registry::ToolRegistry;
pub use traits::Tool;
