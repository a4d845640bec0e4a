//! env — Print the environment.
//!
//! ```text
//! env           # every variable, NAME=value, sorted by name
//! env HOME      # just the value of HOME
//! ```

use async_trait::async_trait;

use crate::interpreter::{ExecResult, Session};
use crate::tools::Tool;

/// Env tool: lists variables or prints one.
pub struct Env;

#[async_trait]
impl Tool for Env {
    fn name(&self) -> &str {
        "env"
    }

    async fn execute(&self, args: Vec<String>, session: &mut Session) -> ExecResult {
        if args.is_empty() {
            let out: String = session
                .vars()
                .into_iter()
                .map(|(name, value)| format!("{name}={value}\n"))
                .collect();
            return ExecResult::success(out);
        }

        let mut out = String::new();
        for name in &args {
            match session.get_var(name) {
                Some(value) => {
                    out.push_str(value);
                    out.push('\n');
                }
                None => return ExecResult::failure(1, format!("env: {name}: not set")),
            }
        }
        ExecResult::success(out)
    }
}
