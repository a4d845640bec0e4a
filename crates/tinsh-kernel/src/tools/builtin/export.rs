//! export — Set environment variables.
//!
//! ```text
//! export MY_VAR=value      # set MY_VAR
//! export A=1 B=2           # several at once
//! export                   # print every variable
//! ```
//!
//! Every variable is visible to every command, so there is no separate
//! "exported" flag; `export` is assignment spelled as a command.

use async_trait::async_trait;

use crate::interpreter::{ExecResult, Session};
use crate::tools::Tool;

pub struct Export;

#[async_trait]
impl Tool for Export {
    fn name(&self) -> &str {
        "export"
    }

    async fn execute(&self, args: Vec<String>, session: &mut Session) -> ExecResult {
        if args.is_empty() {
            let out: String = session
                .vars()
                .into_iter()
                .map(|(name, value)| format!("export {name}={value}\n"))
                .collect();
            return ExecResult::success(out);
        }

        for arg in &args {
            let Some((name, value)) = arg.split_once('=') else {
                return ExecResult::failure(1, format!("export: {arg}: missing value"));
            };
            if !is_valid_name(name) {
                return ExecResult::failure(1, format!("export: `{name}': not a valid identifier"));
            }
            session.set_var(name, value);
        }
        ExecResult::success("")
    }
}

/// Shell identifier: letter or underscore, then letters, digits, underscores.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
