//! unset — Remove variables.

use async_trait::async_trait;

use crate::interpreter::{ExecResult, Session};
use crate::tools::Tool;

/// Unset tool: removing a name that is not set is not an error.
pub struct Unset;

#[async_trait]
impl Tool for Unset {
    fn name(&self) -> &str {
        "unset"
    }

    async fn execute(&self, args: Vec<String>, session: &mut Session) -> ExecResult {
        for name in &args {
            if session.remove_var(name).is_some() {
                tracing::trace!(name = %name, "unset");
            }
        }
        ExecResult::success("")
    }
}
