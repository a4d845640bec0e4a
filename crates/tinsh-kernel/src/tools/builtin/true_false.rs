//! true/false — Fixed exit status builtins.
//!
//! The status drives `&&`/`||` short-circuiting and `$?`.

use async_trait::async_trait;

use crate::interpreter::{ExecResult, Session};
use crate::tools::Tool;

/// Always succeeds.
pub struct True;

#[async_trait]
impl Tool for True {
    fn name(&self) -> &str {
        "true"
    }

    async fn execute(&self, _args: Vec<String>, _session: &mut Session) -> ExecResult {
        ExecResult::success("")
    }
}

/// Always fails with exit code 1 and no output.
pub struct False;

#[async_trait]
impl Tool for False {
    fn name(&self) -> &str {
        "false"
    }

    async fn execute(&self, _args: Vec<String>, _session: &mut Session) -> ExecResult {
        ExecResult::failure(1, "")
    }
}
