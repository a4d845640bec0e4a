//! cat — Emit the previous pipeline stage's output.
//!
//! There is no filesystem, so `cat` only reads the stage buffer.

use async_trait::async_trait;

use crate::interpreter::{ExecResult, Session};
use crate::tools::Tool;

pub struct Cat;

#[async_trait]
impl Tool for Cat {
    fn name(&self) -> &str {
        "cat"
    }

    async fn execute(&self, args: Vec<String>, session: &mut Session) -> ExecResult {
        if let Some(path) = args.first() {
            return ExecResult::failure(1, format!("cat: {path}: no such file"));
        }
        ExecResult::success(session.stage_buffer().unwrap_or_default())
    }
}
