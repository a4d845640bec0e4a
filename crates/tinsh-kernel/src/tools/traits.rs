//! Core tool trait.

use async_trait::async_trait;

use crate::interpreter::{ExecResult, Session};

/// A command handler.
///
/// Handlers receive their arguments already expanded, in source order. They
/// may read and change the session (environment, stage buffer); the evaluator
/// does not inspect those changes. The exit code in the returned
/// [`ExecResult`] becomes the session's return code (0 or 1).
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's name (used for lookup).
    fn name(&self) -> &str;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: Vec<String>, session: &mut Session) -> ExecResult;
}
