//! Tree evaluation for tinsh.
//!
//! The evaluator walks a parsed tree against a [`Session`], dispatching
//! commands to the [`ToolRegistry`] and re-entering itself for command
//! substitution and alias fallback. It holds no state of its own; everything
//! mutable lives in the session passed to each call.

use std::future::Future;
use std::pin::Pin;

use tracing::Instrument;

use crate::ast::{
    AssignmentWord, Ast, Command, LogicalExpression, LogicalOp, Node, Pipeline, Subshell, Suffix,
};
use crate::error::{ShellError, ShellResult};
use crate::parser::ScriptParser;
use crate::tools::ToolRegistry;

use super::control::strip_control_sequences;
use super::expand::SessionResolvers;
use super::result::ReturnCode;
use super::session::Session;

type EvalFuture<'s> = Pin<Box<dyn Future<Output = ShellResult<String>> + Send + 's>>;

/// Tree evaluator.
///
/// Borrows the command registry and the parser used for alias fallback.
pub struct Evaluator<'a> {
    tools: &'a ToolRegistry,
    parser: &'a dyn ScriptParser,
}

impl<'a> Evaluator<'a> {
    /// Create a new evaluator over the given registry and parser.
    pub fn new(tools: &'a ToolRegistry, parser: &'a dyn ScriptParser) -> Self {
        Self { tools, parser }
    }

    /// Evaluate a tree and return its concatenated output.
    ///
    /// A script's top-level nodes run strictly in order. A command-substitution
    /// root is unwrapped once and evaluated in place. Any other root is a
    /// protocol violation.
    pub fn run<'s>(&'s self, ast: &'s Ast, session: &'s mut Session) -> EvalFuture<'s> {
        Box::pin(async move {
            match ast {
                Ast::Script(script) => {
                    let mut out = String::new();
                    for node in &script.commands {
                        out.push_str(&self.walk(node, session).await?);
                    }
                    Ok(out)
                }
                Ast::CommandSubstitution(inner) => self.run(inner, session).await,
                Ast::Unrecognized { kind } => Err(ShellError::ProtocolViolation(kind.clone())),
            }
        })
    }

    /// Evaluate a single node.
    pub fn walk<'s>(&'s self, node: &'s Node, session: &'s mut Session) -> EvalFuture<'s> {
        let span = tracing::debug_span!("walk", node = %node.kind_name());
        Box::pin(
            async move {
                match node {
                    Node::Command(cmd) => self.dispatch_command(cmd, session).await,
                    Node::Subshell(subshell) => self.eval_subshell(subshell, session).await,
                    Node::Pipeline(pipeline) => self.eval_pipeline(pipeline, session).await,
                    Node::LogicalExpression(expr) => self.eval_logical(expr, session).await,
                    Node::Redirect(_) => {
                        Err(ShellError::UnsupportedFeature("redirection".to_string()))
                    }
                    Node::Unrecognized { kind } => {
                        Err(ShellError::UnsupportedFeature(kind.clone()))
                    }
                }
            }
            .instrument(span),
        )
    }

    /// Run each body node independently and join their raw output.
    async fn eval_subshell(&self, subshell: &Subshell, session: &mut Session) -> ShellResult<String> {
        let mut out = String::new();
        for node in &subshell.body {
            out.push_str(&self.walk(node, session).await?);
        }
        Ok(out)
    }

    /// Run stages in order, each one's output landing in the stage buffer.
    ///
    /// Intermediate output has control sequences stripped before the next
    /// stage runs; the last stage's output is returned untouched.
    #[tracing::instrument(level = "debug", skip(self, pipeline, session), fields(stages = pipeline.stages.len()))]
    async fn eval_pipeline(&self, pipeline: &Pipeline, session: &mut Session) -> ShellResult<String> {
        let last = pipeline.stages.len().saturating_sub(1);
        for (i, stage) in pipeline.stages.iter().enumerate() {
            let out = self.dispatch_command(stage, session).await?;
            if i < last {
                session.set_stage_buffer(strip_control_sequences(&out).into_owned());
            } else {
                session.set_stage_buffer(out);
            }
        }
        Ok(session.take_stage_buffer().unwrap_or_default())
    }

    /// `&&` / `||` with real short-circuiting: a skipped right side has no effects.
    ///
    /// Chains nest down the left side, so the spine is followed in a loop and
    /// the right sides are folded in source order.
    async fn eval_logical(
        &self,
        expr: &LogicalExpression,
        session: &mut Session,
    ) -> ShellResult<String> {
        let mut links = vec![(expr.op, expr.right.as_ref())];
        let mut head = expr.left.as_ref();
        while let Node::LogicalExpression(inner) = head {
            links.push((inner.op, inner.right.as_ref()));
            head = inner.left.as_ref();
        }

        let mut out = self.walk(head, session).await?;
        for (op, right) in links.into_iter().rev() {
            let ok = session.return_code().is_success();
            let run_right = match op {
                LogicalOp::And => ok,
                LogicalOp::Or => !ok,
            };
            if run_right {
                session.set_return_code(ReturnCode::Success);
                out.push_str(&self.walk(right, session).await?);
            }
        }
        Ok(out)
    }

    /// Dispatch one command: assignments, registered tools, then aliases.
    async fn dispatch_command(&self, cmd: &Command, session: &mut Session) -> ShellResult<String> {
        if cmd.background {
            session.set_return_code(ReturnCode::Failure);
            return Err(ShellError::UnsupportedFeature("background execution".to_string()));
        }

        self.assign_prefixes(&cmd.prefix, session).await?;

        let Some(name_word) = &cmd.name else {
            return Ok(String::new());
        };
        let name = self.expand(name_word, session).await?;
        let name = name.trim();

        if let Some(tool) = self.tools.get(name) {
            let args = self.expand_suffix(&cmd.suffix, session).await?;
            session.set_return_code(ReturnCode::Success);
            tracing::debug!(command = %name, argc = args.len(), "dispatch");
            let result = tool.execute(args, session).await;
            session.set_return_code(ReturnCode::from_exit(result.code));
            session.clear_stage_buffer();
            return Ok(result.out);
        }

        self.alias_fallback(name, &cmd.suffix, session).await
    }

    /// Apply `NAME=value` prefixes in order.
    ///
    /// A prefix without `=` fails on its own (return code 1) and the remaining
    /// prefixes are still applied.
    async fn assign_prefixes(
        &self,
        prefix: &[AssignmentWord],
        session: &mut Session,
    ) -> ShellResult<()> {
        for assignment in prefix {
            let Some((key, value)) = assignment.split() else {
                let err = ShellError::InvalidAssignment(assignment.word.literal_text());
                tracing::warn!("{err}");
                session.set_return_code(ReturnCode::Failure);
                continue;
            };
            let value = self.expand(&value, session).await?;
            session.set_var(key, value);
        }
        Ok(())
    }

    /// Resolve an unregistered name through the alias table.
    ///
    /// Faults while expanding the caller's own arguments propagate. Any
    /// failure while re-parsing or running the alias target, fatal or not,
    /// is reported as `command not found` for the original name.
    async fn alias_fallback(
        &self,
        name: &str,
        suffix: &[Suffix],
        session: &mut Session,
    ) -> ShellResult<String> {
        let Some(replacement) = session.alias(name).map(str::to_string) else {
            return Ok(command_not_found(name, session));
        };
        if !session.enter_alias(name) {
            return Ok(command_not_found(name, session));
        }

        let args = match self.expand_suffix(suffix, session).await {
            Ok(args) => args,
            Err(err) => {
                session.leave_alias(name);
                return Err(err);
            }
        };
        let mut source = replacement;
        for arg in &args {
            source.push(' ');
            source.push_str(&single_quote(arg));
        }

        let outcome = self.eval_alias(&source, session).await;
        session.leave_alias(name);

        match outcome {
            Ok(out) => Ok(out),
            Err(err) => {
                tracing::debug!(
                    alias = %name,
                    error = %err,
                    fatal = err.is_fatal(),
                    "alias target failed"
                );
                Ok(command_not_found(name, session))
            }
        }
    }

    async fn eval_alias(&self, source: &str, session: &mut Session) -> ShellResult<String> {
        tracing::debug!(source = %source, "alias fallback");

        let ast = {
            let resolvers = SessionResolvers::new(session);
            self.parser.parse(source, &resolvers)?
        };
        self.run(&ast, session).await
    }
}

fn command_not_found(name: &str, session: &mut Session) -> String {
    session.set_return_code(ReturnCode::Failure);
    ShellError::CommandNotFound(name.to_string()).message()
}

/// Quote an already-expanded argument so re-parsing yields it verbatim.
fn single_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}
