//! The Kernel — evaluates shell source against one session.
//!
//! The kernel owns the session, the tool registry and the parser. Every entry
//! point locks the session for the whole evaluation, so concurrent calls on one
//! kernel run one after another and never interleave.
//!
//! # Example
//!
//! ```
//! use tinsh_kernel::{Kernel, KernelConfig};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let kernel = Kernel::new(KernelConfig::default().with_alias("hi", "echo hello"));
//! assert_eq!(kernel.execute_bash("hi; false; echo $?").await.unwrap(), "hello\n1\n");
//! # });
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::ast::Ast;
use crate::error::{ErrorReport, ShellError, ShellResult};
use crate::interpreter::{Evaluator, ReturnCode, Session, SessionResolvers};
use crate::parser::{ScriptParser, ShellParser};
use crate::tools::{register_builtins, ToolRegistry};

/// Configuration for initializing a kernel.
///
/// Can be built in code or loaded from TOML:
///
/// ```toml
/// name = "work"
/// builtins = true
///
/// [env]
/// HOME = "/home/me"
///
/// [aliases]
/// ll = "ls -l"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Name of this kernel (for identification).
    pub name: String,

    /// Initial environment.
    pub env: HashMap<String, String>,

    /// Alias table. Fixed for the kernel's lifetime.
    pub aliases: HashMap<String, String>,

    /// Register the builtin tools (`echo`, `cat`, `env`, ...).
    pub builtins: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            env: HashMap::new(),
            aliases: HashMap::new(),
            builtins: true,
        }
    }
}

impl KernelConfig {
    /// Create a kernel config with the given name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Add an initial environment variable.
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Add an alias.
    pub fn with_alias(mut self, name: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.aliases.insert(name.into(), replacement.into());
        self
    }

    /// Enable or disable the builtin tools.
    pub fn with_builtins(mut self, builtins: bool) -> Self {
        self.builtins = builtins;
        self
    }

    /// Parse a TOML config. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing kernel config")
    }

    /// Load a TOML config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("config: {}", path.display()))
    }

    fn session(&self) -> Session {
        Session::with_state(self.env.clone(), self.aliases.clone())
    }
}

/// The Kernel — evaluates shell source.
pub struct Kernel {
    name: String,
    session: Mutex<Session>,
    tools: Arc<ToolRegistry>,
    parser: Arc<dyn ScriptParser>,
    config: KernelConfig,
}

impl Kernel {
    /// Create a kernel using the reference [`ShellParser`].
    pub fn new(config: KernelConfig) -> Self {
        Self::with_parser(config, Arc::new(ShellParser::new()))
    }

    /// Create a kernel with a custom parser.
    pub fn with_parser(config: KernelConfig, parser: Arc<dyn ScriptParser>) -> Self {
        Self::with_tools(config, parser, |_| {})
    }

    /// Create a kernel, registering extra tools after the builtins.
    ///
    /// A tool registered here under a builtin's name replaces the builtin.
    pub fn with_tools(
        config: KernelConfig,
        parser: Arc<dyn ScriptParser>,
        configure: impl FnOnce(&mut ToolRegistry),
    ) -> Self {
        let mut tools = ToolRegistry::new();
        if config.builtins {
            register_builtins(&mut tools);
        }
        configure(&mut tools);
        tracing::debug!(name = %config.name, tools = tools.len(), "kernel created");

        Self {
            name: config.name.clone(),
            session: Mutex::new(config.session()),
            tools: Arc::new(tools),
            parser,
            config,
        }
    }

    /// Get the kernel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parse and evaluate source text.
    ///
    /// Never fails outward with anything but an [`ErrorReport`]: a parse
    /// failure reports `invalid/unsupported syntax`, any other fatal fault its
    /// own message. Output produced before a fault is discarded. Every fault
    /// leaves the return code at 1.
    #[tracing::instrument(level = "info", skip(self, source), fields(input_len = source.len()))]
    pub async fn execute_bash(&self, source: &str) -> std::result::Result<String, ErrorReport> {
        let mut session = self.session.lock().await;

        let parsed = {
            let resolvers = SessionResolvers::new(&session);
            self.parser.parse(source, &resolvers)
        };
        let result = match parsed {
            Ok(ast) => self.evaluator().run(&ast, &mut session).await,
            Err(err) => {
                tracing::debug!(error = %err, "parse failed");
                Err(ShellError::from(err))
            }
        };

        result.map_err(|err| fault(&mut session, &err))
    }

    /// Evaluate an already-parsed tree.
    ///
    /// Unlike [`execute_bash`](Self::execute_bash), faults come back as the
    /// underlying [`ShellError`]. The return code is still set to 1.
    pub async fn run(&self, ast: &Ast) -> ShellResult<String> {
        let mut session = self.session.lock().await;
        let result = self.evaluator().run(ast, &mut session).await;
        if let Err(err) = &result {
            fault(&mut session, err);
        }
        result
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.tools, self.parser.as_ref())
    }

    /// Get a variable value.
    pub async fn get_var(&self, name: &str) -> Option<String> {
        let session = self.session.lock().await;
        session.get_var(name).map(str::to_string)
    }

    /// Set a variable value.
    pub async fn set_var(&self, name: &str, value: impl Into<String>) {
        let mut session = self.session.lock().await;
        session.set_var(name, value);
    }

    /// The return code of the last evaluation.
    pub async fn return_code(&self) -> ReturnCode {
        self.session.lock().await.return_code()
    }

    /// Look up an alias replacement.
    pub async fn alias(&self, name: &str) -> Option<String> {
        let session = self.session.lock().await;
        session.alias(name).map(str::to_string)
    }

    /// Names of every registered tool, sorted.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.names()
    }

    /// Reset the session to the configured initial state.
    pub async fn reset(&self) {
        let mut session = self.session.lock().await;
        *session = self.config.session();
    }
}

/// Record a fatal fault on the session and turn it into a report.
fn fault(session: &mut Session, err: &ShellError) -> ErrorReport {
    tracing::warn!(error = %err, "evaluation aborted");
    session.set_return_code(ReturnCode::Failure);
    session.clear_stage_buffer();
    ErrorReport::from(err)
}
