//! Embedding tests: custom tools, the stage buffer, concurrent callers.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tinsh_kernel::interpreter::{ExecResult, Session};
use tinsh_kernel::parser::ShellParser;
use tinsh_kernel::tools::{Tool, ToolRegistry};
use tinsh_kernel::{Kernel, KernelConfig};

/// Emits fixed text and records the stage buffer it observed.
struct Emit {
    name: &'static str,
    text: &'static str,
    seen: Arc<Mutex<Vec<Option<String>>>>,
}

#[async_trait]
impl Tool for Emit {
    fn name(&self) -> &str {
        self.name
    }

    async fn execute(&self, _args: Vec<String>, session: &mut Session) -> ExecResult {
        self.seen
            .lock()
            .unwrap()
            .push(session.stage_buffer().map(str::to_string));
        ExecResult::success(self.text)
    }
}

/// Upper-cases its arguments.
struct Shout;

#[async_trait]
impl Tool for Shout {
    fn name(&self) -> &str {
        "shout"
    }

    async fn execute(&self, args: Vec<String>, _session: &mut Session) -> ExecResult {
        ExecResult::success(format!("{}\n", args.join(" ").to_uppercase()))
    }
}

fn kernel_with(configure: impl FnOnce(&mut ToolRegistry)) -> Kernel {
    Kernel::with_tools(KernelConfig::default(), Arc::new(ShellParser::new()), configure)
}

#[tokio::test]
async fn pipeline_strips_control_sequences_between_stages() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let kernel = kernel_with(|tools| {
        tools.register(Emit {
            name: "red",
            text: "\x1b[31mred\x1b[0m",
            seen: seen.clone(),
        });
        tools.register(Emit {
            name: "plain",
            text: "plain",
            seen: seen.clone(),
        });
    });

    assert_eq!(kernel.execute_bash("red | plain").await.unwrap(), "plain");
    assert_eq!(*seen.lock().unwrap(), vec![None, Some("red".to_string())]);
}

#[tokio::test]
async fn last_stage_output_is_untouched() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let kernel = kernel_with(|tools| {
        tools.register(Emit {
            name: "red",
            text: "\x1b[31mred\x1b[0m",
            seen,
        });
    });
    assert_eq!(kernel.execute_bash("red").await.unwrap(), "\x1b[31mred\x1b[0m");
    assert_eq!(kernel.execute_bash("echo x | red").await.unwrap(), "\x1b[31mred\x1b[0m");
}

#[tokio::test]
async fn substitution_strips_control_sequences() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let kernel = kernel_with(|tools| {
        tools.register(Emit {
            name: "green",
            text: "\x1b[32mok\x1b[0m\n",
            seen,
        });
    });
    assert_eq!(kernel.execute_bash("echo [$(green)]").await.unwrap(), "[ok]\n");
}

#[tokio::test]
async fn custom_tool_replaces_builtin() {
    let kernel = kernel_with(|tools| tools.register_as("echo", Shout));
    assert_eq!(kernel.execute_bash("echo quiet please").await.unwrap(), "QUIET PLEASE\n");
}

#[tokio::test]
async fn custom_tool_alongside_builtins() {
    let kernel = kernel_with(|tools| tools.register(Shout));
    assert!(kernel.tool_names().contains(&"shout".to_string()));
    assert!(kernel.tool_names().contains(&"echo".to_string()));
    assert_eq!(kernel.execute_bash("N=world; shout hello $N").await.unwrap(), "HELLO WORLD\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_calls_do_not_interleave() {
    let kernel = Arc::new(Kernel::new(KernelConfig::default()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let kernel = kernel.clone();
        handles.push(tokio::spawn(async move {
            let out = kernel
                .execute_bash(&format!("X={i}; echo $(echo $X) | cat; echo $X"))
                .await
                .unwrap();
            (i, out)
        }));
    }

    for handle in handles {
        let (i, out) = handle.await.unwrap();
        assert_eq!(out, format!("{i}\n{i}\n"));
    }
}
