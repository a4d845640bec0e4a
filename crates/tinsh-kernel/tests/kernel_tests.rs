//! End-to-end tests through `Kernel::execute_bash`.

use rstest::rstest;
use tinsh_kernel::interpreter::ReturnCode;
use tinsh_kernel::{Kernel, KernelConfig};

fn kernel() -> Kernel {
    Kernel::new(KernelConfig::default())
}

async fn exec(source: &str) -> String {
    kernel()
        .execute_bash(source)
        .await
        .unwrap_or_else(|report| panic!("{source:?} failed: {}", report.error))
}

// ============================================================================
// Sequencing, logic, pipelines
// ============================================================================

#[rstest]
#[case("echo a; echo b", "a\nb\n")]
#[case("echo a\necho b\n", "a\nb\n")]
#[case("true && echo hi", "hi\n")]
#[case("false || echo hi", "hi\n")]
#[case("false && echo no", "")]
#[case("true || echo no", "")]
#[case("false || false || echo third", "third\n")]
#[case("(echo -n a; echo -n b)", "ab")]
#[case("echo hello | cat", "hello\n")]
#[case("echo hello | cat | cat", "hello\n")]
#[case("echo x | echo y", "y\n")]
#[case("cat", "")]
#[case("", "")]
#[case("# just a comment", "")]
#[tokio::test]
async fn evaluates(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(exec(source).await, expected);
}

#[tokio::test]
async fn skipped_right_side_has_no_effect() {
    let kernel = kernel();
    kernel.execute_bash("true || FOO=x").await.unwrap();
    assert_eq!(kernel.get_var("FOO").await, None);
}

#[tokio::test]
async fn or_resets_status_before_right_side() {
    assert_eq!(exec("false || echo $?").await, "0\n");
}

// ============================================================================
// Return code and $?
// ============================================================================

#[rstest]
#[case("true; echo $?", "0\n")]
#[case("false; echo $?", "1\n")]
#[case("false; echo ${?}", "1\n")]
#[case("false; FOO=bar; echo $?", "1\n")]
#[case("doesnotexist; echo $?", "command not found: doesnotexist\n1\n")]
#[case("env NOPE; echo $?", "env: NOPE: not set\n1\n")]
#[tokio::test]
async fn last_status(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(exec(source).await, expected);
}

#[tokio::test]
async fn command_not_found_is_not_fatal() {
    let kernel = kernel();
    let out = kernel.execute_bash("doesnotexist").await.unwrap();
    assert_eq!(out, "command not found: doesnotexist\n");
    assert_eq!(kernel.return_code().await, ReturnCode::Failure);
}

// ============================================================================
// Assignments and expansion
// ============================================================================

#[tokio::test]
async fn assignment_sets_variable_silently() {
    let kernel = kernel();
    assert_eq!(kernel.execute_bash("FOO=bar").await.unwrap(), "");
    assert_eq!(kernel.get_var("FOO").await.as_deref(), Some("bar"));
    assert_eq!(kernel.return_code().await, ReturnCode::Success);
}

#[tokio::test]
async fn prefix_assignment_persists() {
    let kernel = kernel();
    assert_eq!(kernel.execute_bash("FOO=1 env FOO").await.unwrap(), "1\n");
    assert_eq!(kernel.get_var("FOO").await.as_deref(), Some("1"));
}

#[rstest]
#[case("X=1; X=2; echo $X", "2\n")]
#[case("echo \"[$UNSET]\"", "[]\n")]
#[case("A=a; B=\"$A b\"; echo $B", "a b\n")]
#[case("echo '$HOME'", "$HOME\n")]
#[case("export A=1 B=2; env A", "1\n")]
#[case("A=1; unset A; echo \"[$A]\"", "[]\n")]
#[tokio::test]
async fn variables(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(exec(source).await, expected);
}

#[rstest]
#[case("echo \"[$(echo '  spaced  ')]\"", "[spaced]\n")]
#[case("echo $(echo $(echo deep))", "deep\n")]
#[case("echo `echo tick`", "tick\n")]
#[case("X=$(FOO=inner; echo v); echo $FOO $X", "inner v\n")]
#[case("echo $(false)$?", "1\n")]
#[case("echo $(doesnotexist)", "command not found: doesnotexist\n")]
#[tokio::test]
async fn command_substitution(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(exec(source).await, expected);
}

#[tokio::test]
async fn long_and_chain() {
    let source = format!("{} && echo done", vec!["true"; 5000].join(" && "));
    assert_eq!(exec(&source).await, "done\n");
}

#[tokio::test]
async fn long_or_chain() {
    let source = format!("false{} || echo last", " || false".repeat(4999));
    let kernel = kernel();
    assert_eq!(kernel.execute_bash(&source).await.unwrap(), "last\n");
    assert_eq!(kernel.return_code().await, ReturnCode::Success);
}

// ============================================================================
// Aliases
// ============================================================================

#[tokio::test]
async fn alias_to_unregistered_target() {
    let kernel = Kernel::new(KernelConfig::default().with_alias("nvim", "vim"));
    assert_eq!(kernel.execute_bash("nvim").await.unwrap(), "command not found: vim\n");
    assert_eq!(kernel.return_code().await, ReturnCode::Failure);
}

#[tokio::test]
async fn alias_with_arguments() {
    let kernel = Kernel::new(KernelConfig::default().with_alias("ll", "echo -n listing"));
    assert_eq!(kernel.execute_bash("ll a 'b c'").await.unwrap(), "listing a b c");
}

#[tokio::test]
async fn alias_chain() {
    let config = KernelConfig::default()
        .with_alias("a", "b")
        .with_alias("b", "echo chained");
    let kernel = Kernel::new(config);
    assert_eq!(kernel.execute_bash("a").await.unwrap(), "chained\n");
}

#[tokio::test]
async fn alias_cycle_terminates() {
    let config = KernelConfig::default()
        .with_alias("ping", "pong")
        .with_alias("pong", "ping");
    let kernel = Kernel::new(config);
    assert_eq!(kernel.execute_bash("ping").await.unwrap(), "command not found: ping\n");
}

#[tokio::test]
async fn alias_argument_fault_is_fatal() {
    let kernel = Kernel::new(KernelConfig::default().with_alias("ll", "echo -n"));
    let report = kernel.execute_bash("ll $((1))").await.unwrap_err();
    assert_eq!(report.error, "unknown expansion type: arithmetic expansion\n");
    assert_eq!(kernel.return_code().await, ReturnCode::Failure);
    // The alias is usable again afterwards.
    assert_eq!(kernel.execute_bash("ll ok").await.unwrap(), "ok");
}

#[tokio::test]
async fn alias_builtin_lists_table() {
    let kernel = Kernel::new(KernelConfig::default().with_alias("ll", "ls -l"));
    assert_eq!(kernel.execute_bash("alias").await.unwrap(), "alias ll='ls -l'\n");
}

// ============================================================================
// Fatal faults
// ============================================================================

#[rstest]
#[case("echo (", "invalid/unsupported syntax\n")]
#[case("echo 'open", "invalid/unsupported syntax\n")]
#[case("echo hi &", "unsupported feature: background execution\n")]
#[case("echo hi > out.txt", "unsupported feature: redirection\n")]
#[case("> out.txt", "unsupported feature: redirection\n")]
#[case("echo $((1 + 2))", "unknown expansion type: arithmetic expansion\n")]
#[case("echo ${HOME:-x}", "unknown expansion type: parameter expansion\n")]
#[case("echo before; echo $1", "unknown expansion type: special parameter\n")]
#[tokio::test]
async fn fatal_faults(#[case] source: &str, #[case] expected: &str) {
    let kernel = kernel();
    let report = kernel.execute_bash(source).await.unwrap_err();
    assert_eq!(report.error, expected);
    assert_eq!(kernel.return_code().await, ReturnCode::Failure);
}

#[tokio::test]
async fn error_report_json_shape() {
    let report = kernel().execute_bash("echo hi &").await.unwrap_err();
    let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"error": "unsupported feature: background execution\n"})
    );
}

#[tokio::test]
async fn kernel_recovers_after_fault() {
    let kernel = kernel();
    kernel.execute_bash("echo (").await.unwrap_err();
    assert_eq!(kernel.execute_bash("echo ok").await.unwrap(), "ok\n");
    assert_eq!(kernel.return_code().await, ReturnCode::Success);
}

// ============================================================================
// Determinism
// ============================================================================

#[tokio::test]
async fn fresh_sessions_are_deterministic() {
    let script = "A=1; echo $A | cat; false || echo $?; doesnotexist; (echo -n x; echo y)";
    let first = exec(script).await;
    let second = exec(script).await;
    assert_eq!(first, second);
    assert_eq!(first, "1\n0\ncommand not found: doesnotexist\nxy\n");
}
