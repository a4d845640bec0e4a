//! echo — Print arguments.

use async_trait::async_trait;

use crate::interpreter::{ExecResult, Session};
use crate::tools::Tool;

/// Echo tool: joins its arguments with spaces.
pub struct Echo;

#[async_trait]
impl Tool for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    async fn execute(&self, args: Vec<String>, _session: &mut Session) -> ExecResult {
        let (no_newline, words) = match args.split_first() {
            Some((flag, rest)) if flag == "-n" => (true, rest),
            _ => (false, args.as_slice()),
        };

        let mut output = words.join(" ");
        if !no_newline {
            output.push('\n');
        }
        ExecResult::success(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_echo_simple() {
        let mut session = Session::new();
        let result = Echo.execute(args(&["hello"]), &mut session).await;
        assert!(result.ok());
        assert_eq!(result.out, "hello\n");
    }

    #[tokio::test]
    async fn test_echo_multiple() {
        let mut session = Session::new();
        let result = Echo.execute(args(&["hello", "world"]), &mut session).await;
        assert_eq!(result.out, "hello world\n");
    }

    #[tokio::test]
    async fn test_echo_empty() {
        let mut session = Session::new();
        let result = Echo.execute(vec![], &mut session).await;
        assert_eq!(result.out, "\n");
    }

    #[tokio::test]
    async fn test_echo_n_no_newline() {
        let mut session = Session::new();
        let result = Echo.execute(args(&["-n", "hello"]), &mut session).await;
        assert_eq!(result.out, "hello");
    }

    #[tokio::test]
    async fn test_echo_n_only_first() {
        let mut session = Session::new();
        let result = Echo.execute(args(&["a", "-n"]), &mut session).await;
        assert_eq!(result.out, "a -n\n");
    }
}
