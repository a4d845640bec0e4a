//! alias — Show the alias table.
//!
//! ```text
//! alias          # alias name='value' for every alias, sorted
//! alias ll       # just ll
//! ```
//!
//! The table is fixed when the kernel is built; defining aliases from a
//! script is refused.

use async_trait::async_trait;

use crate::interpreter::{ExecResult, Session};
use crate::tools::Tool;

pub struct Alias;

#[async_trait]
impl Tool for Alias {
    fn name(&self) -> &str {
        "alias"
    }

    async fn execute(&self, args: Vec<String>, session: &mut Session) -> ExecResult {
        if args.is_empty() {
            let mut entries: Vec<_> = session.aliases().iter().collect();
            entries.sort_unstable();
            let out: String = entries
                .into_iter()
                .map(|(name, value)| format_alias(name, value))
                .collect();
            return ExecResult::success(out);
        }

        let mut out = String::new();
        for arg in &args {
            if arg.contains('=') {
                return ExecResult::failure(1, "alias: alias table is read-only");
            }
            match session.alias(arg) {
                Some(value) => out.push_str(&format_alias(arg, value)),
                None => return ExecResult::failure(1, format!("alias: {arg}: not found")),
            }
        }
        ExecResult::success(out)
    }
}

fn format_alias(name: &str, value: &str) -> String {
    format!("alias {name}='{value}'\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::AliasTable;

    fn session() -> Session {
        let mut aliases = AliasTable::new();
        aliases.insert("ll".into(), "ls -l".into());
        aliases.insert("g".into(), "git".into());
        Session::with_state(Default::default(), aliases)
    }

    #[tokio::test]
    async fn lists_sorted() {
        let mut session = session();
        let result = Alias.execute(vec![], &mut session).await;
        assert!(result.ok());
        assert_eq!(result.out, "alias g='git'\nalias ll='ls -l'\n");
    }

    #[tokio::test]
    async fn shows_one() {
        let mut session = session();
        let result = Alias.execute(vec!["ll".into()], &mut session).await;
        assert_eq!(result.out, "alias ll='ls -l'\n");
    }

    #[tokio::test]
    async fn unknown_fails() {
        let mut session = session();
        let result = Alias.execute(vec!["nope".into()], &mut session).await;
        assert_eq!(result.code, 1);
        assert_eq!(result.out, "alias: nope: not found\n");
    }

    #[tokio::test]
    async fn defining_is_refused() {
        let mut session = session();
        let result = Alias.execute(vec!["x=y".into()], &mut session).await;
        assert_eq!(result.code, 1);
        assert_eq!(session.alias("x"), None);
    }
}
