//! Session state shared across one interpreter instance.
//!
//! A session holds:
//! - The environment (`NAME` → value)
//! - The alias table, read-only during evaluation
//! - The last return code (`$?`)
//! - The stage buffer carrying the previous pipeline stage's output

use std::collections::HashMap;

use super::result::ReturnCode;

/// Alias table: word → replacement command text.
pub type AliasTable = HashMap<String, String>;

/// Mutable state for one interpreter session.
///
/// Not synchronized. The [`Kernel`](crate::Kernel) serializes access so only
/// one evaluation touches a session at a time.
#[derive(Debug, Clone, Default)]
pub struct Session {
    env: HashMap<String, String>,
    aliases: AliasTable,
    return_code: ReturnCode,
    stage_buffer: Option<String>,
    /// Aliases whose replacement is currently being evaluated.
    expanding: Vec<String>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with an initial environment and alias table.
    pub fn with_state(env: HashMap<String, String>, aliases: AliasTable) -> Self {
        Self {
            env,
            aliases,
            ..Self::default()
        }
    }

    /// Get a variable.
    pub fn get_var(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }

    /// Set a variable, replacing any earlier value.
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.env.insert(name.into(), value.into());
    }

    /// Remove a variable, returning its value if it was set.
    pub fn remove_var(&mut self, name: &str) -> Option<String> {
        self.env.remove(name)
    }

    /// All variables, sorted by name.
    pub fn vars(&self) -> Vec<(&str, &str)> {
        let mut vars: Vec<_> = self
            .env
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        vars.sort_unstable();
        vars
    }

    /// Look up an alias replacement.
    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// The alias table.
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// The last return code.
    pub fn return_code(&self) -> ReturnCode {
        self.return_code
    }

    pub fn set_return_code(&mut self, code: ReturnCode) {
        self.return_code = code;
    }

    /// Output of the previous pipeline stage, if any.
    pub fn stage_buffer(&self) -> Option<&str> {
        self.stage_buffer.as_deref()
    }

    pub fn set_stage_buffer(&mut self, text: String) {
        self.stage_buffer = Some(text);
    }

    pub fn take_stage_buffer(&mut self) -> Option<String> {
        self.stage_buffer.take()
    }

    pub fn clear_stage_buffer(&mut self) {
        self.stage_buffer = None;
    }

    /// Put back a buffer saved with [`take_stage_buffer`](Self::take_stage_buffer).
    pub fn restore_stage_buffer(&mut self, saved: Option<String>) {
        self.stage_buffer = saved;
    }

    /// Mark an alias as being expanded. False if it already is.
    pub(crate) fn enter_alias(&mut self, name: &str) -> bool {
        if self.is_expanding(name) {
            return false;
        }
        self.expanding.push(name.to_string());
        true
    }

    pub(crate) fn leave_alias(&mut self, name: &str) {
        if let Some(pos) = self.expanding.iter().rposition(|n| n == name) {
            self.expanding.remove(pos);
        }
    }

    /// Whether an alias is in the middle of being expanded.
    pub fn is_expanding(&self, name: &str) -> bool {
        self.expanding.iter().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_var_is_none() {
        let session = Session::new();
        assert_eq!(session.get_var("MISSING"), None);
    }

    #[test]
    fn set_overwrites() {
        let mut session = Session::new();
        session.set_var("X", "1");
        session.set_var("X", "2");
        assert_eq!(session.get_var("X"), Some("2"));
        assert_eq!(session.remove_var("X"), Some("2".to_string()));
        assert_eq!(session.get_var("X"), None);
    }

    #[test]
    fn vars_are_sorted() {
        let mut session = Session::new();
        session.set_var("B", "2");
        session.set_var("A", "1");
        assert_eq!(session.vars(), vec![("A", "1"), ("B", "2")]);
    }

    #[test]
    fn stage_buffer_lifecycle() {
        let mut session = Session::new();
        assert_eq!(session.stage_buffer(), None);
        session.set_stage_buffer("out".into());
        assert_eq!(session.stage_buffer(), Some("out"));
        assert_eq!(session.take_stage_buffer(), Some("out".into()));
        assert_eq!(session.stage_buffer(), None);
    }

    #[test]
    fn alias_reentry_is_refused() {
        let mut session = Session::new();
        assert!(session.enter_alias("ll"));
        assert!(!session.enter_alias("ll"));
        assert!(session.is_expanding("ll"));
        session.leave_alias("ll");
        assert!(!session.is_expanding("ll"));
        assert!(session.enter_alias("ll"));
    }

    #[test]
    fn initial_state() {
        let mut aliases = AliasTable::new();
        aliases.insert("nvim".into(), "vim".into());
        let session = Session::with_state(HashMap::from([("HOME".into(), "/".into())]), aliases);
        assert_eq!(session.get_var("HOME"), Some("/"));
        assert_eq!(session.alias("nvim"), Some("vim"));
        assert_eq!(session.return_code(), ReturnCode::Success);
    }
}
