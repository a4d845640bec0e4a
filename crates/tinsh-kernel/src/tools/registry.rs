//! Name → tool lookup table.

use std::collections::HashMap;
use std::sync::Arc;

use super::traits::Tool;

/// Registry of dispatchable commands.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name, replacing any previous entry.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    /// Register a tool under an explicit name.
    pub fn register_as(&mut self, name: impl Into<String>, tool: impl Tool + 'static) {
        self.tools.insert(name.into(), Arc::new(tool));
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tools.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::interpreter::{ExecResult, Session};

    struct Hello;

    #[async_trait]
    impl Tool for Hello {
        fn name(&self) -> &str {
            "hello"
        }

        async fn execute(&self, _args: Vec<String>, _session: &mut Session) -> ExecResult {
            ExecResult::success("hello\n")
        }
    }

    #[test]
    fn register_by_own_name() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());
        registry.register(Hello);
        assert!(registry.contains("hello"));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn register_under_other_name() {
        let mut registry = ToolRegistry::new();
        registry.register_as("hi", Hello);
        assert!(!registry.contains("hello"));

        let tool = registry.get("hi").expect("registered");
        let mut session = Session::new();
        assert_eq!(tool.execute(vec![], &mut session).await.out, "hello\n");
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register_as("b", Hello);
        registry.register_as("a", Hello);
        assert_eq!(registry.names(), vec!["a", "b"]);
    }
}
