//! AST type definitions.

use std::fmt;

/// The root of a parsed tree as handed to the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// A complete script: top-level nodes in source order.
    Script(Script),
    /// Command-substitution wrapper around an embedded tree (backticks).
    CommandSubstitution(Box<Ast>),
    /// A root shape the evaluator does not understand.
    Unrecognized { kind: String },
}

impl Ast {
    /// Wrap a list of top-level nodes as a script root.
    pub fn script(commands: Vec<Node>) -> Self {
        Ast::Script(Script { commands })
    }

    /// Short name for diagnostics and tracing.
    pub fn kind_name(&self) -> &str {
        match self {
            Ast::Script(_) => "Script",
            Ast::CommandSubstitution(_) => "CommandSubstitution",
            Ast::Unrecognized { kind } => kind,
        }
    }
}

/// A sequence of top-level nodes, evaluated in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub commands: Vec<Node>,
}

/// A single evaluable node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Simple command: `NAME=value tool arg1 arg2`
    Command(Command),
    /// Pipeline: `a | b | c`
    Pipeline(Pipeline),
    /// Subshell: `( a; b )`
    Subshell(Subshell),
    /// `left && right` or `left || right`
    LogicalExpression(LogicalExpression),
    /// A bare redirection. Always rejected.
    Redirect(Redirect),
    /// A node kind produced by the parser that has no evaluation rule.
    Unrecognized { kind: String },
}

impl Node {
    /// Short name for diagnostics and tracing.
    pub fn kind_name(&self) -> &str {
        match self {
            Node::Command(_) => "Command",
            Node::Pipeline(_) => "Pipeline",
            Node::Subshell(_) => "Subshell",
            Node::LogicalExpression(_) => "LogicalExpression",
            Node::Redirect(_) => "Redirect",
            Node::Unrecognized { kind } => kind,
        }
    }
}

/// A command invocation.
///
/// `name` is absent for pure assignment statements (`FOO=bar`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Command {
    pub name: Option<Word>,
    pub prefix: Vec<AssignmentWord>,
    pub suffix: Vec<Suffix>,
    /// Set by a trailing `&`.
    pub background: bool,
}

impl Command {
    /// A command with the given literal name and literal arguments.
    pub fn simple(name: &str, args: &[&str]) -> Self {
        Self {
            name: Some(Word::literal(name)),
            prefix: Vec::new(),
            suffix: args.iter().map(|a| Suffix::Word(Word::literal(*a))).collect(),
            background: false,
        }
    }
}

/// A command suffix: an argument word or a redirection.
#[derive(Debug, Clone, PartialEq)]
pub enum Suffix {
    Word(Word),
    Redirect(Redirect),
}

/// Commands connected by pipes.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub stages: Vec<Command>,
}

/// Commands run as an independent group.
#[derive(Debug, Clone, PartialEq)]
pub struct Subshell {
    pub body: Vec<Node>,
}

/// Short-circuiting combination of two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpression {
    pub left: Box<Node>,
    pub right: Box<Node>,
    pub op: LogicalOp,
}

impl Drop for LogicalExpression {
    // Chains nest down the left side; unroll them so long ones don't exhaust the stack.
    fn drop(&mut self) {
        let mut next = take_node(&mut self.left);
        while let Node::LogicalExpression(mut inner) = next {
            next = take_node(&mut inner.left);
        }
    }
}

fn take_node(slot: &mut Node) -> Node {
    std::mem::replace(slot, Node::Unrecognized { kind: String::new() })
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `&&` - run right only if left succeeded
    And,
    /// `||` - run right only if left failed
    Or,
}

/// I/O redirection. Parsed so it can be reported, never executed.
#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    pub kind: RedirectKind,
    pub target: Word,
}

/// Type of redirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// `>` stdout to file (overwrite)
    StdoutOverwrite,
    /// `>>` stdout to file (append)
    StdoutAppend,
    /// `<` stdin from file
    Stdin,
    /// `2>` stderr to file
    Stderr,
    /// `&>` both stdout and stderr to file
    Both,
}

/// A `NAME=value` prefix. Kept as a whole word; the evaluator splits it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentWord {
    pub word: Word,
}

impl AssignmentWord {
    pub fn new(word: Word) -> Self {
        Self { word }
    }

    /// Split on the first `=` of the leading literal text.
    ///
    /// Returns `None` when no `=` appears before the first expansion unit.
    pub fn split(&self) -> Option<(String, Word)> {
        let mut key = String::new();
        let mut parts = self.word.parts.iter();
        while let Some(part) = parts.next() {
            let WordPart::Literal(text) = part else {
                return None;
            };
            if let Some((head, tail)) = text.split_once('=') {
                key.push_str(head);
                let mut value = Vec::new();
                if !tail.is_empty() {
                    value.push(WordPart::Literal(tail.to_string()));
                }
                value.extend(parts.cloned());
                return Some((key, Word { parts: value }));
            }
            key.push_str(text);
        }
        None
    }
}

/// A word: literal text interleaved with expansion units.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Word {
    pub parts: Vec<WordPart>,
}

impl Word {
    /// A word with no expansion units.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            parts: vec![WordPart::Literal(text.into())],
        }
    }

    /// True when the word carries no expansion units.
    pub fn is_literal(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, WordPart::Literal(_)))
    }

    /// Concatenated literal text, ignoring expansion units.
    pub fn literal_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                WordPart::Literal(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// One piece of a word.
#[derive(Debug, Clone, PartialEq)]
pub enum WordPart {
    /// Verbatim text (quotes already removed).
    Literal(String),
    /// `$NAME`, `${NAME}`, `$?`
    Parameter(Parameter),
    /// `$(...)` or backticks
    Command(Box<Ast>),
    /// An expansion form without an evaluation rule, e.g. `$((1 + 2))`.
    Unrecognized { kind: String },
}

/// Parameter reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    /// `$?`
    LastStatus,
    /// `$NAME`
    Named(String),
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::LastStatus => write!(f, "$?"),
            Parameter::Named(name) => write!(f, "${name}"),
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "&&"),
            LogicalOp::Or => write!(f, "||"),
        }
    }
}

impl fmt::Display for RedirectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectKind::StdoutOverwrite => write!(f, ">"),
            RedirectKind::StdoutAppend => write!(f, ">>"),
            RedirectKind::Stdin => write!(f, "<"),
            RedirectKind::Stderr => write!(f, "2>"),
            RedirectKind::Both => write!(f, "&>"),
        }
    }
}
