//! Parser for tinsh.
//!
//! [`ScriptParser`] is the port the evaluator depends on; [`ShellParser`] is
//! the reference implementation, a recursive descent parser over the token
//! stream from [`crate::lexer`].
//!
//! # Grammar
//!
//! ```text
//! script   := sep* (and_or (term and_or)* term?)?     sep  := ';' | newline
//!                                                       term := '&' sep* | sep+
//! and_or   := pipeline (('&&' | '||') newline* pipeline)*
//! pipeline := command ('|' newline* command)*
//! command  := '(' script ')' | simple
//! simple   := assignment* (word | redirect)+ | assignment+
//! redirect := ('>' | '>>' | '<' | '2>' | '&>') word
//! ```
//!
//! `&` marks the rightmost simple command of the preceding list as
//! background. Pipeline stages must be simple commands.

use thiserror::Error;

use crate::ast::{
    AssignmentWord, Ast, Command, LogicalExpression, LogicalOp, Node, Parameter, Pipeline,
    Redirect, RedirectKind, Subshell, Suffix, Word, WordPart,
};
use crate::lexer::{self, LexerError, Spanned, Token, MAX_NESTING};

/// Errors from parsing source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{error} at byte {offset}")]
    Lexer { error: LexerError, offset: usize },
    #[error("unexpected {found} at byte {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        offset: usize,
        expected: &'static str,
    },
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("a subshell cannot be a pipeline stage")]
    SubshellInPipeline,
    #[error("bad substitution: ${{{0}}}")]
    BadSubstitution(String),
    #[error("nesting depth exceeded (max {0})")]
    TooDeep(usize),
}

/// Callbacks the parser may consult while building the tree.
pub trait ParseResolvers {
    /// The alias target for `word`, or `word` itself.
    fn resolve_alias(&self, word: &str) -> String;

    /// A value to inline for `$name`, or `None` to keep the reference.
    fn resolve_environment(&self, name: &str) -> Option<String>;

    /// A value to inline for a parameter, or `None` to keep the reference.
    fn resolve_parameter(&self, param: &Parameter) -> Option<String>;
}

/// Resolvers that resolve nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unresolved;

impl ParseResolvers for Unresolved {
    fn resolve_alias(&self, word: &str) -> String {
        word.to_string()
    }

    fn resolve_environment(&self, _name: &str) -> Option<String> {
        None
    }

    fn resolve_parameter(&self, _param: &Parameter) -> Option<String> {
        None
    }
}

/// Source text → tree.
pub trait ScriptParser: Send + Sync {
    fn parse(&self, source: &str, resolvers: &dyn ParseResolvers) -> Result<Ast, ParseError>;
}

/// Reference parser for the supported shell subset.
#[derive(Debug, Clone, Copy)]
pub struct ShellParser {
    max_depth: usize,
}

impl ShellParser {
    pub fn new() -> Self {
        Self {
            max_depth: MAX_NESTING,
        }
    }
}

impl Default for ShellParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptParser for ShellParser {
    fn parse(&self, source: &str, resolvers: &dyn ParseResolvers) -> Result<Ast, ParseError> {
        let commands = parse_script(source, resolvers, 0, self.max_depth)?;
        Ok(Ast::script(commands))
    }
}

fn parse_script(
    source: &str,
    resolvers: &dyn ParseResolvers,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<Node>, ParseError> {
    if depth > max_depth {
        return Err(ParseError::TooDeep(max_depth));
    }
    let tokens = lexer::tokenize(source).map_err(|errors| match errors.into_iter().next() {
        Some(first) => ParseError::Lexer {
            error: first.token,
            offset: first.span.start,
        },
        None => ParseError::UnexpectedEof,
    })?;
    tracing::trace!(tokens = tokens.len(), depth, "tokenized");

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth,
        max_depth,
        resolvers,
    };
    let nodes = parser.script(false)?;
    match parser.peek() {
        None => Ok(nodes),
        Some(_) => Err(parser.unexpected("end of input")),
    }
}

struct Parser<'r> {
    tokens: Vec<Spanned<Token>>,
    pos: usize,
    depth: usize,
    max_depth: usize,
    resolvers: &'r dyn ParseResolvers,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(spanned) => ParseError::UnexpectedToken {
                found: spanned.token.to_string(),
                offset: spanned.span.start,
                expected,
            },
            None => ParseError::UnexpectedEof,
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(&Token::Newline) {}
    }

    fn skip_separators(&mut self) -> bool {
        let mut any = false;
        while matches!(self.peek(), Some(Token::Newline | Token::Semi)) {
            self.pos += 1;
            any = true;
        }
        any
    }

    /// A list of and-or chains, stopping at end of input or, inside a
    /// subshell, at the closing paren.
    fn script(&mut self, in_subshell: bool) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        self.skip_separators();
        loop {
            match self.peek() {
                None => break,
                Some(Token::RParen) if in_subshell => break,
                _ => {}
            }
            let mut node = self.and_or()?;
            let background = self.eat(&Token::Amp);
            if background {
                mark_background(&mut node);
            }
            nodes.push(node);

            let separated = self.skip_separators();
            if !separated && !background {
                break;
            }
        }
        Ok(nodes)
    }

    fn and_or(&mut self) -> Result<Node, ParseError> {
        let mut left = self.pipeline()?;
        loop {
            let op = match self.peek() {
                Some(Token::And) => LogicalOp::And,
                Some(Token::Or) => LogicalOp::Or,
                _ => break,
            };
            self.pos += 1;
            self.skip_newlines();
            let right = self.pipeline()?;
            left = Node::LogicalExpression(LogicalExpression {
                left: Box::new(left),
                right: Box::new(right),
                op,
            });
        }
        Ok(left)
    }

    fn pipeline(&mut self) -> Result<Node, ParseError> {
        let first = self.command()?;
        if self.peek() != Some(&Token::Pipe) {
            return Ok(first);
        }

        let mut stages = vec![into_stage(first)?];
        while self.eat(&Token::Pipe) {
            self.skip_newlines();
            stages.push(into_stage(self.command()?)?);
        }
        Ok(Node::Pipeline(Pipeline { stages }))
    }

    fn command(&mut self) -> Result<Node, ParseError> {
        if !self.eat(&Token::LParen) {
            return self.simple();
        }

        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::TooDeep(self.max_depth));
        }
        let body = self.script(true)?;
        self.depth -= 1;

        if body.is_empty() {
            return Err(self.unexpected("command"));
        }
        if !self.eat(&Token::RParen) {
            return Err(self.unexpected("')'"));
        }
        Ok(Node::Subshell(Subshell { body }))
    }

    fn simple(&mut self) -> Result<Node, ParseError> {
        let mut cmd = Command::default();

        while let Some(Token::Word(raw)) = self.peek() {
            if !is_assignment(raw) {
                break;
            }
            let word = self.word(raw)?;
            cmd.prefix.push(AssignmentWord::new(word));
            self.pos += 1;
        }

        loop {
            let kind = match self.peek() {
                Some(Token::Word(raw)) => {
                    let word = self.word(raw)?;
                    self.pos += 1;
                    if cmd.name.is_none() {
                        cmd.name = Some(word);
                    } else {
                        cmd.suffix.push(Suffix::Word(word));
                    }
                    continue;
                }
                Some(Token::Gt) => RedirectKind::StdoutOverwrite,
                Some(Token::GtGt) => RedirectKind::StdoutAppend,
                Some(Token::Lt) => RedirectKind::Stdin,
                Some(Token::Stderr) => RedirectKind::Stderr,
                Some(Token::Both) => RedirectKind::Both,
                _ => break,
            };
            self.pos += 1;
            let target = match self.advance() {
                Some(Token::Word(raw)) => self.word(&raw)?,
                Some(_) => {
                    self.pos -= 1;
                    return Err(self.unexpected("redirection target"));
                }
                None => return Err(ParseError::UnexpectedEof),
            };
            cmd.suffix.push(Suffix::Redirect(Redirect { kind, target }));
        }

        if cmd.name.is_none() {
            let redirect = cmd.suffix.iter().find_map(|s| match s {
                Suffix::Redirect(r) => Some(r.clone()),
                Suffix::Word(_) => None,
            });
            if let Some(redirect) = redirect {
                return Ok(Node::Redirect(redirect));
            }
            if cmd.prefix.is_empty() {
                return Err(self.unexpected("command"));
            }
        }
        Ok(Node::Command(cmd))
    }

    fn word(&self, raw: &str) -> Result<Word, ParseError> {
        WordParser {
            raw,
            bytes: raw.as_bytes(),
            pos: 0,
            literal: String::new(),
            parts: Vec::new(),
            depth: self.depth,
            max_depth: self.max_depth,
            resolvers: self.resolvers,
        }
        .parse()
    }
}

fn into_stage(node: Node) -> Result<Command, ParseError> {
    match node {
        Node::Command(cmd) => Ok(cmd),
        _ => Err(ParseError::SubshellInPipeline),
    }
}

/// Flag the rightmost simple command of `node` as background.
fn mark_background(node: &mut Node) {
    match node {
        Node::Command(cmd) => cmd.background = true,
        Node::Pipeline(pipeline) => {
            if let Some(last) = pipeline.stages.last_mut() {
                last.background = true;
            }
        }
        Node::LogicalExpression(expr) => mark_background(&mut expr.right),
        Node::Subshell(subshell) => {
            if let Some(last) = subshell.body.last_mut() {
                mark_background(last);
            }
        }
        Node::Redirect(_) | Node::Unrecognized { .. } => {}
    }
}

/// `NAME=...` with NAME a shell identifier, judged on the raw word.
fn is_assignment(raw: &str) -> bool {
    let Some((name, _)) = raw.split_once('=') else {
        return false;
    };
    is_identifier(name)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits one raw word into literal text and expansion units.
struct WordParser<'a, 'r> {
    raw: &'a str,
    bytes: &'a [u8],
    pos: usize,
    literal: String,
    parts: Vec<WordPart>,
    depth: usize,
    max_depth: usize,
    resolvers: &'r dyn ParseResolvers,
}

impl WordParser<'_, '_> {
    fn parse(mut self) -> Result<Word, ParseError> {
        while let Some(c) = self.current() {
            match c {
                '\\' => self.escape(|_| true),
                '\'' => self.single_quoted()?,
                '"' => self.double_quoted()?,
                '$' => self.dollar()?,
                '`' => self.backticks()?,
                _ => self.push_char(c),
            }
        }
        self.flush();
        if self.parts.is_empty() {
            self.parts.push(WordPart::Literal(String::new()));
        }
        Ok(Word { parts: self.parts })
    }

    fn current(&self) -> Option<char> {
        self.raw[self.pos..].chars().next()
    }

    fn push_char(&mut self, c: char) {
        self.literal.push(c);
        self.pos += c.len_utf8();
    }

    fn flush(&mut self) {
        if !self.literal.is_empty() {
            self.parts.push(WordPart::Literal(std::mem::take(&mut self.literal)));
        }
    }

    fn push_unit(&mut self, unit: WordPart) {
        self.flush();
        self.parts.push(unit);
    }

    fn lexer_error(&self, error: LexerError) -> ParseError {
        ParseError::Lexer {
            error,
            offset: self.pos,
        }
    }

    /// Backslash at `pos`. `escapable` picks the characters that lose the
    /// backslash; a backslash-newline disappears entirely.
    fn escape(&mut self, escapable: impl Fn(char) -> bool) {
        self.pos += 1;
        match self.current() {
            Some('\n') => self.pos += 1,
            Some(c) if escapable(c) => self.push_char(c),
            Some(_) | None => self.literal.push('\\'),
        }
    }

    fn single_quoted(&mut self) -> Result<(), ParseError> {
        let end = lexer::skip_single_quoted(self.bytes, self.pos + 1)
            .map_err(|e| self.lexer_error(e))?;
        self.literal.push_str(&self.raw[self.pos + 1..end - 1]);
        self.pos = end;
        Ok(())
    }

    fn double_quoted(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.pos += 1;
        while let Some(c) = self.current() {
            match c {
                '"' => {
                    self.pos += 1;
                    return Ok(());
                }
                '\\' => self.escape(|c| matches!(c, '$' | '"' | '\\' | '`')),
                '$' => self.dollar()?,
                '`' => self.backticks()?,
                _ => self.push_char(c),
            }
        }
        Err(ParseError::Lexer {
            error: LexerError::UnterminatedString,
            offset: start,
        })
    }

    fn dollar(&mut self) -> Result<(), ParseError> {
        let raw = self.raw;
        let next = self.bytes.get(self.pos + 1).copied();
        match next {
            Some(b'(') if self.bytes.get(self.pos + 2) == Some(&b'(') => {
                let end = self.matching_paren()?;
                self.pos = end;
                self.push_unit(WordPart::Unrecognized {
                    kind: "arithmetic expansion".to_string(),
                });
            }
            Some(b'(') => {
                let end = self.matching_paren()?;
                let inner = &raw[self.pos + 2..end - 1];
                let nodes = parse_script(inner, self.resolvers, self.depth + 1, self.max_depth)?;
                self.pos = end;
                self.push_unit(WordPart::Command(Box::new(Ast::script(nodes))));
            }
            Some(b'{') => {
                let end = lexer::skip_braces(self.bytes, self.pos + 2)
                    .map_err(|e| self.lexer_error(e))?;
                let body = &raw[self.pos + 2..end - 1];
                self.pos = end;
                if body == "?" {
                    self.parameter(Parameter::LastStatus);
                } else if is_identifier(body) {
                    self.parameter(Parameter::Named(body.to_string()));
                } else if body.is_empty() {
                    return Err(ParseError::BadSubstitution(String::new()));
                } else {
                    self.push_unit(WordPart::Unrecognized {
                        kind: "parameter expansion".to_string(),
                    });
                }
            }
            Some(b'?') => {
                self.pos += 2;
                self.parameter(Parameter::LastStatus);
            }
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                let start = self.pos + 1;
                let len = self.bytes[start..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                    .count();
                let name = raw[start..start + len].to_string();
                self.pos = start + len;
                self.parameter(Parameter::Named(name));
            }
            Some(b) if b.is_ascii_digit() || b"@*#!$-".contains(&b) => {
                self.pos += 2;
                self.push_unit(WordPart::Unrecognized {
                    kind: "special parameter".to_string(),
                });
            }
            _ => self.push_char('$'),
        }
        Ok(())
    }

    /// `pos` is at `$(`. Returns the index past the matching `)`.
    fn matching_paren(&self) -> Result<usize, ParseError> {
        lexer::skip_parens(self.bytes, self.pos + 2, self.depth + 1)
            .map_err(|e| self.lexer_error(e))
    }

    fn parameter(&mut self, param: Parameter) {
        let resolved = match &param {
            Parameter::Named(name) => self.resolvers.resolve_environment(name),
            Parameter::LastStatus => None,
        }
        .or_else(|| self.resolvers.resolve_parameter(&param));

        match resolved {
            Some(value) => self.literal.push_str(&value),
            None => self.push_unit(WordPart::Parameter(param)),
        }
    }

    fn backticks(&mut self) -> Result<(), ParseError> {
        let end = lexer::skip_backticks(self.bytes, self.pos + 1)
            .map_err(|e| self.lexer_error(e))?;
        let inner = unescape_backticks(&self.raw[self.pos + 1..end - 1]);
        let nodes = parse_script(&inner, self.resolvers, self.depth + 1, self.max_depth)?;
        self.pos = end;
        let ast = Ast::CommandSubstitution(Box::new(Ast::script(nodes)));
        self.push_unit(WordPart::Command(Box::new(ast)));
        Ok(())
    }
}

/// Inside backticks, `\`` `\\` and `\$` lose their backslash.
fn unescape_backticks(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if matches!(next, '`' | '\\' | '$') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}
