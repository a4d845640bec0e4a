//! Word expansion and the resolver callbacks handed to the parser.
//!
//! Expansion units are resolved strictly in order: a command substitution can
//! assign variables or change `$?`, and later units must observe that.

use crate::ast::{Parameter, Suffix, Word, WordPart};
use crate::error::{ShellError, ShellResult};
use crate::parser::ParseResolvers;

use super::control::strip_control_sequences;
use super::eval::Evaluator;
use super::session::{AliasTable, Session};

/// Resolve a parameter reference against the session.
///
/// Unset variables expand to the empty string.
pub fn resolve_parameter(param: &Parameter, session: &Session) -> String {
    match param {
        Parameter::LastStatus => session.return_code().to_string(),
        Parameter::Named(name) => session.get_var(name).unwrap_or_default().to_string(),
    }
}

impl Evaluator<'_> {
    /// Expand a word to literal text.
    pub async fn expand(&self, word: &Word, session: &mut Session) -> ShellResult<String> {
        let mut out = String::new();
        for part in &word.parts {
            out.push_str(&self.resolve_expansion_unit(part, session).await?);
        }
        Ok(out)
    }

    /// Expand command arguments in source order. Redirections are rejected.
    pub(crate) async fn expand_suffix(
        &self,
        suffix: &[Suffix],
        session: &mut Session,
    ) -> ShellResult<Vec<String>> {
        let mut args = Vec::with_capacity(suffix.len());
        for item in suffix {
            match item {
                Suffix::Word(word) => args.push(self.expand(word, session).await?),
                Suffix::Redirect(_) => {
                    return Err(ShellError::UnsupportedFeature("redirection".to_string()))
                }
            }
        }
        Ok(args)
    }

    async fn resolve_expansion_unit(
        &self,
        part: &WordPart,
        session: &mut Session,
    ) -> ShellResult<String> {
        match part {
            WordPart::Literal(text) => Ok(text.clone()),
            WordPart::Parameter(param) => Ok(resolve_parameter(param, session)),
            WordPart::Command(ast) => {
                // The nested script must not clobber the enclosing stage's input.
                let saved = session.take_stage_buffer();
                let raw = self.run(ast, session).await;
                session.restore_stage_buffer(saved);
                let value = strip_control_sequences(&raw?).trim().to_string();
                tracing::trace!(value = %value, "command substitution");
                Ok(value)
            }
            WordPart::Unrecognized { kind } => Err(ShellError::UnknownExpansionType(kind.clone())),
        }
    }
}

/// Parse-time callbacks backed by a session.
///
/// Environment and parameter lookups always report "unresolved" so values are
/// read at evaluation time, after earlier statements in the same script ran.
pub struct SessionResolvers<'a> {
    aliases: &'a AliasTable,
}

impl<'a> SessionResolvers<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            aliases: session.aliases(),
        }
    }
}

impl ParseResolvers for SessionResolvers<'_> {
    fn resolve_alias(&self, word: &str) -> String {
        self.aliases
            .get(word)
            .cloned()
            .unwrap_or_else(|| word.to_string())
    }

    fn resolve_environment(&self, _name: &str) -> Option<String> {
        None
    }

    fn resolve_parameter(&self, _param: &Parameter) -> Option<String> {
        None
    }
}
