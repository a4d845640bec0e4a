//! Lexer for tinsh source text.
//!
//! Splits source into operator tokens and raw words using logos. A word is
//! kept as its exact source slice (quotes, `$(...)`, backticks and all); the
//! parser breaks it into literal text and expansion units afterwards.
//!
//! # Token Categories
//!
//! - **Operators**: `&&`, `||`, `|`, `&`, `;`, `(`, `)`
//! - **Redirections**: `>`, `>>`, `<`, `2>`, `&>`
//! - **Newlines**: statement separators
//! - **Words**: everything else, up to the next unquoted metacharacter

use std::fmt;

use logos::{Logos, Span};

/// Maximum nesting of subshells and command substitutions.
pub const MAX_NESTING: usize = 64;

/// A token with its span in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub token: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(token: T, span: Span) -> Self {
        Self { token, span }
    }
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LexerError {
    #[default]
    UnexpectedCharacter,
    UnterminatedString,
    UnterminatedSubstitution,
    UnterminatedVarRef,
    /// Command substitutions nested deeper than [`MAX_NESTING`].
    NestingTooDeep,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::UnexpectedCharacter => write!(f, "unexpected character"),
            LexerError::UnterminatedString => write!(f, "unterminated string"),
            LexerError::UnterminatedSubstitution => write!(f, "unterminated command substitution"),
            LexerError::UnterminatedVarRef => write!(f, "unterminated variable reference"),
            LexerError::NestingTooDeep => write!(f, "nesting depth exceeded (max {})", MAX_NESTING),
        }
    }
}

/// Tokens produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexerError)]
#[logos(skip r"[ \t]+")]
pub enum Token {
    #[token("&&")]
    And,

    #[token("||")]
    Or,

    #[token("|")]
    Pipe,

    #[token("&")]
    Amp,

    #[token(";")]
    Semi,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(">>")]
    GtGt,

    #[token(">")]
    Gt,

    #[token("<")]
    Lt,

    #[token("2>")]
    Stderr,

    #[token("&>")]
    Both,

    #[regex(r"\r?\n")]
    Newline,

    /// `# ...` up to end of line. Only recognized where a word could start.
    #[regex(r"#[^\n]*")]
    Comment,

    /// Backslash-newline between words.
    #[regex(r"\\\r?\n")]
    LineContinuation,

    /// A raw word, exactly as written.
    #[regex(r"[^ \t\r\n|&;()<>#]", lex_word)]
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::And => write!(f, "'&&'"),
            Token::Or => write!(f, "'||'"),
            Token::Pipe => write!(f, "'|'"),
            Token::Amp => write!(f, "'&'"),
            Token::Semi => write!(f, "';'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::GtGt => write!(f, "'>>'"),
            Token::Gt => write!(f, "'>'"),
            Token::Lt => write!(f, "'<'"),
            Token::Stderr => write!(f, "'2>'"),
            Token::Both => write!(f, "'&>'"),
            Token::Newline => write!(f, "newline"),
            Token::Comment => write!(f, "comment"),
            Token::LineContinuation => write!(f, "line continuation"),
            Token::Word(w) => write!(f, "word '{w}'"),
        }
    }
}

/// Extend a one-character match to the end of the word.
fn lex_word(lex: &mut logos::Lexer<Token>) -> Result<String, LexerError> {
    let end = scan_word(lex.source().as_bytes(), lex.span().start)?;
    lex.bump(end - lex.span().end);
    Ok(lex.slice().to_string())
}

/// Find the end of the word starting at `start`.
///
/// Metacharacters inside quotes, `$(...)`, `${...}` and backticks do not end
/// the word.
pub(crate) fn scan_word(src: &[u8], start: usize) -> Result<usize, LexerError> {
    let mut i = start;
    while i < src.len() {
        i = match src[i] {
            b' ' | b'\t' | b'\r' | b'\n' | b'|' | b'&' | b';' | b'(' | b')' | b'<' | b'>' => break,
            b'\\' => (i + 2).min(src.len()),
            b'\'' => skip_single_quoted(src, i + 1)?,
            b'"' => skip_double_quoted(src, i + 1, 1)?,
            b'`' => skip_backticks(src, i + 1)?,
            b'$' if src.get(i + 1) == Some(&b'(') => skip_parens(src, i + 2, 1)?,
            b'$' if src.get(i + 1) == Some(&b'{') => skip_braces(src, i + 2)?,
            _ => i + 1,
        };
    }
    Ok(i)
}

/// `i` is just past the opening `'`. Returns the index past the closing one.
pub(crate) fn skip_single_quoted(src: &[u8], i: usize) -> Result<usize, LexerError> {
    src[i..]
        .iter()
        .position(|&b| b == b'\'')
        .map(|off| i + off + 1)
        .ok_or(LexerError::UnterminatedString)
}

/// `i` is just past the opening `"`. Returns the index past the closing one.
pub(crate) fn skip_double_quoted(src: &[u8], mut i: usize, depth: usize) -> Result<usize, LexerError> {
    while i < src.len() {
        i = match src[i] {
            b'\\' => i + 2,
            b'"' => return Ok(i + 1),
            b'`' => skip_backticks(src, i + 1)?,
            b'$' if src.get(i + 1) == Some(&b'(') => skip_parens(src, i + 2, depth + 1)?,
            _ => i + 1,
        };
    }
    Err(LexerError::UnterminatedString)
}

/// `i` is just past the opening backtick. Returns the index past the closing one.
pub(crate) fn skip_backticks(src: &[u8], mut i: usize) -> Result<usize, LexerError> {
    while i < src.len() {
        match src[i] {
            b'\\' => i += 2,
            b'`' => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(LexerError::UnterminatedSubstitution)
}

/// `i` is just past `$(`. Returns the index past the matching `)`.
pub(crate) fn skip_parens(src: &[u8], mut i: usize, depth: usize) -> Result<usize, LexerError> {
    if depth > MAX_NESTING {
        return Err(LexerError::NestingTooDeep);
    }
    let mut open = 1usize;
    while i < src.len() {
        i = match src[i] {
            b'\\' => i + 2,
            b'\'' => skip_single_quoted(src, i + 1)?,
            b'"' => skip_double_quoted(src, i + 1, depth)?,
            b'`' => skip_backticks(src, i + 1)?,
            b'$' if src.get(i + 1) == Some(&b'(') => skip_parens(src, i + 2, depth + 1)?,
            b'(' => {
                open += 1;
                i + 1
            }
            b')' => {
                open -= 1;
                if open == 0 {
                    return Ok(i + 1);
                }
                i + 1
            }
            _ => i + 1,
        };
    }
    Err(LexerError::UnterminatedSubstitution)
}

/// `i` is just past `${`. Returns the index past the closing `}`.
pub(crate) fn skip_braces(src: &[u8], i: usize) -> Result<usize, LexerError> {
    src[i..]
        .iter()
        .position(|&b| b == b'}')
        .map(|off| i + off + 1)
        .ok_or(LexerError::UnterminatedVarRef)
}

/// Tokenize source, dropping comments and line continuations.
///
/// Returns every lexer error if any occurred.
pub fn tokenize(source: &str) -> Result<Vec<Spanned<Token>>, Vec<Spanned<LexerError>>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(Token::Comment | Token::LineContinuation) => {}
            Ok(token) => tokens.push(Spanned::new(token, span)),
            Err(err) => errors.push(Spanned::new(err, span)),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}
