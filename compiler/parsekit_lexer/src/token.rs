//! Tokens and token kinds.
//!
//! Kinds follow one convention: a non-negative kind is the literal
//! character it stands for (`'{'` is its own kind), negative kinds name
//! multi-character classes. Two negative values are reserved:
//! [`TokenKind::EOF`] and [`TokenKind::INVALID`].

use crate::auto::{FromLexeme, ValueError};
use crate::scanner::Scanner;
use std::fmt;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Type tag of a token.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKind(i32);

impl TokenKind {
    /// End of input. Emitted exactly once, with an empty lexeme.
    pub const EOF: TokenKind = TokenKind(0);

    /// Not a token. Payload-free, it means "input consumed, nothing to
    /// yield"; carrying an error it marks an error token.
    pub const INVALID: TokenKind = TokenKind(-1);

    /// First tag available to [`class`](Self::class).
    const FIRST_CLASS: i32 = -2;

    /// Kind of a single-character token.
    pub const fn literal(c: char) -> Self {
        TokenKind(c as i32)
    }

    /// Kind of the `index`-th multi-character token class.
    ///
    /// ```
    /// use parsekit_lexer::TokenKind;
    ///
    /// const NUMBER: TokenKind = TokenKind::class(0);
    /// const IDENT: TokenKind = TokenKind::class(1);
    /// assert_ne!(NUMBER, IDENT);
    /// assert!(NUMBER.raw() < 0);
    /// ```
    pub const fn class(index: u16) -> Self {
        TokenKind(TokenKind::FIRST_CLASS - index as i32)
    }

    /// The raw tag value.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// The character this kind stands for, for literal kinds.
    pub fn as_char(self) -> Option<char> {
        if self.0 > 0 {
            u32::try_from(self.0).ok().and_then(char::from_u32)
        } else {
            None
        }
    }
}

impl From<char> for TokenKind {
    fn from(c: char) -> Self {
        TokenKind::literal(c)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_char() {
            Some(c) => write!(f, "{c:?}"),
            None => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Debug for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TokenKind::EOF => f.write_str("EOF"),
            TokenKind::INVALID => f.write_str("INVALID"),
            kind => write!(f, "TokenKind({kind})"),
        }
    }
}

/// Error carried by an error token.
#[derive(Clone, Debug, Error)]
pub enum TokenError {
    /// The lexeme could not be converted to its value type.
    #[error(transparent)]
    Value(#[from] ValueError),
    /// The source could not be read.
    #[error("cannot read input: {0}")]
    Source(Arc<io::Error>),
}

impl From<io::Error> for TokenError {
    fn from(e: io::Error) -> Self {
        TokenError::Source(Arc::new(e))
    }
}

/// Payload of a token.
#[derive(Clone, Debug, Default)]
pub enum TokenValue<V> {
    #[default]
    None,
    Value(V),
    Error(TokenError),
}

/// One token.
///
/// The lexer only chooses the kind and payload. The lexeme and offset are
/// filled in by the [`TokenStream`](crate::TokenStream) from the bytes the
/// lexer consumed.
#[derive(Clone, Debug)]
pub struct Token<V = ()> {
    kind: TokenKind,
    value: TokenValue<V>,
    lexeme: String,
    offset: usize,
}

impl<V> Token<V> {
    /// A payload-free token of `kind`.
    pub fn new(kind: impl Into<TokenKind>) -> Self {
        Token {
            kind: kind.into(),
            value: TokenValue::None,
            lexeme: String::new(),
            offset: 0,
        }
    }

    /// A token of `kind` carrying `value`.
    pub fn with_value(kind: impl Into<TokenKind>, value: V) -> Self {
        Token {
            value: TokenValue::Value(value),
            ..Token::new(kind)
        }
    }

    /// An error token.
    pub fn error(error: impl Into<TokenError>) -> Self {
        Token {
            value: TokenValue::Error(error.into()),
            ..Token::new(TokenKind::INVALID)
        }
    }

    /// The end-of-input token.
    pub fn eof() -> Self {
        Token::new(TokenKind::EOF)
    }

    /// "Nothing to yield": returned by lexers after skipping whitespace or
    /// comments. The stream drops it.
    pub fn ignore() -> Self {
        Token::new(TokenKind::INVALID)
    }

    /// A token of `kind` whose value is parsed from the scanner's current
    /// lexeme, or an error token if the lexeme does not parse.
    pub fn auto<T>(kind: impl Into<TokenKind>, sc: &Scanner) -> Self
    where
        T: FromLexeme,
        V: From<T>,
    {
        match T::from_lexeme(sc.cursor()) {
            Ok(value) => Token::with_value(kind, V::from(value)),
            Err(e) => Token::error(e),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn value(&self) -> Option<&V> {
        match &self.value {
            TokenValue::Value(v) => Some(v),
            TokenValue::None | TokenValue::Error(_) => None,
        }
    }

    pub fn error_value(&self) -> Option<&TokenError> {
        match &self.value {
            TokenValue::Error(e) => Some(e),
            TokenValue::None | TokenValue::Value(_) => None,
        }
    }

    pub fn payload(&self) -> &TokenValue<V> {
        &self.value
    }

    pub fn into_payload(self) -> TokenValue<V> {
        self.value
    }

    /// Exact source text of the token.
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    /// Byte offset of the token in its source.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EOF
    }

    pub fn is_error(&self) -> bool {
        matches!(self.value, TokenValue::Error(_))
    }

    /// Returns `true` for the [`ignore`](Self::ignore) marker.
    pub fn is_ignore(&self) -> bool {
        self.kind == TokenKind::INVALID && !self.is_error()
    }

    /// Attach the consumed text. Only the stream does this.
    pub(crate) fn located(mut self, offset: usize, lexeme: String) -> Self {
        self.offset = offset;
        self.lexeme = lexeme;
        self
    }
}
