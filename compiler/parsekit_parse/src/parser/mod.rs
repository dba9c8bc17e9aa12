//! One-token-lookahead parser driver.
//!
//! Grammars are plain functions over `&mut Parser` that call the
//! primitives below and propagate [`Failure`] with `?`. The parser holds
//! one *current* token. After [`more`](Parser::more) or a failed
//! [`matches`](Parser::matches) or [`expect`](Parser::expect) it is only
//! peeked: the next primitive sees it again. Consuming primitives clear the
//! peek, and the consumed token stays readable through [`lit`](Parser::lit)
//! and [`token_value`](Parser::token_value) until the next fetch.
//!
//! End of input is sticky: once EOF is current, every later fetch sees
//! EOF again.

mod recovery;

use crate::error::{Error, Failure, PResult, ParseErrors, SyntaxError};
use parsekit_lexer::{Position, Token, TokenError, TokenKind, TokenStream};
use std::error::Error as StdError;
use std::fmt;
use tracing::{debug, trace};

/// Literal shown for the end-of-input token.
pub const EOF_LITERAL: &str = "<EOF>";

/// Recursive-descent parser producing a `T` from tokens carrying `V`.
pub struct Parser<T, V = ()> {
    stream: TokenStream<V>,
    current: Option<Token<V>>,
    /// `current` was fetched but not consumed.
    peeking: bool,
    /// Tokens consumed so far.
    consumed: usize,
    /// A terminal error was recorded; every primitive now fails with
    /// [`Failure::Stop`].
    stopped: bool,
    sync_literals: Vec<String>,
    errors: Vec<Error>,
    /// The output under construction.
    pub value: T,
}

impl<T, V> Parser<T, V> {
    pub(crate) fn from_stream(stream: TokenStream<V>, sync_literals: Vec<String>, value: T) -> Self {
        Parser {
            stream,
            current: None,
            peeking: false,
            consumed: 0,
            stopped: false,
            sync_literals,
            errors: Vec::new(),
            value,
        }
    }

    // === Current Token ===

    /// Text of the current token; [`EOF_LITERAL`] at end of input and empty
    /// before the first fetch.
    pub fn lit(&self) -> &str {
        match &self.current {
            Some(tk) if tk.is_eof() => EOF_LITERAL,
            Some(tk) => tk.lexeme(),
            None => "",
        }
    }

    /// Kind of the current token; [`TokenKind::INVALID`] before the first
    /// fetch.
    pub fn kind(&self) -> TokenKind {
        self.current.as_ref().map_or(TokenKind::INVALID, Token::kind)
    }

    /// Value of the current token, if it carries one.
    pub fn token_value(&self) -> Option<&V> {
        self.current.as_ref().and_then(Token::value)
    }

    /// Error of the current token, if it is an error token.
    pub fn token_error(&self) -> Option<&TokenError> {
        self.current.as_ref().and_then(Token::error_value)
    }

    /// Position of the current token, or of the scanner before the first
    /// fetch.
    pub fn position(&self) -> Position {
        match &self.current {
            Some(tk) => self.stream.scanner().locate(tk.offset()),
            None => self.stream.scanner().position(),
        }
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Returns `true` once a terminal error stopped the parse.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    // === Primitives ===

    /// Peek at the next token; returns `true` unless it is EOF.
    ///
    /// Returns `false` as well once the parse has stopped.
    pub fn more(&mut self) -> bool {
        self.peek().is_ok() && !self.current.as_ref().is_some_and(Token::is_eof)
    }

    /// Consume the next token if it is of `kind`; otherwise fail with
    /// `expected {description}, got {literal} instead`, leaving the token
    /// in place.
    pub fn expect(&mut self, kind: impl Into<TokenKind>, description: &str) -> PResult {
        let kind: TokenKind = kind.into();
        self.peek()?;
        if self.kind() == kind {
            self.consume();
            return Ok(());
        }
        let mut message = format!("expected {description}, got {:?} instead", self.lit());
        if let Some(e) = self.token_error() {
            message.push_str(&format!(": {e}"));
        }
        Err(self.errf(message))
    }

    /// Consume the next token if its kind is one of `kinds`.
    ///
    /// Leaves the token in place and returns `false` otherwise, so it is
    /// safe to call speculatively.
    pub fn matches(&mut self, kinds: &[TokenKind]) -> PResult<bool> {
        self.peek()?;
        if kinds.contains(&self.kind()) {
            self.consume();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the next token whatever it is.
    pub fn skip(&mut self) -> PResult {
        self.peek()?;
        self.consume();
        Ok(())
    }

    /// A syntax failure at the current token's position.
    ///
    /// ```ignore
    /// return Err(p.errf(format_args!("invalid interface name {:?}", p.lit())));
    /// ```
    pub fn errf(&self, message: impl fmt::Display) -> Failure {
        Failure::Syntax(SyntaxError {
            position: self.position(),
            message: message.to_string(),
        })
    }

    /// Record `error` as terminal and stop the parse.
    ///
    /// Synchronization guards do not recover from the returned failure.
    pub fn err(&mut self, error: impl Into<Box<dyn StdError + Send + Sync>>) -> Failure {
        let error = error.into();
        debug!(%error, "parse stopped");
        self.errors.push(Error::Custom(error));
        self.stopped = true;
        Failure::Stop
    }

    /// Release the input and hand back the output with every recorded
    /// error.
    pub fn finish(self) -> (T, Result<(), ParseErrors>) {
        let result = match ParseErrors::from_vec(self.errors) {
            Some(errors) => Err(errors),
            None => Ok(()),
        };
        (self.value, result)
    }

    // === Fetching ===

    /// Make the next token current without consuming it.
    fn peek(&mut self) -> PResult {
        if self.stopped {
            return Err(Failure::Stop);
        }
        if !self.peeking {
            self.fetch();
            self.peeking = true;
        }
        if self.stopped {
            return Err(Failure::Stop);
        }
        Ok(())
    }

    fn consume(&mut self) {
        self.peeking = false;
        self.consumed += 1;
    }

    /// Pull the next token from the stream into `current`.
    fn fetch(&mut self) {
        if self.current.as_ref().is_some_and(Token::is_eof) {
            return;
        }
        let token = self.stream.next().unwrap_or_else(Token::eof);
        trace!(kind = %token.kind(), offset = token.offset(), lexeme = token.lexeme(), "token");
        if let Some(TokenError::Source(e)) = token.error_value() {
            debug!(error = %e, "input failed");
            self.errors.push(Error::Source(e.clone()));
            self.stopped = true;
        }
        self.current = Some(token);
    }
}

impl<T: fmt::Debug, V> fmt::Debug for Parser<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("lit", &self.lit())
            .field("peeking", &self.peeking)
            .field("consumed", &self.consumed)
            .field("stopped", &self.stopped)
            .field("errors", &self.errors.len())
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}
