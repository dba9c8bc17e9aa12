//! Lazy token stream.
//!
//! [`TokenStream`] is a single-pass iterator: each `next` calls the lexer
//! until it returns something other than [`Token::ignore`], stamps the
//! token with the consumed lexeme and its offset, and yields it. The
//! sequence ends with exactly one EOF token.
//!
//! A lexer must consume at least one byte per call unless it returns EOF.
//! The stream does not enforce this.

use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};
use std::fmt;
use std::iter::FusedIterator;
use tracing::trace;

/// The grammar-specific tokenizer.
///
/// Any `FnMut(&mut Scanner) -> Token<V>` closure is a lexer.
pub trait Lexer<V> {
    /// Consume the next token's bytes from `sc` and classify them.
    fn lex(&mut self, sc: &mut Scanner) -> Token<V>;
}

impl<V, F> Lexer<V> for F
where
    F: FnMut(&mut Scanner) -> Token<V>,
{
    fn lex(&mut self, sc: &mut Scanner) -> Token<V> {
        self(sc)
    }
}

/// Tokens of a scanner, pulled on demand.
pub struct TokenStream<V> {
    scanner: Scanner,
    lexer: Box<dyn Lexer<V>>,
    done: bool,
}

impl<V> TokenStream<V> {
    pub fn new(scanner: Scanner, lexer: impl Lexer<V> + 'static) -> Self {
        Self::from_boxed(scanner, Box::new(lexer))
    }

    pub fn from_boxed(scanner: Scanner, lexer: Box<dyn Lexer<V>>) -> Self {
        TokenStream {
            scanner,
            lexer,
            done: false,
        }
    }

    /// The scanner, for resolving token offsets into positions.
    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Returns `true` once EOF (or a source failure) has been yielded.
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn finish(&mut self, token: Token<V>) -> Token<V> {
        self.done = true;
        let offset = self.scanner.token_offset();
        token.located(offset, String::new())
    }
}

impl<V> Iterator for TokenStream<V> {
    type Item = Token<V>;

    fn next(&mut self) -> Option<Token<V>> {
        if self.done {
            return None;
        }
        loop {
            if self.scanner.is_eof() {
                if let Some(e) = self.scanner.take_error() {
                    trace!(error = %e, "source failed");
                    return Some(self.finish(Token::error(e)));
                }
                if self.scanner.next_source() {
                    continue;
                }
                return Some(self.finish(Token::eof()));
            }

            let token = self.lexer.lex(&mut self.scanner);
            if token.is_ignore() {
                self.scanner.discard();
                continue;
            }
            if token.kind() == TokenKind::EOF {
                return Some(self.finish(token));
            }
            let (offset, lexeme) = self.scanner.take_lexeme();
            return Some(token.located(offset, lexeme));
        }
    }
}

impl<V> FusedIterator for TokenStream<V> {}

impl<V> fmt::Debug for TokenStream<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStream")
            .field("scanner", &self.scanner)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
