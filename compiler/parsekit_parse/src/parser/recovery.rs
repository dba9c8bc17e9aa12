//! Literal-based error recovery.
//!
//! A [`synchronize`](Parser::synchronize) guard wraps one production,
//! conventionally a whole top-level construct. When the production fails
//! with a syntax error, the guard records it and skips tokens until the
//! lookahead's text is one of the parser's synchronization literals, which
//! is left in place for the enclosing loop to re-enter the production.
//!
//! If the production consumed nothing before failing, the offending token
//! is skipped even when it is itself a synchronization literal. Otherwise
//! an outer loop would re-enter the production on the same token forever.

use super::Parser;
use crate::error::{Error, Failure, PResult};
use parsekit_lexer::Token;
use tracing::debug;

impl<T, V> Parser<T, V> {
    /// Run `production`, recovering from its syntax failure.
    ///
    /// Returns `Ok(Some(_))` when the production succeeded and `Ok(None)`
    /// after recovery, either at a synchronization literal or at end of
    /// input. [`Failure::Stop`] passes through unchanged.
    pub fn synchronize<R>(
        &mut self,
        production: impl FnOnce(&mut Self) -> PResult<R>,
    ) -> PResult<Option<R>> {
        let start = self.consumed;
        match production(self) {
            Ok(r) => Ok(Some(r)),
            Err(Failure::Stop) => Err(Failure::Stop),
            Err(Failure::Syntax(e)) => {
                debug!(error = %e, "recovering from syntax error");
                self.errors.push(Error::Syntax(e));
                self.recover(start)?;
                Ok(None)
            }
        }
    }

    /// Skip to the next synchronization literal or EOF.
    fn recover(&mut self, start: usize) -> PResult {
        loop {
            self.peek()?;
            let Some(tk) = self.current.as_ref() else {
                return Ok(());
            };
            if tk.is_eof() {
                debug!("recovery reached end of input");
                return Ok(());
            }
            if self.consumed > start && self.is_sync_literal(tk) {
                debug!(literal = tk.lexeme(), consumed = self.consumed - start, "resynchronized");
                return Ok(());
            }
            self.consume();
        }
    }

    fn is_sync_literal(&self, tk: &Token<V>) -> bool {
        self.sync_literals.iter().any(|lit| lit == tk.lexeme())
    }
}
