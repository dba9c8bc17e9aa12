//! Parse errors and the failure signal productions propagate.
//!
//! A production reports trouble by returning a [`Failure`]:
//!
//! - [`Failure::Syntax`] is recoverable. The nearest
//!   [`synchronize`](crate::Parser::synchronize) guard records it and
//!   skips ahead to a synchronization literal.
//! - [`Failure::Stop`] is terminal. Its error was recorded where it was
//!   raised; guards let it through untouched.
//!
//! Everything recorded during a parse comes back from
//! [`finish`](crate::Parser::finish) as one [`ParseErrors`] value.

use parsekit_lexer::Position;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Result of a grammar production.
pub type PResult<T = ()> = Result<T, Failure>;

/// A positioned syntax error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("at {position}: {message}")]
pub struct SyntaxError {
    pub position: Position,
    pub message: String,
}

/// Control signal returned by a failing production.
#[derive(Debug, PartialEq, Eq)]
pub enum Failure {
    /// Recoverable: unwinds to the nearest synchronization guard.
    Syntax(SyntaxError),
    /// Terminal: the error is already recorded, stop parsing.
    Stop,
}

impl From<SyntaxError> for Failure {
    fn from(e: SyntaxError) -> Self {
        Failure::Syntax(e)
    }
}

/// One error recorded during a parse.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// The source could not be opened or read.
    #[error("cannot read input: {0}")]
    Source(Arc<io::Error>),
    /// A terminal error raised by the grammar.
    #[error(transparent)]
    Custom(Box<dyn StdError + Send + Sync>),
}

impl Error {
    /// The syntax error, if this is one.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Error::Syntax(e) => Some(e),
            Error::Source(_) | Error::Custom(_) => None,
        }
    }
}

/// All errors of one parse, in the order they were recorded.
///
/// Displays as the members joined by newlines.
#[derive(Debug)]
pub struct ParseErrors(Vec<Error>);

impl ParseErrors {
    /// `None` when nothing was recorded.
    pub(crate) fn from_vec(errors: Vec<Error>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(ParseErrors(errors))
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Error> {
        self.0
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl StdError for ParseErrors {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.first().map(|e| e as &(dyn StdError + 'static))
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ParseErrors {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Invalid parser configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no input configured")]
    NoSource,
    #[error("more than one input configured")]
    MultipleSources,
    #[error("no lexer configured")]
    NoLexer,
}

#[cfg(test)]
mod tests;
