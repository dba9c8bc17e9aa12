//! Scanning engine for hand-written lexers.
//!
//! A [`Scanner`] reads one or more [`Source`]s through a sliding
//! [`SourceBuffer`] and offers rune primitives, string and identifier
//! recognizers, and a byte-transition-table automaton
//! ([`TransitionTable`]) for token classes with overlapping prefixes.
//! A grammar-specific [`Lexer`] classifies what the scanner consumed;
//! [`TokenStream`] turns repeated lexer calls into a lazy sequence of
//! [`Token`]s ending in exactly one EOF.

mod auto;
mod position;
mod scanner;
mod source;
mod source_buffer;
mod stream;
mod table;
mod token;
mod unquote;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use auto::{lexeme_str, FromLexeme, ValueError};
pub use position::{Position, UNNAMED_SOURCE};
pub use scanner::Scanner;
pub use source::Source;
pub use source_buffer::{SourceBuffer, MIN_BUFFER, MIN_READ};
pub use stream::{Lexer, TokenStream};
pub use table::{TableError, TransitionTable, CATCH_ALL, FINAL, MAX_STATES};
pub use token::{Token, TokenError, TokenKind, TokenValue};
pub use unquote::{unquote, UnquoteError};
