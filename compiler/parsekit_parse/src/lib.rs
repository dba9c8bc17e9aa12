//! Recursive-descent parsing with one token of lookahead.
//!
//! A grammar is ordinary code over a [`Parser`]: it pulls tokens with
//! [`expect`](Parser::expect), [`matches`](Parser::matches),
//! [`skip`](Parser::skip) and [`more`](Parser::more), builds its output in
//! [`Parser::value`], and wraps top-level constructs in
//! [`synchronize`](Parser::synchronize) to keep going after syntax errors.
//! [`finish`](Parser::finish) returns the output with every recorded error.
//!
//! Tokens come from a [`parsekit_lexer::TokenStream`] configured through
//! [`Parser::builder`].

mod builder;
mod error;
mod parser;

#[cfg(test)]
mod tests;

pub use builder::ParserBuilder;
pub use error::{ConfigError, Error, Failure, PResult, ParseErrors, SyntaxError};
pub use parser::{Parser, EOF_LITERAL};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call more than once.
/// `RUST_LOG=parsekit_parse=debug` shows recovery decisions;
/// `RUST_LOG=parsekit_parse=trace,parsekit_lexer=trace` also shows every
/// token and buffer refill.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
