//! Parser configuration.
//!
//! Exactly one input and one lexer must be configured:
//!
//! ```
//! use parsekit_lexer::{Scanner, Token, TokenKind};
//! use parsekit_parse::Parser;
//!
//! let p = Parser::builder()
//!     .read_string("a b c")
//!     .lexer(|sc: &mut Scanner| -> Token {
//!         sc.advance();
//!         Token::new(TokenKind::class(0))
//!     })
//!     .synchronize_at(["a"])
//!     .build::<Vec<String>>();
//! assert!(p.is_ok());
//! ```

use crate::error::ConfigError;
use crate::parser::Parser;
use parsekit_lexer::{Lexer, Scanner, Source, TokenStream};
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

impl<V> Parser<(), V> {
    /// Start configuring a parser. The output type is chosen at
    /// [`build`](ParserBuilder::build).
    pub fn builder() -> ParserBuilder<V> {
        ParserBuilder::new()
    }
}

/// Builder for [`Parser`].
pub struct ParserBuilder<V> {
    sources: Option<Vec<Source>>,
    /// More than one input was configured.
    conflict: bool,
    lexer: Option<Box<dyn Lexer<V>>>,
    sync_literals: Vec<String>,
}

impl<V> ParserBuilder<V> {
    pub fn new() -> Self {
        ParserBuilder {
            sources: None,
            conflict: false,
            lexer: None,
            sync_literals: Vec::new(),
        }
    }

    fn input(mut self, sources: Vec<Source>) -> Self {
        if self.sources.is_some() {
            self.conflict = true;
        }
        self.sources = Some(sources);
        self
    }

    /// Parse one file.
    #[must_use]
    pub fn read_file(self, path: impl Into<PathBuf>) -> Self {
        self.input(vec![Source::File(path.into())])
    }

    /// Parse several files in order as one token stream. No token spans
    /// two files.
    #[must_use]
    pub fn read_files<P: Into<PathBuf>>(self, paths: impl IntoIterator<Item = P>) -> Self {
        let sources = paths.into_iter().map(|p| Source::File(p.into())).collect();
        self.input(sources)
    }

    /// Parse in-memory text.
    #[must_use]
    pub fn read_string(self, text: impl Into<String>) -> Self {
        self.input(vec![Source::text(text)])
    }

    /// Parse whatever `reader` produces. It is dropped as soon as it
    /// reports end of input or an error.
    #[must_use]
    pub fn read_from(self, reader: impl Read + 'static) -> Self {
        self.input(vec![Source::reader(reader)])
    }

    /// Parse an explicitly built source, e.g. named text.
    #[must_use]
    pub fn read_source(self, source: Source) -> Self {
        self.input(vec![source])
    }

    #[must_use]
    pub fn lexer(mut self, lexer: impl Lexer<V> + 'static) -> Self {
        self.lexer = Some(Box::new(lexer));
        self
    }

    /// Literals error recovery stops at.
    #[must_use]
    pub fn synchronize_at<S: Into<String>>(mut self, literals: impl IntoIterator<Item = S>) -> Self {
        self.sync_literals = literals.into_iter().map(Into::into).collect();
        self
    }

    /// Build a parser whose output starts as `T::default()`.
    pub fn build<T: Default>(self) -> Result<Parser<T, V>, ConfigError> {
        self.build_with(T::default())
    }

    /// Build a parser whose output starts as `value`.
    pub fn build_with<T>(self, value: T) -> Result<Parser<T, V>, ConfigError> {
        if self.conflict {
            return Err(ConfigError::MultipleSources);
        }
        let sources = match self.sources {
            Some(sources) if !sources.is_empty() => sources,
            _ => return Err(ConfigError::NoSource),
        };
        let lexer = self.lexer.ok_or(ConfigError::NoLexer)?;
        debug!(
            sources = sources.len(),
            sync_literals = ?self.sync_literals,
            "parser configured"
        );
        let stream = TokenStream::from_boxed(Scanner::from_sources(sources), lexer);
        Ok(Parser::from_stream(stream, self.sync_literals, value))
    }
}

impl<V> Default for ParserBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}
