//! Human-readable source positions for diagnostics.

use std::fmt;
use std::sync::Arc;

/// Name shown in positions when the source has no file name.
pub const UNNAMED_SOURCE: &str = "<input>";

/// A resolved source position.
///
/// Positions are only built when an error is reported: the hot path
/// carries plain byte offsets and [`Scanner::locate`](crate::Scanner::locate)
/// turns one into a `Position` on demand.
///
/// A position is valid if `line > 0`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    /// File name, if the source has one.
    pub filename: Option<Arc<str>>,
    /// Byte offset, starting at 0.
    pub offset: usize,
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number, starting at 1 (characters, not bytes).
    pub column: usize,
}

impl Position {
    /// Returns `true` if the position carries a line number.
    pub fn is_valid(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filename.as_deref().unwrap_or(UNNAMED_SOURCE))?;
        if self.is_valid() {
            write!(f, ":{}:{}", self.line, self.column)?;
        }
        Ok(())
    }
}
