//! Position-tracking scanner over a [`SourceBuffer`].
//!
//! The scanner keeps the in-progress lexeme as the prefix of the buffer
//! window: the window starts where the current token started and `off`
//! marks how far the lexer has advanced. Yielding a token releases that
//! prefix, so compaction can never pull bytes out from under a lexeme.
//!
//! Every primitive re-extends the buffer when it runs off the loaded
//! window. A code point, string, or identifier split across a refill
//! boundary scans exactly as it would in one contiguous block.
//!
//! The recognizers ([`lex_string`](Scanner::lex_string),
//! [`lex_ident`](Scanner::lex_ident),
//! [`scan_with_table`](Scanner::scan_with_table)) measure from the cursor
//! without moving it; the lexer commits the measured length with
//! [`advance_by`](Scanner::advance_by).

use crate::position::Position;
use crate::source::Source;
use crate::source_buffer::SourceBuffer;
use crate::table::TransitionTable;
use std::borrow::Cow;
use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::Arc;
use tracing::debug;

/// Bytes accepted by [`Scanner::lex_ident`]: ASCII letters, `_` and `-`.
const IDENT: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        #[allow(clippy::cast_possible_truncation, reason = "i < 256")]
        let b = i as u8;
        table[i] = b.is_ascii_alphabetic() || b == b'_' || b == b'-';
        i += 1;
    }
    table
};

/// Opening (and matching closing) delimiters for [`Scanner::lex_string`].
#[inline]
fn is_quote(b: u8) -> bool {
    matches!(b, b'"' | b'\'' | b'`')
}

/// Encoded length announced by a UTF-8 lead byte; 1 for invalid leads.
#[inline]
fn utf8_width(lead: u8) -> usize {
    match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 1,
    }
}

/// Reads lexemes from one source, or from a sequence of sources in turn.
#[derive(Debug)]
pub struct Scanner {
    buffer: SourceBuffer,
    /// Name of the source being scanned.
    name: Option<Arc<str>>,
    /// End of the in-progress lexeme, relative to the window start.
    off: usize,
    /// Sources still to scan after the current one.
    pending: VecDeque<Source>,
}

impl Scanner {
    /// Scan a single source.
    pub fn new(source: Source) -> Self {
        Self::from_sources([source])
    }

    /// Scan `sources` one after the other.
    ///
    /// Each source is opened only when the previous one is exhausted. A
    /// lexeme never spans two sources.
    pub fn from_sources(sources: impl IntoIterator<Item = Source>) -> Self {
        let mut pending: VecDeque<Source> = sources.into_iter().collect();
        let (name, buffer) = match pending.pop_front() {
            Some(source) => (source.name(), source.open()),
            None => (None, SourceBuffer::from_bytes(Vec::new())),
        };
        Scanner {
            buffer,
            name,
            off: 0,
            pending,
        }
    }

    /// Scan an unnamed in-memory text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(Source::text(text))
    }

    /// Scan an unnamed reader.
    pub fn from_reader(reader: impl Read + 'static) -> Self {
        Self::new(Source::reader(reader))
    }

    /// Make sure the window holds at least `len` bytes.
    ///
    /// Returns `false` if the source ends (or fails) first.
    fn fill(&mut self, len: usize) -> bool {
        while self.buffer.window().len() < len {
            if self.buffer.extend() == 0 {
                return false;
            }
        }
        true
    }

    /// Decode the code point at the cursor and its encoded length.
    ///
    /// Invalid UTF-8 decodes as U+FFFD with length 1.
    fn decode(&mut self) -> Option<(char, usize)> {
        if !self.fill(self.off + 1) {
            return None;
        }
        let width = utf8_width(self.buffer.window()[self.off]);
        if width > 1 {
            // A truncated sequence at end of input decodes as invalid below.
            self.fill(self.off + width);
        }
        let rest = &self.buffer.window()[self.off..];
        let encoded = &rest[..width.min(rest.len())];
        match std::str::from_utf8(encoded).ok().and_then(|s| s.chars().next()) {
            Some(c) => Some((c, encoded.len())),
            None => Some((char::REPLACEMENT_CHARACTER, 1)),
        }
    }

    /// Consume and return the next code point, or `None` at end of input.
    pub fn advance(&mut self) -> Option<char> {
        let (c, len) = self.decode()?;
        self.off += len;
        Some(c)
    }

    /// Return the next code point without consuming it.
    pub fn peek(&mut self) -> Option<char> {
        self.decode().map(|(c, _)| c)
    }

    /// Return the next raw byte without consuming it.
    pub fn peek_byte(&mut self) -> Option<u8> {
        if self.fill(self.off + 1) {
            Some(self.buffer.window()[self.off])
        } else {
            None
        }
    }

    /// Consume `n` bytes, typically a length measured by a recognizer.
    ///
    /// Stops early at end of input.
    pub fn advance_by(&mut self, n: usize) {
        self.fill(self.off + n);
        self.off = (self.off + n).min(self.buffer.window().len());
    }

    /// Returns `true` if no byte is left after the cursor.
    pub fn is_eof(&mut self) -> bool {
        !self.fill(self.off + 1)
    }

    /// The in-progress lexeme: bytes consumed since the last token.
    #[inline]
    pub fn cursor(&self) -> &[u8] {
        &self.buffer.window()[..self.off]
    }

    /// The in-progress lexeme as text, with invalid UTF-8 replaced.
    pub fn cursor_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.cursor())
    }

    /// Loaded bytes after the cursor. May be shorter than the rest of the
    /// input; use the recognizers or [`peek_byte`](Self::peek_byte) to
    /// scan past the loaded window.
    pub fn remaining(&self) -> &[u8] {
        &self.buffer.window()[self.off..]
    }

    /// Length of the quoted string starting at the cursor, delimiters
    /// included.
    ///
    /// The string may be delimited by `"`, `'` or `` ` ``; a backslash
    /// escapes the byte after it, so an escaped delimiter does not close the
    /// string. Returns 0 if the cursor is not on a delimiter. An unterminated
    /// string yields the length up to end of input: callers that need a
    /// closed string must check that the measured lexeme ends with its
    /// opening delimiter.
    pub fn lex_string(&mut self) -> usize {
        let Some(quote) = self.peek_byte().filter(|&b| is_quote(b)) else {
            return 0;
        };
        let mut len = 1;
        let mut escaped = false;
        loop {
            let window = &self.buffer.window()[self.off..];
            while len < window.len() {
                let b = window[len];
                len += 1;
                if escaped {
                    escaped = false;
                } else if b == quote {
                    return len;
                } else if b == b'\\' {
                    escaped = true;
                }
            }
            if !self.fill(self.off + len + 1) {
                return len;
            }
        }
    }

    /// Length of the identifier run at the cursor: ASCII letters,
    /// underscores and hyphens. Returns 0 if there is none.
    pub fn lex_ident(&mut self) -> usize {
        let mut len = 0;
        loop {
            let window = &self.buffer.window()[self.off..];
            while len < window.len() {
                if !IDENT[usize::from(window[len])] {
                    return len;
                }
                len += 1;
            }
            if !self.fill(self.off + len + 1) {
                return len;
            }
        }
    }

    /// Run `table` from the cursor, starting in state 0.
    ///
    /// Returns the accepting state and the number of bytes it matched. The
    /// scan stops, without matching the byte, at a transition into the
    /// final state, at a byte with no transition, or at end of input.
    pub fn scan_with_table(&mut self, table: &TransitionTable) -> (u8, usize) {
        let final_state = table.final_state();
        let mut state = 0;
        let mut len = 0;
        while self.fill(self.off + len + 1) {
            let byte = self.buffer.window()[self.off + len];
            match table.transition(state, byte) {
                Some(next) if next != final_state => {
                    state = next;
                    len += 1;
                }
                _ => break,
            }
        }
        (state, len)
    }

    /// Name of the source currently being scanned.
    pub fn filename(&self) -> Option<&Arc<str>> {
        self.name.as_ref()
    }

    /// Absolute byte offset of the in-progress lexeme.
    #[inline]
    pub fn token_offset(&self) -> usize {
        self.buffer.offset()
    }

    /// Resolve a byte offset of the current source into a [`Position`].
    ///
    /// Cost is proportional to the distance scanned since the last buffer
    /// compaction; keep it off the hot path.
    pub fn locate(&self, offset: usize) -> Position {
        let (line, column) = self.buffer.line_column(offset);
        Position {
            filename: self.name.clone(),
            offset,
            line,
            column,
        }
    }

    /// Position of the in-progress lexeme.
    pub fn position(&self) -> Position {
        self.locate(self.token_offset())
    }

    /// The sticky read (or open) failure of the current source, if any.
    pub fn error(&self) -> Option<&io::Error> {
        self.buffer.error()
    }

    /// Take the sticky failure of the current source.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.buffer.take_error()
    }

    /// Finish the current lexeme, returning its offset and text.
    pub(crate) fn take_lexeme(&mut self) -> (usize, String) {
        let offset = self.buffer.offset();
        let lexeme = self.cursor_str().into_owned();
        self.discard();
        (offset, lexeme)
    }

    /// Drop the current lexeme without producing a token.
    pub(crate) fn discard(&mut self) {
        self.buffer.release(self.off);
        self.off = 0;
    }

    /// Switch to the next pending source. Returns `false` if there is none.
    pub(crate) fn next_source(&mut self) -> bool {
        let Some(source) = self.pending.pop_front() else {
            return false;
        };
        self.name = source.name();
        debug!(source = ?self.name, "switching to next source");
        self.buffer = source.open();
        self.off = 0;
        true
    }
}
