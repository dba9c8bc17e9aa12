//! Sliding-window source buffer.
//!
//! The buffer owns the raw input bytes. In-memory sources are loaded whole
//! at construction; reader-backed sources are pulled in chunks by
//! [`SourceBuffer::extend`]. Bytes before the window start have already been
//! consumed by the scanner (the *rearview*), bytes after it are the *window*.
//!
//! # Layout
//!
//! ```text
//! [consumed..., window..., free...]
//!  ^            ^          ^       ^
//!  0            start      end     buf.len()
//! ```
//!
//! # Growth
//!
//! `extend` always reads into at least [`MIN_READ`] bytes of free tail. When
//! the tail is shorter than that, the consumed prefix is compacted away; if
//! that still leaves too little room the allocation doubles, with a floor of
//! [`MIN_BUFFER`]. Reallocation is amortized O(1) per byte scanned.
//!
//! Compaction drops rearview bytes, so their newline count and trailing
//! column are folded into a carry first. Position recovery stays exact no
//! matter how often the window slides.

use memchr::{memchr_iter, memrchr};
use std::fmt;
use std::io::{self, Read};
use tracing::trace;

/// Smallest allocation made for a reader-backed buffer.
pub const MIN_BUFFER: usize = 8 * 1024;

/// Smallest free tail handed to a single `read` call.
pub const MIN_READ: usize = 512;

/// Line and column reached at the end of the bytes folded so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct LineCarry {
    /// Newlines seen.
    lines: usize,
    /// Characters after the last newline.
    column: usize,
}

impl LineCarry {
    fn fold(&mut self, bytes: &[u8]) {
        match memrchr(b'\n', bytes) {
            Some(last) => {
                self.lines += memchr_iter(b'\n', bytes).count();
                self.column = count_chars(&bytes[last + 1..]);
            }
            None => self.column += count_chars(bytes),
        }
    }
}

/// Count UTF-8 code points by skipping continuation bytes.
///
/// Invalid sequences count one column per non-continuation byte, which
/// matches how the scanner advances over them.
fn count_chars(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b & 0xC0 != 0x80).count()
}

/// Owned input bytes with a zero-copy window over the unconsumed suffix.
pub struct SourceBuffer {
    /// Allocation; only `..end` holds source bytes.
    buf: Vec<u8>,
    /// Window start. Everything before it is rearview.
    start: usize,
    /// End of the bytes read so far.
    end: usize,
    /// Absolute source offset of `buf[0]` (grows on compaction).
    base: usize,
    /// Line/column of the bytes discarded by compaction.
    carry: LineCarry,
    /// Incremental reader; `None` once the input is fully loaded.
    reader: Option<Box<dyn Read>>,
    /// Sticky read failure.
    error: Option<io::Error>,
}

impl SourceBuffer {
    /// Create a fully materialized buffer. [`extend`](Self::extend) is a no-op.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let buf = bytes.into();
        let end = buf.len();
        SourceBuffer {
            buf,
            start: 0,
            end,
            base: 0,
            carry: LineCarry::default(),
            reader: None,
            error: None,
        }
    }

    /// Create an empty buffer that pulls its content from `reader` on demand.
    pub fn from_reader(reader: impl Read + 'static) -> Self {
        SourceBuffer {
            reader: Some(Box::new(reader)),
            ..SourceBuffer::from_bytes(Vec::new())
        }
    }

    /// Create an empty buffer for a source that could not be opened.
    ///
    /// The error is reported by [`take_error`](Self::take_error) exactly as a
    /// read failure would be.
    pub fn failed(error: io::Error) -> Self {
        SourceBuffer {
            error: Some(error),
            ..SourceBuffer::from_bytes(Vec::new())
        }
    }

    /// Unconsumed bytes currently loaded.
    #[inline]
    pub fn window(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    /// Consumed bytes still held in memory.
    ///
    /// Only the suffix since the last compaction survives; use
    /// [`line_column`](Self::line_column) for positions.
    pub fn rearview(&self) -> &[u8] {
        &self.buf[..self.start]
    }

    /// Mark the first `n` window bytes as consumed.
    #[inline]
    pub fn release(&mut self, n: usize) {
        debug_assert!(
            n <= self.end - self.start,
            "release past window end ({n} > {})",
            self.end - self.start
        );
        self.start = (self.start + n).min(self.end);
    }

    /// Absolute source offset of the window start.
    #[inline]
    pub fn offset(&self) -> usize {
        self.base + self.start
    }

    /// Returns `true` once no further bytes can arrive.
    pub fn is_exhausted(&self) -> bool {
        self.reader.is_none()
    }

    /// The sticky read failure, if any.
    pub fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    /// Take the sticky read failure, leaving the buffer exhausted but clean.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Pull more input into the window.
    ///
    /// Returns the number of bytes added. Returns 0 once the reader reported
    /// end-of-input or failed, and on every call after that; the reader is
    /// dropped at that point so any file handle closes early.
    pub fn extend(&mut self) -> usize {
        if self.reader.is_none() {
            return 0;
        }
        self.make_room();

        let Some(reader) = self.reader.as_mut() else {
            return 0;
        };
        let result = loop {
            match reader.read(&mut self.buf[self.end..]) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => break other,
            }
        };

        match result {
            Ok(0) => {
                trace!(offset = self.base + self.end, "source exhausted");
                self.reader = None;
                0
            }
            Ok(n) => {
                self.end += n;
                trace!(read = n, window = self.end - self.start, "extended source window");
                n
            }
            Err(e) => {
                trace!(error = %e, "source read failed");
                self.error = Some(e);
                self.reader = None;
                0
            }
        }
    }

    /// Guarantee at least [`MIN_READ`] free bytes after `end`.
    fn make_room(&mut self) {
        if self.buf.len() - self.end >= MIN_READ {
            return;
        }
        if self.start > 0 {
            self.compact();
        }
        if self.buf.len() - self.end < MIN_READ {
            let grown = (self.buf.len() * 2).max(MIN_BUFFER);
            trace!(from = self.buf.len(), to = grown, "growing source buffer");
            self.buf.resize(grown, 0);
        }
    }

    /// Shift the window to the front of the allocation.
    fn compact(&mut self) {
        trace!(dropped = self.start, live = self.end - self.start, "compacting source buffer");
        self.carry.fold(&self.buf[..self.start]);
        self.buf.copy_within(self.start..self.end, 0);
        self.base += self.start;
        self.end -= self.start;
        self.start = 0;
    }

    /// 1-based line and column of the absolute source `offset`.
    ///
    /// O(distance from the last compaction). Offsets inside the discarded
    /// prefix clamp to the compaction point; offsets past the loaded bytes
    /// clamp to the end of the window.
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        let rel = offset.saturating_sub(self.base).min(self.end);
        let mut carry = self.carry;
        carry.fold(&self.buf[..rel]);
        (carry.lines + 1, carry.column + 1)
    }
}

impl fmt::Debug for SourceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceBuffer")
            .field("offset", &self.offset())
            .field("window", &self.window().len())
            .field("capacity", &self.buf.len())
            .field("exhausted", &self.is_exhausted())
            .field("error", &self.error)
            .finish()
    }
}
