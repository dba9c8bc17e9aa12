//! Readers that exercise the buffer refill paths.
//!
//! Built for this crate's tests and, with the `test-helpers` feature, for
//! downstream crates that drive a parser from streamed input.

use std::io::{self, Read};

/// Serves `data` at most `chunk` bytes per `read` call.
pub struct ChunkedReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl ChunkedReader {
    pub fn new(data: impl Into<Vec<u8>>, chunk: usize) -> Self {
        ChunkedReader {
            data: data.into(),
            pos: 0,
            chunk: chunk.max(1),
        }
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Serves `data`, then fails every read with `kind`.
pub struct FailingReader {
    data: Vec<u8>,
    served: bool,
    kind: io::ErrorKind,
}

impl FailingReader {
    pub fn new(data: impl Into<Vec<u8>>, kind: io::ErrorKind) -> Self {
        FailingReader {
            data: data.into(),
            served: false,
            kind,
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.served || self.data.is_empty() {
            return Err(io::Error::new(self.kind, "injected failure"));
        }
        self.served = true;
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data.drain(..n);
        self.served = self.data.is_empty();
        Ok(n)
    }
}

/// Fails the first read with `Interrupted`, then serves `data` in one go.
pub struct InterruptedOnce {
    data: Vec<u8>,
    interrupted: bool,
}

impl InterruptedOnce {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        InterruptedOnce {
            data: data.into(),
            interrupted: false,
        }
    }
}

impl Read for InterruptedOnce {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.interrupted {
            self.interrupted = true;
            return Err(io::ErrorKind::Interrupted.into());
        }
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data.drain(..n);
        Ok(n)
    }
}
