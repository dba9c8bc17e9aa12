//! Input sources a scanner can read from.

use crate::source_buffer::SourceBuffer;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// One logical input.
///
/// Files are opened lazily by [`Source::open`] so a sequence of files holds
/// at most one open handle at a time.
pub enum Source {
    /// A file, streamed through the sliding window.
    File(PathBuf),
    /// Text already in memory.
    Text {
        name: Option<String>,
        text: String,
    },
    /// Any byte producer, streamed through the sliding window.
    Reader {
        name: Option<String>,
        reader: Box<dyn Read>,
    },
}

impl Source {
    /// An unnamed in-memory source.
    pub fn text(text: impl Into<String>) -> Self {
        Source::Text {
            name: None,
            text: text.into(),
        }
    }

    /// An unnamed reader source.
    pub fn reader(reader: impl Read + 'static) -> Self {
        Source::Reader {
            name: None,
            reader: Box::new(reader),
        }
    }

    /// The name positions should report for this source.
    pub fn name(&self) -> Option<Arc<str>> {
        match self {
            Source::File(path) => Some(Arc::from(path.to_string_lossy().as_ref())),
            Source::Text { name, .. } | Source::Reader { name, .. } => {
                name.as_deref().map(Arc::from)
            }
        }
    }

    /// Turn the source into a buffer.
    ///
    /// Open failures do not fail here: they produce a buffer whose sticky
    /// error surfaces through the scanner like any read failure.
    pub fn open(self) -> SourceBuffer {
        match self {
            Source::File(path) => match File::open(&path) {
                Ok(file) => SourceBuffer::from_reader(file),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "cannot open source file");
                    SourceBuffer::failed(e)
                }
            },
            Source::Text { text, .. } => SourceBuffer::from_bytes(text),
            Source::Reader { reader, .. } => SourceBuffer::from_reader(reader),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => f.debug_tuple("File").field(path).finish(),
            Source::Text { name, text } => f
                .debug_struct("Text")
                .field("name", name)
                .field("len", &text.len())
                .finish(),
            Source::Reader { name, .. } => {
                f.debug_struct("Reader").field("name", name).finish_non_exhaustive()
            }
        }
    }
}
