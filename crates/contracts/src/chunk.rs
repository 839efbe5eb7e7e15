//! Chunk - InputStream output
//!
//! One unit of input handed to the dispatcher.

use bytes::Bytes;

/// A transient block of input bytes.
///
/// Either one line (line mode, terminator re-appended when one was read) or
/// a fixed-size block (chunked mode). Dropped after dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Sequence number, starting at 0 for the first chunk of the run
    pub seq: u64,

    /// Payload, written verbatim to every sink
    pub data: Bytes,
}

impl Chunk {
    pub fn new(seq: u64, data: impl Into<Bytes>) -> Self {
        Self {
            seq,
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Read strategy, fixed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// One logical line per read (interactive terminal input)
    Line {
        /// Longest line segment returned by a single read
        max_line_len: usize,
    },

    /// Fixed-size blocks (pipes, files, redirects)
    Chunked {
        /// Maximum bytes per read
        block_size: usize,
    },
}
