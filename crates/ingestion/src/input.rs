//! InputStream - buffered reader over the process input
//!
//! Consumed incrementally and never rewound.

use bytes::Bytes;
use contracts::{Chunk, ContractError, ReadMode};
use metrics::counter;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader, Stdin};
use tracing::{trace, warn};

/// Internal buffer capacity of the reader
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// One logical line as returned by [`InputStream::read_line`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line content without its terminator
    pub data: Bytes,

    /// A `\n` terminator was consumed after `data`
    pub terminated: bool,

    /// The line hit the length limit; the remainder follows in later reads
    pub truncated: bool,
}

/// Single buffered reader over one input stream
pub struct InputStream<R> {
    reader: BufReader<R>,
    next_seq: u64,
    bytes_read: u64,
}

impl InputStream<Stdin> {
    /// Wrap the process's standard input
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

impl<R: AsyncRead + Unpin> InputStream<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY, reader)
    }

    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            next_seq: 0,
            bytes_read: 0,
        }
    }

    /// Total bytes handed out so far (terminators included)
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Number of chunks handed out by [`next_chunk`](Self::next_chunk)
    pub fn chunks_read(&self) -> u64 {
        self.next_seq
    }

    /// Read one logical line of at most `max_line_len` bytes
    ///
    /// Returns `Ok(None)` at end of stream. A final line without terminator
    /// is returned with `terminated == false`.
    pub async fn read_line(&mut self, max_line_len: usize) -> Result<Option<Line>, ContractError> {
        let max_line_len = max_line_len.max(1);
        let mut line = Vec::new();

        loop {
            let available = match self.reader.fill_buf().await {
                Ok(buf) => buf,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ContractError::Read(e)),
            };

            if available.is_empty() {
                if line.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(Line {
                    data: line.into(),
                    terminated: false,
                    truncated: false,
                }));
            }

            let room = max_line_len - line.len();
            // One extra byte so a terminator right at the limit still counts
            let window = &available[..available.len().min(room + 1)];

            if let Some(pos) = window.iter().position(|&b| b == b'\n') {
                line.extend_from_slice(&window[..pos]);
                self.reader.consume(pos + 1);
                return Ok(Some(Line {
                    data: line.into(),
                    terminated: true,
                    truncated: false,
                }));
            }

            if room == 0 {
                return Ok(Some(Line {
                    data: line.into(),
                    terminated: false,
                    truncated: true,
                }));
            }

            let taken = window.len().min(room);
            line.extend_from_slice(&window[..taken]);
            self.reader.consume(taken);
        }
    }

    /// Read up to `max_size` bytes
    ///
    /// Returns `Ok(None)` once the stream is exhausted.
    pub async fn read_chunk(&mut self, max_size: usize) -> Result<Option<Bytes>, ContractError> {
        let mut buf = vec![0u8; max_size.max(1)];

        let n = loop {
            match self.reader.read(&mut buf).await {
                Ok(n) => break n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ContractError::Read(e)),
            }
        };

        if n == 0 {
            return Ok(None);
        }

        buf.truncate(n);
        Ok(Some(Bytes::from(buf)))
    }

    /// Read the next chunk according to `mode`
    ///
    /// In line mode the `\n` is re-appended only when one was read, so the
    /// dispatched bytes always equal the input bytes.
    pub async fn next_chunk(&mut self, mode: ReadMode) -> Result<Option<Chunk>, ContractError> {
        let data = match mode {
            ReadMode::Line { max_line_len } => match self.read_line(max_line_len).await? {
                Some(line) => {
                    if line.truncated {
                        warn!(limit = max_line_len, "line too long, forwarding in parts");
                    }
                    if line.terminated {
                        let mut data = Vec::with_capacity(line.data.len() + 1);
                        data.extend_from_slice(&line.data);
                        data.push(b'\n');
                        Bytes::from(data)
                    } else {
                        line.data
                    }
                }
                None => return Ok(None),
            },
            ReadMode::Chunked { block_size } => match self.read_chunk(block_size).await? {
                Some(data) => data,
                None => return Ok(None),
            },
        };

        let chunk = Chunk::new(self.next_seq, data);
        self.next_seq += 1;
        self.bytes_read += chunk.len() as u64;
        counter!("teeplex_input_bytes_total").increment(chunk.len() as u64);
        trace!(seq = chunk.seq, len = chunk.len(), "Chunk read");

        Ok(Some(chunk))
    }
}
