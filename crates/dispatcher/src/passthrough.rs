//! Passthrough - optional console copy of the input

use contracts::ContractError;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter, Stdout};

/// Buffered console output
///
/// Unlike a sink, a failure here is fatal to the run.
pub struct Passthrough<W = Stdout> {
    writer: BufWriter<W>,
}

impl Passthrough<Stdout> {
    /// Passthrough to the process's standard output
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> Passthrough<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Write a chunk and flush it
    pub async fn write(&mut self, bytes: &[u8]) -> Result<(), ContractError> {
        self.writer
            .write_all(bytes)
            .await
            .map_err(ContractError::Passthrough)?;
        self.flush().await
    }

    pub async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer.flush().await.map_err(ContractError::Passthrough)
    }

    /// Underlying writer
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}
