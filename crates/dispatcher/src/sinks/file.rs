//! FileSink - writes raw input bytes to one file

use contracts::{ContractError, DataSink};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, instrument, warn};

/// Sink that copies every chunk into a single file
///
/// Owns the file handle through its buffered writer. Each write is flushed
/// before returning, so nothing stays buffered between chunks.
pub struct FileSink {
    name: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    active: bool,
}

impl FileSink {
    /// Open `path` for writing
    ///
    /// | exists | append | result |
    /// |---|---|---|
    /// | no | any | created |
    /// | yes | true | opened, positioned at end |
    /// | yes | false | truncated to empty |
    ///
    /// The decision is made by a single open call, not by probing the path
    /// first.
    ///
    /// # Errors
    /// `ContractError::FileOpen` for permission problems, invalid paths and
    /// directories.
    #[instrument(name = "file_sink_open", skip(path), fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>, append: bool) -> Result<Self, ContractError> {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();

        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        let file = options
            .open(&path)
            .await
            .map_err(|e| ContractError::file_open(&name, e))?;

        debug!(sink = %name, append, "FileSink opened");

        Ok(Self {
            name,
            path,
            writer: Some(BufWriter::new(file)),
            active: true,
        })
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the handle has been released
    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    async fn write_through(&mut self, bytes: &[u8]) -> io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("sink is closed"))?;
        writer.write_all(bytes).await?;
        writer.flush().await
    }
}

impl DataSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, bytes),
        fields(sink = %self.name, len = bytes.len())
    )]
    async fn write(&mut self, bytes: &[u8]) -> Result<(), ContractError> {
        if let Err(e) = self.write_through(bytes).await {
            // Handle stays open until close
            self.active = false;
            error!(sink = %self.name, error = %e, "Write failed");
            return Err(ContractError::sink_write(&self.name, e));
        }
        Ok(())
    }

    #[instrument(name = "file_sink_flush", skip(self), fields(sink = %self.name))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        match self.writer.as_mut() {
            Some(writer) => writer
                .flush()
                .await
                .map_err(|e| ContractError::sink_write(&self.name, e)),
            None => Ok(()),
        }
    }

    #[instrument(name = "file_sink_close", skip(self), fields(sink = %self.name))]
    async fn close(&mut self) {
        let Some(mut writer) = self.writer.take() else {
            return;
        };

        // A failed sink may still hold part of the rejected chunk in its
        // buffer; it is released without flushing.
        if self.active {
            if let Err(e) = writer.flush().await {
                warn!(sink = %self.name, error = %e, "Flush failed on close");
            }
        }
        self.active = false;
        drop(writer);

        debug!(sink = %self.name, "FileSink closed");
    }
}
