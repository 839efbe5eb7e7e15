//! Dispatcher - main loop pumping input into the sinks

use contracts::{ContractError, DataSink, ReadMode, TeeConfig};
use ingestion::InputStream;
use tokio::io::{AsyncRead, AsyncWrite, Stdout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::passthrough::Passthrough;
use crate::sink_set::{SinkReport, SinkSet};
use crate::sinks::FileSink;

/// Dispatcher lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Built, loop not entered yet
    Idle,
    /// Reading and dispatching
    Running,
    /// Input exhausted, final flush in progress
    Draining,
    /// Outputs flushed and closed
    Terminated,
}

/// Why the main loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Input reached end of stream
    EndOfInput,
    /// Shutdown was requested through the cancellation token
    Interrupted,
    /// Reading the input failed
    ReadFailed,
    /// Writing the console passthrough failed
    PassthroughFailed,
}

impl RunOutcome {
    /// Whether the process should report success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::EndOfInput | Self::Interrupted)
    }
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Chunks dispatched
    pub chunks: u64,
    /// Bytes dispatched
    pub bytes: u64,
    pub sinks: Vec<SinkReport>,
}

/// Builder for creating a Dispatcher over file sinks and stdout
pub struct DispatcherBuilder<R> {
    config: TeeConfig,
    input: InputStream<R>,
    interactive: bool,
    cancel: CancellationToken,
}

impl<R: AsyncRead + Unpin + Send> DispatcherBuilder<R> {
    /// Create a new DispatcherBuilder
    pub fn new(config: TeeConfig, input: InputStream<R>) -> Self {
        Self {
            config,
            input,
            interactive: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Whether the input is an interactive terminal
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Token that stops the main loop when cancelled
    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Open the outputs and build the dispatcher
    ///
    /// Output files that cannot be opened are left out; the dispatcher
    /// itself refuses to run when none remain.
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(outputs = self.config.outputs.len())
    )]
    pub async fn build(self) -> Dispatcher<R, FileSink, Stdout> {
        let mode = self.config.resolve_read_mode(self.interactive);
        let sinks = SinkSet::open_all(&self.config.outputs, self.config.append).await;
        let passthrough = self.config.passthrough.then(Passthrough::stdout);

        Dispatcher::new(self.input, mode, sinks, passthrough, self.cancel)
    }
}

/// The main Dispatcher that fans out input chunks to sinks
pub struct Dispatcher<R, S = FileSink, W = Stdout> {
    input: InputStream<R>,
    mode: ReadMode,
    sinks: SinkSet<S>,
    passthrough: Option<Passthrough<W>>,
    cancel: CancellationToken,
    state: DispatcherState,
}

impl<R, S, W> Dispatcher<R, S, W>
where
    R: AsyncRead + Unpin + Send,
    S: DataSink,
    W: AsyncWrite + Unpin + Send,
{
    /// Create a dispatcher from already built parts
    pub fn new(
        input: InputStream<R>,
        mode: ReadMode,
        sinks: SinkSet<S>,
        passthrough: Option<Passthrough<W>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            input,
            mode,
            sinks,
            passthrough,
            cancel,
            state: DispatcherState::Idle,
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn mode(&self) -> ReadMode {
        self.mode
    }

    pub fn sinks(&self) -> &SinkSet<S> {
        &self.sinks
    }

    pub fn passthrough(&self) -> Option<&Passthrough<W>> {
        self.passthrough.as_ref()
    }

    /// Run the dispatcher main loop
    ///
    /// Returns once input is exhausted, shutdown is requested, or a fatal
    /// error occurs; every path ends with the passthrough flushed and all
    /// sinks closed.
    ///
    /// # Errors
    /// `NoSinksAvailable` when no sink is active; nothing is read in that
    /// case.
    #[instrument(name = "dispatcher_run", skip(self), fields(mode = ?self.mode))]
    pub async fn run(&mut self) -> Result<RunReport, ContractError> {
        if self.sinks.active_count() == 0 {
            error!("No valid files to save to");
            self.sinks.close_all().await;
            self.state = DispatcherState::Terminated;
            return Err(ContractError::NoSinksAvailable);
        }

        info!(sinks = self.sinks.len(), "Dispatcher started");
        self.state = DispatcherState::Running;

        let mode = self.mode;
        let mut chunks: u64 = 0;
        let mut bytes: u64 = 0;

        let outcome = loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break RunOutcome::Interrupted,
                next = self.input.next_chunk(mode) => next,
            };

            let chunk = match next {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break RunOutcome::EndOfInput,
                Err(e) => {
                    error!(error = %e, "Input read failed");
                    break RunOutcome::ReadFailed;
                }
            };

            let dispatched = self.sinks.dispatch(chunk.as_bytes()).await;
            if dispatched.failed > 0 && self.sinks.active_count() == 0 {
                warn!("All output files failed, input is still consumed");
            }

            chunks += 1;
            bytes += chunk.len() as u64;
            observability::record_chunk_dispatched(chunk.len());

            if let Some(passthrough) = self.passthrough.as_mut() {
                if let Err(e) = passthrough.write(chunk.as_bytes()).await {
                    error!(error = %e, "Passthrough failed");
                    break RunOutcome::PassthroughFailed;
                }
            }

            if chunks.is_multiple_of(100) {
                debug!(chunks, bytes, "Dispatcher progress");
            }
        };

        if outcome == RunOutcome::EndOfInput {
            self.state = DispatcherState::Draining;
        }
        info!(?outcome, chunks, bytes, "Dispatcher input closed, shutting down");

        self.finish().await;

        Ok(RunReport {
            outcome,
            chunks,
            bytes,
            sinks: self.sinks.reports(),
        })
    }

    /// Final flush of the passthrough and close of every sink
    async fn finish(&mut self) {
        if let Some(passthrough) = self.passthrough.as_mut() {
            if let Err(e) = passthrough.flush().await {
                warn!(error = %e, "Passthrough flush failed on shutdown");
            }
        }
        self.sinks.close_all().await;
        self.state = DispatcherState::Terminated;
        info!("Dispatcher shutdown complete");
    }
}
