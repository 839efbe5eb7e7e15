//! SinkSet - ordered collection of sinks with fan-out writes

use std::path::Path;

use contracts::{ContractError, DataSink};
use tracing::{debug, info, instrument, warn};

use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::sinks::FileSink;

/// Characters that make a path look like a shell glob
const GLOB_METACHARACTERS: [char; 3] = ['*', '?', '['];

/// Whether `path` contains a glob metacharacter
///
/// No expansion is performed on output paths, so such paths are refused
/// rather than creating a file literally named `*.log`.
pub fn is_glob_pattern(path: &Path) -> bool {
    path.to_string_lossy()
        .chars()
        .any(|c| GLOB_METACHARACTERS.contains(&c))
}

struct SinkEntry<S> {
    sink: S,
    metrics: SinkMetrics,
}

/// Result of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Sinks that accepted the chunk
    pub delivered: usize,
    /// Sinks that failed on this chunk and were deactivated
    pub failed: usize,
    /// Sinks skipped because they were already inactive
    pub skipped: usize,
}

/// Final state of one sink (for reporting)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReport {
    pub name: String,
    pub active: bool,
    pub metrics: MetricsSnapshot,
}

/// Insertion-ordered collection of sinks
///
/// Write order across sinks follows insertion order; there is no atomicity
/// across sinks.
pub struct SinkSet<S = FileSink> {
    entries: Vec<SinkEntry<S>>,
    closed: bool,
}

impl<S> Default for SinkSet<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            closed: false,
        }
    }
}

impl SinkSet<FileSink> {
    /// Open one output file and append it to the set
    ///
    /// # Errors
    /// - `GlobPattern` when the path contains a glob metacharacter
    /// - `FileOpen` when the file cannot be opened
    ///
    /// Neither error is fatal to the run; the path is simply left out.
    #[instrument(name = "sink_set_add_sink", skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn add_sink(
        &mut self,
        path: impl AsRef<Path>,
        append: bool,
    ) -> Result<&FileSink, ContractError> {
        let path = path.as_ref();
        if is_glob_pattern(path) {
            warn!(path = %path.display(), "Ignoring globbing path");
            return Err(ContractError::GlobPattern {
                path: path.display().to_string(),
            });
        }

        match FileSink::open(path, append).await {
            Ok(sink) => {
                observability::record_sink_opened(true);
                self.push(sink);
                Ok(&self.entries[self.entries.len() - 1].sink)
            }
            Err(e) => {
                observability::record_sink_opened(false);
                warn!(path = %path.display(), error = %e, "Problem opening output file");
                Err(e)
            }
        }
    }

    /// Open every path in order, leaving out the ones that fail
    #[instrument(name = "sink_set_open_all", skip(paths), fields(requested = paths.len()))]
    pub async fn open_all<P: AsRef<Path>>(paths: &[P], append: bool) -> Self {
        let mut set = Self::new();
        for path in paths {
            // Failures are logged by add_sink
            let _ = set.add_sink(path, append).await;
        }
        info!(
            requested = paths.len(),
            opened = set.len(),
            append,
            "Output files opened"
        );
        set
    }
}

impl<S: DataSink> SinkSet<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already opened sink
    pub fn push(&mut self, sink: S) {
        debug!(sink = %sink.name(), position = self.entries.len(), "Sink added");
        self.entries.push(SinkEntry {
            sink,
            metrics: SinkMetrics::new(),
        });
    }

    /// Number of sinks, active or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of sinks still accepting writes
    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| e.sink.is_active()).count()
    }

    /// Sink names in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.sink.name()).collect()
    }

    /// Write `bytes` to every active sink, in insertion order
    ///
    /// A failing sink is deactivated and the loop moves on; nothing here
    /// stops delivery to the remaining sinks.
    pub async fn dispatch(&mut self, bytes: &[u8]) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        for entry in &mut self.entries {
            if !entry.sink.is_active() {
                outcome.skipped += 1;
                continue;
            }

            match entry.sink.write(bytes).await {
                Ok(()) => {
                    entry.metrics.record_write(bytes.len());
                    observability::record_sink_write(entry.sink.name(), true);
                    outcome.delivered += 1;
                }
                Err(e) => {
                    entry.metrics.inc_failure_count();
                    observability::record_sink_write(entry.sink.name(), false);
                    observability::record_sink_deactivated(entry.sink.name());
                    warn!(
                        sink = %entry.sink.name(),
                        error = %e,
                        "Sink deactivated after write failure"
                    );
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }

    /// Close every sink in insertion order, active or not
    ///
    /// Only the first call does anything.
    #[instrument(name = "sink_set_close_all", skip(self), fields(sinks = self.entries.len()))]
    pub async fn close_all(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        for entry in &mut self.entries {
            entry.sink.close().await;
        }
        debug!("All sinks closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Per-sink state and metrics
    pub fn reports(&self) -> Vec<SinkReport> {
        self.entries
            .iter()
            .map(|e| SinkReport {
                name: e.sink.name().to_string(),
                active: e.sink.is_active(),
                metrics: e.metrics.snapshot(),
            })
            .collect()
    }
}
