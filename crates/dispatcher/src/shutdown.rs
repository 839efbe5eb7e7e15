//! ShutdownController - turns an external interrupt into a cancellation
//!
//! The controller never touches sinks or the passthrough. It only cancels
//! the shared token; the dispatcher observes it between reads and runs the
//! flush/close sequence itself, so exactly one task ever writes, flushes or
//! closes a given resource.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, instrument, warn};

/// Listens for interrupt signals and requests a cooperative shutdown
pub struct ShutdownController {
    token: CancellationToken,
    listener: Option<JoinHandle<()>>,
}

impl ShutdownController {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            listener: None,
        }
    }

    /// Token observed by the dispatcher
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Start listening for Ctrl+C (and SIGTERM on unix)
    ///
    /// Must be called from within a tokio runtime. Calling it twice keeps
    /// the first listener.
    pub fn listen(&mut self) {
        if self.listener.is_some() {
            return;
        }
        let token = self.token.clone();
        self.listener = Some(tokio::spawn(async move {
            interrupt_listener(token).await;
        }));
    }

    /// Request shutdown without a signal
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop listening once the dispatcher has returned
    pub fn stop(mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

#[instrument(name = "shutdown_listener", skip(token))]
async fn interrupt_listener(token: CancellationToken) {
    tokio::select! {
        received = wait_for_interrupt() => match received {
            Ok(signal) => {
                warn!(signal, "got signal, finishing in-flight writes and closing outputs");
                token.cancel();
            }
            Err(e) => {
                error!(error = %e, "Failed to install interrupt handler");
            }
        },
        _ = token.cancelled() => {}
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn wait_for_interrupt() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.map(|()| "interrupt"),
            _ = terminate.recv() => Ok("terminate"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|()| "interrupt")
    }
}
