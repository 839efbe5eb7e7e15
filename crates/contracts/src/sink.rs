//! DataSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for Sinks.

use crate::ContractError;

/// Byte output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(DataSink: Send)]
pub trait LocalDataSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Whether the sink still accepts writes
    ///
    /// Becomes `false` after the first failed write or after `close`,
    /// and never becomes `true` again.
    fn is_active(&self) -> bool;

    /// Write a chunk and flush it through to the destination
    ///
    /// # Errors
    /// Returns the write error; the sink is deactivated but its handle stays
    /// open until `close`.
    async fn write(&mut self, bytes: &[u8]) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Flush (best effort) and release the destination
    ///
    /// Calling it again is a no-op.
    async fn close(&mut self);
}
