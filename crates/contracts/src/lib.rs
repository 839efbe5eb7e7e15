//! # Contracts
//!
//! Shared interface contracts between the teeplex crates: the data that flows
//! from the input stream to the sinks, the run configuration, the sink trait
//! and the unified error type.
//!
//! All business crates depend only on this crate, never on each other's
//! internals.

mod chunk;
mod config;
mod error;
mod sink;

pub use chunk::*;
pub use config::*;
pub use error::*;
pub use sink::*;
