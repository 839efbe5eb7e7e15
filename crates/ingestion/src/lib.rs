//! # Ingestion
//!
//! Input stream module.
//!
//! Responsibilities:
//! - Wrap the single process input in one buffered reader
//! - Provide the line and chunk read primitives
//! - Pick the read strategy from the kind of input attached
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{stdin_is_terminal, InputStream};
//! use contracts::TeeConfig;
//!
//! let config = TeeConfig::default();
//! let mode = config.resolve_read_mode(stdin_is_terminal());
//! let mut input = InputStream::stdin();
//! while let Some(chunk) = input.next_chunk(mode).await? {
//!     // Dispatch chunk
//! }
//! ```

mod input;
mod mode;

pub use contracts::{Chunk, ReadMode};
pub use input::{InputStream, Line, DEFAULT_BUFFER_CAPACITY};
pub use mode::stdin_is_terminal;
