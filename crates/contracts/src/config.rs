//! TeeConfig - resolved run configuration
//!
//! Built from defaults, an optional settings file, the environment and the
//! command line, in that order of priority.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ReadMode;

/// Default block size for chunked reads (bytes)
pub const DEFAULT_BLOCK_SIZE: usize = 2048;

/// Default longest line segment in line mode (bytes)
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

/// Largest accepted block size (1 MiB)
pub const MAX_BLOCK_SIZE: usize = 1024 * 1024;

/// How the read strategy is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadModeOverride {
    /// Line mode on a terminal, chunked mode otherwise
    #[default]
    Auto,
    /// Always line mode
    Line,
    /// Always chunked mode
    Chunk,
}

/// Complete configuration of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeeConfig {
    /// Output paths, in the order supplied
    #[serde(default)]
    pub outputs: Vec<PathBuf>,

    /// Append to existing files instead of truncating them
    #[serde(default)]
    pub append: bool,

    /// Mirror input to standard output
    #[serde(default = "default_passthrough")]
    pub passthrough: bool,

    /// Read strategy selection
    #[serde(default)]
    pub read_mode: ReadModeOverride,

    /// Block size for chunked reads
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Longest line segment in line mode
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
}

fn default_passthrough() -> bool {
    true
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_max_line_len() -> usize {
    DEFAULT_MAX_LINE_LEN
}

impl Default for TeeConfig {
    fn default() -> Self {
        Self {
            outputs: Vec::new(),
            append: false,
            passthrough: default_passthrough(),
            read_mode: ReadModeOverride::default(),
            block_size: default_block_size(),
            max_line_len: default_max_line_len(),
        }
    }
}

impl TeeConfig {
    /// Resolve the read mode given whether stdin is an interactive terminal
    pub fn resolve_read_mode(&self, stdin_is_terminal: bool) -> ReadMode {
        let line = match self.read_mode {
            ReadModeOverride::Auto => stdin_is_terminal,
            ReadModeOverride::Line => true,
            ReadModeOverride::Chunk => false,
        };

        if line {
            ReadMode::Line {
                max_line_len: self.max_line_len,
            }
        } else {
            ReadMode::Chunked {
                block_size: self.block_size,
            }
        }
    }
}
