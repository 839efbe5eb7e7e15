//! Layered error definitions
//!
//! Categorized by source: config / input / sink / passthrough

use std::io;

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sink Errors =====
    /// Output path looks like a glob pattern; no expansion is performed
    #[error("ignoring glob pattern path '{path}'")]
    GlobPattern { path: String },

    /// Output file could not be opened
    #[error("cannot open '{path}': {source}")]
    FileOpen {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Sink write error
    #[error("sink '{sink_name}' write error: {source}")]
    SinkWrite {
        sink_name: String,
        #[source]
        source: io::Error,
    },

    /// No output could be opened
    #[error("no valid files to write to")]
    NoSinksAvailable,

    // ===== Stream Errors =====
    /// Reading the input stream failed (end of stream is not an error)
    #[error("input read error: {0}")]
    Read(#[source] io::Error),

    /// Writing the console passthrough failed
    #[error("passthrough write error: {0}")]
    Passthrough(#[source] io::Error),

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create file open error
    pub fn file_open(path: impl Into<String>, source: io::Error) -> Self {
        Self::FileOpen {
            path: path.into(),
            source,
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, source: io::Error) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            source,
        }
    }
}
