//! CLI argument definitions using clap.

use clap::{Parser, ValueEnum};
use contracts::ReadModeOverride;
use std::path::PathBuf;

/// teeplex - copy standard input to files and standard output
#[derive(Parser, Debug)]
#[command(
    name = "teeplex",
    author,
    version,
    about = "Copy standard input to one or more files and to standard output",
    long_about = "Takes standard input, saves it to files, and repeats it to standard output.\n\n\
                  A file that cannot be opened or written is skipped while the others keep \n\
                  receiving data. Ctrl+C flushes and closes every file before exiting.\n\n\
                  Example: some-command | teeplex -a file1.txt file2.txt"
)]
pub struct Cli {
    /// Output files, written in the order given
    #[arg(value_name = "FILE")]
    pub outputs: Vec<PathBuf>,

    /// Append to files if they already exist instead of truncating them
    #[arg(short, long)]
    pub append: bool,

    /// Do not forward standard input to standard output
    #[arg(short = 'S', long)]
    pub suppress: bool,

    /// Settings file (TOML or JSON) providing defaults
    #[arg(short, long, env = "TEEPLEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// How input is read: line by line, in fixed blocks, or chosen from the input kind
    #[arg(long, value_enum, env = "TEEPLEX_READ_MODE")]
    pub read_mode: Option<ReadModeArg>,

    /// Block size in bytes for chunked reads
    #[arg(long, env = "TEEPLEX_BLOCK_SIZE")]
    pub block_size: Option<usize>,

    /// Longest line segment in bytes for line reads
    #[arg(long, env = "TEEPLEX_MAX_LINE_LEN")]
    pub max_line_len: Option<usize>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, env = "TEEPLEX_VERBOSE")]
    pub verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        env = "TEEPLEX_LOG_FORMAT"
    )]
    pub log_format: LogFormat,
}

/// Read strategy selection
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadModeArg {
    /// Line mode on a terminal, chunked otherwise
    Auto,
    /// Always read line by line
    Line,
    /// Always read fixed-size blocks
    Chunk,
}

impl From<ReadModeArg> for ReadModeOverride {
    fn from(arg: ReadModeArg) -> Self {
        match arg {
            ReadModeArg::Auto => Self::Auto,
            ReadModeArg::Line => Self::Line,
            ReadModeArg::Chunk => Self::Chunk,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
