//! Run the tee: resolve configuration, wire the dispatcher, map the outcome.

use std::process::ExitCode;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{ContractError, TeeConfig};
use dispatcher::{CancellationToken, DispatcherBuilder, RunReport, ShutdownController};
use ingestion::{stdin_is_terminal, InputStream};
use tracing::{debug, info, warn};

use crate::cli::Cli;

/// Exit status when no output could be opened or the run failed
pub const EXIT_FAILURE: u8 = 1;

/// Merge defaults, settings file and command line into one configuration
pub fn resolve_config(cli: &Cli) -> Result<TeeConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => TeeConfig::default(),
    };

    if !cli.outputs.is_empty() {
        config.outputs = cli.outputs.clone();
    }
    config.append |= cli.append;
    config.passthrough &= !cli.suppress;
    if let Some(mode) = cli.read_mode {
        config.read_mode = mode.into();
    }
    if let Some(block_size) = cli.block_size {
        config.block_size = block_size;
    }
    if let Some(max_line_len) = cli.max_line_len {
        config.max_line_len = max_line_len;
    }

    config_loader::validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Execute one run and return the process exit status
pub async fn run_tee(cli: &Cli) -> Result<ExitCode> {
    let config = resolve_config(cli)?;
    debug!(
        config = %serde_json::to_string(&config)?,
        "Configuration resolved"
    );

    if config.outputs.is_empty() {
        warn!("No files specified, see --help for usage");
    }

    let mut shutdown = ShutdownController::new(CancellationToken::new());
    shutdown.listen();

    let interactive = stdin_is_terminal();
    let mut dispatcher = DispatcherBuilder::new(config, InputStream::stdin())
        .interactive(interactive)
        .cancel_token(shutdown.token())
        .build()
        .await;

    info!(
        mode = ?dispatcher.mode(),
        interactive,
        sinks = dispatcher.sinks().len(),
        "Starting"
    );

    let result = dispatcher.run().await;
    shutdown.stop();

    match result {
        Ok(report) => {
            log_report(&report);
            if report.outcome.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(EXIT_FAILURE))
            }
        }
        Err(ContractError::NoSinksAvailable) => Ok(ExitCode::from(EXIT_FAILURE)),
        Err(e) => Err(e).context("Dispatcher failed"),
    }
}

fn log_report(report: &RunReport) {
    info!(
        outcome = ?report.outcome,
        chunks = report.chunks,
        bytes = report.bytes,
        "Run finished"
    );
    for sink in &report.sinks {
        debug!(
            sink = %sink.name,
            active = sink.active,
            writes = sink.metrics.write_count,
            bytes = sink.metrics.bytes_written,
            failures = sink.metrics.failure_count,
            "Sink summary"
        );
        if !sink.active && sink.metrics.failure_count > 0 {
            warn!(
                sink = %sink.name,
                bytes = sink.metrics.bytes_written,
                "Output file is incomplete"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use contracts::ReadModeOverride;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_resolve_config_flags() {
        let cli = Cli::try_parse_from(["teeplex", "-a", "-S", "--block-size", "16", "x"]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert!(config.append);
        assert!(!config.passthrough);
        assert_eq!(config.block_size, 16);
        assert_eq!(config.outputs, vec![PathBuf::from("x")]);
    }

    #[test]
    fn test_resolve_config_file_then_flags() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(b"outputs = [\"from_file.txt\"]\nread_mode = \"line\"\nblock_size = 64\n")
            .unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let path = path.as_str();

        let cli = Cli::try_parse_from(["teeplex", "-c", path]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.outputs, vec![PathBuf::from("from_file.txt")]);
        assert_eq!(config.read_mode, ReadModeOverride::Line);
        assert!(config.passthrough);

        let cli = Cli::try_parse_from([
            "teeplex",
            "-c",
            path,
            "--read-mode",
            "chunk",
            "--block-size",
            "128",
            "cli.txt",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.outputs, vec![PathBuf::from("cli.txt")]);
        assert_eq!(config.read_mode, ReadModeOverride::Chunk);
        assert_eq!(config.block_size, 128);
    }

    #[test]
    fn test_resolve_config_rejects_zero_block_size() {
        let cli = Cli::try_parse_from(["teeplex", "--block-size", "0", "x"]).unwrap();
        assert!(resolve_config(&cli).is_err());
    }
}
