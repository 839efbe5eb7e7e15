//! # teeplex CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 参数与配置解析
//! - 日志初始化 (stderr)
//! - 中断信号处理与退出码映射

mod cli;
mod run;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use cli::Cli;
use run::{run_tee, EXIT_FAILURE};

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("teeplex: {e:#}");
        return ExitCode::from(EXIT_FAILURE);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "teeplex starting");

    let result = run(&cli);
    if let Err(ref e) = result {
        error!(error = %format!("{e:#}"), "Command failed");
    }
    result.unwrap_or(ExitCode::from(EXIT_FAILURE))
}

/// Drive the run on a tokio runtime
///
/// A pending terminal read occupies a blocking thread that cannot be
/// interrupted, so the runtime is shut down in the background instead of
/// waiting for it.
fn run(cli: &Cli) -> Result<ExitCode> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;

    let result = runtime.block_on(run_tee(cli));
    runtime.shutdown_background();
    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let (default_log_level, ignore_env) = if cli.quiet {
        ("error", true)
    } else {
        let level = match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        (level, false)
    };

    observability::init_with_config(observability::ObservabilityConfig {
        log_format: cli.log_format.into(),
        default_log_level: default_log_level.to_string(),
        ignore_env,
    })
}
