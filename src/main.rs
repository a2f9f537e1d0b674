use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use smokebox::config::app_config::{AppConfig, Overrides, load_config};
use smokebox::error::Result;
use smokebox::http_probe::probe::build_client;
use smokebox::suite::{execute, exit_status};

#[derive(Parser)]
#[command(
    name = "smokebox",
    about = "Smoke-test a deployed web platform: health gate, page probes, CI report",
    version
)]
struct Cli {
    /// Base URL to test (default: $BASE_URL, then http://localhost:3000)
    base_url: Option<String>,

    /// YAML suite file overriding the built-in probes and timings
    #[arg(long, env = "SMOKE_CONFIG")]
    config: Option<PathBuf>,

    /// Where to write the JSON report in CI mode
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the JSON report even when $CI is not set
    #[arg(long)]
    ci: bool,

    /// Call out probes slower than this many milliseconds
    #[arg(long)]
    slow_threshold_ms: Option<u64>,

    /// Log progress to stderr
    #[arg(long, short)]
    verbose: bool,
}

async fn run(config: AppConfig) -> Result<bool> {
    let client = build_client()?;
    execute(&config, &client, &mut std::io::stdout()).await
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            tracing::warn!("Failed to register signal handlers");
            return std::future::pending().await;
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match load_config(Overrides {
        base_url: cli.base_url,
        config_file: cli.config,
        report_path: cli.report,
        force_ci: cli.ci,
        slow_threshold_ms: cli.slow_threshold_ms,
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        result = run(config) => {
            if let Err(e) = &result {
                eprintln!("❌ {e}");
            }
            ExitCode::from(exit_status(&result))
        }
        _ = wait_for_shutdown_signal() => {
            eprintln!("❌ Interrupted, aborting smoke tests");
            ExitCode::FAILURE
        }
    }
}
