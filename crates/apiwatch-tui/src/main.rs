//! `apiwatch-tui`: terminal dashboard for an API status monitoring service.
//!
//! Renders the [`Dashboard`](apiwatch_core::Dashboard) state: overview
//! counters, the monitored endpoint table, the selected endpoint's logs,
//! and forms for adding endpoints and bulk import. The dashboard polls the
//! service in the background while the view is open.
//!
//! Logs are written to a file (default `/tmp/apiwatch-tui.log`) so they
//! never corrupt the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use apiwatch_config::{Overrides, load_config, load_config_from};
use apiwatch_core::Dashboard;

use crate::app::App;

/// Terminal dashboard for monitoring API endpoints.
#[derive(Parser, Debug)]
#[command(name = "apiwatch-tui", version, about)]
struct Cli {
    /// Monitoring service base URL (e.g., http://localhost:8001)
    #[arg(short = 'u', long, env = "APIWATCH_API_BASE")]
    api_base: Option<String>,

    /// Seconds between background refreshes
    #[arg(short = 'i', long, value_name = "SECS")]
    interval: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Log entries fetched for the selected endpoint
    #[arg(long, value_name = "N")]
    log_limit: Option<u32>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    insecure: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the resolved configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Log file path (defaults to /tmp/apiwatch-tui.log)
    #[arg(long, default_value = "/tmp/apiwatch-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_base: self.api_base.clone(),
            poll_interval_secs: self.interval,
            timeout_secs: self.timeout,
            log_limit: self.log_limit,
            insecure: self.insecure,
        }
    }
}

/// Set up file-based tracing. Logging to stdout/stderr would corrupt the
/// TUI. The returned guard must live until exit so buffered lines flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "apiwatch_tui={log_level},apiwatch_core={log_level},apiwatch_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("apiwatch-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks first, so a panic during startup still restores the terminal
    tui::install_hooks()?;

    let overrides = cli.overrides();
    let config = match &cli.config {
        Some(path) => load_config_from(path, &overrides),
        None => load_config(&overrides),
    }
    .wrap_err("failed to load configuration")?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let _log_guard = setup_tracing(&cli);

    let dashboard_config = config.to_dashboard_config()?;
    info!(
        api_base = %dashboard_config.api_base,
        poll_interval = ?dashboard_config.poll_interval,
        "starting apiwatch-tui"
    );

    let poll_interval: Duration = dashboard_config.poll_interval;
    let dashboard = Dashboard::new(dashboard_config).wrap_err("failed to build HTTP client")?;
    let mut app = App::new(dashboard, poll_interval);
    app.run().await?;

    Ok(())
}
