//! cron-worker — standalone daemon running a heartbeat job on a cron
//! schedule.
//!
//! Mostly a smoke harness for the engine: arms one job that logs a tick,
//! then drains cleanly on SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use tracing::info;

use taktwerk_cron::{load_dotenv, Job, Scheduler, SchedulerConfig};

// ── CLI ─────────────────────────────────────────────────────────────

/// Recurring-job worker.
#[derive(Parser, Debug)]
#[command(name = "cron-worker", version, about)]
struct Cli {
    /// Cron expression for the heartbeat job.
    #[arg(long, env = "CRON_EXPR", default_value = "*/10 * * * * *")]
    expr: String,

    /// Shutdown timeout in seconds (overrides env-based config).
    #[arg(long, env = "CRON_SHUTDOWN_TIMEOUT")]
    shutdown_timeout: Option<u64>,
}

// ── Heartbeat job ───────────────────────────────────────────────────

struct HeartbeatJob;

#[async_trait]
impl Job for HeartbeatJob {
    fn name(&self) -> &str {
        "heartbeat"
    }

    async fn run(&self) -> anyhow::Result<()> {
        info!("tick");
        Ok(())
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();

    let mut config = SchedulerConfig::from_env();
    if let Some(secs) = cli.shutdown_timeout {
        config.shutdown_timeout = Duration::from_secs(secs);
    }
    config.log_summary();

    let scheduler = Scheduler::builder()
        .config(config)
        .bind(Arc::new(HeartbeatJob), cli.expr.clone())
        .build();
    scheduler.start()?;
    info!(expr = %cli.expr, "cron-worker started");

    shutdown_signal().await;
    info!("shutdown signal received, draining");
    let summary = scheduler.dispose().await;
    info!(?summary, "cron-worker exited cleanly");
    Ok(())
}

/// Wait for SIGINT or SIGTERM (Unix) or Ctrl+C elsewhere.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to register SIGINT");
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM");
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl_c");
    }
}
