//! LVP prober entry point.
//!
//! Loads configuration from the environment, initialises structured
//! logging, opens the session log, and runs the probe loop until Ctrl+C.

use anyhow::Result;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lvp_prober::catalog::Catalog;
use lvp_prober::client::{EaClient, PriceSource};
use lvp_prober::clock::SystemClock;
use lvp_prober::config::ProberConfig;
use lvp_prober::prober::Prober;
use lvp_prober::recorder::Recorder;
use lvp_prober::session_log::SessionLog;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = ProberConfig::from_env()?;

    init_logging();

    let catalog = Catalog::default();

    println!("Starting ICE EA LVP Test Requester");
    println!("EA URL: {}", cfg.ea_url);
    println!("Request interval: {}s", cfg.request_interval_secs);
    println!("Testing {} pairs", catalog.len());
    println!("{}", "-".repeat(60));

    // Failing to open the session log is the one fatal error.
    let session = SessionLog::create(&cfg.log_dir, Utc::now())?;

    let client = EaClient::new(cfg.ea_url.clone(), cfg.request_timeout)?;
    info!(
        ea_url = %client.endpoint(),
        interval_secs = cfg.request_interval_secs,
        pairs = catalog.len(),
        log = %session.path().display(),
        "LVP prober starting up"
    );

    let mut prober = Prober::new(
        Box::new(client),
        Box::new(SystemClock),
        catalog,
        Recorder::new(session),
        cfg.pacing(),
    );

    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received.");
                token.cancel();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
        }
    });

    let cycles = prober.run(shutdown).await;
    info!(cycles, "LVP prober stopped.");

    Ok(())
}

/// Initialise the `tracing` subscriber.
///
/// Diagnostics go to stderr; stdout carries the record stream.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lvp_prober=info"));

    let json_logging = std::env::var("LVP_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
