//! # Notary Relay
//!
//! Co-signs notary requests for the configured mint call and persists each
//! minted item's resource.
//!
//! ```text
//! notary-relay [CONFIG]
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use relay_runtime::logging::init_logging;
use relay_runtime::{RelayConfig, RelayRuntime};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "notary-relay", version, about)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(default_value = "relay.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = RelayConfig::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    init_logging(&config.logging)?;

    let runtime = RelayRuntime::new(config)?;
    let orchestrator = runtime.start().await?;

    tokio::select! {
        result = runtime.serve() => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server stopped");
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for ctrl-c")?;
            info!("Ctrl-C received");
        }
    }

    runtime.shutdown();
    if tokio::time::timeout(Duration::from_secs(2), orchestrator)
        .await
        .is_err()
    {
        info!("In-flight request abandoned");
    }
    info!("Shutdown complete");
    Ok(())
}
