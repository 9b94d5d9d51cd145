//! Roster RPC Server - JSON-RPC front end for a Roster registry.
//!
//! Serves register/unregister/discover/heartbeat over HTTP so processes that
//! cannot reach the registry directory directly can still take part, and runs
//! the expiry sweeper for the directory it serves.

mod handler;
mod server;

use anyhow::Result;
use clap::Parser;
use roster_core::{Registry, RegistryConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "roster-rpc")]
#[command(about = "JSON-RPC server for a Roster service registry")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// JSON configuration file (storage_root, sweep_interval_secs, ttl_secs)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding service records (overrides the config file)
    #[arg(long)]
    storage_root: Option<PathBuf>,

    /// Seconds without a heartbeat before a record is evicted
    #[arg(long)]
    ttl_secs: Option<u64>,

    /// Seconds between sweep passes
    #[arg(long)]
    sweep_interval_secs: Option<u64>,
}

impl Args {
    /// Merge the config file (if any) with command-line overrides.
    fn registry_config(&self) -> Result<RegistryConfig> {
        let mut config = match (&self.config, &self.storage_root) {
            (Some(path), _) => RegistryConfig::load(path)?,
            (None, Some(root)) => RegistryConfig::new(root),
            (None, None) => RegistryConfig::new(std::env::current_dir()?.join("roster-data")),
        };

        if let Some(root) = &self.storage_root {
            config.storage_root = root.clone();
        }
        if let Some(ttl) = self.ttl_secs {
            config.ttl = Duration::from_secs(ttl);
        }
        if let Some(interval) = self.sweep_interval_secs {
            config.sweep_interval = Duration::from_secs(interval);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting Roster RPC Server");

    let config = args.registry_config()?;
    info!("Storage root: {}", config.storage_root.display());

    let (registry, sweeper) = Registry::start(config)?;

    let addr = server::start_server(registry, &args.host, args.port).await?;

    // Parsed by supervisors and the integration tests
    println!("RPC_PORT={}", addr.port());

    info!("RPC server running on {}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping sweeper");
    sweeper.stop().await?;

    Ok(())
}
