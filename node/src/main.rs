//! TraceLink Node - supply-chain ledger engine node.
//!
//! Wires storage, the commit-substrate client, and the ledger engine
//! together from configuration, seeds first-run data when asked to, keeps a
//! background health probe running, and shuts down cleanly on ctrl-c.

use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tracelink_config::{NodeConfig, StorageBackend};
use tracelink_ledger::LedgerEngine;
use tracelink_persistence::{KvStore, MemoryStore, RocksDbStore};
use tracelink_substrate::{CommitClient, HttpCommitClient, InProcessCommitClient};

mod config;
mod health;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let matches = Command::new("tracelink-node")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tamper-evident supply-chain ledger node")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML configuration file"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Override the storage directory"),
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .value_name("URL")
                .help("Commit/ordering service endpoint"),
        )
        .arg(
            Arg::new("standalone")
                .long("standalone")
                .help("Run with the in-process substrate and seed demonstration data")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let mut node_config = config::load(matches.get_one::<String>("config").map(PathBuf::from).as_deref())?;
    if let Some(data_dir) = matches.get_one::<String>("data-dir") {
        node_config.storage.path = PathBuf::from(data_dir);
    }
    if let Some(endpoint) = matches.get_one::<String>("endpoint") {
        node_config.substrate.endpoint = endpoint.clone();
    }
    if matches.get_flag("standalone") {
        node_config.substrate.endpoint.clear();
        node_config.ledger.seed_demo_data = true;
    }

    if let Err(e) = run_node(node_config).await {
        error!(error = %e, "node failed");
        return Err(e);
    }
    Ok(())
}

async fn run_node(node_config: NodeConfig) -> Result<()> {
    info!("starting tracelink node");

    let store: Arc<dyn KvStore> = match node_config.storage.backend {
        StorageBackend::Rocksdb => Arc::new(
            RocksDbStore::open(&node_config.storage.path).context("failed to open storage")?,
        ),
        StorageBackend::Memory => {
            info!("using in-memory storage; data will not survive restart");
            Arc::new(MemoryStore::new())
        }
    };

    let substrate: Arc<dyn CommitClient> = if node_config.substrate.is_remote() {
        info!(endpoint = %node_config.substrate.endpoint, "using remote ordering service");
        Arc::new(
            HttpCommitClient::new(&node_config.substrate)
                .context("failed to construct substrate client")?,
        )
    } else {
        info!("no ordering endpoint configured; using in-process substrate");
        Arc::new(InProcessCommitClient::new())
    };

    let engine = LedgerEngine::new(store, Arc::clone(&substrate), &node_config.ledger);

    if node_config.ledger.seed_demo_data {
        if engine.bootstrap().await.context("bootstrap failed")? {
            info!("first-run data seeded");
        }
    }

    let monitor = health::HealthMonitor::spawn(
        Arc::clone(&substrate),
        node_config.substrate.health_interval(),
    );

    info!("node ready; press ctrl-c to stop");
    signal::ctrl_c().await.context("failed to listen for shutdown signal")?;

    info!("shutting down");
    monitor.stop();
    engine.close().await.context("failed to close substrate client")?;
    info!("shutdown complete");
    Ok(())
}
