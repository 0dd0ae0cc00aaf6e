//! TraceLink Configuration Module
//!
//! This module provides configuration types for the TraceLink ledger node.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Interval between background substrate health probes
pub const HEALTH_POLL_INTERVAL_SECS: u64 = 30;

/// Default bound on the commit-substrate round trip
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Default on-disk location for ledger data
pub const DEFAULT_DATA_DIR: &str = "./data/ledger";

/// Default ordering channel submitted transactions are routed to
pub const DEFAULT_CHANNEL: &str = "scmchannel";

/// Number of leading transaction-id hex characters used as the suffix of
/// derived record keys (forecast/quality/supplier events)
pub const RECORD_KEY_SUFFIX_LEN: usize = 12;

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// RocksDB-backed durable storage
    #[default]
    Rocksdb,
    /// In-memory storage for tests and standalone runs
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Rocksdb => write!(f, "rocksdb"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rocksdb" | "rocks" => Ok(StorageBackend::Rocksdb),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Rocksdb,
            path: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

/// Commit-substrate client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstrateConfig {
    /// Base URL of the ordering service; empty selects the in-process client
    pub endpoint: String,
    /// Ordering channel name
    pub channel: String,
    /// Bound on the single commit round trip
    pub request_timeout_ms: u64,
    /// Background health probe cadence
    pub health_interval_secs: u64,
    /// Optional basic-auth credentials
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for SubstrateConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            channel: DEFAULT_CHANNEL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            health_interval_secs: HEALTH_POLL_INTERVAL_SECS,
            username: None,
            password: None,
        }
    }
}

impl SubstrateConfig {
    /// Whether an external ordering service endpoint is configured
    pub fn is_remote(&self) -> bool {
        !self.endpoint.is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }
}

/// Ledger engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Bound on the commit round trip performed by the coordinator
    pub request_timeout_ms: u64,
    /// Seed the demonstration inventory asset on first run
    pub seed_demo_data: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            seed_demo_data: false,
        }
    }
}

impl LedgerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Top-level node configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NodeConfig {
    pub storage: StorageConfig,
    pub substrate: SubstrateConfig,
    pub ledger: LedgerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_roundtrip() {
        assert_eq!("rocksdb".parse::<StorageBackend>(), Ok(StorageBackend::Rocksdb));
        assert_eq!("mem".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert!("leveldb".parse::<StorageBackend>().is_err());
        assert_eq!(StorageBackend::Memory.to_string(), "memory");
    }

    #[test]
    fn test_substrate_config_defaults() {
        let config = SubstrateConfig::default();
        assert!(!config.is_remote());
        assert_eq!(config.channel, DEFAULT_CHANNEL);
        assert_eq!(config.request_timeout(), Duration::from_millis(5_000));
        assert_eq!(config.health_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_node_config_from_partial_toml() {
        let config: NodeConfig = toml::from_str(
            r#"
            [storage]
            backend = "memory"

            [substrate]
            endpoint = "http://orderer.example.com:4000"
            request_timeout_ms = 250
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.path, PathBuf::from(DEFAULT_DATA_DIR));
        assert!(config.substrate.is_remote());
        assert_eq!(config.substrate.request_timeout_ms, 250);
        assert!(!config.ledger.seed_demo_data);
    }
}
