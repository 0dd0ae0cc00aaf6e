//! # TraceLink Substrate Clients
//!
//! Clients for the commit/ordering substrate: the external service that
//! linearizes and durably commits mutations before the ledger engine applies
//! them locally. The substrate itself is a black box; this crate defines the
//! contract the engine depends on and two implementations:
//!
//! - [`HttpCommitClient`]: posts transactions to a remote ordering service
//! - [`InProcessCommitClient`]: acknowledges locally, for standalone runs
//!   and tests
//!
//! Clients are constructed explicitly and injected; there is no process-wide
//! singleton. Teardown goes through [`CommitClient::close`].

/// HTTP ordering-service client
pub mod http_client;
/// In-process ordering stub
pub mod in_process;

pub use http_client::HttpCommitClient;
pub use in_process::InProcessCommitClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for substrate operations
pub type SubstrateResult<T> = std::result::Result<T, SubstrateError>;

/// Substrate-specific error types
#[derive(Debug, Clone, Error)]
pub enum SubstrateError {
    /// The ordering service could not be reached
    #[error("substrate transport error: {0}")]
    Transport(String),

    /// The ordering service answered but refused the submission
    #[error("substrate rejected submission: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for SubstrateError {
    fn from(err: reqwest::Error) -> Self {
        SubstrateError::Transport(err.to_string())
    }
}

/// A transaction handed to the substrate for ordering and commitment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub transaction_id: String,
    pub operation: String,
    pub arguments: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

/// The substrate's acknowledgement of a committed transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitAck {
    pub transaction_id: String,
    pub block_number: u64,
    pub committed_at: DateTime<Utc>,
}

/// The substrate's record of one committed reference, for audit lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRef {
    pub block_number: u64,
    pub transaction_id: String,
    pub committed_at: DateTime<Utc>,
}

/// Result of a health probe; never an error, unreachable maps to unhealthy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub healthy: bool,
    pub detail: String,
}

impl HealthStatus {
    pub fn healthy(detail: impl Into<String>) -> Self {
        Self {
            healthy: true,
            detail: detail.into(),
        }
    }

    pub fn unhealthy(detail: impl Into<String>) -> Self {
        Self {
            healthy: false,
            detail: detail.into(),
        }
    }
}

/// Client contract for the commit/ordering substrate.
///
/// `submit` performs the single round trip on the request path; the caller
/// bounds it with a timeout and treats elapsed time as unavailability.
#[async_trait]
pub trait CommitClient: Send + Sync {
    /// Submits a transaction for ordering; resolves once it is committed
    async fn submit(&self, request: &CommitRequest) -> SubstrateResult<CommitAck>;

    /// Probes service health; used by background polling only
    async fn health(&self) -> HealthStatus;

    /// Looks up the commit record for a block reference, if known
    async fn commit_ref(&self, block_number: u64) -> SubstrateResult<Option<CommitRef>>;

    /// Releases client resources; the client must not be used afterwards
    async fn close(&self) -> SubstrateResult<()>;
}
