//! In-process ordering stub.
//!
//! Acknowledges every submission immediately with a monotonically increasing
//! block number and remembers the commit record for audit lookups. Used in
//! standalone mode and by tests; carries no durability of its own, since
//! the ledger's own stores are the durable record.

use crate::{CommitAck, CommitClient, CommitRef, CommitRequest, HealthStatus, SubstrateError, SubstrateResult};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

/// Local always-available commit client
#[derive(Default)]
pub struct InProcessCommitClient {
    next_block: AtomicU64,
    commits: DashMap<u64, CommitRef>,
    closed: AtomicBool,
}

impl InProcessCommitClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transactions committed through this client
    pub fn committed_count(&self) -> usize {
        self.commits.len()
    }
}

#[async_trait]
impl CommitClient for InProcessCommitClient {
    async fn submit(&self, request: &CommitRequest) -> SubstrateResult<CommitAck> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SubstrateError::Transport("client is closed".into()));
        }

        let block_number = self.next_block.fetch_add(1, Ordering::SeqCst) + 1;
        let committed_at = Utc::now();
        self.commits.insert(
            block_number,
            CommitRef {
                block_number,
                transaction_id: request.transaction_id.clone(),
                committed_at,
            },
        );

        debug!(
            transaction_id = %request.transaction_id,
            block_number,
            "committed in-process"
        );
        Ok(CommitAck {
            transaction_id: request.transaction_id.clone(),
            block_number,
            committed_at,
        })
    }

    async fn health(&self) -> HealthStatus {
        if self.closed.load(Ordering::SeqCst) {
            HealthStatus::unhealthy("in-process substrate closed")
        } else {
            HealthStatus::healthy("in-process substrate")
        }
    }

    async fn commit_ref(&self, block_number: u64) -> SubstrateResult<Option<CommitRef>> {
        Ok(self.commits.get(&block_number).map(|entry| entry.value().clone()))
    }

    async fn close(&self) -> SubstrateResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str) -> CommitRequest {
        CommitRequest {
            transaction_id: id.to_string(),
            operation: "CreateAsset".to_string(),
            arguments: vec!["ITEM001".to_string()],
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_blocks_are_assigned_in_order() {
        let client = InProcessCommitClient::new();
        let first = client.submit(&request("tx1")).await.expect("ack");
        let second = client.submit(&request("tx2")).await.expect("ack");
        assert_eq!(first.block_number, 1);
        assert_eq!(second.block_number, 2);
        assert_eq!(client.committed_count(), 2);
    }

    #[tokio::test]
    async fn test_commit_ref_lookup() {
        let client = InProcessCommitClient::new();
        let ack = client.submit(&request("tx1")).await.expect("ack");

        let commit = client
            .commit_ref(ack.block_number)
            .await
            .expect("lookup")
            .expect("known block");
        assert_eq!(commit.transaction_id, "tx1");
        assert_eq!(client.commit_ref(99).await.expect("lookup"), None);
    }

    #[tokio::test]
    async fn test_closed_client_refuses_submissions() {
        let client = InProcessCommitClient::new();
        client.close().await.expect("close");
        assert!(client.submit(&request("tx1")).await.is_err());
        assert!(!client.health().await.healthy);
    }
}
