//! Transaction records and the status state machine.
//!
//! Every submission is mirrored durably, whatever the outcome of the
//! underlying mutation: created `pending`, transitioned exactly once to
//! `confirmed` or `failed`, then immutable.

use crate::error::{ErrorKind, LedgerError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

impl TxStatus {
    /// Whether this status admits no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Confirmed | TxStatus::Failed)
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Pending => write!(f, "pending"),
            TxStatus::Confirmed => write!(f, "confirmed"),
            TxStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TxStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TxStatus::Pending),
            "confirmed" => Ok(TxStatus::Confirmed),
            "failed" => Ok(TxStatus::Failed),
            _ => Err(format!("Unknown transaction status: {}", s)),
        }
    }
}

/// Error classification preserved with a failed transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Durable mirror of one submitted operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub operation: String,
    pub arguments: Vec<String>,
    pub status: TxStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<TxError>,
}

impl TransactionRecord {
    /// Creates the pending record written at submission time
    pub fn pending(
        transaction_id: impl Into<String>,
        operation: impl Into<String>,
        arguments: &[String],
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            operation: operation.into(),
            arguments: arguments.to_vec(),
            status: TxStatus::Pending,
            submitted_at,
            result: None,
            error: None,
        }
    }

    /// Transitions to `confirmed`, storing the result payload.
    ///
    /// Rejects the transition when the record is already terminal.
    pub fn confirm(&mut self, result: serde_json::Value) -> Result<()> {
        self.transition(TxStatus::Confirmed)?;
        self.result = Some(result);
        Ok(())
    }

    /// Transitions to `failed`, preserving kind and message for audit
    pub fn fail(&mut self, kind: ErrorKind, message: impl Into<String>) -> Result<()> {
        self.transition(TxStatus::Failed)?;
        self.error = Some(TxError {
            kind,
            message: message.into(),
        });
        Ok(())
    }

    fn transition(&mut self, next: TxStatus) -> Result<()> {
        if self.status.is_terminal() {
            return Err(LedgerError::InvalidOperation(format!(
                "transaction {} is already {} and cannot become {}",
                self.transaction_id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }
}
