//! Transaction confirmation polling
//!
//! Polls the chain for a signature's status until it is `confirmed` or
//! `finalized`, it fails on chain, or the deadline passes. The loop is
//! bounded: callers always get an answer within the deadline.

use async_trait::async_trait;
use blink_types::{ConfirmationLevel, SignatureStatus};
use solana_client::{client_error::ClientErrorKind, nonblocking::rpc_client::RpcClient};
use solana_sdk::signature::Signature;
use solana_transaction_status::TransactionConfirmationStatus;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, error, info};

/// Error reported by a status source for one query
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// The query timed out; the poller retries
    #[error("Signature status request timed out")]
    Timeout,
    #[error("{0}")]
    Rpc(String),
}

/// Terminal confirmation failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfirmError {
    #[error("Transaction execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Failed to query transaction status: {0}")]
    Rpc(String),

    #[error("Timed out waiting for transaction {signature} after {elapsed_ms}ms")]
    Timeout { signature: String, elapsed_ms: u64 },
}

/// Chain collaborator reporting the status of a submitted signature
#[async_trait]
pub trait SignatureStatusSource: Send + Sync {
    /// `Ok(None)` when the signature is not known yet
    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, StatusError>;
}

#[async_trait]
impl SignatureStatusSource for RpcClient {
    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, StatusError> {
        let response = self
            .get_signature_statuses_with_history(&[*signature])
            .await
            .map_err(|e| match e.kind() {
                ClientErrorKind::Reqwest(inner) if inner.is_timeout() => StatusError::Timeout,
                _ => StatusError::Rpc(e.to_string()),
            })?;

        Ok(response
            .value
            .into_iter()
            .next()
            .flatten()
            .map(|status| SignatureStatus {
                confirmation_status: status.confirmation_status.map(confirmation_level),
                err: status.err.map(|e| format!("{e:?}")),
                confirmations: status.confirmations,
            }))
    }
}

fn confirmation_level(status: TransactionConfirmationStatus) -> ConfirmationLevel {
    match status {
        TransactionConfirmationStatus::Processed => ConfirmationLevel::Processed,
        TransactionConfirmationStatus::Confirmed => ConfirmationLevel::Confirmed,
        TransactionConfirmationStatus::Finalized => ConfirmationLevel::Finalized,
    }
}

/// Limits for [`confirm_transaction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmOptions {
    /// Overall wall-clock budget
    pub deadline: Duration,
    /// Budget for a single status query
    pub attempt_timeout: Duration,
    /// Pause between queries
    pub retry_delay: Duration,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            // 60s worst case finality plus 20% headroom
            deadline: Duration::from_millis(72_000),
            attempt_timeout: Duration::from_secs(5),
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Wait until `signature` reaches `confirmed` or `finalized`.
///
/// Query timeouts are transient and retried after `retry_delay`. An
/// on-chain execution error or any other RPC error fails immediately.
pub async fn confirm_transaction(
    source: &dyn SignatureStatusSource,
    signature: &Signature,
    options: &ConfirmOptions,
) -> Result<SignatureStatus, ConfirmError> {
    let started = Instant::now();
    let deadline = started + options.deadline;
    let timed_out = || ConfirmError::Timeout {
        signature: signature.to_string(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    };

    let mut attempt: u32 = 0;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            error!(%signature, attempts = attempt, "Transaction confirmation timed out");
            return Err(timed_out());
        }
        attempt += 1;

        let budget = options.attempt_timeout.min(remaining);
        match timeout(budget, source.signature_status(signature)).await {
            Err(_) | Ok(Err(StatusError::Timeout)) => {
                info!(%signature, attempt, "Confirming signature timed out, retrying");
            }
            Ok(Err(StatusError::Rpc(message))) => {
                error!(%signature, attempt, error = %message, "Error confirming transaction");
                return Err(ConfirmError::Rpc(message));
            }
            Ok(Ok(Some(status))) => {
                if let Some(err) = &status.err {
                    error!(%signature, error = %err, "Transaction failed on chain");
                    return Err(ConfirmError::ExecutionFailed(err.clone()));
                }
                if status.is_confirmed() {
                    info!(
                        %signature,
                        attempt,
                        level = ?status.confirmation_status,
                        "Transaction confirmed"
                    );
                    return Ok(status);
                }
                debug!(%signature, attempt, level = ?status.confirmation_status, "Not confirmed yet");
            }
            Ok(Ok(None)) => {
                debug!(%signature, attempt, "Signature not found yet");
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(timed_out());
        }
        sleep(options.retry_delay.min(remaining)).await;
    }
}
